//! Element type tags.

use std::fmt;
use std::str::FromStr;

use crate::ScheduleError;

/// Element type of a tensor, named the way the compiler front-end names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F16,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
}

impl DType {
    /// Storage width in bits.
    pub fn bits(self) -> usize {
        match self {
            DType::Bool | DType::I8 | DType::U8 => 8,
            DType::F16 | DType::I16 | DType::U16 => 16,
            DType::F32 | DType::I32 | DType::U32 => 32,
            DType::F64 | DType::I64 | DType::U64 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::F16 => "float16",
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dtype = match s.trim() {
            "float16" | "f16" => DType::F16,
            "float32" | "f32" => DType::F32,
            "float64" | "f64" => DType::F64,
            "int8" | "i8" => DType::I8,
            "int16" | "i16" => DType::I16,
            "int32" | "i32" => DType::I32,
            "int64" | "i64" => DType::I64,
            "uint8" | "u8" => DType::U8,
            "uint16" | "u16" => DType::U16,
            "uint32" | "u32" => DType::U32,
            "uint64" | "u64" => DType::U64,
            "bool" => DType::Bool,
            other => return Err(ScheduleError::UnknownDType(other.to_string())),
        };
        Ok(dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compiler_names() {
        assert_eq!("float32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!("int8".parse::<DType>().unwrap(), DType::I8);
        assert_eq!(" uint16 ".parse::<DType>().unwrap(), DType::U16);
        assert_eq!("f16".parse::<DType>().unwrap(), DType::F16);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "bfloat16".parse::<DType>().unwrap_err();
        assert_eq!(err, ScheduleError::UnknownDType("bfloat16".into()));
    }

    #[test]
    fn test_display_roundtrips_name() {
        for dtype in [DType::F16, DType::I64, DType::Bool] {
            assert_eq!(dtype.to_string().parse::<DType>().unwrap(), dtype);
        }
    }

    #[test]
    fn test_bits() {
        assert_eq!(DType::I8.bits(), 8);
        assert_eq!(DType::F16.bits(), 16);
        assert_eq!(DType::F32.bits(), 32);
        assert_eq!(DType::U64.bits(), 64);
    }
}

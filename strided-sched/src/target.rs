//! Vector target description.
//!
//! A target is identified by the board name used on the compiler command
//! line (`c906`, `c908`, ...) or by an LLVM-style target string carrying a
//! `-device=` or `-mcpu=` option.

use std::str::FromStr;

use tracing::{debug, warn};

use crate::{Result, ScheduleError};

/// Environment variable naming the default target (board or target string).
pub const TARGET_ENV: &str = "STRIDED_SCHED_TARGET";

/// Fixed-width vector unit of a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VectorTarget {
    pub name: String,
    /// Bits per vector register.
    pub vlen: usize,
    /// Widest supported element, in bits.
    pub elen: usize,
}

impl VectorTarget {
    pub fn new(name: impl Into<String>, vlen: usize, elen: usize) -> Self {
        Self {
            name: name.into(),
            vlen,
            elen,
        }
    }

    pub fn c906() -> Self {
        Self::new("c906", 128, 64)
    }

    pub fn c908() -> Self {
        Self::new("c908", 128, 64)
    }

    pub fn c920() -> Self {
        Self::new("c920", 128, 64)
    }

    /// Look up a board preset.
    pub fn from_board(board: &str) -> Result<Self> {
        match board.trim() {
            "c906" => Ok(Self::c906()),
            "c908" => Ok(Self::c908()),
            "c920" => Ok(Self::c920()),
            other => Err(ScheduleError::UnknownTarget(other.to_string())),
        }
    }

    /// Resolve a target string such as
    /// `llvm -mtriple=riscv -mcpu=c906 -mfloat-abi=hard -device=c906`.
    ///
    /// `-device=` wins over `-mcpu=`; a bare word is treated as a board name.
    pub fn from_target_string(target: &str) -> Result<Self> {
        let option = |key: &str| {
            target
                .split_whitespace()
                .find_map(|tok| tok.strip_prefix(key))
                .filter(|v| !v.is_empty())
        };
        if let Some(board) = option("-device=").or_else(|| option("-mcpu=")) {
            return Self::from_board(board);
        }
        let mut words = target.split_whitespace();
        match (words.next(), words.next()) {
            (Some(board), None) if !board.starts_with('-') => Self::from_board(board),
            _ => Err(ScheduleError::UnknownTarget(target.trim().to_string())),
        }
    }

    /// Target from [`TARGET_ENV`], or `c906` when unset or unrecognised.
    pub fn from_env() -> Self {
        match std::env::var(TARGET_ENV) {
            Ok(value) => match Self::from_target_string(&value) {
                Ok(target) => {
                    debug!(target = %target.name, "vector target from environment");
                    target
                }
                Err(err) => {
                    warn!(%err, env = TARGET_ENV, "ignoring invalid target, using c906");
                    Self::c906()
                }
            },
            Err(_) => Self::c906(),
        }
    }
}

impl FromStr for VectorTarget {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_target_string(s)
    }
}

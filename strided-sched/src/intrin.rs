//! Layout-transform intrinsics and the registry that supplies them.
//!
//! The layout-transform micro-kernel fills one contiguous output tile of
//! `lanes` elements with a strided gather from the input:
//!
//! ```text
//! dst[k] = src[base + k * stride]    for k in 0..lanes
//! ```
//!
//! `skip_dims` tells the hardware kernel how many trailing input axes one
//! stride step crosses, so it can generate the address sequence without the
//! full input shape.

use std::fmt;

use tracing::debug;

use crate::dtype::DType;
use crate::target::VectorTarget;
use crate::{Result, ScheduleError};

/// Parameters that select one layout-transform micro-kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntrinsicRequest {
    pub lanes: usize,
    pub dtype: DType,
    pub stride: usize,
    pub skip_dims: usize,
}

impl IntrinsicRequest {
    fn lookup_error(&self, reason: impl Into<String>) -> ScheduleError {
        ScheduleError::IntrinsicLookup {
            dtype: self.dtype,
            lanes: self.lanes,
            stride: self.stride,
            skip_dims: self.skip_dims,
            reason: reason.into(),
        }
    }
}

/// Handle to a bound layout-transform micro-kernel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutTransformIntrinsic {
    request: IntrinsicRequest,
    name: String,
}

impl LayoutTransformIntrinsic {
    pub fn request(&self) -> &IntrinsicRequest {
        &self.request
    }

    /// Kernel symbol, unique per request.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lanes(&self) -> usize {
        self.request.lanes
    }

    /// Run the kernel on one tile: `dst[k] = src[base + k * stride]`.
    ///
    /// # Panics
    /// Panics if `dst` is not exactly `lanes` long or the gather reads past
    /// the end of `src`.
    #[inline]
    pub fn apply<T: Copy>(&self, src: &[T], base: usize, dst: &mut [T]) {
        assert_eq!(dst.len(), self.request.lanes, "tile width must equal lanes");
        let stride = self.request.stride;
        for (k, d) in dst.iter_mut().enumerate() {
            *d = src[base + k * stride];
        }
    }
}

impl fmt::Display for LayoutTransformIntrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Source of vector lane counts and layout-transform kernels for a target.
pub trait IntrinsicRegistry {
    /// Maximum lanes one vector operation can process for `dtype`.
    fn max_vector_lanes(&self, dtype: DType) -> Result<usize>;

    /// Construct the kernel for `request`, or fail with
    /// [`ScheduleError::IntrinsicLookup`] if none matches.
    fn build_layout_transform(&self, request: IntrinsicRequest)
        -> Result<LayoutTransformIntrinsic>;
}

impl<R: IntrinsicRegistry + ?Sized> IntrinsicRegistry for &R {
    fn max_vector_lanes(&self, dtype: DType) -> Result<usize> {
        (**self).max_vector_lanes(dtype)
    }

    fn build_layout_transform(
        &self,
        request: IntrinsicRequest,
    ) -> Result<LayoutTransformIntrinsic> {
        (**self).build_layout_transform(request)
    }
}

/// Registry for a RISC-V vector unit with a fixed `vlen`.
///
/// Lanes per dtype are `vlen / bits`; element types wider than `elen` and
/// `bool` have no kernel.
#[derive(Debug, Clone)]
pub struct RvvRegistry {
    target: VectorTarget,
}

impl RvvRegistry {
    pub fn new(target: VectorTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &VectorTarget {
        &self.target
    }

    fn unsupported(&self, dtype: DType) -> ScheduleError {
        ScheduleError::UnsupportedDType {
            dtype,
            target: self.target.name.clone(),
        }
    }
}

impl Default for RvvRegistry {
    fn default() -> Self {
        Self::new(VectorTarget::from_env())
    }
}

impl IntrinsicRegistry for RvvRegistry {
    fn max_vector_lanes(&self, dtype: DType) -> Result<usize> {
        if dtype == DType::Bool || dtype.bits() > self.target.elen {
            return Err(self.unsupported(dtype));
        }
        match self.target.vlen / dtype.bits() {
            0 => Err(self.unsupported(dtype)),
            lanes => Ok(lanes),
        }
    }

    fn build_layout_transform(
        &self,
        request: IntrinsicRequest,
    ) -> Result<LayoutTransformIntrinsic> {
        let max_lanes = self
            .max_vector_lanes(request.dtype)
            .map_err(|err| request.lookup_error(err.to_string()))?;
        if request.lanes == 0 {
            return Err(request.lookup_error("zero lanes"));
        }
        if request.lanes > max_lanes {
            return Err(request.lookup_error(format!(
                "{} lanes exceed the {}-lane vector unit of '{}'",
                request.lanes, max_lanes, self.target.name
            )));
        }
        if request.stride == 0 {
            return Err(request.lookup_error("zero stride"));
        }

        let name = format!(
            "layout_transform_{}_x{}_s{}_k{}",
            request.dtype, request.lanes, request.stride, request.skip_dims
        );
        debug!(kernel = %name, target = %self.target.name, "bound layout-transform intrinsic");
        Ok(LayoutTransformIntrinsic { request, name })
    }
}

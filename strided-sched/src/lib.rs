//! Loop-schedule construction for vectorized tensor transpose.
//!
//! Given a transpose node (input shape, output shape, element type) and the
//! requested axis permutation, this crate builds a declarative loop-transform
//! plan for a fixed-width vector target:
//!
//! ```text
//! fuse(all output axes) -> split(factor) -> parallel(outer) -> tensorize(inner)
//! ```
//!
//! The inner axis is bound to a strided layout-transform micro-kernel whose
//! `stride` / `skip_dims` parameters are derived from the permutation.
//!
//! # Pipeline
//!
//! - [`compute_vector_factor`]: widest tile that divides the output's last dim
//! - [`fuse_axes`]: flatten the output iteration space
//! - [`compute_stride_params`]: stride and skip-dims for the micro-kernel
//! - [`ScheduleBuilder`]: split, parallel-mark and tensorize
//! - [`IntrinsicRegistry`]: lane counts and micro-kernel lookup for a target
//!
//! # Example
//!
//! ```rust
//! use strided_sched::{schedule_transpose, DType, Permutation, RvvRegistry, TransposeOp, VectorTarget};
//!
//! let perm = Permutation::new(vec![2, 0, 1]);
//! let op = TransposeOp::new(vec![2, 3, 4], &perm, DType::F32).unwrap();
//! let registry = RvvRegistry::new(VectorTarget::c906());
//!
//! let schedule = schedule_transpose(&op, &perm, &registry).unwrap();
//! assert_eq!(op.output_shape, vec![4, 2, 3]);
//! assert_eq!(schedule.factor(), 3);
//! assert_eq!(schedule.intrinsic().request().stride, 4);
//! assert_eq!(schedule.intrinsic().request().skip_dims, 1);
//! ```

pub mod dtype;
pub mod error;
pub mod execute;
pub mod fuse;
pub mod intrin;
pub mod schedule;
pub mod shape;
pub mod stride;
pub mod target;

pub use dtype::DType;
pub use error::{Result, ScheduleError};
#[cfg(feature = "parallel")]
pub use execute::execute_par;
pub use execute::{execute, MINTHREADLENGTH};
pub use fuse::{fuse_axes, output_axes, FusedAxis, LoopAxis};
pub use intrin::{IntrinsicRegistry, IntrinsicRequest, LayoutTransformIntrinsic, RvvRegistry};
pub use schedule::{
    schedule_transpose, schedule_transpose_outputs, Schedule, ScheduleBuilder, ScheduleOp,
    TransposeAttrs, TransposeOp,
};
pub use shape::{compute_vector_factor, row_major_strides, validate_shape};
pub use stride::{compute_stride_params, transpose_output_shape, Permutation, StrideParams};
pub use target::{VectorTarget, TARGET_ENV};

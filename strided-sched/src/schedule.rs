//! Schedule construction for transpose.
//!
//! Pipeline: pick the vector factor → fuse the output axes → derive the
//! kernel stride parameters → split the fused axis by the factor → mark the
//! outer axis parallel → tensorize the inner axis with the layout-transform
//! intrinsic. The resulting [`Schedule`] is an immutable value; building it
//! twice from the same inputs gives equal schedules.

use std::fmt;

use tracing::debug;

use crate::dtype::DType;
use crate::fuse::{fuse_axes, output_axes, FusedAxis, LoopAxis};
use crate::intrin::{IntrinsicRegistry, IntrinsicRequest, LayoutTransformIntrinsic};
use crate::shape::{compute_vector_factor, validate_shape};
use crate::stride::{compute_stride_params, transpose_output_shape, Permutation, StrideParams};
use crate::{Result, ScheduleError};

/// A transpose node: one input tensor, one output tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransposeOp {
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
    pub dtype: DType,
}

impl TransposeOp {
    /// Node transposing `input_shape` by `perm`; the output shape is inferred.
    pub fn new(input_shape: Vec<usize>, perm: &Permutation, dtype: DType) -> Result<Self> {
        validate_shape(&input_shape)?;
        let output_shape = transpose_output_shape(&input_shape, perm)?;
        Ok(Self {
            input_shape,
            output_shape,
            dtype,
        })
    }

    /// Node with an explicit output shape.
    pub fn with_output(input_shape: Vec<usize>, output_shape: Vec<usize>, dtype: DType) -> Self {
        Self {
            input_shape,
            output_shape,
            dtype,
        }
    }

    pub fn rank(&self) -> usize {
        self.output_shape.len()
    }

    /// Number of output elements.
    pub fn output_len(&self) -> usize {
        self.output_shape.iter().product()
    }

    /// Check both shapes are non-empty, of equal rank and element count.
    pub(crate) fn validate(&self) -> Result<()> {
        validate_shape(&self.input_shape)?;
        validate_shape(&self.output_shape)?;
        if self.input_shape.len() != self.output_shape.len() {
            return Err(ScheduleError::RankMismatch(
                self.input_shape.len(),
                self.output_shape.len(),
            ));
        }
        let input_len: usize = self.input_shape.iter().product();
        if input_len != self.output_len() {
            return Err(ScheduleError::ShapeMismatch(
                self.input_shape.clone(),
                self.output_shape.clone(),
            ));
        }
        Ok(())
    }
}

/// Attributes of a transpose call. `axes == None` selects the default order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransposeAttrs {
    pub axes: Option<Vec<i64>>,
}

/// One loop transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOp {
    /// Merge `axes` into `fused`.
    Fuse { axes: Vec<LoopAxis>, fused: LoopAxis },
    /// Split `axis` into `outer` × `inner`, `inner.extent == factor`.
    Split {
        axis: LoopAxis,
        factor: usize,
        outer: LoopAxis,
        inner: LoopAxis,
    },
    /// Iterations of `axis` may run on independent workers.
    Parallel { axis: LoopAxis },
    /// Replace the loop over `axis` with one call to `intrinsic`.
    Tensorize {
        axis: LoopAxis,
        intrinsic: LayoutTransformIntrinsic,
    },
}

impl fmt::Display for ScheduleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleOp::Fuse { axes, fused } => {
                let names: Vec<&str> = axes.iter().map(|a| a.name.as_str()).collect();
                write!(f, "fuse({}) -> {}", names.join(", "), fused)
            }
            ScheduleOp::Split {
                axis,
                factor,
                outer,
                inner,
            } => write!(
                f,
                "split({}, factor={}) -> {}, {}",
                axis.name, factor, outer, inner
            ),
            ScheduleOp::Parallel { axis } => write!(f, "parallel({})", axis.name),
            ScheduleOp::Tensorize { axis, intrinsic } => {
                write!(f, "tensorize({}, {})", axis.name, intrinsic)
            }
        }
    }
}

/// Loop-transform plan for one transpose node.
///
/// Always holds exactly fuse, split, parallel, tensorize, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    ops: Vec<ScheduleOp>,
    fused: LoopAxis,
    outer: LoopAxis,
    inner: LoopAxis,
    intrinsic: LayoutTransformIntrinsic,
}

impl Schedule {
    pub fn ops(&self) -> &[ScheduleOp] {
        &self.ops
    }

    /// Lanes per tensorized tile.
    pub fn factor(&self) -> usize {
        self.inner.extent
    }

    pub fn fused(&self) -> &LoopAxis {
        &self.fused
    }

    /// The parallel axis.
    pub fn outer(&self) -> &LoopAxis {
        &self.outer
    }

    /// The tensorized axis.
    pub fn inner(&self) -> &LoopAxis {
        &self.inner
    }

    pub fn intrinsic(&self) -> &LayoutTransformIntrinsic {
        &self.intrinsic
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

/// Builds transpose schedules against an [`IntrinsicRegistry`].
#[derive(Debug, Clone)]
pub struct ScheduleBuilder<R> {
    registry: R,
}

impl<R: IntrinsicRegistry> ScheduleBuilder<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Split `fused` by `factor`, parallelize the outer axis and tensorize
    /// the inner one.
    ///
    /// Registry failures are returned unchanged; no fallback kernel is tried.
    pub fn build(
        &self,
        fused: &FusedAxis,
        factor: usize,
        params: StrideParams,
        dtype: DType,
    ) -> Result<Schedule> {
        let (outer, inner) = fused.axis.split(factor).ok_or_else(|| {
            ScheduleError::InvalidConfig(format!(
                "factor {factor} does not divide fused extent {}",
                fused.extent()
            ))
        })?;

        let request = IntrinsicRequest {
            lanes: factor,
            dtype,
            stride: params.stride,
            skip_dims: params.skip_dims,
        };
        let intrinsic = self.registry.build_layout_transform(request)?;

        debug!(
            fused = fused.extent(),
            outer = outer.extent,
            inner = inner.extent,
            kernel = intrinsic.name(),
            "built transpose schedule"
        );

        let ops = vec![
            ScheduleOp::Fuse {
                axes: fused.sources.clone(),
                fused: fused.axis.clone(),
            },
            ScheduleOp::Split {
                axis: fused.axis.clone(),
                factor,
                outer: outer.clone(),
                inner: inner.clone(),
            },
            ScheduleOp::Parallel {
                axis: outer.clone(),
            },
            ScheduleOp::Tensorize {
                axis: inner.clone(),
                intrinsic: intrinsic.clone(),
            },
        ];

        Ok(Schedule {
            ops,
            fused: fused.axis.clone(),
            outer,
            inner,
            intrinsic,
        })
    }

    /// Run the whole pipeline for one transpose node.
    pub fn schedule(&self, op: &TransposeOp, perm: &Permutation) -> Result<Schedule> {
        op.validate()?;
        perm.validate(op.rank())?;

        let max_lanes = self.registry.max_vector_lanes(op.dtype)?;
        let factor = compute_vector_factor(&op.output_shape, max_lanes);
        let fused = fuse_axes(&output_axes(&op.output_shape))?;
        let params = compute_stride_params(&op.input_shape, perm, op.rank())?;

        self.build(&fused, factor, params, op.dtype)
    }
}

/// Schedule a single transpose node.
pub fn schedule_transpose<R: IntrinsicRegistry>(
    op: &TransposeOp,
    perm: &Permutation,
    registry: R,
) -> Result<Schedule> {
    ScheduleBuilder::new(registry).schedule(op, perm)
}

/// Schedule the first node of an operator's output list.
pub fn schedule_transpose_outputs<R: IntrinsicRegistry>(
    outs: &[TransposeOp],
    attrs: &TransposeAttrs,
    registry: R,
) -> Result<Schedule> {
    let op = outs.first().ok_or(ScheduleError::NoOutputs)?;
    let perm = match &attrs.axes {
        Some(axes) => Permutation::from_axes(axes, op.rank())?,
        None => Permutation::empty(),
    };
    schedule_transpose(op, &perm, registry)
}

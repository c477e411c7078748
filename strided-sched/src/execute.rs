//! Reference execution of a transpose schedule on host buffers.
//!
//! Each iteration of the outer axis fills one `factor`-wide output tile with a
//! single call to the bound layout-transform intrinsic. The tile's input base
//! offset comes from its output coordinates; because the factor divides the
//! output's last extent, a tile never crosses an output row and its lanes are
//! exactly `stride` apart in the input.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::schedule::{Schedule, TransposeOp};
use crate::shape::row_major_strides;
use crate::stride::Permutation;
use crate::{Result, ScheduleError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Stack-allocated Vec for per-axis data. 8 covers the ranks seen in practice.
type SVec<T> = SmallVec<[T; 8]>;

/// Minimum number of output elements to justify multi-threaded execution.
pub const MINTHREADLENGTH: usize = 1 << 15;

/// Per-output-axis `(extent, input stride)` pairs and the validated tile width.
struct TileMap {
    axes: SVec<(usize, usize)>,
    factor: usize,
}

impl TileMap {
    fn new<T>(
        schedule: &Schedule,
        op: &TransposeOp,
        perm: &Permutation,
        src: &[T],
        dst: &[T],
    ) -> Result<Self> {
        op.validate()?;
        let input_len: usize = op.input_shape.iter().product();
        if src.len() != input_len {
            return Err(ScheduleError::BufferLength {
                expected: input_len,
                got: src.len(),
            });
        }
        if dst.len() != op.output_len() {
            return Err(ScheduleError::BufferLength {
                expected: op.output_len(),
                got: dst.len(),
            });
        }
        if schedule.fused().extent != op.output_len() {
            return Err(ScheduleError::ShapeMismatch(
                vec![schedule.fused().extent],
                op.output_shape.clone(),
            ));
        }

        let rank = op.rank();
        let order = perm.resolve(rank)?;
        let in_strides = row_major_strides(&op.input_shape);
        let axes: SVec<(usize, usize)> = order
            .iter()
            .zip(op.output_shape.iter())
            .map(|(&a, &d)| (d, in_strides[a]))
            .collect();

        let factor = schedule.factor();
        if factor != schedule.intrinsic().lanes() {
            return Err(ScheduleError::InvalidConfig(format!(
                "tile of {factor} does not match the {}-lane kernel",
                schedule.intrinsic().lanes()
            )));
        }
        let last = op.output_shape[rank - 1];
        if last % factor != 0 {
            return Err(ScheduleError::InvalidConfig(format!(
                "factor {factor} does not divide output row of {last}"
            )));
        }

        let req = schedule.intrinsic().request();
        let selected = order[rank - 1];
        if req.stride != in_strides[selected] || req.skip_dims != rank - 1 - selected {
            return Err(ScheduleError::InvalidConfig(format!(
                "kernel (stride={}, skip_dims={}) does not match input axis {} (stride={}, skip_dims={})",
                req.stride,
                req.skip_dims,
                selected,
                in_strides[selected],
                rank - 1 - selected
            )));
        }

        Ok(Self { axes, factor })
    }

    /// Input offset of output element `flat` (row-major).
    #[inline]
    fn input_offset(&self, mut flat: usize) -> usize {
        let mut offset = 0;
        for &(extent, stride) in self.axes.iter().rev() {
            offset += (flat % extent) * stride;
            flat /= extent;
        }
        offset
    }
}

/// Execute `schedule` for `op`, reading `src` (row-major input) and writing
/// `dst` (row-major output).
///
/// `perm` must resolve to a full axis order (empty selects the default
/// reversed order) consistent with the kernel bound in `schedule`.
pub fn execute<T: Copy>(
    schedule: &Schedule,
    op: &TransposeOp,
    perm: &Permutation,
    src: &[T],
    dst: &mut [T],
) -> Result<()> {
    let map = TileMap::new(schedule, op, perm, src, dst)?;
    let intrinsic = schedule.intrinsic();
    debug!(
        tiles = schedule.outer().extent,
        kernel = intrinsic.name(),
        "executing schedule"
    );

    debug_assert_eq!(dst.len() % map.factor, 0);
    for (tile, out) in dst.chunks_exact_mut(map.factor).enumerate() {
        let base = map.input_offset(tile * map.factor);
        trace!(tile, base, "layout transform");
        intrinsic.apply(src, base, out);
    }
    Ok(())
}

/// Execute `schedule` with outer-axis iterations dispatched across rayon.
///
/// Tiles write disjoint output chunks, so no synchronization is needed.
/// Falls back to [`execute`] below [`MINTHREADLENGTH`] elements.
#[cfg(feature = "parallel")]
pub fn execute_par<T: Copy + Send + Sync>(
    schedule: &Schedule,
    op: &TransposeOp,
    perm: &Permutation,
    src: &[T],
    dst: &mut [T],
) -> Result<()> {
    if dst.len() < MINTHREADLENGTH {
        return execute(schedule, op, perm, src, dst);
    }

    let map = TileMap::new(schedule, op, perm, src, dst)?;
    let intrinsic = schedule.intrinsic();
    debug!(
        tiles = schedule.outer().extent,
        threads = rayon::current_num_threads(),
        kernel = intrinsic.name(),
        "executing schedule in parallel"
    );

    debug_assert_eq!(dst.len() % map.factor, 0);
    dst.par_chunks_exact_mut(map.factor)
        .enumerate()
        .for_each(|(tile, out)| {
            let base = map.input_offset(tile * map.factor);
            intrinsic.apply(src, base, out);
        });
    Ok(())
}

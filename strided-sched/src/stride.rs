//! Permutations and the stride parameters of the layout-transform kernel.
//!
//! Only the last entry of the permutation drives the kernel parameters: it
//! names the input axis that becomes the output's fastest-varying axis. The
//! kernel gathers along that axis with
//!
//! ```text
//! stride    = prod(input_shape[index + 1..])   (1 when index is the last axis)
//! skip_dims = rank - 1 - index
//! ```
//!
//! i.e. `stride` is the row-major input stride of axis `index` and
//! `skip_dims` counts the trailing axes that stride spans.

use tracing::debug;

use crate::{Result, ScheduleError};

/// Axis order of a transpose. Empty means the default order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Permutation {
    axes: Vec<usize>,
}

impl Permutation {
    /// Wrap already-normalized axis indices. Use [`Permutation::from_axes`]
    /// for untrusted input.
    pub fn new(axes: Vec<usize>) -> Self {
        Self { axes }
    }

    /// The empty (default) permutation.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn identity(rank: usize) -> Self {
        Self {
            axes: (0..rank).collect(),
        }
    }

    /// Build from possibly negative axis indices, validating against `rank`.
    ///
    /// Negative axes count from the back (`-1` is the last axis).
    pub fn from_axes(axes: &[i64], rank: usize) -> Result<Self> {
        if axes.len() > rank {
            return Err(ScheduleError::PermutationTooLong {
                len: axes.len(),
                rank,
            });
        }
        let mut normalized = Vec::with_capacity(axes.len());
        for &axis in axes {
            let a = if axis < 0 { axis + rank as i64 } else { axis };
            if a < 0 || a >= rank as i64 {
                return Err(ScheduleError::InvalidAxis { axis, rank });
            }
            normalized.push(a as usize);
        }
        let perm = Self { axes: normalized };
        perm.validate(rank)?;
        Ok(perm)
    }

    /// Parse a textual axes attribute such as `[2, 0, 1]`, `(2,0,1)` or
    /// `2 0 1`. `[]`, `()`, `None` and the empty string give the empty
    /// permutation.
    pub fn parse(text: &str, rank: usize) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed == "None" {
            return Ok(Self::empty());
        }
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .or_else(|| trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')))
            .unwrap_or(trimmed);

        let mut axes = Vec::new();
        for token in inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let axis = token.parse::<i64>().map_err(|_| {
                ScheduleError::InvalidConfig(format!(
                    "permutation entry '{token}' is not an integer"
                ))
            })?;
            axes.push(axis);
        }
        Self::from_axes(&axes, rank)
    }

    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// The axis that drives the kernel stride: the last entry, or `0` when
    /// the permutation is empty.
    pub fn selected_axis(&self) -> usize {
        self.axes.last().copied().unwrap_or(0)
    }

    /// Check range, uniqueness and length against `rank`.
    pub fn validate(&self, rank: usize) -> Result<()> {
        if self.axes.len() > rank {
            return Err(ScheduleError::PermutationTooLong {
                len: self.axes.len(),
                rank,
            });
        }
        let mut seen = vec![false; rank];
        for &axis in &self.axes {
            if axis >= rank {
                return Err(ScheduleError::InvalidAxis {
                    axis: axis as i64,
                    rank,
                });
            }
            if seen[axis] {
                return Err(ScheduleError::DuplicateAxis(axis));
            }
            seen[axis] = true;
        }
        Ok(())
    }

    /// Full axis order for a tensor of `rank` axes.
    ///
    /// The empty permutation resolves to reversed axes, the default transpose.
    /// A non-empty permutation must name every axis.
    pub fn resolve(&self, rank: usize) -> Result<Vec<usize>> {
        if self.axes.is_empty() {
            return Ok((0..rank).rev().collect());
        }
        self.validate(rank)?;
        if self.axes.len() != rank {
            return Err(ScheduleError::RankMismatch(self.axes.len(), rank));
        }
        Ok(self.axes.clone())
    }
}

/// Output shape of transposing `input_shape` by `perm`.
pub fn transpose_output_shape(input_shape: &[usize], perm: &Permutation) -> Result<Vec<usize>> {
    let order = perm.resolve(input_shape.len())?;
    Ok(order.iter().map(|&a| input_shape[a]).collect())
}

/// Strided-access parameters for the layout-transform micro-kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrideParams {
    /// Input elements between consecutive lanes.
    pub stride: usize,
    /// Trailing axes spanned by one stride step.
    pub skip_dims: usize,
}

/// Derive the kernel stride and skip-dims count.
///
/// `index` is the permutation's last entry (or `0` if empty); the formulas
/// are applied literally, including for the empty permutation at rank > 1.
pub fn compute_stride_params(
    input_shape: &[usize],
    perm: &Permutation,
    output_rank: usize,
) -> Result<StrideParams> {
    if output_rank == 0 {
        return Err(ScheduleError::EmptyShape);
    }
    let index = perm.selected_axis();
    if index >= output_rank || index >= input_shape.len() {
        return Err(ScheduleError::InvalidAxis {
            axis: index as i64,
            rank: output_rank.min(input_shape.len()),
        });
    }

    let stride = if index == output_rank - 1 {
        1
    } else {
        input_shape[index + 1..].iter().product()
    };
    let skip_dims = output_rank - 1 - index;

    debug!(index, stride, skip_dims, "computed stride params");
    Ok(StrideParams { stride, skip_dims })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_unit_stride() {
        for rank in 1..6 {
            let shape: Vec<usize> = (2..2 + rank).collect();
            let p = compute_stride_params(&shape, &Permutation::identity(rank), rank).unwrap();
            assert_eq!(p, StrideParams { stride: 1, skip_dims: 0 });
        }
    }

    #[test]
    fn test_rotate_three_axes() {
        let p = compute_stride_params(&[2, 3, 4], &Permutation::new(vec![2, 0, 1]), 3).unwrap();
        assert_eq!(p.stride, 4);
        assert_eq!(p.skip_dims, 1);
    }

    #[test]
    fn test_empty_permutation_uses_axis_zero() {
        let p = compute_stride_params(&[2, 3, 4], &Permutation::empty(), 3).unwrap();
        assert_eq!(p.stride, 12);
        assert_eq!(p.skip_dims, 2);
    }

    #[test]
    fn test_empty_permutation_rank_one() {
        let p = compute_stride_params(&[9], &Permutation::empty(), 1).unwrap();
        assert_eq!(p, StrideParams { stride: 1, skip_dims: 0 });
    }

    #[test]
    fn test_only_last_entry_matters() {
        let a = compute_stride_params(&[2, 3, 4, 5], &Permutation::new(vec![0, 3, 2, 1]), 4);
        let b = compute_stride_params(&[2, 3, 4, 5], &Permutation::new(vec![3, 2, 0, 1]), 4);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_stride_out_of_range_axis() {
        let err = compute_stride_params(&[2, 3], &Permutation::new(vec![0, 5]), 2).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidAxis { axis: 5, .. }));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Permutation::parse("[2, 0, 1]", 3).unwrap().axes(), &[2, 0, 1]);
        assert_eq!(Permutation::parse("(1,0)", 2).unwrap().axes(), &[1, 0]);
        assert_eq!(Permutation::parse("1 2 0", 3).unwrap().axes(), &[1, 2, 0]);
        assert!(Permutation::parse("[]", 3).unwrap().is_empty());
        assert!(Permutation::parse("None", 3).unwrap().is_empty());
        assert!(Permutation::parse("  ", 3).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        let err = Permutation::parse("[0, x, 1]", 3).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfig(_)));
        let err = Permutation::parse("[0.5, 1]", 2).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_axes_negative() {
        let p = Permutation::from_axes(&[-1, 0, 1], 3).unwrap();
        assert_eq!(p.axes(), &[2, 0, 1]);
    }

    #[test]
    fn test_from_axes_rejects() {
        assert_eq!(
            Permutation::from_axes(&[0, 3], 3),
            Err(ScheduleError::InvalidAxis { axis: 3, rank: 3 })
        );
        assert_eq!(
            Permutation::from_axes(&[-4], 3),
            Err(ScheduleError::InvalidAxis { axis: -4, rank: 3 })
        );
        assert_eq!(
            Permutation::from_axes(&[1, 1], 3),
            Err(ScheduleError::DuplicateAxis(1))
        );
        assert_eq!(
            Permutation::from_axes(&[0, 1, 2], 2),
            Err(ScheduleError::PermutationTooLong { len: 3, rank: 2 })
        );
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Permutation::empty().resolve(3).unwrap(), vec![2, 1, 0]);
        assert_eq!(Permutation::new(vec![1, 0]).resolve(2).unwrap(), vec![1, 0]);
        assert_eq!(
            Permutation::new(vec![1]).resolve(2),
            Err(ScheduleError::RankMismatch(1, 2))
        );
    }

    #[test]
    fn test_default_transpose_agrees_with_selected_axis() {
        for rank in 1..6 {
            let order = Permutation::empty().resolve(rank).unwrap();
            assert_eq!(*order.last().unwrap(), Permutation::empty().selected_axis());
        }
    }

    #[test]
    fn test_output_shape() {
        let perm = Permutation::new(vec![2, 0, 1]);
        assert_eq!(transpose_output_shape(&[2, 3, 4], &perm).unwrap(), vec![4, 2, 3]);
        assert_eq!(
            transpose_output_shape(&[2, 3, 4], &Permutation::empty()).unwrap(),
            vec![4, 3, 2]
        );
    }
}

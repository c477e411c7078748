//! Shape analysis: validation, strides and vector-factor selection.

use tracing::debug;

use crate::{Result, ScheduleError};

/// Check that a shape has at least one axis and no zero extents.
pub fn validate_shape(shape: &[usize]) -> Result<()> {
    if shape.is_empty() {
        return Err(ScheduleError::EmptyShape);
    }
    if let Some(axis) = shape.iter().position(|&d| d == 0) {
        return Err(ScheduleError::ZeroExtent { axis });
    }
    Ok(())
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides(dims: &[usize]) -> Vec<usize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1usize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

/// Largest factor in `[1, max_lanes]` that evenly divides the output's
/// fastest-varying extent.
///
/// Candidates are tried from `max_lanes` downwards, so the first hit is the
/// widest tile. `1` always divides, so this never fails. An empty shape is
/// treated as a scalar (last extent 1).
pub fn compute_vector_factor(output_shape: &[usize], max_lanes: usize) -> usize {
    let last = output_shape.last().copied().unwrap_or(1);
    let factor = (1..=max_lanes.max(1))
        .rev()
        .find(|&f| last % f == 0)
        .unwrap_or(1);
    debug!(last_dim = last, max_lanes, factor, "selected vector factor");
    factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_exact_max() {
        assert_eq!(compute_vector_factor(&[4, 16], 8), 8);
    }

    #[test]
    fn test_factor_falls_back_to_divisor() {
        // 8, 7, 6 do not divide 15; 5 does
        assert_eq!(compute_vector_factor(&[2, 15], 8), 5);
    }

    #[test]
    fn test_factor_prime_extent() {
        assert_eq!(compute_vector_factor(&[13], 8), 1);
        assert_eq!(compute_vector_factor(&[13], 16), 13);
    }

    #[test]
    fn test_factor_extent_smaller_than_lanes() {
        assert_eq!(compute_vector_factor(&[3, 2], 4), 2);
    }

    #[test]
    fn test_factor_is_largest_divisor_in_range() {
        for last in 1..=64usize {
            for max_lanes in 1..=16usize {
                let f = compute_vector_factor(&[last], max_lanes);
                assert!(f >= 1 && f <= max_lanes);
                assert_eq!(last % f, 0);
                assert!((f + 1..=max_lanes).all(|g| last % g != 0));
            }
        }
    }

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(row_major_strides(&[5]), vec![1]);
        assert!(row_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_validate_shape() {
        assert!(validate_shape(&[1, 2]).is_ok());
        assert_eq!(validate_shape(&[]), Err(ScheduleError::EmptyShape));
        assert_eq!(
            validate_shape(&[3, 0, 2]),
            Err(ScheduleError::ZeroExtent { axis: 1 })
        );
    }
}

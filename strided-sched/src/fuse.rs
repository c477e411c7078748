//! Loop axes and iteration-space fusion.
//!
//! The output iteration space of a transpose is flattened into a single axis
//! before it is re-split into a parallel outer axis and a vector inner axis.

use std::fmt;

use tracing::debug;

use crate::{Result, ScheduleError};

/// One iteration dimension of the loop nest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoopAxis {
    /// Loop variable name, e.g. `ax0` or `ax0.ax1.fused.outer`.
    pub name: String,
    /// Number of iterations (loop runs `0..extent`).
    pub extent: usize,
}

impl LoopAxis {
    pub fn new(name: impl Into<String>, extent: usize) -> Self {
        Self {
            name: name.into(),
            extent,
        }
    }

    /// Split into `(outer, inner)` with `inner.extent == factor`.
    ///
    /// Returns `None` unless `factor` is non-zero and divides the extent.
    pub fn split(&self, factor: usize) -> Option<(LoopAxis, LoopAxis)> {
        if factor == 0 || self.extent % factor != 0 {
            return None;
        }
        let outer = LoopAxis::new(format!("{}.outer", self.name), self.extent / factor);
        let inner = LoopAxis::new(format!("{}.inner", self.name), factor);
        Some((outer, inner))
    }
}

impl fmt::Display for LoopAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[0, {})", self.name, self.extent)
    }
}

/// A single axis covering the whole iteration space of its source axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusedAxis {
    pub axis: LoopAxis,
    /// Axes absorbed by the fuse, outermost first.
    pub sources: Vec<LoopAxis>,
}

impl FusedAxis {
    pub fn extent(&self) -> usize {
        self.axis.extent
    }
}

/// The per-dimension loop axes of an output tensor, named `ax0..axN`.
pub fn output_axes(output_shape: &[usize]) -> Vec<LoopAxis> {
    output_shape
        .iter()
        .enumerate()
        .map(|(i, &d)| LoopAxis::new(format!("ax{i}"), d))
        .collect()
}

/// Fuse all axes into one whose extent is the product of theirs.
pub fn fuse_axes(axes: &[LoopAxis]) -> Result<FusedAxis> {
    if axes.is_empty() {
        return Err(ScheduleError::EmptyShape);
    }

    let extent: usize = axes.iter().map(|a| a.extent).product();
    let name = if axes.len() == 1 {
        axes[0].name.clone()
    } else {
        let joined: Vec<&str> = axes.iter().map(|a| a.name.as_str()).collect();
        format!("{}.fused", joined.join("."))
    };

    debug!(rank = axes.len(), extent, fused = %name, "fused output axes");

    Ok(FusedAxis {
        axis: LoopAxis::new(name, extent),
        sources: axes.to_vec(),
    })
}

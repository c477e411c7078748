use crate::dtype::DType;

/// Errors that can occur while building or executing a transpose schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The permutation attribute is not a sequence of integers.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Axis index outside `[-rank, rank)`.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: i64, rank: usize },

    /// The same axis appears twice in a permutation.
    #[error("axis {0} appears more than once in permutation")]
    DuplicateAxis(usize),

    /// More permutation entries than tensor axes.
    #[error("permutation of length {len} exceeds rank {rank}")]
    PermutationTooLong { len: usize, rank: usize },

    /// A tensor shape with no axes where at least one is required.
    #[error("shape must have at least one axis")]
    EmptyShape,

    /// A tensor shape with a zero-sized axis.
    #[error("axis {axis} has zero extent")]
    ZeroExtent { axis: usize },

    /// Ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Shapes do not match.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Unrecognised element type name.
    #[error("unknown dtype '{0}'")]
    UnknownDType(String),

    /// Unrecognised vector target or board name.
    #[error("unknown vector target '{0}'")]
    UnknownTarget(String),

    /// The target's vector unit cannot hold this element type.
    #[error("dtype {dtype} is not vectorizable on target '{target}'")]
    UnsupportedDType { dtype: DType, target: String },

    /// The intrinsic registry has no micro-kernel for this request.
    #[error("no layout-transform intrinsic for {dtype} x{lanes} (stride={stride}, skip_dims={skip_dims}): {reason}")]
    IntrinsicLookup {
        dtype: DType,
        lanes: usize,
        stride: usize,
        skip_dims: usize,
        reason: String,
    },

    /// An operator output list with nothing to schedule.
    #[error("no output tensors to schedule")]
    NoOutputs,

    /// Host buffer does not hold exactly the tensor's elements.
    #[error("buffer length mismatch: expected {expected}, got {got}")]
    BufferLength { expected: usize, got: usize },
}

/// Result type for schedule construction and execution.
pub type Result<T> = std::result::Result<T, ScheduleError>;

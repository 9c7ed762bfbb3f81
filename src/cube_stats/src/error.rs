use cube_stats_core::math::combinatorics::CombinatoricsError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CubeStatsError {
    #[error("Invalid combinatorial argument: {0}")]
    InvalidArgument(#[from] CombinatoricsError),
    #[error(
        "The set of given twists is not sufficient to solve all twists ({resolved}/{reachable})"
    )]
    InsufficientTwistSet { resolved: usize, reachable: usize },
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Unknown piece type {0:?}, expected \"corners\" or \"edges\"")]
    UnknownPieceType(String),
    #[error("Unknown piece {piece:?} for {plural_name}")]
    UnknownPiece { plural_name: String, piece: String },
    #[error("No buffers were given for {0}")]
    NoBuffers(String),
    #[error("Invalid twist for {plural_name}: {reason}")]
    InvalidTwist { plural_name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CubeStatsError>;

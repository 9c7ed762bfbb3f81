#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::cast_precision_loss,
    clippy::missing_panics_doc
)]

pub mod buffer_state;
pub mod decider;
pub mod error;
pub mod expectation;
pub mod method;
pub mod parity_solver;
pub mod solvable;
pub mod solver;
pub mod twist_solver;

pub use error::{CubeStatsError, Result};
pub use expectation::{
    AlgCountsData, AlgCountsRow, expected_alg_counts, expected_alg_counts_for_piece_type,
    expected_alg_counts_for_scrambles, expected_algs,
};
pub use method::{
    AlgSet, AlgSubset, BufferDescription, ExecutionOrder, MethodDescription,
    PieceMethodDescription, UniformAlgSetMode,
};

//! The two representations of a state the solver can work on.
//!
//! A [`Scramble`] is one concrete state, so every decision has exactly one
//! outcome. A [`ScrambleGroup`] stands for a whole class of equally likely
//! states, so a decision splits it into the classes that agree on the answer.
//! The solver is written once against [`Solvable`] and handles both.

use cube_stats_core::{
    alg::{DoubleSwap, EvenCycle, Parity, ParityTwist, ThreeCycle},
    math::{Orientation, Probabilistic},
    piece::Piece,
};
use std::{fmt::Debug, hash::Hash};

mod scramble;
mod scramble_group;
mod symmetry;

pub use scramble::Scramble;
pub use scramble_group::ScrambleGroup;
pub use symmetry::PieceSymmetry;

/// A decision together with the state it was made in. Deciding something about
/// a group can tell us more about the group, so the state comes back refined.
pub type Decided<S, T> = Probabilistic<(S, T)>;

/// A state of one piece type that the solver can query and change.
///
/// Queries prefixed with `decide_` may have to look at parts of the state that
/// are not known yet. Mutations must only touch pieces that the previous
/// queries revealed.
pub trait Solvable: Clone + Debug + Eq + Hash {
    /// The same state with the pieces the method can't tell apart renamed
    /// into a canonical order. Only valid while the solver holds no piece
    /// names, and solving the result takes the same kinds of algs.
    #[must_use]
    fn relabeled(&self) -> Self;

    /// The number of pieces that are not in their home position.
    fn num_permuted(&self) -> usize;

    /// The number of cycles of length at least two.
    fn num_cycles(&self) -> usize;

    /// Exactly two pieces are permuted, so only a parity is left.
    fn decide_is_parity_time(&self) -> Decided<Self, bool>;

    /// The piece is at home and oriented.
    fn decide_is_solved(&self, piece: Piece) -> Decided<Self, bool>;

    fn decide_is_permuted(&self, piece: Piece) -> Decided<Self, bool>;

    /// The piece is at home but not oriented.
    fn decide_is_twisted(&self, piece: Piece) -> Decided<Self, bool>;

    fn decide_has_permuted(&self) -> Decided<Self, bool>;

    /// The only twisted piece other than `except`, if there is exactly one.
    fn decide_only_twisted_except(&self, except: Option<Piece>) -> Decided<Self, Option<Piece>>;

    /// The sum of the orientations of all positions in the cycle of `piece`.
    fn decide_cycle_orientation(&self, piece: Piece) -> Decided<Self, Orientation>;

    /// The orientation of every piece.
    ///
    /// # Panics
    ///
    /// Panics if a piece is still permuted.
    fn decide_orientations(&self) -> Decided<Self, Vec<Orientation>>;

    fn decide_cycle_length(&self, piece: Piece) -> Decided<Self, usize>;

    /// The piece sitting in the home position of `piece`, which is the target
    /// to shoot to after `piece`.
    fn decide_next_piece(&self, piece: Piece) -> Decided<Self, Piece>;

    /// Break from a buffer in a 2-cycle into another cycle.
    #[must_use]
    fn apply_cycle_break_from_swap(&self, cycle_break: ThreeCycle) -> Self;

    /// Break from a buffer at home into a cycle.
    #[must_use]
    fn apply_cycle_break_from_unpermuted(&self, cycle_break: ThreeCycle) -> Self;

    /// Swap the two pieces of a 2-cycle home, leaving `orientation` on the
    /// buffer.
    #[must_use]
    fn apply_parity(&self, parity: Parity, orientation: Orientation) -> Self;

    /// Like `apply_parity`, but also move the twist of the unoriented piece
    /// into the buffer.
    #[must_use]
    fn apply_parity_twist(&self, parity_twist: ParityTwist, orientation: Orientation) -> Self;

    /// Solve the 2-cycle of the buffer and one target of a longer cycle.
    #[must_use]
    fn apply_partial_double_swap(&self, double_swap: DoubleSwap) -> Self;

    /// Solve two 2-cycles, leaving `orientation` on the third piece.
    #[must_use]
    fn apply_complete_double_swap(&self, double_swap: DoubleSwap, orientation: Orientation)
    -> Self;

    /// Solve the whole odd cycle of the buffer, leaving `orientation` on it.
    #[must_use]
    fn apply_complete_even_cycle(&self, cycle: EvenCycle, orientation: Orientation) -> Self;

    /// Solve the next targets of a longer cycle of the buffer.
    #[must_use]
    fn apply_partial_even_cycle(&self, cycle: EvenCycle) -> Self;
}

use crate::{
    math::combinatorics::{CombinatoricsError, choose, factorial},
    piece::{Piece, PieceDescription},
};
use integer_partitions::Partitions;
use itertools::Itertools;
use log::debug;
use memoize::memoize;

/// All ways to split `num_permuted` pieces into cycles of at least two pieces,
/// each cycle at least as long as the previous one. Odd permutations are left
/// out unless `allow_odd_permutations` is set.
#[memoize]
fn sorted_cycle_lengths(num_permuted: usize, allow_odd_permutations: bool) -> Vec<Vec<usize>> {
    let mut p = Partitions::new(num_permuted);
    let mut cycle_lengths = Vec::new();

    while let Some(x) = p.next() {
        if x.iter().any(|&length| length < 2) {
            continue;
        }
        let num_even_cycles = x.iter().filter(|&&length| length % 2 == 0).count();
        if !allow_odd_permutations && num_even_cycles % 2 == 1 {
            continue;
        }
        let mut lengths = x.to_vec();
        lengths.sort_unstable();
        cycle_lengths.push(lengths);
    }

    cycle_lengths
}

/// The scrambles of one piece type, where the permutation parity may be tied
/// to another piece type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PiecePermutationDescription {
    piece_description: PieceDescription,
    allow_odd_permutations: bool,
}

/// A class of scrambles sharing the same solved-or-unoriented pieces, the same
/// permuted pieces and the same cycle lengths among the permuted pieces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigScrambleGroup {
    solved_or_unoriented: Vec<Piece>,
    permuted: Vec<Piece>,
    sorted_cycle_lengths: Vec<usize>,
    count: u128,
}

impl PiecePermutationDescription {
    #[must_use]
    pub fn new(piece_description: PieceDescription, allow_odd_permutations: bool) -> Self {
        Self {
            piece_description,
            allow_odd_permutations,
        }
    }

    #[must_use]
    pub fn piece_description(&self) -> &PieceDescription {
        &self.piece_description
    }

    #[must_use]
    pub fn allow_odd_permutations(&self) -> bool {
        self.allow_odd_permutations
    }

    #[must_use]
    pub fn num_pieces(&self) -> usize {
        self.piece_description.num_pieces()
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + Clone + use<> {
        self.piece_description.pieces()
    }

    #[must_use]
    pub fn orientation_types(&self) -> u8 {
        self.piece_description.orientation_types()
    }

    /// The number of orientation states, where every piece but the last one
    /// may be twisted freely.
    fn orientation_count(&self) -> u128 {
        let exponent = u32::try_from(self.num_pieces() - 1).unwrap_or(u32::MAX);
        u128::from(self.orientation_types()).pow(exponent)
    }

    /// The number of valid permutation and orientation combinations.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the piece count is out of range.
    pub fn count(&self) -> Result<u128, CombinatoricsError> {
        let permutations = u128::from(factorial(self.num_pieces() as u64)?);
        let divisor = if self.allow_odd_permutations { 1 } else { 2 };
        Ok(self.orientation_count() * permutations / divisor)
    }

    /// Enumerate every scramble class. The counts of the classes add up to
    /// `count()`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the piece count is out of range.
    pub fn groups(&self) -> Result<Vec<BigScrambleGroup>, CombinatoricsError> {
        let mut groups = Vec::new();
        for solved_or_unoriented in self.pieces().powerset() {
            let permuted = self
                .pieces()
                .filter(|p| !solved_or_unoriented.contains(p))
                .collect_vec();
            for cycle_lengths in
                sorted_cycle_lengths(permuted.len(), self.allow_odd_permutations)
            {
                let count = self.group_count(&cycle_lengths)?;
                groups.push(BigScrambleGroup {
                    solved_or_unoriented: solved_or_unoriented.clone(),
                    permuted: permuted.clone(),
                    sorted_cycle_lengths: cycle_lengths,
                    count,
                });
            }
        }
        debug!(
            "{} scramble groups for {}",
            groups.len(),
            self.piece_description.plural_name()
        );
        Ok(groups)
    }

    /// The number of scrambles whose permuted pieces form cycles of the given
    /// sorted lengths, for one fixed set of permuted pieces.
    fn group_count(&self, sorted_cycle_lengths: &[usize]) -> Result<u128, CombinatoricsError> {
        let mut remaining = sorted_cycle_lengths.iter().sum::<usize>() as u64;
        let mut arrangements: u128 = 1;
        for &length in sorted_cycle_lengths {
            let length = length as u64;
            // Pick the members of the cycle, then one of its `(length - 1)!`
            // cyclic orders
            arrangements *= u128::from(choose(remaining, length)?);
            arrangements *= u128::from(factorial(length - 1)?);
            remaining -= length;
        }
        // Cycles of equal length are interchangeable
        for (_, run) in &sorted_cycle_lengths.iter().chunk_by(|&&length| length) {
            arrangements /= u128::from(factorial(run.count() as u64)?);
        }
        Ok(arrangements * self.orientation_count())
    }

    /// The probability of a scramble of this description to lie in `group`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the piece count is out of range.
    pub fn probability(&self, group: &BigScrambleGroup) -> Result<f64, CombinatoricsError> {
        Ok(group.count as f64 / self.count()? as f64)
    }
}

impl BigScrambleGroup {
    #[must_use]
    pub fn solved_or_unoriented(&self) -> &[Piece] {
        &self.solved_or_unoriented
    }

    #[must_use]
    pub fn permuted(&self) -> &[Piece] {
        &self.permuted
    }

    #[must_use]
    pub fn sorted_cycle_lengths(&self) -> &[usize] {
        &self.sorted_cycle_lengths
    }

    /// The number of scrambles in this class.
    #[must_use]
    pub fn count(&self) -> u128 {
        self.count
    }
}

use super::{Decided, Solvable};
use cube_stats_core::{
    alg::{DoubleSwap, EvenCycle, Parity, ParityTwist, ThreeCycle},
    math::{
        Orientation, Probabilistic,
        orientation::{implied_last, oriented_sum},
    },
    permutation::PiecePermutationDescription,
    piece::Piece,
};
use itertools::Itertools;

/// One concrete state of a piece type.
///
/// Position `p` holds the piece `pieces[p]` twisted by `orientations[p]`, so
/// following `pieces` from the buffer visits the targets in the order they are
/// shot to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scramble {
    pieces: Vec<Piece>,
    orientations: Vec<Orientation>,
}

impl Scramble {
    /// # Panics
    ///
    /// Panics if `pieces` is not a permutation, if the lengths differ or if
    /// the orientations don't add up to the solved orientation.
    #[must_use]
    pub fn new(pieces: Vec<Piece>, orientations: Vec<Orientation>) -> Self {
        assert_eq!(pieces.len(), orientations.len());
        assert!(
            pieces.iter().sorted().copied().eq((0..pieces.len()).map(|i| Piece::new(i as u8))),
            "The pieces of a scramble have to be a permutation"
        );
        if let Some(first) = orientations.first() {
            assert!(
                oriented_sum(first.modulus(), orientations.iter().copied()).is_solved(),
                "The orientations of a scramble have to add up to zero"
            );
        }
        Self {
            pieces,
            orientations,
        }
    }

    #[must_use]
    pub fn solved(description: &PiecePermutationDescription) -> Self {
        Self {
            pieces: description.pieces().collect(),
            orientations: description.piece_description().solved_orientations(),
        }
    }

    /// Every valid scramble of the description, one per permutation and
    /// orientation combination. Only feasible for a handful of pieces.
    #[must_use]
    pub fn all(description: &PiecePermutationDescription) -> Vec<Self> {
        let num_pieces = description.num_pieces();
        let modulus = description.orientation_types();
        let orientation_vectors = std::iter::repeat_n(Orientation::all(modulus), num_pieces - 1)
            .multi_cartesian_product()
            .map(|mut orientations| {
                orientations.push(implied_last(modulus, orientations.iter().copied()));
                orientations
            })
            .collect_vec();

        let mut scrambles = Vec::new();
        for pieces in description.pieces().permutations(num_pieces) {
            let scramble = Self::new(pieces, description.piece_description().solved_orientations());
            let num_all_cycles = scramble.num_cycles() + (num_pieces - scramble.num_permuted());
            let is_odd = (num_pieces - num_all_cycles) % 2 == 1;
            if is_odd && !description.allow_odd_permutations() {
                continue;
            }
            for orientations in &orientation_vectors {
                scrambles.push(Self {
                    pieces: scramble.pieces.clone(),
                    orientations: orientations.clone(),
                });
            }
        }
        scrambles
    }

    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[must_use]
    pub fn orientations(&self) -> &[Orientation] {
        &self.orientations
    }

    fn next(&self, piece: Piece) -> Piece {
        self.pieces[piece.id()]
    }

    fn orientation(&self, piece: Piece) -> Orientation {
        self.orientations[piece.id()]
    }

    fn is_home(&self, piece: Piece) -> bool {
        self.next(piece) == piece
    }

    /// The cycle of `piece` in shooting order, starting with `piece`.
    #[must_use]
    pub fn cycle(&self, piece: Piece) -> Vec<Piece> {
        let mut cycle = vec![piece];
        let mut current = self.next(piece);
        while current != piece {
            cycle.push(current);
            current = self.next(current);
        }
        cycle
    }

    #[must_use]
    pub fn cycle_length(&self, piece: Piece) -> usize {
        self.cycle(piece).len()
    }

    fn cycle_orientation(&self, piece: Piece) -> Orientation {
        let modulus = self.orientation(piece).modulus();
        oriented_sum(modulus, self.cycle(piece).into_iter().map(|p| self.orientation(p)))
    }

    fn set_home(&mut self, piece: Piece, orientation: Orientation) {
        self.pieces[piece.id()] = piece;
        self.orientations[piece.id()] = orientation;
    }

    fn twisted_except(&self, except: Option<Piece>) -> impl Iterator<Item = Piece> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(move |&(position, &piece)| {
                position == piece.id()
                    && Some(piece) != except
                    && !self.orientations[position].is_solved()
            })
            .map(|(_, &piece)| piece)
    }

    /// Cycle the contents of the three positions. Pieces that arrive at home
    /// hand their orientation to `first`.
    fn three_cycle(&self, cycle: ThreeCycle) -> Self {
        let ThreeCycle {
            first,
            second,
            third,
        } = cycle;
        let mut result = self.clone();
        result.pieces[second.id()] = self.next(first);
        result.pieces[third.id()] = self.next(second);
        result.pieces[first.id()] = self.next(third);
        result.orientations[second.id()] = self.orientation(first);
        result.orientations[third.id()] = self.orientation(second);
        result.orientations[first.id()] = self.orientation(third);
        for piece in [second, third] {
            if result.is_home(piece) {
                let orientation = result.orientation(piece);
                result.orientations[first.id()] = result.orientation(first) + orientation;
                result.orientations[piece.id()] = Orientation::solved(orientation.modulus());
            }
        }
        result
    }
}

impl Solvable for Scramble {
    fn relabeled(&self) -> Self {
        self.clone()
    }

    fn num_permuted(&self) -> usize {
        self.pieces
            .iter()
            .enumerate()
            .filter(|&(position, piece)| position != piece.id())
            .count()
    }

    fn num_cycles(&self) -> usize {
        let mut seen = vec![false; self.pieces.len()];
        let mut num_cycles = 0;
        for piece in self.pieces.iter().copied() {
            if seen[piece.id()] || self.is_home(piece) {
                continue;
            }
            for p in self.cycle(piece) {
                seen[p.id()] = true;
            }
            num_cycles += 1;
        }
        num_cycles
    }

    fn decide_is_parity_time(&self) -> Decided<Self, bool> {
        Probabilistic::deterministic((self.clone(), self.num_permuted() == 2))
    }

    fn decide_is_solved(&self, piece: Piece) -> Decided<Self, bool> {
        let is_solved = self.is_home(piece) && self.orientation(piece).is_solved();
        Probabilistic::deterministic((self.clone(), is_solved))
    }

    fn decide_is_permuted(&self, piece: Piece) -> Decided<Self, bool> {
        Probabilistic::deterministic((self.clone(), !self.is_home(piece)))
    }

    fn decide_is_twisted(&self, piece: Piece) -> Decided<Self, bool> {
        let is_twisted = self.is_home(piece) && !self.orientation(piece).is_solved();
        Probabilistic::deterministic((self.clone(), is_twisted))
    }

    fn decide_has_permuted(&self) -> Decided<Self, bool> {
        Probabilistic::deterministic((self.clone(), self.num_permuted() > 0))
    }

    fn decide_only_twisted_except(&self, except: Option<Piece>) -> Decided<Self, Option<Piece>> {
        let only = self.twisted_except(except).exactly_one().ok();
        Probabilistic::deterministic((self.clone(), only))
    }

    fn decide_cycle_orientation(&self, piece: Piece) -> Decided<Self, Orientation> {
        Probabilistic::deterministic((self.clone(), self.cycle_orientation(piece)))
    }

    fn decide_orientations(&self) -> Decided<Self, Vec<Orientation>> {
        assert_eq!(self.num_permuted(), 0, "Only unpermuted scrambles have twists");
        Probabilistic::deterministic((self.clone(), self.orientations.clone()))
    }

    fn decide_cycle_length(&self, piece: Piece) -> Decided<Self, usize> {
        Probabilistic::deterministic((self.clone(), self.cycle_length(piece)))
    }

    fn decide_next_piece(&self, piece: Piece) -> Decided<Self, Piece> {
        Probabilistic::deterministic((self.clone(), self.next(piece)))
    }

    fn apply_cycle_break_from_swap(&self, cycle_break: ThreeCycle) -> Self {
        assert_eq!(self.cycle_length(cycle_break.first), 2);
        assert_eq!(self.next(cycle_break.first), cycle_break.second);
        self.three_cycle(cycle_break)
    }

    fn apply_cycle_break_from_unpermuted(&self, cycle_break: ThreeCycle) -> Self {
        assert!(self.is_home(cycle_break.first));
        assert_eq!(self.next(cycle_break.second), cycle_break.third);
        self.three_cycle(cycle_break)
    }

    fn apply_parity(&self, parity: Parity, orientation: Orientation) -> Self {
        assert_eq!(self.cycle(parity.first), [parity.first, parity.last]);
        debug_assert_eq!(self.cycle_orientation(parity.first), orientation);
        let mut result = self.clone();
        result.set_home(parity.first, orientation);
        result.set_home(parity.last, Orientation::solved(orientation.modulus()));
        result
    }

    fn apply_parity_twist(&self, parity_twist: ParityTwist, orientation: Orientation) -> Self {
        let unoriented = parity_twist.unoriented;
        assert!(self.is_home(unoriented));
        let mut result = self.apply_parity(parity_twist.parity(), orientation);
        result.orientations[parity_twist.first.id()] = orientation + self.orientation(unoriented);
        result.orientations[unoriented.id()] = Orientation::solved(orientation.modulus());
        result
    }

    fn apply_partial_double_swap(&self, double_swap: DoubleSwap) -> Self {
        let DoubleSwap {
            first,
            second,
            third,
            fourth,
        } = double_swap;
        assert_eq!(self.cycle(first), [first, second]);
        assert_eq!(self.next(third), fourth);
        assert!(self.cycle_length(third) > 2);
        let modulus = self.orientation(first).modulus();
        let mut result = self.clone();
        result.set_home(first, self.orientation(first) + self.orientation(second));
        result.set_home(second, Orientation::solved(modulus));
        result.pieces[third.id()] = self.next(fourth);
        result.orientations[third.id()] = self.orientation(third) + self.orientation(fourth);
        result.set_home(fourth, Orientation::solved(modulus));
        result
    }

    fn apply_complete_double_swap(
        &self,
        double_swap: DoubleSwap,
        orientation: Orientation,
    ) -> Self {
        let DoubleSwap {
            first,
            second,
            third,
            fourth,
        } = double_swap;
        assert_eq!(self.cycle(first), [first, second]);
        assert_eq!(self.cycle(third), [third, fourth]);
        debug_assert_eq!(self.cycle_orientation(third), orientation);
        let modulus = orientation.modulus();
        let mut result = self.clone();
        result.set_home(first, self.orientation(first) + self.orientation(second));
        result.set_home(second, Orientation::solved(modulus));
        result.set_home(third, orientation);
        result.set_home(fourth, Orientation::solved(modulus));
        result
    }

    fn apply_complete_even_cycle(&self, cycle: EvenCycle, orientation: Orientation) -> Self {
        let members = self.cycle(cycle.buffer());
        assert_eq!(members.len(), cycle.cycle_length());
        debug_assert_eq!(self.cycle_orientation(cycle.buffer()), orientation);
        let mut result = self.clone();
        for piece in members {
            result.set_home(piece, Orientation::solved(orientation.modulus()));
        }
        result.orientations[cycle.buffer().id()] = orientation;
        result
    }

    fn apply_partial_even_cycle(&self, cycle: EvenCycle) -> Self {
        let buffer = cycle.buffer();
        let members = self.cycle(buffer);
        assert!(members.len() > cycle.cycle_length());
        let targets = &members[1..=cycle.num_targets()];
        let modulus = self.orientation(buffer).modulus();
        let mut result = self.clone();
        let mut buffer_orientation = self.orientation(buffer);
        for &piece in targets {
            buffer_orientation = buffer_orientation + self.orientation(piece);
            result.set_home(piece, Orientation::solved(modulus));
        }
        result.pieces[buffer.id()] = members[cycle.num_targets() + 1];
        result.orientations[buffer.id()] = buffer_orientation;
        result
    }
}

use super::{Decided, PieceSymmetry, Solvable};
use cube_stats_core::{
    alg::{DoubleSwap, EvenCycle, Parity, ParityTwist, ThreeCycle},
    math::{Orientation, Probabilistic, orientation::implied_last},
    permutation::PiecePermutationDescription,
    piece::Piece,
};
use itertools::Itertools;
use std::{
    hash::{Hash, Hasher},
    rc::Rc,
};

/// A position in a cycle whose piece is either known or one of the hidden
/// pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Slot {
    Hidden,
    Named(Piece),
}

/// The sum of the orientations of a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Unit {
    Unknown,
    Known(Orientation),
}

impl Unit {
    fn plus(self, other: Self) -> Self {
        match (self, other) {
            (Unit::Known(a), Unit::Known(b)) => Unit::Known(a + b),
            _ => Unit::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Cycle {
    slots: Vec<Slot>,
    unit: Unit,
}

impl Cycle {
    fn fixed(slot: Slot, unit: Unit) -> Self {
        Self {
            slots: vec![slot],
            unit,
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    /// Rotate to the smallest rotation so that equal cycles compare equal.
    fn canonical(mut self) -> Self {
        if let Some(start) = (0..self.slots.len()).min_by(|&a, &b| {
            self.slots[a..]
                .iter()
                .chain(&self.slots[..a])
                .cmp(self.slots[b..].iter().chain(&self.slots[..b]))
        }) {
            self.slots.rotate_left(start);
        }
        self
    }
}

/// All scrambles with a given cycle structure, where only some pieces have
/// been revealed so far.
///
/// Every slot is either named or hidden, and every assignment of the hidden
/// pool to the hidden slots is equally likely. Every cycle, including the
/// cycles of length one, carries one orientation unit. Unknown units are
/// uniformly distributed as long as all units add up to zero.
///
/// The state is kept in a canonical form between decisions, so that two groups
/// describing the same set of scrambles compare equal and can be merged. With
/// a [`PieceSymmetry`], [`Solvable::relabeled`] also merges groups that only
/// differ in the names of pieces the method can't tell apart.
#[derive(Clone, Debug)]
pub struct ScrambleGroup {
    modulus: u8,
    cycles: Vec<Cycle>,
    hidden: Vec<Piece>,
    symmetry: Rc<PieceSymmetry>,
}

impl PartialEq for ScrambleGroup {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus && self.cycles == other.cycles && self.hidden == other.hidden
    }
}

impl Eq for ScrambleGroup {}

impl Hash for ScrambleGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.modulus.hash(state);
        self.cycles.hash(state);
        self.hidden.hash(state);
    }
}

impl ScrambleGroup {
    /// All scrambles whose permuted pieces form cycles of the given lengths,
    /// with any pieces in any of the cycles.
    ///
    /// # Panics
    ///
    /// Panics if the cycles don't fit into the piece type or a cycle is
    /// shorter than two pieces.
    #[must_use]
    pub fn new(description: &PiecePermutationDescription, sorted_cycle_lengths: &[usize]) -> Self {
        let num_permuted: usize = sorted_cycle_lengths.iter().sum();
        assert!(num_permuted <= description.num_pieces());
        assert!(sorted_cycle_lengths.iter().all(|&length| length >= 2));
        let mut cycles = sorted_cycle_lengths
            .iter()
            .map(|&length| Cycle {
                slots: vec![Slot::Hidden; length],
                unit: Unit::Unknown,
            })
            .collect_vec();
        cycles.extend(
            (num_permuted..description.num_pieces())
                .map(|_| Cycle::fixed(Slot::Hidden, Unit::Unknown)),
        );
        Self {
            modulus: description.orientation_types(),
            cycles,
            hidden: description.pieces().collect(),
            symmetry: Rc::new(PieceSymmetry::none()),
        }
        .canonical()
    }

    /// The same group, renamed by [`Solvable::relabeled`] according to
    /// `symmetry`.
    #[must_use]
    pub fn with_symmetry(mut self, symmetry: Rc<PieceSymmetry>) -> Self {
        self.symmetry = symmetry;
        self
    }

    fn canonical(mut self) -> Self {
        self.cycles = self.cycles.into_iter().map(Cycle::canonical).collect();
        self.cycles.sort_unstable();
        self
    }

    /// Rename the pieces within every segment of the symmetry. The pieces a
    /// scan can still find keep their order and take the first names. The
    /// others are at home, where only their unit tells them apart, so they
    /// are sorted by it.
    fn relabel(mut self, fixed_are_ordered: bool) -> Self {
        if self.symmetry.is_none() {
            return self;
        }
        let num_pieces = self.cycles.iter().map(Cycle::len).sum::<usize>();
        let mut fixed_units = vec![None; num_pieces];
        for cycle in &self.cycles {
            if let [Slot::Named(piece)] = cycle.slots[..] {
                fixed_units[piece.id()] = Some(cycle.unit);
            }
        }
        let solved = self.solved_unit();
        let is_free = |piece: Piece| {
            fixed_units[piece.id()].is_some_and(|unit| !fixed_are_ordered || unit == solved)
        };

        let mut renamed = vec![None; num_pieces];
        for segment in self.symmetry.segments() {
            let (free, ordered): (Vec<_>, Vec<_>) =
                segment.iter().copied().partition(|&piece| is_free(piece));
            let free = free.into_iter().sorted_by_key(|piece| fixed_units[piece.id()]);
            for (&name, piece) in segment.iter().zip(ordered.into_iter().chain(free)) {
                renamed[piece.id()] = Some(name);
            }
        }

        let rename = |piece: Piece| renamed[piece.id()].unwrap_or(piece);
        for slot in self.cycles.iter_mut().flat_map(|cycle| &mut cycle.slots) {
            if let Slot::Named(piece) = slot {
                *piece = rename(*piece);
            }
        }
        for piece in &mut self.hidden {
            *piece = rename(*piece);
        }
        self.hidden.sort_unstable();
        self.canonical()
    }

    /// Once every piece is at home only the twist solver looks at the names,
    /// and its twists treat the pieces of a segment alike. The pieces chosen
    /// from a segment become the first hidden pieces of that segment.
    fn representatives(&self, chosen: &[Piece]) -> Vec<Piece> {
        let mut representatives = chosen
            .iter()
            .copied()
            .filter(|&piece| self.symmetry.segment_of(piece).is_none())
            .collect_vec();
        for (i, segment) in self.symmetry.segments().iter().enumerate() {
            let num_chosen = chosen
                .iter()
                .filter(|&&piece| self.symmetry.segment_of(piece) == Some(i))
                .count();
            representatives.extend(
                segment
                    .iter()
                    .copied()
                    .filter(|piece| self.hidden.contains(piece))
                    .take(num_chosen),
            );
        }
        representatives.sort_unstable();
        representatives
    }

    fn finish<T: Eq + Hash>(decided: Decided<Self, T>) -> Decided<Self, T> {
        decided.map(|(group, x)| (group.canonical(), x)).merged()
    }

    fn locate(&self, piece: Piece) -> Option<(usize, usize)> {
        self.cycles.iter().enumerate().find_map(|(i, cycle)| {
            cycle
                .slots
                .iter()
                .position(|&slot| slot == Slot::Named(piece))
                .map(|j| (i, j))
        })
    }

    fn name(&mut self, cycle: usize, slot: usize, piece: Piece) {
        debug_assert_eq!(self.cycles[cycle].slots[slot], Slot::Hidden);
        self.cycles[cycle].slots[slot] = Slot::Named(piece);
        self.hidden.retain(|&p| p != piece);
    }

    /// Where `piece` is. A hidden piece is equally likely to be in any hidden
    /// slot.
    fn place(&self, piece: Piece) -> Decided<Self, (usize, usize)> {
        if let Some(location) = self.locate(piece) {
            return Probabilistic::deterministic((self.clone(), location));
        }
        debug_assert!(self.hidden.contains(&piece));
        let hidden_slots = self
            .cycles
            .iter()
            .enumerate()
            .flat_map(|(i, cycle)| {
                cycle
                    .slots
                    .iter()
                    .enumerate()
                    .filter(|&(_, &slot)| slot == Slot::Hidden)
                    .map(move |(j, _)| (i, j))
            })
            .collect_vec();
        Probabilistic::uniform(hidden_slots).map(|(i, j)| {
            let mut group = self.clone();
            group.name(i, j, piece);
            (group, (i, j))
        })
    }

    /// The piece in a slot. A hidden slot is equally likely to hold any hidden
    /// piece.
    fn piece_at(&self, cycle: usize, slot: usize) -> Decided<Self, Piece> {
        match self.cycles[cycle].slots[slot] {
            Slot::Named(piece) => Probabilistic::deterministic((self.clone(), piece)),
            Slot::Hidden => Probabilistic::uniform(self.hidden.clone()).map(|piece| {
                let mut group = self.clone();
                group.name(cycle, slot, piece);
                (group, piece)
            }),
        }
    }

    /// The orientation unit of a cycle. The last unknown unit is implied by
    /// all the others.
    fn reveal(&self, cycle: usize) -> Decided<Self, Orientation> {
        if let Unit::Known(orientation) = self.cycles[cycle].unit {
            return Probabilistic::deterministic((self.clone(), orientation));
        }
        let with_unit = |orientation| {
            let mut group = self.clone();
            group.cycles[cycle].unit = Unit::Known(orientation);
            (group, orientation)
        };
        let num_unknown = self
            .cycles
            .iter()
            .filter(|c| c.unit == Unit::Unknown)
            .count();
        if num_unknown == 1 {
            let known = self.cycles.iter().filter_map(|c| match c.unit {
                Unit::Known(orientation) => Some(orientation),
                Unit::Unknown => None,
            });
            Probabilistic::deterministic(with_unit(implied_last(self.modulus, known)))
        } else {
            Probabilistic::uniform(Orientation::all(self.modulus).collect()).map(with_unit)
        }
    }

    /// Reveal the fixed points other than `except` until two of them are
    /// twisted. `except` has to be revealed already.
    fn only_twisted_except(&self, except: Option<Piece>) -> Decided<Self, Option<Piece>> {
        let candidates = self
            .cycles
            .iter()
            .positions(|cycle| {
                cycle.len() == 1 && except.is_none_or(|p| cycle.slots[0] != Slot::Named(p))
            })
            .collect_vec();

        // Stop looking as soon as there are two twisted pieces
        let mut frontier = Probabilistic::deterministic((self.clone(), Vec::new()));
        for i in candidates {
            frontier = frontier.flat_map(|(group, twisted): (Self, Vec<usize>)| {
                if twisted.len() >= 2 {
                    return Probabilistic::deterministic((group, twisted));
                }
                group.reveal(i).map(|(group, orientation)| {
                    let mut twisted = twisted.clone();
                    if !orientation.is_solved() {
                        twisted.push(i);
                    }
                    (group, twisted)
                })
            });
        }

        frontier.flat_map(|(group, twisted)| match twisted.as_slice() {
            &[i] => group
                .piece_at(i, 0)
                .map(|(group, piece)| (group, Some(piece))),
            _ => Probabilistic::deterministic((group, None)),
        })
    }

    /// # Panics
    ///
    /// Panics if the piece has not been revealed yet.
    fn find(&self, piece: Piece) -> (usize, usize) {
        self.locate(piece)
            .unwrap_or_else(|| panic!("Piece {piece} has to be revealed before it is moved"))
    }

    /// Remove the cycle of `piece`, rotated to start with `piece`.
    fn take_cycle(&mut self, piece: Piece) -> (Vec<Slot>, Unit) {
        let (i, j) = self.find(piece);
        let Cycle { mut slots, unit } = self.cycles.remove(i);
        slots.rotate_left(j);
        (slots, unit)
    }

    /// Remove the 2-cycle of `first` and `second`.
    fn take_swap(&mut self, first: Piece, second: Piece) -> Unit {
        let (slots, unit) = self.take_cycle(first);
        assert_eq!(slots, [Slot::Named(first), Slot::Named(second)]);
        unit
    }

    fn push_fixed(&mut self, slot: Slot, unit: Unit) {
        self.cycles.push(Cycle::fixed(slot, unit));
    }

    fn solved_unit(&self) -> Unit {
        Unit::Known(Orientation::solved(self.modulus))
    }

    /// Name the hidden fixed points that are twisted. Hidden pieces are
    /// equally likely to land on any of them, so only the set of pieces per
    /// orientation matters.
    fn name_twisted(&self) -> Probabilistic<Self> {
        let twisted = self
            .cycles
            .iter()
            .find_map(|cycle| match (cycle.slots.as_slice(), cycle.unit) {
                ([Slot::Hidden], Unit::Known(orientation)) if !orientation.is_solved() => {
                    Some(orientation)
                }
                _ => None,
            });
        let Some(orientation) = twisted else {
            return Probabilistic::deterministic(self.clone());
        };
        let slots = self
            .cycles
            .iter()
            .positions(|cycle| {
                cycle.slots == [Slot::Hidden] && cycle.unit == Unit::Known(orientation)
            })
            .collect_vec();
        let choices = self
            .hidden
            .iter()
            .copied()
            .combinations(slots.len())
            .map(|pieces| self.representatives(&pieces))
            .collect_vec();
        Probabilistic::uniform(choices).merged().flat_map(|pieces| {
            let mut group = self.clone();
            for (&i, piece) in slots.iter().zip(pieces) {
                group.name(i, 0, piece);
            }
            group.name_twisted()
        })
    }
}

impl Solvable for ScrambleGroup {
    fn relabeled(&self) -> Self {
        self.clone().relabel(self.symmetry.fixed_are_ordered())
    }

    fn num_permuted(&self) -> usize {
        self.cycles
            .iter()
            .map(Cycle::len)
            .filter(|&length| length > 1)
            .sum()
    }

    fn num_cycles(&self) -> usize {
        self.cycles.iter().filter(|cycle| cycle.len() > 1).count()
    }

    fn decide_is_parity_time(&self) -> Decided<Self, bool> {
        Probabilistic::deterministic((self.clone(), self.num_permuted() == 2))
    }

    fn decide_is_solved(&self, piece: Piece) -> Decided<Self, bool> {
        Self::finish(self.place(piece).flat_map(|(group, (i, _))| {
            if group.cycles[i].len() > 1 {
                Probabilistic::deterministic((group, false))
            } else {
                group
                    .reveal(i)
                    .map(|(group, orientation)| (group, orientation.is_solved()))
            }
        }))
    }

    fn decide_is_permuted(&self, piece: Piece) -> Decided<Self, bool> {
        Self::finish(self.place(piece).map(|(group, (i, _))| {
            let is_permuted = group.cycles[i].len() > 1;
            (group, is_permuted)
        }))
    }

    fn decide_is_twisted(&self, piece: Piece) -> Decided<Self, bool> {
        Self::finish(self.place(piece).flat_map(|(group, (i, _))| {
            if group.cycles[i].len() > 1 {
                Probabilistic::deterministic((group, false))
            } else {
                group
                    .reveal(i)
                    .map(|(group, orientation)| (group, !orientation.is_solved()))
            }
        }))
    }

    fn decide_has_permuted(&self) -> Decided<Self, bool> {
        Probabilistic::deterministic((self.clone(), self.num_permuted() > 0))
    }

    fn decide_only_twisted_except(&self, except: Option<Piece>) -> Decided<Self, Option<Piece>> {
        let placed = match except {
            Some(piece) => self.place(piece).map(|(group, _)| group),
            None => Probabilistic::deterministic(self.clone()),
        };
        Self::finish(placed.flat_map(|group| group.only_twisted_except(except)))
    }

    fn decide_cycle_orientation(&self, piece: Piece) -> Decided<Self, Orientation> {
        Self::finish(self.place(piece).flat_map(|(group, (i, _))| group.reveal(i)))
    }

    fn decide_orientations(&self) -> Decided<Self, Vec<Orientation>> {
        assert_eq!(self.num_permuted(), 0, "Only unpermuted scrambles have twists");

        // Every piece is at home, so none of them is ever scanned for again
        let mut frontier = Probabilistic::deterministic(self.clone().relabel(false));
        while frontier
            .possibilities()
            .iter()
            .any(|(group, _)| group.cycles.iter().any(|c| c.unit == Unit::Unknown))
        {
            frontier = frontier
                .flat_map(|group| {
                    match group.cycles.iter().position(|c| c.unit == Unit::Unknown) {
                        Some(i) => group.reveal(i).map(|(group, _)| group.relabel(false)),
                        None => Probabilistic::deterministic(group),
                    }
                })
                .merged();
        }

        let num_pieces = self.cycles.len();
        frontier
            .flat_map(|group| group.name_twisted())
            .map(|group| {
                let group = group.relabel(false);
                let mut orientations = vec![Orientation::solved(group.modulus); num_pieces];
                for cycle in &group.cycles {
                    if let ([Slot::Named(piece)], Unit::Known(orientation)) =
                        (cycle.slots.as_slice(), cycle.unit)
                    {
                        orientations[piece.id()] = orientation;
                    }
                }
                (group, orientations)
            })
            .merged()
    }

    fn decide_cycle_length(&self, piece: Piece) -> Decided<Self, usize> {
        Self::finish(self.place(piece).map(|(group, (i, _))| {
            let length = group.cycles[i].len();
            (group, length)
        }))
    }

    fn decide_next_piece(&self, piece: Piece) -> Decided<Self, Piece> {
        Self::finish(self.place(piece).flat_map(|(group, (i, j))| {
            let next = (j + 1) % group.cycles[i].len();
            group.piece_at(i, next)
        }))
    }

    fn apply_cycle_break_from_swap(&self, cycle_break: ThreeCycle) -> Self {
        let ThreeCycle {
            first,
            second,
            third,
        } = cycle_break;
        let mut group = self.clone();
        let swap_unit = group.take_swap(first, second);
        let (mut slots, unit) = group.take_cycle(third);
        // The cycle of `third` now ends with `third` and continues at `first`
        slots.rotate_left(1);
        slots.insert(0, Slot::Named(first));
        group.cycles.push(Cycle {
            slots,
            unit: swap_unit.plus(unit),
        });
        group.push_fixed(Slot::Named(second), group.solved_unit());
        group.canonical()
    }

    fn apply_cycle_break_from_unpermuted(&self, cycle_break: ThreeCycle) -> Self {
        let ThreeCycle {
            first,
            second,
            third,
        } = cycle_break;
        let mut group = self.clone();
        let (buffer_slots, buffer_unit) = group.take_cycle(first);
        assert_eq!(buffer_slots.len(), 1);
        let (mut slots, unit) = group.take_cycle(second);
        assert_eq!(slots[1], Slot::Named(third));
        slots[1] = Slot::Named(first);
        group.cycles.push(Cycle {
            slots,
            unit: unit.plus(buffer_unit),
        });
        group.push_fixed(Slot::Named(third), group.solved_unit());
        group.canonical()
    }

    fn apply_parity(&self, parity: Parity, orientation: Orientation) -> Self {
        let mut group = self.clone();
        group.take_swap(parity.first, parity.last);
        group.push_fixed(Slot::Named(parity.first), Unit::Known(orientation));
        group.push_fixed(Slot::Named(parity.last), group.solved_unit());
        group.canonical()
    }

    fn apply_parity_twist(&self, parity_twist: ParityTwist, orientation: Orientation) -> Self {
        let mut group = self.clone();
        group.take_swap(parity_twist.first, parity_twist.last);
        let (slots, unoriented_unit) = group.take_cycle(parity_twist.unoriented);
        assert_eq!(slots.len(), 1);
        let solved = group.solved_unit();
        group.push_fixed(
            Slot::Named(parity_twist.first),
            Unit::Known(orientation).plus(unoriented_unit),
        );
        group.push_fixed(Slot::Named(parity_twist.last), solved);
        group.push_fixed(Slot::Named(parity_twist.unoriented), solved);
        group.canonical()
    }

    fn apply_partial_double_swap(&self, double_swap: DoubleSwap) -> Self {
        let DoubleSwap {
            first,
            second,
            third,
            fourth,
        } = double_swap;
        let mut group = self.clone();
        let swap_unit = group.take_swap(first, second);
        let (mut slots, unit) = group.take_cycle(third);
        assert!(slots.len() > 2);
        assert_eq!(slots.remove(1), Slot::Named(fourth));
        group.cycles.push(Cycle { slots, unit });
        let solved = group.solved_unit();
        group.push_fixed(Slot::Named(first), swap_unit);
        group.push_fixed(Slot::Named(second), solved);
        group.push_fixed(Slot::Named(fourth), solved);
        group.canonical()
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
        let mut group = self.clone();
        let swap_unit = group.take_swap(first, second);
        group.take_swap(third, fourth);
        let solved = group.solved_unit();
        group.push_fixed(Slot::Named(first), swap_unit);
        group.push_fixed(Slot::Named(second), solved);
        group.push_fixed(Slot::Named(third), Unit::Known(orientation));
        group.push_fixed(Slot::Named(fourth), solved);
        group.canonical()
    }

    fn apply_complete_even_cycle(&self, cycle: EvenCycle, orientation: Orientation) -> Self {
        let mut group = self.clone();
        let (slots, _) = group.take_cycle(cycle.buffer());
        assert_eq!(slots.len(), cycle.cycle_length());
        let solved = group.solved_unit();
        group.push_fixed(Slot::Named(cycle.buffer()), Unit::Known(orientation));
        for &slot in &slots[1..] {
            group.push_fixed(slot, solved);
        }
        group.canonical()
    }

    fn apply_partial_even_cycle(&self, cycle: EvenCycle) -> Self {
        let mut group = self.clone();
        let (mut slots, unit) = group.take_cycle(cycle.buffer());
        assert!(slots.len() > cycle.cycle_length());
        let solved = group.solved_unit();
        for slot in slots.drain(1..=cycle.num_targets()) {
            group.push_fixed(slot, solved);
        }
        group.cycles.push(Cycle { slots, unit });
        group.canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_stats_core::{math::probabilistic::PROBABILITY_TOLERANCE, piece::PieceDescription};

    fn description(num_pieces: usize, unoriented_types: u8) -> PiecePermutationDescription {
        let pieces = PieceDescription::new("x", num_pieces, unoriented_types);
        PiecePermutationDescription::new(pieces, true)
    }

    fn probability_of<T: PartialEq>(decided: &Decided<ScrambleGroup, T>, value: &T) -> f64 {
        decided
            .possibilities()
            .iter()
            .filter(|((_, x), _)| x == value)
            .map(|&(_, p)| p)
            .sum()
    }

    #[test_log::test]
    fn shape() {
        let group = ScrambleGroup::new(&description(8, 2), &[2, 3]);
        assert_eq!(group.num_permuted(), 5);
        assert_eq!(group.num_cycles(), 2);
        assert_eq!(group.cycles.len(), 5);
    }

    #[test_log::test]
    fn hidden_pieces_are_placed_uniformly() {
        let group = ScrambleGroup::new(&description(4, 0), &[3]);
        let permuted = group.decide_is_permuted(Piece::new(0));
        // Rotations of the 3-cycle are merged
        assert_eq!(permuted.len(), 2);
        assert!((probability_of(&permuted, &true) - 0.75).abs() < PROBABILITY_TOLERANCE);
    }

    #[test_log::test]
    fn next_piece_is_uniform_among_the_rest() {
        let group = ScrambleGroup::new(&description(4, 0), &[4]);
        let next = group.decide_next_piece(Piece::new(0));
        assert_eq!(next.len(), 3);
        for (_, p) in next.possibilities() {
            assert!((p - 1.0 / 3.0).abs() < PROBABILITY_TOLERANCE);
        }
    }

    #[test_log::test]
    fn last_unit_is_implied() {
        let group = ScrambleGroup::new(&description(2, 2), &[]);
        let first = group.decide_cycle_orientation(Piece::new(0));
        assert_eq!(first.len(), 3);
        for ((group, orientation), _) in first.possibilities() {
            let second = group.decide_cycle_orientation(Piece::new(1)).assert_deterministic().1;
            assert!((*orientation + second).is_solved());
        }
    }

    #[test_log::test]
    fn orientations_of_unpermuted_groups() {
        let group = ScrambleGroup::new(&description(3, 2), &[]);
        let orientations = group.decide_orientations();
        assert_eq!(orientations.len(), 9);
        assert!(orientations.is_normalized());
        for ((_, orientations), p) in orientations.possibilities() {
            assert!((p - 1.0 / 9.0).abs() < PROBABILITY_TOLERANCE);
            let sum = orientations.iter().fold(Orientation::solved(3), |a, &b| a + b);
            assert!(sum.is_solved());
        }
    }

    #[test_log::test]
    fn only_twisted_except() {
        let group = ScrambleGroup::new(&description(3, 1), &[]);
        // With two orientations there is never exactly one twisted piece
        let only = group.decide_only_twisted_except(None);
        assert!((probability_of(&only, &None) - 1.0).abs() < PROBABILITY_TOLERANCE);

        // Leaving out one piece, the others are both twisted or both not, unless
        // the left out piece is twisted together with exactly one other
        let except = group.decide_only_twisted_except(Some(Piece::new(0)));
        assert!(except.is_normalized());
        assert!((probability_of(&except, &None) - 0.5).abs() < PROBABILITY_TOLERANCE);
    }

    /// Piece 0 plays a role, the others can be swapped freely.
    fn first_piece_is_a_role(num_pieces: u8) -> Rc<PieceSymmetry> {
        Rc::new(PieceSymmetry::new(
            (0..num_pieces).map(Piece::new),
            |piece| piece.id() == 0,
            true,
        ))
    }

    #[test_log::test]
    fn relabeling_merges_solved_pieces() {
        let plain = ScrambleGroup::new(&description(5, 1), &[2]);
        assert_eq!(plain.relabeled(), plain);

        let group = plain.with_symmetry(first_piece_is_a_role(5));
        let solved_at_home = |piece| {
            group
                .decide_is_solved(piece)
                .into_possibilities()
                .into_iter()
                .find(|((_, solved), _)| *solved)
                .map(|((group, _), _)| group)
                .unwrap()
        };
        let first = solved_at_home(Piece::new(1));
        let third = solved_at_home(Piece::new(3));
        assert_ne!(first, third);
        assert_eq!(first.relabeled(), third.relabeled());

        // The solved piece takes the last name of its segment
        let relabeled = first.relabeled();
        assert_eq!(relabeled.hidden, [0, 1, 2, 3].map(Piece::new));
        assert!(relabeled.decide_is_solved(Piece::new(4)).assert_deterministic().1);
    }

    #[test_log::test]
    fn relabeling_keeps_what_scans_can_find() {
        let group = ScrambleGroup::new(&description(4, 1), &[2])
            .with_symmetry(first_piece_is_a_role(4));
        let placed = group.decide_is_permuted(Piece::new(1));
        assert_eq!(placed.len(), 2);
        // Piece 1 is either permuted or at home with a unit that a scan for
        // twisted pieces would reveal
        for ((group, _), _) in placed.into_possibilities() {
            assert_eq!(group.relabeled(), group);
        }
    }

    #[test_log::test]
    fn twists_are_named_up_to_symmetry() {
        let o = |index| Orientation::new(index, 2);
        let group = ScrambleGroup::new(&description(4, 1), &[]);
        assert_eq!(group.decide_orientations().len(), 8);

        let orientations = group
            .with_symmetry(first_piece_is_a_role(4))
            .decide_orientations();
        assert_eq!(orientations.len(), 4);
        assert!(orientations.is_normalized());
        for (expected, probability) in [
            (vec![o(0), o(0), o(0), o(0)], 1.0 / 8.0),
            (vec![o(0), o(0), o(1), o(1)], 3.0 / 8.0),
            (vec![o(1), o(0), o(0), o(1)], 3.0 / 8.0),
            (vec![o(1), o(1), o(1), o(1)], 1.0 / 8.0),
        ] {
            let actual = probability_of(&orientations, &expected);
            assert!((actual - probability).abs() < PROBABILITY_TOLERANCE, "{expected:?}");
        }
    }

    #[test_log::test]
    fn complete_cycles_solve_every_slot() {
        let group = ScrambleGroup::new(&description(4, 2), &[3]);
        for ((group, permuted), _) in group.decide_is_permuted(Piece::new(0)).into_possibilities() {
            if !permuted {
                continue;
            }
            for ((group, orientation), _) in group
                .decide_cycle_orientation(Piece::new(0))
                .into_possibilities()
            {
                let solved =
                    group.apply_complete_even_cycle(EvenCycle::new(Piece::new(0), 2), orientation);
                assert_eq!(solved.num_permuted(), 0);
                let is_twisted = solved.decide_is_twisted(Piece::new(0)).assert_deterministic().1;
                assert_eq!(is_twisted, !orientation.is_solved());
            }
        }
    }
}

use crate::{
    alg_counts::{AlgCounts, AlgCountsBuilder},
    math::Orientation,
    piece::Piece,
};
use std::{fmt::Debug, hash::Hash};

/// The buffer together with an even number of targets. Shooting to all of
/// them is one cycle of odd length, the buffer plus its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EvenCycle {
    buffer: Piece,
    num_targets: usize,
}

impl EvenCycle {
    /// # Panics
    ///
    /// Panics if `num_targets` is odd or zero.
    #[must_use]
    pub fn new(buffer: Piece, num_targets: usize) -> Self {
        assert!(
            num_targets >= 2 && num_targets % 2 == 0,
            "An even cycle needs a positive even number of targets, got {num_targets}"
        );
        Self {
            buffer,
            num_targets,
        }
    }

    #[must_use]
    pub fn buffer(self) -> Piece {
        self.buffer
    }

    #[must_use]
    pub fn num_targets(self) -> usize {
        self.num_targets
    }

    /// The number of pieces the alg cycles, which is always odd.
    #[must_use]
    pub fn cycle_length(self) -> usize {
        self.num_targets + 1
    }
}

/// A 3-cycle moving the content of `first` to `second`, the content of
/// `second` to `third` and the content of `third` to `first`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ThreeCycle {
    pub first: Piece,
    pub second: Piece,
    pub third: Piece,
}

impl ThreeCycle {
    #[must_use]
    pub fn new(first: Piece, second: Piece, third: Piece) -> Self {
        debug_assert!(first != second && second != third && first != third);
        Self {
            first,
            second,
            third,
        }
    }
}

/// A swap of the buffer with one other piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Parity {
    pub first: Piece,
    pub last: Piece,
}

impl Parity {
    #[must_use]
    pub fn new(first: Piece, last: Piece) -> Self {
        debug_assert_ne!(first, last);
        Self { first, last }
    }
}

/// A parity that also orients one unoriented piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParityTwist {
    pub first: Piece,
    pub last: Piece,
    pub unoriented: Piece,
}

impl ParityTwist {
    #[must_use]
    pub fn new(parity: Parity, unoriented: Piece) -> Self {
        debug_assert!(unoriented != parity.first && unoriented != parity.last);
        Self {
            first: parity.first,
            last: parity.last,
            unoriented,
        }
    }

    #[must_use]
    pub fn parity(self) -> Parity {
        Parity::new(self.first, self.last)
    }
}

/// Two swaps at once, `first` with `second` and `third` with `fourth`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DoubleSwap {
    pub first: Piece,
    pub second: Piece,
    pub third: Piece,
    pub fourth: Piece,
}

impl DoubleSwap {
    #[must_use]
    pub fn new(first: Piece, second: Piece, third: Piece, fourth: Piece) -> Self {
        Self {
            first,
            second,
            third,
            fourth,
        }
    }
}

/// An alg that only changes orientations, one entry per piece.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Twist {
    orientations: Vec<Orientation>,
}

impl Twist {
    #[must_use]
    pub fn new(orientations: Vec<Orientation>) -> Self {
        Self { orientations }
    }

    #[must_use]
    pub fn orientations(&self) -> &[Orientation] {
        &self.orientations
    }

    #[must_use]
    pub fn num_unoriented(&self) -> usize {
        self.orientations.iter().filter(|o| !o.is_solved()).count()
    }
}

/// One step of a solve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Alg {
    /// A cycle of `length` pieces starting at `buffer`. The length is odd.
    Cycle { buffer: Piece, length: usize },
    Parity(Parity),
    ParityTwist(ParityTwist),
    DoubleSwap(DoubleSwap),
    Twist(Twist),
}

impl Alg {
    /// # Panics
    ///
    /// Panics if `length` is even or smaller than 3.
    #[must_use]
    pub fn cycle(buffer: Piece, length: usize) -> Self {
        assert!(
            length >= 3 && length % 2 == 1,
            "Cycle algs move an odd number of pieces, got {length}"
        );
        Self::Cycle { buffer, length }
    }
}

impl From<ThreeCycle> for Alg {
    fn from(three_cycle: ThreeCycle) -> Self {
        Self::cycle(three_cycle.first, 3)
    }
}

impl From<EvenCycle> for Alg {
    fn from(even_cycle: EvenCycle) -> Self {
        Self::cycle(even_cycle.buffer(), even_cycle.cycle_length())
    }
}

impl From<Parity> for Alg {
    fn from(parity: Parity) -> Self {
        Self::Parity(parity)
    }
}

impl From<ParityTwist> for Alg {
    fn from(parity_twist: ParityTwist) -> Self {
        Self::ParityTwist(parity_twist)
    }
}

impl From<DoubleSwap> for Alg {
    fn from(double_swap: DoubleSwap) -> Self {
        Self::DoubleSwap(double_swap)
    }
}

impl From<Twist> for Alg {
    fn from(twist: Twist) -> Self {
        Self::Twist(twist)
    }
}

/// The ordered list of algs that solve one scramble.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AlgTrace {
    algs: Vec<Alg>,
}

impl AlgTrace {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn algs(&self) -> &[Alg] {
        &self.algs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.algs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.algs.is_empty()
    }

    #[must_use]
    pub fn with_prefix(mut self, alg: impl Into<Alg>) -> Self {
        self.algs.insert(0, alg.into());
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, alg: impl Into<Alg>) -> Self {
        self.algs.push(alg.into());
        self
    }

    /// Tally the algs of this trace.
    #[must_use]
    pub fn count_algs(&self) -> AlgCounts {
        let mut builder = AlgCountsBuilder::default();
        for alg in &self.algs {
            match alg {
                Alg::Cycle { length, .. } => builder.add_cycle(*length),
                Alg::Parity(_) => builder.add_parity(),
                Alg::ParityTwist(_) => builder.add_parity_twist(),
                Alg::DoubleSwap(_) => builder.add_double_swap(),
                Alg::Twist(twist) => builder.add_twist(twist.num_unoriented()),
            }
        }
        builder.build()
    }

    /// Regroup the targets of consecutive cycles with the same buffer into as
    /// few cycles as `max_cycle_length(buffer)` allows.
    ///
    /// With a maximum of 3 every cycle becomes 3-cycles. With a maximum of 5,
    /// two 3-cycles in a row become one 5-cycle.
    ///
    /// # Panics
    ///
    /// Panics if `max_cycle_length` returns an even length or one smaller
    /// than 3.
    #[must_use]
    pub fn with_max_cycle_length(self, max_cycle_length: impl Fn(Piece) -> usize) -> Self {
        fn flush(
            run: Option<(Piece, usize)>,
            algs: &mut Vec<Alg>,
            max_cycle_length: &impl Fn(Piece) -> usize,
        ) {
            let Some((buffer, targets)) = run else {
                return;
            };
            algs.extend(
                split_targets(targets, max_cycle_length(buffer))
                    .map(|length| Alg::cycle(buffer, length)),
            );
        }

        let mut algs = Vec::with_capacity(self.algs.len());
        let mut run: Option<(Piece, usize)> = None;
        for alg in self.algs {
            match alg {
                Alg::Cycle { buffer, length } => match &mut run {
                    Some((run_buffer, targets)) if *run_buffer == buffer => {
                        *targets += length - 1;
                    }
                    _ => {
                        flush(run.take(), &mut algs, &max_cycle_length);
                        run = Some((buffer, length - 1));
                    }
                },
                other => {
                    flush(run.take(), &mut algs, &max_cycle_length);
                    algs.push(other);
                }
            }
        }
        flush(run, &mut algs, &max_cycle_length);
        Self { algs }
    }
}

/// The lengths of the cycles that shoot to `num_targets` targets in a row
/// when a cycle may move at most `max_length` pieces.
///
/// # Panics
///
/// Panics if `max_length` is even or smaller than 3.
fn split_targets(mut num_targets: usize, max_length: usize) -> impl Iterator<Item = usize> {
    assert!(
        max_length >= 3 && max_length % 2 == 1,
        "Cycle algs move an odd number of pieces, got a maximum of {max_length}"
    );
    std::iter::from_fn(move || {
        (num_targets > 0).then(|| {
            let chunk = num_targets.min(max_length - 1);
            num_targets -= chunk;
            chunk + 1
        })
    })
}

/// What the solver records about a solve while it builds it back to front.
///
/// [`AlgTrace`] keeps every alg with its pieces. [`AlgShape`] only keeps what
/// the alg counts need, so that solves that differ in the names of their
/// pieces but not in their counts collapse into one possibility.
pub trait Trace: Clone + Debug + Default + Eq + Hash {
    /// The twists that finish a solve.
    fn from_twists(twists: &AlgTrace) -> Self;

    /// The same solve with `alg` executed first.
    #[must_use]
    fn prepended(self, alg: &Alg) -> Self;

    /// Tally the algs after joining and splitting the cycles of every buffer
    /// the way [`AlgTrace::with_max_cycle_length`] does.
    fn count_merged_algs(&self, max_cycle_length: impl Fn(Piece) -> usize) -> AlgCounts;
}

impl Trace for AlgTrace {
    fn from_twists(twists: &AlgTrace) -> Self {
        twists.clone()
    }

    fn prepended(self, alg: &Alg) -> Self {
        self.with_prefix(alg.clone())
    }

    fn count_merged_algs(&self, max_cycle_length: impl Fn(Piece) -> usize) -> AlgCounts {
        self.clone()
            .with_max_cycle_length(max_cycle_length)
            .count_algs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum AlgKind {
    /// Consecutive cycles of one buffer, joined.
    Cycles { buffer: Piece, num_targets: usize },
    Parity,
    ParityTwist,
    DoubleSwap,
    Twist { num_unoriented: usize },
}

/// The kinds of the algs of a solve, without the pieces they move.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AlgShape {
    /// In reverse order of execution, so that prepending pushes.
    kinds: Vec<AlgKind>,
}

impl AlgShape {
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Trace for AlgShape {
    fn from_twists(twists: &AlgTrace) -> Self {
        twists
            .algs()
            .iter()
            .rev()
            .fold(Self::default(), |shape, alg| shape.prepended(alg))
    }

    fn prepended(mut self, alg: &Alg) -> Self {
        let kind = match alg {
            &Alg::Cycle { buffer, length } => match self.kinds.last_mut() {
                Some(AlgKind::Cycles {
                    buffer: first_buffer,
                    num_targets,
                }) if *first_buffer == buffer => {
                    *num_targets += length - 1;
                    return self;
                }
                _ => AlgKind::Cycles {
                    buffer,
                    num_targets: length - 1,
                },
            },
            Alg::Parity(_) => AlgKind::Parity,
            Alg::ParityTwist(_) => AlgKind::ParityTwist,
            Alg::DoubleSwap(_) => AlgKind::DoubleSwap,
            Alg::Twist(twist) => AlgKind::Twist {
                num_unoriented: twist.num_unoriented(),
            },
        };
        self.kinds.push(kind);
        self
    }

    fn count_merged_algs(&self, max_cycle_length: impl Fn(Piece) -> usize) -> AlgCounts {
        let mut builder = AlgCountsBuilder::default();
        for &kind in &self.kinds {
            match kind {
                AlgKind::Cycles {
                    buffer,
                    num_targets,
                } => {
                    for length in split_targets(num_targets, max_cycle_length(buffer)) {
                        builder.add_cycle(length);
                    }
                }
                AlgKind::Parity => builder.add_parity(),
                AlgKind::ParityTwist => builder.add_parity_twist(),
                AlgKind::DoubleSwap => builder.add_double_swap(),
                AlgKind::Twist { num_unoriented } => builder.add_twist(num_unoriented),
            }
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Piece = Piece::new(0);
    const B: Piece = Piece::new(1);
    const C: Piece = Piece::new(2);
    const D: Piece = Piece::new(3);

    fn twist() -> Twist {
        Twist::new(vec![
            Orientation::new(1, 3),
            Orientation::new(2, 3),
            Orientation::solved(3),
            Orientation::solved(3),
        ])
    }

    #[test_log::test]
    fn counting() {
        let trace = AlgTrace::empty()
            .with_suffix(ThreeCycle::new(A, B, C))
            .with_suffix(EvenCycle::new(A, 4))
            .with_suffix(DoubleSwap::new(A, B, C, D))
            .with_suffix(Parity::new(A, B))
            .with_suffix(twist())
            .with_prefix(ParityTwist::new(Parity::new(A, C), D));
        assert_eq!(trace.len(), 6);
        assert!(matches!(trace.algs()[0], Alg::ParityTwist(_)));

        let counts = trace.count_algs();
        assert_eq!(counts.cycles_of_length(3), 1.0);
        assert_eq!(counts.cycles_of_length(5), 1.0);
        assert_eq!(counts.double_swaps(), 1.0);
        assert_eq!(counts.parities(), 1.0);
        assert_eq!(counts.parity_twists(), 1.0);
        assert_eq!(counts.twists_with_num_unoriented(2), 1.0);
        assert_eq!(counts.total(), 6.0);
    }

    #[test_log::test]
    fn empty_trace_counts_nothing() {
        let counts = AlgTrace::empty().count_algs();
        assert_eq!(counts, AlgCounts::default());
        assert_eq!(counts.total(), 0.0);
    }

    #[test_log::test]
    fn five_cycles_merge_three_cycles() {
        let trace = AlgTrace::empty()
            .with_suffix(ThreeCycle::new(A, B, C))
            .with_suffix(ThreeCycle::new(A, C, D))
            .with_suffix(ThreeCycle::new(A, D, B))
            .with_suffix(Parity::new(A, B));
        let merged = trace.with_max_cycle_length(|_| 5);
        assert_eq!(
            merged.algs(),
            &[
                Alg::cycle(A, 5),
                Alg::cycle(A, 3),
                Alg::Parity(Parity::new(A, B))
            ]
        );
    }

    #[test_log::test]
    fn long_cycles_split_into_three_cycles() {
        let trace = AlgTrace::empty()
            .with_suffix(EvenCycle::new(A, 6))
            .with_suffix(ThreeCycle::new(B, C, D));
        let split = trace.with_max_cycle_length(|_| 3);
        assert_eq!(
            split.algs(),
            &[
                Alg::cycle(A, 3),
                Alg::cycle(A, 3),
                Alg::cycle(A, 3),
                Alg::cycle(B, 3)
            ]
        );
        assert_eq!(split.count_algs().cycles_of_length(3), 4.0);
    }

    #[test_log::test]
    fn shapes_count_like_traces() {
        let trace = AlgTrace::empty()
            .with_suffix(ThreeCycle::new(A, B, C))
            .with_suffix(EvenCycle::new(A, 4))
            .with_suffix(DoubleSwap::new(A, B, C, D))
            .with_suffix(ThreeCycle::new(C, A, B))
            .with_suffix(ThreeCycle::new(C, B, D))
            .with_suffix(Parity::new(C, D))
            .with_suffix(twist());
        let shape = trace
            .algs()
            .iter()
            .rev()
            .fold(AlgShape::default(), |shape, alg| shape.prepended(alg));
        // The two runs of cycles collapse into one kind each
        assert_eq!(shape.len(), 5);
        assert_eq!(shape, AlgShape::from_twists(&trace));

        for max_length in [3, 5, 7] {
            let max_cycle_length = |buffer| if buffer == A { max_length } else { 3 };
            assert_eq!(
                shape.count_merged_algs(max_cycle_length),
                trace.count_merged_algs(max_cycle_length)
            );
        }
        let counts = shape.count_merged_algs(|_| 5);
        // A shoots to six targets in a row, which takes a 5-cycle and a 3-cycle
        assert_eq!(counts.cycles_of_length(5), 2.0);
        assert_eq!(counts.cycles_of_length(3), 1.0);
    }

    #[test_log::test]
    fn shapes_forget_pieces() {
        let first = AlgShape::default()
            .prepended(&Alg::Parity(Parity::new(A, B)))
            .prepended(&Alg::from(ThreeCycle::new(A, C, D)));
        let second = AlgShape::default()
            .prepended(&Alg::Parity(Parity::new(A, D)))
            .prepended(&Alg::from(ThreeCycle::new(A, B, C)));
        assert_eq!(first, second);
        assert_ne!(first, AlgShape::default().prepended(&Alg::cycle(A, 3)));
    }

    #[test]
    #[should_panic]
    fn even_cycles_have_even_targets() {
        let _ = EvenCycle::new(A, 3);
    }
}

use crate::{
    buffer_state::BufferState,
    decider::Decider,
    error::Result,
    parity_solver::ParitySolver,
    solvable::{Decided, Solvable},
    twist_solver::TwistSolver,
};
use cube_stats_core::{
    alg::{Alg, AlgShape, AlgTrace, DoubleSwap, EvenCycle, Parity, ThreeCycle, Trace},
    alg_counts::AlgCounts,
    math::Probabilistic,
    piece::Piece,
};
use fxhash::FxHashMap;
use std::cell::RefCell;

/// All the ways a solve can go, with their probabilities.
pub type Traces<T> = Probabilistic<T>;

pub(crate) fn with_prefix<T: Trace>(traces: Traces<T>, alg: impl Into<Alg>) -> Traces<T> {
    let alg = alg.into();
    traces.map(|trace| trace.prepended(&alg))
}

/// The first of `pieces` that satisfies `condition`, if any.
pub(crate) fn decide_first_piece<S: Solvable>(
    solvable: &S,
    pieces: &[Piece],
    condition: impl Fn(&S, Piece) -> Decided<S, bool> + Copy,
) -> Decided<S, Option<Piece>> {
    let Some((&piece, rest)) = pieces.split_first() else {
        return Probabilistic::deterministic((solvable.clone(), None));
    };
    condition(solvable, piece).flat_map(|(solvable, found)| {
        if found {
            Probabilistic::deterministic((solvable, Some(piece)))
        } else {
            decide_first_piece(&solvable, rest, condition)
        }
    })
}

/// Solves one piece type the way the method describes it.
#[derive(Debug)]
pub struct Solver {
    decider: Decider,
    twist_solver: TwistSolver,
}

impl Solver {
    /// # Errors
    ///
    /// Returns `InsufficientTwistSet` if the twists of the method can't solve
    /// every twist.
    pub fn new(decider: Decider) -> Result<Self> {
        let twist_solver =
            TwistSolver::new(decider.piece_description(), decider.twists_with_costs())?;
        Ok(Self {
            decider,
            twist_solver,
        })
    }

    #[must_use]
    pub fn decider(&self) -> &Decider {
        &self.decider
    }

    /// A search that remembers every state it solves, so that solving many
    /// related states only solves each of their common states once.
    #[must_use]
    pub fn search<S: Solvable, T: Trace>(&self) -> Search<'_, S, T> {
        Search {
            decider: &self.decider,
            twist_solver: &self.twist_solver,
            solved: RefCell::new(FxHashMap::default()),
        }
    }

    /// The alg counts of every possible solve, cycles merged the way the
    /// buffers allow.
    pub fn alg_counts<S: Solvable>(&self, solvable: &S) -> Probabilistic<AlgCounts> {
        self.search::<S, AlgShape>().alg_counts(solvable)
    }

    /// Every possible sequence of algs that solves `solvable`.
    pub fn algs<S: Solvable>(&self, solvable: &S) -> Traces<AlgTrace> {
        self.search().algs(solvable)
    }
}

/// The solves of states of type `S`, recorded as `T`.
pub struct Search<'a, S, T> {
    decider: &'a Decider,
    twist_solver: &'a TwistSolver,
    solved: RefCell<FxHashMap<(BufferState, S), Traces<T>>>,
}

impl<S: Solvable, T: Trace> Search<'_, S, T> {
    /// Every possible solve of `solvable`.
    pub fn algs(&self, solvable: &S) -> Traces<T> {
        self.algs_with_state(BufferState::empty(), solvable, None)
    }

    /// The alg counts of every possible solve, cycles merged the way the
    /// buffers allow.
    pub fn alg_counts(&self, solvable: &S) -> Probabilistic<AlgCounts> {
        self.algs(solvable).map(|trace| {
            trace.count_merged_algs(|buffer| self.decider.max_cycle_length_for_buffer(buffer))
        })
    }

    /// The number of states solved so far.
    #[must_use]
    pub fn num_solved(&self) -> usize {
        self.solved.borrow().len()
    }

    fn parity_solver(&self) -> ParitySolver<'_> {
        ParitySolver::new(self.decider, self.twist_solver)
    }

    fn algs_with_state(
        &self,
        buffer_state: BufferState,
        solvable: &S,
        decreasing_number: Option<usize>,
    ) -> Traces<T> {
        // Breaking into a new cycle doesn't decrease the number of swaps, so
        // it may use up one extra step
        let mut next_decreasing_number = 2 * (solvable.num_permuted() + solvable.num_cycles());
        if decreasing_number.is_none_or(|previous| next_decreasing_number + 1 < previous) {
            next_decreasing_number += 1;
        }
        if let Some(previous) = decreasing_number {
            assert!(
                next_decreasing_number < previous,
                "The solve is not making progress: {solvable:?}"
            );
        }

        // No piece is held across this point, so the pieces can be renamed
        let key = (buffer_state, solvable.relabeled());
        if let Some(traces) = self.solved.borrow().get(&key) {
            return traces.clone();
        }

        let traces = self
            .decide_next_buffer(buffer_state, &key.1)
            .flat_map(|(solvable, buffer)| {
                let buffer_state = if buffer_state.previous_buffer() == Some(buffer) {
                    buffer_state
                } else {
                    BufferState::new(buffer)
                };
                self.algs_with_buffer(buffer_state, &solvable, next_decreasing_number, buffer)
            })
            .merged();
        self.solved.borrow_mut().insert(key, traces.clone());
        traces
    }

    /// Stay with the current buffer while it's unsolved or after a cycle
    /// break, otherwise float to the next buffer that has something to do.
    fn decide_next_buffer(&self, buffer_state: BufferState, solvable: &S) -> Decided<S, Piece> {
        let previous = buffer_state.previous_buffer();
        if let Some(previous) = previous.filter(|_| !self.decider.can_change_buffer(buffer_state)) {
            return Probabilistic::deterministic((solvable.clone(), previous));
        }

        let sorted_buffers = self.decider.sorted_buffers();
        let relevant = match previous.and_then(|p| sorted_buffers.iter().position(|&b| b == p)) {
            Some(index) => &sorted_buffers[index..],
            None => sorted_buffers,
        };
        let fallback = match previous {
            Some(previous) if self.decider.stay_with_solved_buffer(previous) => previous,
            _ => self.decider.favorite_buffer(),
        };

        let unsolved = |solvable: &S| {
            decide_first_piece(solvable, relevant, |s, buffer| {
                s.decide_is_solved(buffer).map(|(s, solved)| (s, !solved))
            })
        };
        let decided = if self.decider.avoid_unoriented_if_we_can_float() {
            decide_first_piece(solvable, relevant, |s, buffer| s.decide_is_permuted(buffer))
                .flat_map(|(solvable, buffer)| match buffer {
                    Some(buffer) => Probabilistic::deterministic((solvable, Some(buffer))),
                    None => unsolved(&solvable),
                })
        } else {
            unsolved(solvable)
        };
        decided.map(|(solvable, buffer)| (solvable, buffer.unwrap_or(fallback)))
    }

    fn algs_with_buffer(
        &self,
        buffer_state: BufferState,
        solvable: &S,
        decreasing_number: usize,
        buffer: Piece,
    ) -> Traces<T> {
        solvable
            .decide_is_permuted(buffer)
            .flat_map(|(solvable, is_permuted)| {
                if is_permuted {
                    self.algs_with_permuted_buffer(
                        buffer_state,
                        &solvable,
                        decreasing_number,
                        buffer,
                    )
                } else {
                    self.algs_with_unpermuted_buffer(
                        buffer_state,
                        &solvable,
                        decreasing_number,
                        buffer,
                    )
                }
            })
    }

    fn algs_with_permuted_buffer(
        &self,
        buffer_state: BufferState,
        solvable: &S,
        decreasing_number: usize,
        buffer: Piece,
    ) -> Traces<T> {
        solvable
            .decide_cycle_length(buffer)
            .flat_map(|(solvable, cycle_length)| match cycle_length {
                2 => solvable
                    .decide_is_parity_time()
                    .flat_map(|(solvable, is_parity_time)| {
                        if is_parity_time {
                            solvable
                                .decide_next_piece(buffer)
                                .flat_map(|(solvable, last)| {
                                    self.parity_solver()
                                        .algs_with_parity(&solvable, Parity::new(buffer, last))
                                })
                        } else {
                            self.algs_with_swapped_buffer(
                                buffer_state,
                                &solvable,
                                decreasing_number,
                                buffer,
                            )
                        }
                    }),
                length if length % 2 == 1 => {
                    let cycle = EvenCycle::new(buffer, length - 1);
                    solvable
                        .decide_cycle_orientation(buffer)
                        .flat_map(|(solvable, orientation)| {
                            let remaining = solvable.apply_complete_even_cycle(cycle, orientation);
                            let traces = self.algs_with_state(
                                buffer_state,
                                &remaining,
                                Some(decreasing_number),
                            );
                            with_prefix(traces, cycle)
                        })
                }
                length => {
                    let cycle = EvenCycle::new(buffer, length - 2);
                    let remaining = solvable.apply_partial_even_cycle(cycle);
                    let traces =
                        self.algs_with_state(buffer_state, &remaining, Some(decreasing_number));
                    with_prefix(traces, cycle)
                }
            })
    }

    /// The buffer is in a 2-cycle, but other pieces are permuted as well.
    fn algs_with_swapped_buffer(
        &self,
        buffer_state: BufferState,
        solvable: &S,
        decreasing_number: usize,
        buffer: Piece,
    ) -> Traces<T> {
        solvable
            .decide_next_piece(buffer)
            .flat_map(|(solvable, other)| {
                let cycle_breaks = self
                    .decider
                    .sorted_cycle_breaks()
                    .iter()
                    .copied()
                    .filter(|&p| p != buffer && p != other)
                    .collect::<Vec<_>>();
                decide_first_piece(&solvable, &cycle_breaks, |s, piece| {
                    s.decide_is_permuted(piece)
                })
                .flat_map(|(solvable, cycle_break)| {
                    let Some(cycle_break) = cycle_break else {
                        unreachable!("Only the buffer's 2-cycle is left at parity time");
                    };
                    solvable
                        .decide_next_piece(cycle_break)
                        .flat_map(|(solvable, next)| {
                            let double_swap = DoubleSwap::new(buffer, other, cycle_break, next);
                            self.algs_with_swap_into(
                                buffer_state,
                                &solvable,
                                decreasing_number,
                                double_swap,
                            )
                        })
                })
            })
    }

    /// Either solve both 2-cycles of `double_swap` at once, or break from the
    /// buffer's 2-cycle into the third piece.
    fn algs_with_swap_into(
        &self,
        buffer_state: BufferState,
        solvable: &S,
        decreasing_number: usize,
        double_swap: DoubleSwap,
    ) -> Traces<T> {
        let DoubleSwap {
            first: buffer,
            second: other,
            third: cycle_break,
            ..
        } = double_swap;
        solvable
            .decide_cycle_orientation(buffer)
            .flat_map(|(solvable, orientation)| {
                if self.decider.can_change_buffer(buffer_state)
                    && self.decider.is_buffer(cycle_break)
                    && self.decider.can_double_swap(double_swap, orientation)
                {
                    self.algs_with_double_swap(&solvable, decreasing_number, double_swap)
                } else {
                    let cycle_break = ThreeCycle::new(buffer, other, cycle_break);
                    let remaining = solvable.apply_cycle_break_from_swap(cycle_break);
                    let traces = self.algs_with_state(
                        buffer_state.with_cycle_break(),
                        &remaining,
                        Some(decreasing_number),
                    );
                    with_prefix(traces, cycle_break)
                }
            })
    }

    /// Swap the buffer home and continue with the third piece as the buffer.
    fn algs_with_double_swap(
        &self,
        solvable: &S,
        decreasing_number: usize,
        double_swap: DoubleSwap,
    ) -> Traces<T> {
        let new_buffer = double_swap.third;
        let is_complete = solvable
            .decide_cycle_length(new_buffer)
            .assert_deterministic()
            .1
            == 2;
        let remaining = if is_complete {
            solvable
                .decide_cycle_orientation(new_buffer)
                .map(|(solvable, orientation)| {
                    solvable.apply_complete_double_swap(double_swap, orientation)
                })
        } else {
            Probabilistic::deterministic(solvable.apply_partial_double_swap(double_swap))
        };
        remaining.flat_map(|remaining| {
            let traces = self.algs_with_state(
                BufferState::new(new_buffer),
                &remaining,
                Some(decreasing_number),
            );
            with_prefix(traces, double_swap)
        })
    }

    fn algs_with_unpermuted_buffer(
        &self,
        buffer_state: BufferState,
        solvable: &S,
        decreasing_number: usize,
        buffer: Piece,
    ) -> Traces<T> {
        solvable
            .decide_has_permuted()
            .flat_map(|(solvable, has_permuted)| {
                if !has_permuted {
                    return self.twist_solver.algs(&solvable);
                }
                let cycle_breaks = self
                    .decider
                    .sorted_cycle_breaks()
                    .iter()
                    .copied()
                    .filter(|&p| p != buffer)
                    .collect::<Vec<_>>();
                decide_first_piece(&solvable, &cycle_breaks, |s, piece| {
                    s.decide_is_permuted(piece)
                })
                .flat_map(|(solvable, cycle_break)| {
                    let Some(cycle_break) = cycle_break else {
                        unreachable!("Some piece other than the buffer is permuted");
                    };
                    solvable
                        .decide_next_piece(cycle_break)
                        .flat_map(|(solvable, next)| {
                            let cycle_break = ThreeCycle::new(buffer, cycle_break, next);
                            let remaining = solvable.apply_cycle_break_from_unpermuted(cycle_break);
                            let traces = self.algs_with_state(
                                buffer_state.with_cycle_break(),
                                &remaining,
                                Some(decreasing_number),
                            );
                            with_prefix(traces, cycle_break)
                        })
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        method::{AlgSet, BufferDescription, PieceMethodDescription, UniformAlgSetMode},
        solvable::Scramble,
    };
    use cube_stats_core::{
        math::Orientation, permutation::PiecePermutationDescription, piece::PieceDescription,
    };

    fn corners() -> PiecePermutationDescription {
        PiecePermutationDescription::new(PieceDescription::corners(), true)
    }

    fn solver(method: &PieceMethodDescription) -> Solver {
        Solver::new(Decider::new(corners(), method).unwrap()).unwrap()
    }

    fn ufr_method() -> PieceMethodDescription {
        PieceMethodDescription::new("corners", vec![BufferDescription::new("UFR")])
    }

    fn scramble(pieces: [u8; 8]) -> Scramble {
        Scramble::new(
            pieces.into_iter().map(Piece::new).collect(),
            vec![Orientation::solved(3); 8],
        )
    }

    fn trace(solver: &Solver, scramble: &Scramble) -> AlgTrace {
        solver.algs(scramble).assert_deterministic()
    }

    #[test_log::test]
    fn solved_needs_no_algs() {
        let solver = solver(&ufr_method());
        assert!(trace(&solver, &Scramble::solved(&corners())).is_empty());
        let counts = solver.alg_counts(&Scramble::solved(&corners())).assert_deterministic();
        assert_eq!(counts, AlgCounts::default());
    }

    #[test_log::test]
    fn three_cycle_through_the_buffer() {
        let solver = solver(&ufr_method());
        let trace = trace(&solver, &scramble([1, 2, 0, 3, 4, 5, 6, 7]));
        assert_eq!(trace.algs(), [Alg::cycle(Piece::new(0), 3)]);
    }

    #[test_log::test]
    fn cycle_break_into_a_second_cycle() {
        let solver = solver(&ufr_method());
        // UFR is solved, UBR UFL DFR form a 3-cycle
        let trace = trace(&solver, &scramble([0, 2, 4, 3, 1, 5, 6, 7]));
        assert_eq!(trace.len(), 2);
        let counts = solver
            .alg_counts(&scramble([0, 2, 4, 3, 1, 5, 6, 7]))
            .assert_deterministic();
        assert_eq!(counts.cycles_of_length(3), 2.0);
    }

    #[test_log::test]
    fn five_cycles_merge_three_cycles() {
        let method = PieceMethodDescription::new(
            "corners",
            vec![BufferDescription::new("UFR").with_five_cycles(true)],
        );
        let scramble = scramble([1, 2, 3, 4, 0, 5, 6, 7]);
        let counts = solver(&method).alg_counts(&scramble).assert_deterministic();
        assert_eq!(counts.cycles_of_length(5), 1.0);
        assert_eq!(counts.total(), 1.0);

        let counts = solver(&ufr_method()).alg_counts(&scramble).assert_deterministic();
        assert_eq!(counts.cycles_of_length(3), 2.0);
    }

    #[test_log::test]
    fn searches_remember_solved_states() {
        let solver = solver(&ufr_method());
        let search = solver.search::<Scramble, AlgTrace>();
        let scramble = scramble([0, 2, 4, 3, 1, 5, 6, 7]);
        let first = search.algs(&scramble);
        let num_solved = search.num_solved();
        // At least the start and the solved state
        assert!(num_solved >= 2);
        assert_eq!(search.algs(&scramble), first);
        assert_eq!(search.num_solved(), num_solved);
    }

    #[test_log::test]
    fn parity_at_the_end() {
        let solver = solver(&ufr_method());
        let counts = solver
            .alg_counts(&scramble([1, 0, 2, 3, 4, 5, 6, 7]))
            .assert_deterministic();
        assert_eq!(counts.parities(), 1.0);
        assert_eq!(counts.total(), 1.0);
    }

    #[test_log::test]
    fn double_swap_floats_to_the_second_buffer() {
        let method = PieceMethodDescription::new(
            "corners",
            vec![BufferDescription::new("UFR"), BufferDescription::new("UFL")],
        )
        .with_double_swaps(AlgSet::Uniform(UniformAlgSetMode::All));
        // UFR<->UBR and UFL<->UBL
        let scramble = scramble([1, 0, 3, 2, 4, 5, 6, 7]);
        let trace = trace(&solver(&method), &scramble);
        assert_eq!(
            trace.algs(),
            [Alg::DoubleSwap(DoubleSwap::new(
                Piece::new(0),
                Piece::new(1),
                Piece::new(2),
                Piece::new(3)
            ))]
        );

        // Without the double swap, UFR breaks into the other swap
        let trace = self::trace(&solver(&ufr_method()), &scramble);
        assert_eq!(trace.len(), 2);
        assert_eq!(
            trace.algs()[0],
            Alg::from(ThreeCycle::new(Piece::new(0), Piece::new(1), Piece::new(2)))
        );
    }
}

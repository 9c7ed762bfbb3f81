use crate::{
    decider::Decider,
    solvable::Solvable,
    solver::{Traces, decide_first_piece, with_prefix},
    twist_solver::TwistSolver,
};
use cube_stats_core::{
    alg::{Parity, ParityTwist, ThreeCycle, Trace},
    piece::Piece,
};

/// Takes over when only a parity and maybe some twists are left.
pub struct ParitySolver<'a> {
    decider: &'a Decider,
    twist_solver: &'a TwistSolver,
}

impl<'a> ParitySolver<'a> {
    #[must_use]
    pub fn new(decider: &'a Decider, twist_solver: &'a TwistSolver) -> Self {
        Self {
            decider,
            twist_solver,
        }
    }

    pub fn algs_with_parity<S: Solvable, T: Trace>(
        &self,
        solvable: &S,
        parity: Parity,
    ) -> Traces<T> {
        let candidates = self
            .decider
            .sorted_parity_twist_pieces(parity)
            .into_iter()
            .filter(|&p| p != parity.first && p != parity.last)
            .collect::<Vec<_>>();
        decide_first_piece(solvable, &candidates, |s, piece| s.decide_is_twisted(piece))
            .flat_map(|(solvable, unoriented)| match unoriented {
                Some(unoriented) => {
                    self.algs_with_parity_twist(&solvable, ParityTwist::new(parity, unoriented))
                }
                None => self.algs_with_vanilla_parity(&solvable, parity),
            })
            .merged()
    }

    fn algs_with_vanilla_parity<S: Solvable, T: Trace>(
        &self,
        solvable: &S,
        parity: Parity,
    ) -> Traces<T> {
        solvable
            .decide_only_twisted_except(None)
            .flat_map(|(solvable, only_twisted)| match only_twisted {
                Some(unoriented) if self.decider.do_unoriented_before_parity(parity) => {
                    self.algs_with_twist_first(&solvable, parity, unoriented)
                }
                _ => solvable
                    .decide_cycle_orientation(parity.first)
                    .flat_map(|(solvable, orientation)| {
                        let remaining = solvable.apply_parity(parity, orientation);
                        with_prefix(self.twist_solver.algs(&remaining), parity)
                    }),
            })
    }

    fn algs_with_parity_twist<S: Solvable, T: Trace>(
        &self,
        solvable: &S,
        parity_twist: ParityTwist,
    ) -> Traces<T> {
        let parity = parity_twist.parity();
        solvable
            .decide_only_twisted_except(Some(parity_twist.unoriented))
            .flat_map(|(solvable, only_twisted)| match only_twisted {
                Some(unoriented) if self.decider.do_unoriented_before_parity_twist(parity) => {
                    self.algs_with_twist_first(&solvable, parity, unoriented)
                }
                _ => solvable
                    .decide_cycle_orientation(parity.first)
                    .flat_map(|(solvable, orientation)| {
                        let remaining = solvable.apply_parity_twist(parity_twist, orientation);
                        with_prefix(self.twist_solver.algs(&remaining), parity_twist)
                    }),
            })
    }

    /// Break into the twisted piece, which leaves a parity with it.
    fn algs_with_twist_first<S: Solvable, T: Trace>(
        &self,
        solvable: &S,
        parity: Parity,
        unoriented: Piece,
    ) -> Traces<T> {
        let cycle_break = ThreeCycle::new(parity.first, parity.last, unoriented);
        let remaining = solvable.apply_cycle_break_from_swap(cycle_break);
        let traces = self.algs_with_parity(&remaining, Parity::new(parity.first, unoriented));
        with_prefix(traces, cycle_break)
    }
}

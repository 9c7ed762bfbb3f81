use crate::{
    error::{CubeStatsError, Result},
    solvable::Solvable,
};
use cube_stats_core::{
    alg::{AlgTrace, Trace, Twist},
    math::{Orientation, Probabilistic},
    piece::PieceDescription,
    start, success,
};
use log::{debug, info};
use std::{cmp::Ordering, cmp::Reverse, collections::BinaryHeap, time::Instant};

/// A twist alg and how expensive it is to execute.
#[derive(Clone, Debug, PartialEq)]
pub struct TwistWithCost {
    pub twist: Twist,
    pub cost: f64,
}

/// The cost of a sequence of twists. Sequences that cost the same prefer
/// fewer twists, then fewer twists of many pieces, so the winner doesn't
/// depend on the order of the twists or the names of the pieces.
#[derive(Clone, Debug)]
struct Cost {
    total: f64,
    num_twists: usize,
    /// The number of twists by the number of pieces they twist, largest first.
    by_size: Vec<usize>,
}

impl Cost {
    fn zero(num_pieces: usize) -> Self {
        Self {
            total: 0.0,
            num_twists: 0,
            by_size: vec![0; num_pieces + 1],
        }
    }

    fn plus(&self, twist_with_cost: &TwistWithCost) -> Self {
        let mut by_size = self.by_size.clone();
        by_size[self.by_size.len() - 1 - twist_with_cost.twist.num_unoriented()] += 1;
        Self {
            total: self.total + twist_with_cost.cost,
            num_twists: self.num_twists + 1,
            by_size,
        }
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total
            .total_cmp(&other.total)
            .then(self.num_twists.cmp(&other.num_twists))
            .then_with(|| self.by_size.cmp(&other.by_size))
    }
}

/// Solves the orientations that are left once every piece is at home.
///
/// The cheapest sequence of twists for every orientation state is precomputed.
/// A twist is named by the orientations it fixes, so a state is solved by
/// twists that add up to it.
#[derive(Debug)]
pub struct TwistSolver {
    modulus: u8,
    num_pieces: usize,
    traces: Vec<AlgTrace>,
}

impl TwistSolver {
    /// Run Dijkstra's algorithm from the solved state over all orientation
    /// states.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientTwistSet` if some orientation state cannot be
    /// reached with the given twists.
    pub fn new(
        piece_description: &PieceDescription,
        twists_with_costs: &[TwistWithCost],
    ) -> Result<Self> {
        info!(
            start!("Building the twist table for {} with {} twists"),
            piece_description.plural_name(),
            twists_with_costs.len()
        );
        let start = Instant::now();

        let modulus = piece_description.orientation_types();
        let num_pieces = piece_description.num_pieces();
        let mut solver = Self {
            modulus,
            num_pieces,
            traces: Vec::new(),
        };
        let num_states = solver.num_states();
        let twist_indices = twists_with_costs
            .iter()
            .map(|t| solver.index(t.twist.orientations()))
            .collect::<Vec<_>>();

        let mut best: Vec<Option<Cost>> = vec![None; num_states];
        let mut predecessor: Vec<Option<(usize, usize)>> = vec![None; num_states];
        let mut finalized = vec![false; num_states];
        let mut order = Vec::with_capacity(num_states);
        let mut heap = BinaryHeap::new();
        best[0] = Some(Cost::zero(num_pieces));
        heap.push(Reverse((Cost::zero(num_pieces), 0)));

        while let Some(Reverse((cost, state))) = heap.pop() {
            if finalized[state] {
                continue;
            }
            finalized[state] = true;
            order.push(state);
            for (i, twist_with_cost) in twists_with_costs.iter().enumerate() {
                let next = solver.add(state, twist_indices[i]);
                let next_cost = cost.plus(twist_with_cost);
                if !finalized[next] && best[next].as_ref().is_none_or(|known| next_cost < *known) {
                    best[next] = Some(next_cost.clone());
                    predecessor[next] = Some((state, i));
                    heap.push(Reverse((next_cost, next)));
                }
            }
        }

        if order.len() < num_states {
            return Err(CubeStatsError::InsufficientTwistSet {
                resolved: order.len(),
                reachable: num_states,
            });
        }

        // Predecessors are finalized first, so their traces already exist
        let mut traces = vec![AlgTrace::empty(); num_states];
        for state in order {
            if let Some((previous, i)) = predecessor[state] {
                traces[state] = traces[previous]
                    .clone()
                    .with_suffix(twists_with_costs[i].twist.clone());
            }
        }
        solver.traces = traces;

        debug!(
            "The most expensive twist state costs {}",
            best.iter()
                .flatten()
                .map(|cost| cost.total)
                .fold(0.0, f64::max)
        );
        info!(
            success!("Built the twist table with {} states in {:.3}s"),
            num_states,
            start.elapsed().as_secs_f64()
        );
        Ok(solver)
    }

    fn num_states(&self) -> usize {
        usize::from(self.modulus).pow(u32::try_from(self.num_pieces - 1).unwrap_or(u32::MAX))
    }

    /// Mixed radix index of all orientations but the last one, which is
    /// implied by the others.
    fn index(&self, orientations: &[Orientation]) -> usize {
        orientations[..self.num_pieces - 1]
            .iter()
            .rev()
            .fold(0, |index, o| index * usize::from(self.modulus) + usize::from(o.index()))
    }

    fn add(&self, mut left: usize, mut right: usize) -> usize {
        let modulus = usize::from(self.modulus);
        let mut sum = 0;
        let mut place = 1;
        for _ in 0..self.num_pieces - 1 {
            sum += (left % modulus + right % modulus) % modulus * place;
            left /= modulus;
            right /= modulus;
            place *= modulus;
        }
        sum
    }

    /// The cheapest twists for the given orientation of every piece.
    ///
    /// # Panics
    ///
    /// Panics if the number of orientations doesn't match the piece type.
    #[must_use]
    pub fn algs_for_orientations(&self, orientations: &[Orientation]) -> &AlgTrace {
        assert_eq!(orientations.len(), self.num_pieces);
        &self.traces[self.index(orientations)]
    }

    /// The twists that solve the remaining orientations of `solvable`.
    pub fn algs<S: Solvable, T: Trace>(&self, solvable: &S) -> Probabilistic<T> {
        solvable
            .decide_orientations()
            .map(|(_, orientations)| T::from_twists(self.algs_for_orientations(&orientations)))
            .merged()
    }
}

use crate::math::VectorSpace;
use serde::{Deserialize, Serialize};

/// How many algs of each kind a solve takes. Expected values are formed by
/// weighting and adding these, so all fields are real numbers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AlgCounts {
    cycles_by_length: Vec<f64>,
    double_swaps: f64,
    parities: f64,
    parity_twists: f64,
    twists_by_num_unoriented: Vec<f64>,
}

fn zip_histograms(left: &[f64], right: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    (0..left.len().max(right.len()))
        .map(|i| {
            f(
                left.get(i).copied().unwrap_or(0.0),
                right.get(i).copied().unwrap_or(0.0),
            )
        })
        .collect()
}

fn histograms_equal(left: &[f64], right: &[f64]) -> bool {
    (0..left.len().max(right.len())).all(|i| {
        left.get(i).copied().unwrap_or(0.0) == right.get(i).copied().unwrap_or(0.0)
    })
}

impl AlgCounts {
    /// Indexed by the number of pieces of the cycle.
    #[must_use]
    pub fn cycles_by_length(&self) -> &[f64] {
        &self.cycles_by_length
    }

    #[must_use]
    pub fn cycles_of_length(&self, length: usize) -> f64 {
        self.cycles_by_length.get(length).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn double_swaps(&self) -> f64 {
        self.double_swaps
    }

    #[must_use]
    pub fn parities(&self) -> f64 {
        self.parities
    }

    #[must_use]
    pub fn parity_twists(&self) -> f64 {
        self.parity_twists
    }

    /// Indexed by the number of pieces the twist orients.
    #[must_use]
    pub fn twists_by_num_unoriented(&self) -> &[f64] {
        &self.twists_by_num_unoriented
    }

    #[must_use]
    pub fn twists_with_num_unoriented(&self, num_unoriented: usize) -> f64 {
        self.twists_by_num_unoriented
            .get(num_unoriented)
            .copied()
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn total_cycles(&self) -> f64 {
        self.cycles_by_length.iter().sum()
    }

    #[must_use]
    pub fn total_twists(&self) -> f64 {
        self.twists_by_num_unoriented.iter().sum()
    }

    /// The number of algs of all kinds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.total_cycles()
            + self.double_swaps
            + self.parities
            + self.parity_twists
            + self.total_twists()
    }
}

impl PartialEq for AlgCounts {
    fn eq(&self, other: &Self) -> bool {
        histograms_equal(&self.cycles_by_length, &other.cycles_by_length)
            && self.double_swaps == other.double_swaps
            && self.parities == other.parities
            && self.parity_twists == other.parity_twists
            && histograms_equal(
                &self.twists_by_num_unoriented,
                &other.twists_by_num_unoriented,
            )
    }
}

impl VectorSpace for AlgCounts {
    fn zero() -> Self {
        Self::default()
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            cycles_by_length: zip_histograms(
                &self.cycles_by_length,
                &other.cycles_by_length,
                |a, b| a + b,
            ),
            double_swaps: self.double_swaps + other.double_swaps,
            parities: self.parities + other.parities,
            parity_twists: self.parity_twists + other.parity_twists,
            twists_by_num_unoriented: zip_histograms(
                &self.twists_by_num_unoriented,
                &other.twists_by_num_unoriented,
                |a, b| a + b,
            ),
        }
    }

    fn times(&self, scalar: f64) -> Self {
        Self {
            cycles_by_length: self.cycles_by_length.iter().map(|c| c * scalar).collect(),
            double_swaps: self.double_swaps * scalar,
            parities: self.parities * scalar,
            parity_twists: self.parity_twists * scalar,
            twists_by_num_unoriented: self
                .twists_by_num_unoriented
                .iter()
                .map(|c| c * scalar)
                .collect(),
        }
    }
}

/// Accumulates alg counts one alg at a time.
#[derive(Debug, Default)]
pub struct AlgCountsBuilder {
    counts: AlgCounts,
}

fn increment(histogram: &mut Vec<f64>, index: usize) {
    if histogram.len() <= index {
        histogram.resize(index + 1, 0.0);
    }
    histogram[index] += 1.0;
}

impl AlgCountsBuilder {
    pub fn add_cycle(&mut self, length: usize) {
        increment(&mut self.counts.cycles_by_length, length);
    }

    pub fn add_double_swap(&mut self) {
        self.counts.double_swaps += 1.0;
    }

    pub fn add_parity(&mut self) {
        self.counts.parities += 1.0;
    }

    pub fn add_parity_twist(&mut self) {
        self.counts.parity_twists += 1.0;
    }

    pub fn add_twist(&mut self, num_unoriented: usize) {
        increment(&mut self.counts.twists_by_num_unoriented, num_unoriented);
    }

    #[must_use]
    pub fn build(self) -> AlgCounts {
        self.counts
    }
}

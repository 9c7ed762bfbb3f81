use fxhash::FxHashMap;
use std::hash::Hash;

pub type Probability = f64;

/// How far the total probability of a distribution may drift from one before
/// it is considered broken.
pub const PROBABILITY_TOLERANCE: Probability = 1e-9;

/// A real vector space, so that expected values can be formed.
pub trait VectorSpace: Sized {
    fn zero() -> Self;

    #[must_use]
    fn plus(&self, other: &Self) -> Self;

    #[must_use]
    fn times(&self, scalar: f64) -> Self;
}

impl VectorSpace for f64 {
    fn zero() -> Self {
        0.0
    }

    fn plus(&self, other: &Self) -> Self {
        self + other
    }

    fn times(&self, scalar: f64) -> Self {
        self * scalar
    }
}

/// A finite distribution of weighted possibilities.
///
/// Every decision of the solver returns one of these, which lets the same
/// code handle a single concrete scramble (always one possibility) and a whole
/// class of scrambles (one possibility per distinguishable outcome).
#[derive(Clone, Debug, PartialEq)]
pub struct Probabilistic<X> {
    possibilities: Vec<(X, Probability)>,
}

impl<X> Probabilistic<X> {
    #[must_use]
    pub fn new(possibilities: Vec<(X, Probability)>) -> Self {
        Self { possibilities }
    }

    #[must_use]
    pub fn deterministic(x: X) -> Self {
        Self::new(vec![(x, 1.0)])
    }

    /// Each of `xs` with the same probability.
    ///
    /// # Panics
    ///
    /// Panics if `xs` is empty.
    #[must_use]
    pub fn uniform(xs: Vec<X>) -> Self {
        assert!(!xs.is_empty(), "A uniform distribution needs a possibility");
        let probability = 1.0 / xs.len() as f64;
        Self::new(xs.into_iter().map(|x| (x, probability)).collect())
    }

    #[must_use]
    pub fn possibilities(&self) -> &[(X, Probability)] {
        &self.possibilities
    }

    #[must_use]
    pub fn into_possibilities(self) -> Vec<(X, Probability)> {
        self.possibilities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.possibilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.possibilities.is_empty()
    }

    #[must_use]
    pub fn total_probability(&self) -> Probability {
        self.possibilities.iter().map(|&(_, p)| p).sum()
    }

    /// Whether the probabilities sum to one within `PROBABILITY_TOLERANCE`.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (self.total_probability() - 1.0).abs() <= PROBABILITY_TOLERANCE
    }

    pub fn map<Y>(self, mut f: impl FnMut(X) -> Y) -> Probabilistic<Y> {
        Probabilistic::new(
            self.possibilities
                .into_iter()
                .map(|(x, p)| (f(x), p))
                .collect(),
        )
    }

    /// Replace every possibility by the distribution `f` gives for it, scaled
    /// by the probability of that possibility.
    pub fn flat_map<Y>(self, mut f: impl FnMut(X) -> Probabilistic<Y>) -> Probabilistic<Y> {
        let mut possibilities = Vec::with_capacity(self.possibilities.len());
        for (x, p) in self.possibilities {
            possibilities.extend(f(x).possibilities.into_iter().map(|(y, q)| (y, p * q)));
        }
        Probabilistic::new(possibilities)
    }

    #[must_use]
    pub fn times_probability(self, factor: Probability) -> Self {
        Self::new(
            self.possibilities
                .into_iter()
                .map(|(x, p)| (x, p * factor))
                .collect(),
        )
    }

    /// The only possibility.
    ///
    /// # Panics
    ///
    /// Panics if there is not exactly one possibility.
    #[must_use]
    pub fn assert_deterministic(self) -> X {
        assert_eq!(
            self.possibilities.len(),
            1,
            "Expected a deterministic outcome"
        );
        let mut possibilities = self.possibilities;
        possibilities.swap_remove(0).0
    }
}

impl<X: Eq + Hash> Probabilistic<X> {
    /// Combine equal possibilities by summing their probabilities. The order of
    /// first appearance is kept.
    #[must_use]
    pub fn merged(self) -> Self {
        let mut index_of: FxHashMap<&X, usize> = FxHashMap::default();
        let mut probabilities: Vec<Probability> = Vec::new();
        let mut first_indices = Vec::new();
        for (i, (x, p)) in self.possibilities.iter().enumerate() {
            if let Some(&index) = index_of.get(x) {
                probabilities[index] += p;
            } else {
                index_of.insert(x, probabilities.len());
                probabilities.push(*p);
                first_indices.push(i);
            }
        }
        drop(index_of);

        let mut keep = vec![false; self.possibilities.len()];
        for &i in &first_indices {
            keep[i] = true;
        }
        let possibilities = self
            .possibilities
            .into_iter()
            .zip(keep)
            .filter_map(|((x, _), keep)| keep.then_some(x))
            .zip(probabilities)
            .collect();
        Self::new(possibilities)
    }
}

impl<X> Probabilistic<Probabilistic<X>> {
    #[must_use]
    pub fn flatten(self) -> Probabilistic<X> {
        self.flat_map(|inner| inner)
    }
}

impl<X: VectorSpace> Probabilistic<X> {
    /// The probability-weighted sum of all possibilities.
    #[must_use]
    pub fn expected_value(&self) -> X {
        self.possibilities
            .iter()
            .fold(X::zero(), |acc, (x, p)| acc.plus(&x.times(*p)))
    }
}

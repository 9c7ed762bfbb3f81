pub mod combinatorics;
pub mod orientation;
pub mod probabilistic;

pub use orientation::Orientation;
pub use probabilistic::{Probabilistic, Probability, VectorSpace};

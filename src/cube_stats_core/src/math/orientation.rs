use std::{fmt, ops::Add};

/// The largest supported number of orientation types of a piece type.
pub const MAX_ORIENTATION_TYPES: u8 = 3;

/// An element of ℤ/kℤ describing how a piece is twisted, where `0` means the
/// piece is oriented. `k` is the number of orientation types of the piece type,
/// three for corners and two for edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Orientation {
    index: u8,
    modulus: u8,
}

impl Orientation {
    /// # Panics
    ///
    /// Panics if `modulus` is zero or too large, or if `index` is not reduced.
    #[must_use]
    pub fn new(index: u8, modulus: u8) -> Self {
        assert!((1..=MAX_ORIENTATION_TYPES).contains(&modulus));
        assert!(index < modulus);
        Self { index, modulus }
    }

    #[must_use]
    pub fn solved(modulus: u8) -> Self {
        Self::new(0, modulus)
    }

    /// All orientations of ℤ/kℤ, starting with the solved one.
    pub fn all(modulus: u8) -> impl Iterator<Item = Self> + Clone {
        (0..modulus).map(move |index| Self::new(index, modulus))
    }

    #[must_use]
    pub fn index(self) -> u8 {
        self.index
    }

    #[must_use]
    pub fn modulus(self) -> u8 {
        self.modulus
    }

    #[must_use]
    pub fn is_solved(self) -> bool {
        self.index == 0
    }

    /// # Panics
    ///
    /// Panics if the orientations belong to different piece types.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        assert_eq!(self.modulus, other.modulus);
        Self {
            index: (self.index + other.index) % self.modulus,
            modulus: self.modulus,
        }
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            index: (self.modulus - self.index) % self.modulus,
            modulus: self.modulus,
        }
    }

    #[must_use]
    pub fn times(self, scalar: u64) -> Self {
        let scalar = u8::try_from(scalar % u64::from(self.modulus))
            .unwrap_or_else(|_| unreachable!("reduced below a u8 modulus"));
        Self {
            index: (self.index * scalar) % self.modulus,
            modulus: self.modulus,
        }
    }
}

impl Add for Orientation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.plus(rhs)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

/// Reduce a list of orientations to their sum.
pub fn oriented_sum(
    modulus: u8,
    orientations: impl IntoIterator<Item = Orientation>,
) -> Orientation {
    orientations
        .into_iter()
        .fold(Orientation::solved(modulus), Orientation::plus)
}

/// The orientation that makes `orientations` sum to the solved orientation,
/// which is what conservation implies for the one remaining piece.
pub fn implied_last(
    modulus: u8,
    orientations: impl IntoIterator<Item = Orientation>,
) -> Orientation {
    oriented_sum(modulus, orientations).inverse()
}

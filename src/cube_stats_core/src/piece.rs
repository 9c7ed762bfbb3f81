use crate::{
    alg::Twist,
    math::{Orientation, orientation::oriented_sum},
};
use itertools::Itertools;
use std::fmt;

/// One solve unit of a piece type, identified by its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Piece(u8);

impl Piece {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const CORNER_NAMES: [&str; 8] = ["UFR", "UBR", "UFL", "UBL", "DFR", "DBR", "DFL", "DBL"];
pub const EDGE_NAMES: [&str; 12] = [
    "UF", "UR", "UL", "UB", "FR", "FL", "DF", "DB", "DR", "DL", "RB", "LB",
];

/// The largest supported number of pieces of one piece type.
pub const MAX_PIECES: usize = 20;

/// A piece type: how many pieces there are and in how many ways each of them
/// can be twisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceDescription {
    plural_name: String,
    unoriented_types: u8,
    piece_names: Vec<String>,
}

impl PieceDescription {
    /// A piece type whose pieces are named by their index.
    ///
    /// # Panics
    ///
    /// Panics if there are fewer than 2 or more than `MAX_PIECES` pieces, or
    /// more than 2 unoriented types.
    #[must_use]
    pub fn new(plural_name: impl Into<String>, num_pieces: usize, unoriented_types: u8) -> Self {
        assert!(
            (2..=MAX_PIECES).contains(&num_pieces),
            "There have to be between 2 and {MAX_PIECES} pieces"
        );
        assert!(unoriented_types <= 2, "Unsupported number of unoriented types");
        Self {
            plural_name: plural_name.into(),
            unoriented_types,
            piece_names: (0..num_pieces).map(|i| i.to_string()).collect(),
        }
    }

    /// # Panics
    ///
    /// Panics if the number of names doesn't match the number of pieces.
    #[must_use]
    pub fn with_piece_names<S: ToString>(mut self, names: &[S]) -> Self {
        assert_eq!(names.len(), self.piece_names.len());
        self.piece_names = names.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn corners() -> Self {
        Self::new("corners", CORNER_NAMES.len(), 2).with_piece_names(&CORNER_NAMES)
    }

    #[must_use]
    pub fn edges() -> Self {
        Self::new("edges", EDGE_NAMES.len(), 1).with_piece_names(&EDGE_NAMES)
    }

    /// Look up one of the standard piece types of the 3x3x3 by its plural name.
    #[must_use]
    pub fn standard(plural_name: &str) -> Option<Self> {
        match plural_name {
            "corners" => Some(Self::corners()),
            "edges" => Some(Self::edges()),
            _ => None,
        }
    }

    #[must_use]
    pub fn plural_name(&self) -> &str {
        &self.plural_name
    }

    #[must_use]
    pub fn num_pieces(&self) -> usize {
        self.piece_names.len()
    }

    #[must_use]
    pub fn unoriented_types(&self) -> u8 {
        self.unoriented_types
    }

    /// The number of orientations a piece can have, including the solved one.
    #[must_use]
    pub fn orientation_types(&self) -> u8 {
        self.unoriented_types + 1
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + Clone + use<> {
        // `num_pieces` is at most `MAX_PIECES`
        (0..self.num_pieces() as u8).map(Piece::new)
    }

    #[must_use]
    pub fn piece_name(&self, piece: Piece) -> &str {
        &self.piece_names[piece.id()]
    }

    #[must_use]
    pub fn piece_by_name(&self, name: &str) -> Option<Piece> {
        self.piece_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| u8::try_from(i).ok())
            .map(Piece::new)
    }

    #[must_use]
    pub fn solved_orientations(&self) -> Vec<Orientation> {
        vec![Orientation::solved(self.orientation_types()); self.num_pieces()]
    }

    /// Every twist of at most `max_unoriented` pieces that respects the
    /// orientation conservation law, smallest twists first.
    #[must_use]
    pub fn twist_groups(&self, max_unoriented: usize) -> Vec<Twist> {
        let modulus = self.orientation_types();
        let mut twists = Vec::new();
        for num_unoriented in 1..=max_unoriented.min(self.num_pieces()) {
            for unoriented in self.pieces().combinations(num_unoriented) {
                for orientations in std::iter::repeat_n(1..modulus, num_unoriented)
                    .multi_cartesian_product()
                {
                    let orientations = orientations
                        .into_iter()
                        .map(|index| Orientation::new(index, modulus))
                        .collect_vec();
                    if !oriented_sum(modulus, orientations.iter().copied()).is_solved() {
                        continue;
                    }
                    let mut twist = self.solved_orientations();
                    for (piece, orientation) in unoriented.iter().zip(orientations) {
                        twist[piece.id()] = orientation;
                    }
                    twists.push(Twist::new(twist));
                }
            }
        }
        twists
    }
}

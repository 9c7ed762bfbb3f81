use cube_stats_core::piece::Piece;
use itertools::Itertools;

/// Which pieces of a piece type a method can't tell apart.
///
/// A piece plays a role if it is a buffer or an alg set names it. The other
/// pieces only differ in when the scans of the solver reach them, and every
/// scan goes through them in index order. Between two roles, renaming pieces
/// so that the ones a scan can still find keep their order doesn't change the
/// kinds of algs a solve takes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceSymmetry {
    /// Runs of at least two consecutive pieces without a role.
    segments: Vec<Vec<Piece>>,
    fixed_are_ordered: bool,
}

impl PieceSymmetry {
    /// Every piece can be told apart from every other one.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// `pieces` has to be in index order. With `fixed_are_ordered`, scans
    /// also look for twisted pieces at home, so those keep their order too.
    #[must_use]
    pub fn new(
        pieces: impl IntoIterator<Item = Piece>,
        is_role: impl Fn(Piece) -> bool,
        fixed_are_ordered: bool,
    ) -> Self {
        let segments = pieces
            .into_iter()
            .chunk_by(|&piece| is_role(piece))
            .into_iter()
            .filter(|(role, _)| !role)
            .map(|(_, segment)| segment.collect_vec())
            .filter(|segment| segment.len() > 1)
            .collect();
        Self {
            segments,
            fixed_are_ordered,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Vec<Piece>] {
        &self.segments
    }

    #[must_use]
    pub fn fixed_are_ordered(&self) -> bool {
        self.fixed_are_ordered
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.segments.is_empty()
    }

    /// The index of the segment of `piece`, if it has no role.
    #[must_use]
    pub fn segment_of(&self, piece: Piece) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| segment.contains(&piece))
    }
}

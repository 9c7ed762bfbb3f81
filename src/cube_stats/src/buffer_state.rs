use cube_stats_core::piece::Piece;

/// What the solver remembers about the buffer between two algs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferState {
    previous_buffer: Option<Piece>,
    cycle_breaks: usize,
}

impl BufferState {
    /// The state before the first alg, when no buffer has been used yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fresh state for a buffer that was just switched to.
    #[must_use]
    pub fn new(buffer: Piece) -> Self {
        Self {
            previous_buffer: Some(buffer),
            cycle_breaks: 0,
        }
    }

    #[must_use]
    pub fn previous_buffer(self) -> Option<Piece> {
        self.previous_buffer
    }

    /// The number of cycle breaks since the buffer was last switched to.
    #[must_use]
    pub fn cycle_breaks(self) -> usize {
        self.cycle_breaks
    }

    #[must_use]
    pub fn with_cycle_break(self) -> Self {
        Self {
            cycle_breaks: self.cycle_breaks + 1,
            ..self
        }
    }
}

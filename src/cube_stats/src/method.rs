use cube_stats_core::piece::{Piece, PieceDescription};
use serde::{Deserialize, Serialize};

/// Which piece type is solved first. The first piece type never has a parity
/// because its parity is carried over to the second one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionOrder {
    /// Corners, then edges.
    #[default]
    CE,
    /// Edges, then corners.
    EC,
}

impl ExecutionOrder {
    /// The plural names of the piece types in execution order.
    #[must_use]
    pub fn plural_names(self) -> [&'static str; 2] {
        match self {
            ExecutionOrder::CE => ["corners", "edges"],
            ExecutionOrder::EC => ["edges", "corners"],
        }
    }
}

/// A whole blindfolded method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescription {
    #[serde(default)]
    pub execution_order: ExecutionOrder,
    pub piece_method_descriptions: Vec<PieceMethodDescription>,
}

impl Default for MethodDescription {
    /// Corners from UFR, then edges from UF, with all two piece twists.
    fn default() -> Self {
        Self {
            execution_order: ExecutionOrder::CE,
            piece_method_descriptions: vec![
                PieceMethodDescription::new("corners", vec![BufferDescription::new("UFR")]),
                PieceMethodDescription::new("edges", vec![BufferDescription::new("UF")]),
            ],
        }
    }
}

impl MethodDescription {
    /// # Errors
    ///
    /// Returns an error if the text is not a valid method description.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// # Errors
    ///
    /// Returns an error if the description cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The description for the given piece type. Piece types that are not
    /// described are solved with the first piece as the only buffer.
    #[must_use]
    pub fn piece_method_description(
        &self,
        piece_description: &PieceDescription,
    ) -> PieceMethodDescription {
        self.piece_method_descriptions
            .iter()
            .find(|d| d.plural_name == piece_description.plural_name())
            .cloned()
            .unwrap_or_else(|| {
                // Every piece type has at least two pieces
                let favorite = piece_description.piece_name(Piece::new(0));
                PieceMethodDescription::new(
                    piece_description.plural_name(),
                    vec![BufferDescription::new(favorite)],
                )
            })
    }
}

fn default_max_floating_twist_length() -> usize {
    2
}

/// How one piece type is solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceMethodDescription {
    pub plural_name: String,
    /// Buffers in order of preference. The first one is the favorite buffer.
    pub sorted_buffers: Vec<BufferDescription>,
    /// Explicit twist algs. When absent, the twists are derived from
    /// `max_floating_twist_length` and the buffers' `max_twist_length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twists_with_costs: Option<Vec<TwistWithCost>>,
    #[serde(default)]
    pub avoid_buffers_for_cycle_breaks: bool,
    #[serde(default)]
    pub avoid_unoriented_if_we_can_float: bool,
    #[serde(default = "default_max_floating_twist_length")]
    pub max_floating_twist_length: usize,
    #[serde(default)]
    pub double_swaps: AlgSet,
}

impl PieceMethodDescription {
    #[must_use]
    pub fn new(plural_name: impl Into<String>, sorted_buffers: Vec<BufferDescription>) -> Self {
        Self {
            plural_name: plural_name.into(),
            sorted_buffers,
            twists_with_costs: None,
            avoid_buffers_for_cycle_breaks: false,
            avoid_unoriented_if_we_can_float: false,
            max_floating_twist_length: default_max_floating_twist_length(),
            double_swaps: AlgSet::default(),
        }
    }

    #[must_use]
    pub fn with_twists_with_costs(mut self, twists_with_costs: Vec<TwistWithCost>) -> Self {
        self.twists_with_costs = Some(twists_with_costs);
        self
    }

    #[must_use]
    pub fn with_avoid_buffers_for_cycle_breaks(mut self, avoid: bool) -> Self {
        self.avoid_buffers_for_cycle_breaks = avoid;
        self
    }

    #[must_use]
    pub fn with_avoid_unoriented_if_we_can_float(mut self, avoid: bool) -> Self {
        self.avoid_unoriented_if_we_can_float = avoid;
        self
    }

    #[must_use]
    pub fn with_max_floating_twist_length(mut self, max_floating_twist_length: usize) -> Self {
        self.max_floating_twist_length = max_floating_twist_length;
        self
    }

    #[must_use]
    pub fn with_double_swaps(mut self, double_swaps: AlgSet) -> Self {
        self.double_swaps = double_swaps;
        self
    }
}

/// How one buffer is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferDescription {
    /// The name of the buffer piece, e.g. `UFR`.
    pub buffer: String,
    #[serde(default)]
    pub five_cycles: bool,
    /// Stay with this buffer once everything is solved instead of going back
    /// to the favorite buffer.
    #[serde(default)]
    pub stay_with_solved_buffer: bool,
    /// The largest twist including this buffer that has an alg.
    #[serde(default)]
    pub max_twist_length: usize,
    #[serde(default)]
    pub can_do_parity_twists: bool,
    #[serde(default)]
    pub do_unoriented_before_parity: bool,
    #[serde(default)]
    pub do_unoriented_before_parity_twist: bool,
}

impl BufferDescription {
    #[must_use]
    pub fn new(buffer: impl Into<String>) -> Self {
        Self {
            buffer: buffer.into(),
            five_cycles: false,
            stay_with_solved_buffer: false,
            max_twist_length: 0,
            can_do_parity_twists: false,
            do_unoriented_before_parity: false,
            do_unoriented_before_parity_twist: false,
        }
    }

    #[must_use]
    pub fn with_five_cycles(mut self, five_cycles: bool) -> Self {
        self.five_cycles = five_cycles;
        self
    }

    #[must_use]
    pub fn with_stay_with_solved_buffer(mut self, stay: bool) -> Self {
        self.stay_with_solved_buffer = stay;
        self
    }

    #[must_use]
    pub fn with_max_twist_length(mut self, max_twist_length: usize) -> Self {
        self.max_twist_length = max_twist_length;
        self
    }

    #[must_use]
    pub fn with_can_do_parity_twists(mut self, can: bool) -> Self {
        self.can_do_parity_twists = can;
        self
    }

    #[must_use]
    pub fn with_do_unoriented_before_parity(mut self, first: bool) -> Self {
        self.do_unoriented_before_parity = first;
        self
    }

    #[must_use]
    pub fn with_do_unoriented_before_parity_twist(mut self, first: bool) -> Self {
        self.do_unoriented_before_parity_twist = first;
        self
    }
}

/// One twist alg given as the orientation index of every piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwistWithCost {
    pub orientations: Vec<u8>,
    pub cost: f64,
}

/// Which algs of one family exist, independent of the pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformAlgSetMode {
    #[default]
    None,
    /// Only when the pieces involved are oriented.
    OnlyOriented,
    All,
}

/// A set of algs keyed by their pieces, one level per piece. At each level the
/// set is either the same for every piece or listed per piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgSet {
    Uniform(UniformAlgSetMode),
    Partial(Vec<AlgSubset>),
}

impl Default for AlgSet {
    fn default() -> Self {
        AlgSet::Uniform(UniformAlgSetMode::None)
    }
}

/// The algs of a partial set whose next piece is `piece`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgSubset {
    pub piece: String,
    pub subset: AlgSet,
}

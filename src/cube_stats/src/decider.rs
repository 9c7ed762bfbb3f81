use crate::{
    buffer_state::BufferState,
    error::{CubeStatsError, Result},
    method::{self, AlgSet, BufferDescription, PieceMethodDescription, UniformAlgSetMode},
    solvable::PieceSymmetry,
    twist_solver::TwistWithCost,
};
use cube_stats_core::{
    alg::{DoubleSwap, Parity, Twist},
    math::{Orientation, orientation::oriented_sum},
    permutation::PiecePermutationDescription,
    piece::{Piece, PieceDescription},
};
use itertools::Itertools;

/// An [`AlgSet`] whose piece names were looked up.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ResolvedAlgSet {
    Uniform(UniformAlgSetMode),
    Partial(Vec<(Piece, ResolvedAlgSet)>),
}

impl ResolvedAlgSet {
    fn resolve(alg_set: &AlgSet, piece_description: &PieceDescription) -> Result<Self> {
        Ok(match alg_set {
            AlgSet::Uniform(mode) => ResolvedAlgSet::Uniform(*mode),
            AlgSet::Partial(subsets) => ResolvedAlgSet::Partial(
                subsets
                    .iter()
                    .map(|subset| {
                        Ok((
                            resolve_piece(piece_description, &subset.piece)?,
                            ResolvedAlgSet::resolve(&subset.subset, piece_description)?,
                        ))
                    })
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Every piece the set names.
    fn named_pieces(&self) -> Vec<Piece> {
        match self {
            ResolvedAlgSet::Uniform(_) => vec![],
            ResolvedAlgSet::Partial(subsets) => subsets
                .iter()
                .flat_map(|(piece, subset)| std::iter::once(*piece).chain(subset.named_pieces()))
                .collect(),
        }
    }

    /// Whether the set has an alg for `pieces` in this order.
    fn contains(&self, pieces: &[Piece], orientation: Orientation) -> bool {
        match self {
            ResolvedAlgSet::Uniform(mode) => match mode {
                UniformAlgSetMode::None => false,
                UniformAlgSetMode::OnlyOriented => orientation.is_solved(),
                UniformAlgSetMode::All => true,
            },
            ResolvedAlgSet::Partial(subsets) => {
                let Some((&first, rest)) = pieces.split_first() else {
                    return false;
                };
                subsets
                    .iter()
                    .any(|(piece, subset)| *piece == first && subset.contains(rest, orientation))
            }
        }
    }
}

fn resolve_piece(piece_description: &PieceDescription, name: &str) -> Result<Piece> {
    piece_description
        .piece_by_name(name)
        .ok_or_else(|| CubeStatsError::UnknownPiece {
            plural_name: piece_description.plural_name().to_string(),
            piece: name.to_string(),
        })
}

fn resolve_twist(
    piece_description: &PieceDescription,
    twist_with_cost: &method::TwistWithCost,
) -> Result<TwistWithCost> {
    let invalid = |reason: String| CubeStatsError::InvalidTwist {
        plural_name: piece_description.plural_name().to_string(),
        reason,
    };
    let modulus = piece_description.orientation_types();
    let indices = &twist_with_cost.orientations;

    if indices.len() != piece_description.num_pieces() {
        return Err(invalid(format!(
            "expected {} orientations but got {}",
            piece_description.num_pieces(),
            indices.len()
        )));
    }
    if let Some(&index) = indices.iter().find(|&&index| index >= modulus) {
        return Err(invalid(format!(
            "orientation {index} is not below {modulus}"
        )));
    }
    if !(twist_with_cost.cost.is_finite() && twist_with_cost.cost >= 0.0) {
        return Err(invalid(format!("cost {} is negative", twist_with_cost.cost)));
    }
    let orientations = indices
        .iter()
        .map(|&index| Orientation::new(index, modulus))
        .collect_vec();
    if !oriented_sum(modulus, orientations.iter().copied()).is_solved() {
        return Err(invalid(format!("{indices:?} does not conserve orientation")));
    }
    if orientations.iter().all(|o| o.is_solved()) {
        return Err(invalid("the twist doesn't twist anything".to_string()));
    }

    Ok(TwistWithCost {
        twist: Twist::new(orientations),
        cost: twist_with_cost.cost,
    })
}

/// Makes the choices during a solve that depend on the method, like which
/// buffer to use next or whether a double swap has an alg.
#[derive(Debug)]
pub struct Decider {
    permutation_description: PiecePermutationDescription,
    buffer_descriptions: Vec<(Piece, BufferDescription)>,
    sorted_buffers: Vec<Piece>,
    sorted_cycle_breaks: Vec<Piece>,
    twists_with_costs: Vec<TwistWithCost>,
    /// Explicit twists can name every piece differently.
    has_explicit_twists: bool,
    avoid_unoriented_if_we_can_float: bool,
    double_swaps: ResolvedAlgSet,
}

impl Decider {
    /// Look up all pieces of the method and derive the available twists.
    ///
    /// # Errors
    ///
    /// Returns an error if a piece name is unknown, if there are no buffers or
    /// if an explicit twist is malformed.
    pub fn new(
        permutation_description: PiecePermutationDescription,
        method_description: &PieceMethodDescription,
    ) -> Result<Self> {
        let piece_description = permutation_description.piece_description();
        if method_description.sorted_buffers.is_empty() {
            return Err(CubeStatsError::NoBuffers(
                piece_description.plural_name().to_string(),
            ));
        }

        let buffer_descriptions = method_description
            .sorted_buffers
            .iter()
            .map(|d| Ok((resolve_piece(piece_description, &d.buffer)?, d.clone())))
            .collect::<Result<Vec<_>>>()?;
        let sorted_buffers = buffer_descriptions.iter().map(|(b, _)| *b).collect_vec();

        let sorted_cycle_breaks = if method_description.avoid_buffers_for_cycle_breaks {
            permutation_description
                .pieces()
                .filter(|p| !sorted_buffers.contains(p))
                .chain(sorted_buffers.iter().rev().copied())
                .collect_vec()
        } else {
            permutation_description.pieces().collect_vec()
        };

        let twists_with_costs = match &method_description.twists_with_costs {
            Some(twists) => twists
                .iter()
                .map(|t| resolve_twist(piece_description, t))
                .collect::<Result<Vec<_>>>()?,
            None => {
                let max_buffered_twist_length = buffer_descriptions
                    .iter()
                    .map(|(_, d)| d.max_twist_length)
                    .max()
                    .unwrap_or(0);
                let max_length = method_description
                    .max_floating_twist_length
                    .max(max_buffered_twist_length);
                piece_description
                    .twist_groups(max_length)
                    .into_iter()
                    .filter(|twist| {
                        let num_unoriented = twist.num_unoriented();
                        num_unoriented <= method_description.max_floating_twist_length
                            || buffer_descriptions.iter().any(|(buffer, d)| {
                                !twist.orientations()[buffer.id()].is_solved()
                                    && d.max_twist_length >= num_unoriented
                            })
                    })
                    .map(|twist| TwistWithCost { twist, cost: 1.0 })
                    .collect()
            }
        };

        let double_swaps =
            ResolvedAlgSet::resolve(&method_description.double_swaps, piece_description)?;

        Ok(Self {
            permutation_description,
            buffer_descriptions,
            sorted_buffers,
            sorted_cycle_breaks,
            twists_with_costs,
            has_explicit_twists: method_description.twists_with_costs.is_some(),
            avoid_unoriented_if_we_can_float: method_description.avoid_unoriented_if_we_can_float,
            double_swaps,
        })
    }

    /// # Panics
    ///
    /// Panics if `buffer` is not one of the buffers.
    fn buffer_description(&self, buffer: Piece) -> &BufferDescription {
        self.buffer_descriptions
            .iter()
            .find(|(b, _)| *b == buffer)
            .map(|(_, d)| d)
            .unwrap_or_else(|| panic!("{buffer} is not a buffer"))
    }

    #[must_use]
    pub fn permutation_description(&self) -> &PiecePermutationDescription {
        &self.permutation_description
    }

    #[must_use]
    pub fn piece_description(&self) -> &PieceDescription {
        self.permutation_description.piece_description()
    }

    /// The buffers in order of preference.
    #[must_use]
    pub fn sorted_buffers(&self) -> &[Piece] {
        &self.sorted_buffers
    }

    #[must_use]
    pub fn favorite_buffer(&self) -> Piece {
        self.sorted_buffers[0]
    }

    #[must_use]
    pub fn is_buffer(&self, piece: Piece) -> bool {
        self.sorted_buffers.contains(&piece)
    }

    #[must_use]
    pub fn twists_with_costs(&self) -> &[TwistWithCost] {
        &self.twists_with_costs
    }

    /// The pieces this method treats alike. Buffers and the pieces the double
    /// swaps name play a role. Derived twists treat every other piece alike,
    /// explicit ones may not.
    #[must_use]
    pub fn piece_symmetry(&self) -> PieceSymmetry {
        if self.has_explicit_twists {
            return PieceSymmetry::none();
        }
        let mut roles = self.sorted_buffers.clone();
        roles.extend(self.double_swaps.named_pieces());
        let fixed_are_ordered = self
            .buffer_descriptions
            .iter()
            .any(|(_, d)| d.can_do_parity_twists);
        PieceSymmetry::new(
            self.permutation_description.pieces(),
            |piece| roles.contains(&piece),
            fixed_are_ordered,
        )
    }

    /// The pieces to break into when starting a new cycle, best first.
    #[must_use]
    pub fn sorted_cycle_breaks(&self) -> &[Piece] {
        &self.sorted_cycle_breaks
    }

    /// The pieces that can be twisted together with the given parity, best
    /// first.
    #[must_use]
    pub fn sorted_parity_twist_pieces(&self, parity: Parity) -> Vec<Piece> {
        if self.buffer_description(parity.first).can_do_parity_twists {
            self.permutation_description.pieces().collect()
        } else {
            vec![]
        }
    }

    /// Stay with `buffer` once it's solved instead of going back to the
    /// favorite buffer.
    #[must_use]
    pub fn stay_with_solved_buffer(&self, buffer: Piece) -> bool {
        self.buffer_description(buffer).stay_with_solved_buffer
    }

    /// The buffer can only be switched before the first cycle break.
    #[must_use]
    pub fn can_change_buffer(&self, buffer_state: BufferState) -> bool {
        buffer_state.cycle_breaks() == 0
    }

    /// Whether the method has an alg for the double swap in any of the orders
    /// that describe the same double swap. `orientation` is the orientation of
    /// the buffer's 2-cycle.
    #[must_use]
    pub fn can_double_swap(&self, double_swap: DoubleSwap, orientation: Orientation) -> bool {
        let DoubleSwap {
            first: f,
            second: s,
            third: t,
            fourth: u,
        } = double_swap;
        [
            [f, t, s, u],
            [f, t, u, s],
            [t, f, s, u],
            [t, f, u, s],
            [s, u, f, t],
            [u, s, f, t],
            [s, u, t, f],
            [u, s, t, f],
        ]
        .iter()
        .any(|pieces| self.double_swaps.contains(pieces, orientation))
    }

    #[must_use]
    pub fn avoid_unoriented_if_we_can_float(&self) -> bool {
        self.avoid_unoriented_if_we_can_float
    }

    #[must_use]
    pub fn do_unoriented_before_parity(&self, parity: Parity) -> bool {
        self.buffer_description(parity.first)
            .do_unoriented_before_parity
    }

    #[must_use]
    pub fn do_unoriented_before_parity_twist(&self, parity: Parity) -> bool {
        self.buffer_description(parity.first)
            .do_unoriented_before_parity_twist
    }

    #[must_use]
    pub fn max_cycle_length_for_buffer(&self, buffer: Piece) -> usize {
        if self.buffer_description(buffer).five_cycles {
            5
        } else {
            3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::AlgSubset;

    fn corners(method: &PieceMethodDescription) -> Result<Decider> {
        Decider::new(
            PiecePermutationDescription::new(PieceDescription::corners(), false),
            method,
        )
    }

    fn piece(name: &str) -> Piece {
        PieceDescription::corners().piece_by_name(name).unwrap()
    }

    #[test_log::test]
    fn default_twists_are_two_twists() {
        let method = PieceMethodDescription::new("corners", vec![BufferDescription::new("UFR")]);
        let decider = corners(&method).unwrap();
        assert_eq!(decider.twists_with_costs().len(), 28 * 2);
        assert!(decider.twists_with_costs().iter().all(|t| t.cost == 1.0));
        assert_eq!(decider.favorite_buffer(), piece("UFR"));
        assert_eq!(decider.max_cycle_length_for_buffer(piece("UFR")), 3);
    }

    #[test_log::test]
    fn buffered_three_twists() {
        let method = PieceMethodDescription::new(
            "corners",
            vec![BufferDescription::new("UFR").with_max_twist_length(3)],
        );
        let decider = corners(&method).unwrap();
        // 3-twists are only allowed when they include UFR
        assert_eq!(decider.twists_with_costs().len(), 28 * 2 + 21 * 2);
    }

    #[test_log::test]
    fn cycle_breaks_avoid_buffers() {
        let method = PieceMethodDescription::new(
            "corners",
            vec![BufferDescription::new("UFR"), BufferDescription::new("UBL")],
        )
        .with_avoid_buffers_for_cycle_breaks(true);
        let decider = corners(&method).unwrap();
        let names = decider
            .sorted_cycle_breaks()
            .iter()
            .map(|&p| decider.piece_description().piece_name(p))
            .collect_vec();
        assert_eq!(
            names,
            ["UBR", "UFL", "DFR", "DBR", "DFL", "DBL", "UBL", "UFR"]
        );
    }

    #[test_log::test]
    fn unknown_pieces_are_rejected() {
        let method = PieceMethodDescription::new("corners", vec![BufferDescription::new("UF")]);
        assert_eq!(
            corners(&method).unwrap_err(),
            CubeStatsError::UnknownPiece {
                plural_name: "corners".to_string(),
                piece: "UF".to_string()
            }
        );
        let method = PieceMethodDescription::new("corners", vec![]);
        assert_eq!(
            corners(&method).unwrap_err(),
            CubeStatsError::NoBuffers("corners".to_string())
        );
    }

    #[test_log::test]
    fn malformed_twists_are_rejected() {
        let twist = |orientations: Vec<u8>| method::TwistWithCost {
            orientations,
            cost: 1.0,
        };
        for orientations in [vec![1, 2], vec![1, 1, 0, 0, 0, 0, 0, 0], vec![0; 8]] {
            let method =
                PieceMethodDescription::new("corners", vec![BufferDescription::new("UFR")])
                    .with_twists_with_costs(vec![twist(orientations)]);
            assert!(matches!(
                corners(&method),
                Err(CubeStatsError::InvalidTwist { .. })
            ));
        }
    }

    #[test_log::test]
    fn double_swaps_in_any_order() {
        let ufr = piece("UFR");
        let ubr = piece("UBR");
        let ufl = piece("UFL");
        let ubl = piece("UBL");
        let only = |first: &str, second: &str, mode| {
            AlgSet::Partial(vec![AlgSubset {
                piece: first.to_string(),
                subset: AlgSet::Partial(vec![AlgSubset {
                    piece: second.to_string(),
                    subset: AlgSet::Uniform(mode),
                }]),
            }])
        };
        let method = PieceMethodDescription::new("corners", vec![BufferDescription::new("UFR")])
            .with_double_swaps(only("UFL", "UFR", UniformAlgSetMode::OnlyOriented));
        let decider = corners(&method).unwrap();
        let solved = Orientation::solved(3);
        let twisted = Orientation::new(1, 3);

        // UFR<->UBR and UFL<->UBL, looked up as UFL UFR UBR UBL
        let double_swap = DoubleSwap::new(ufr, ubr, ufl, ubl);
        assert!(decider.can_double_swap(double_swap, solved));
        assert!(!decider.can_double_swap(double_swap, twisted));
        assert!(!decider.can_double_swap(DoubleSwap::new(ubr, ufr, ubl, piece("DFR")), solved));

        let method = method.with_double_swaps(AlgSet::Uniform(UniformAlgSetMode::All));
        let decider = corners(&method).unwrap();
        assert!(decider.can_double_swap(double_swap, twisted));
    }

    #[test_log::test]
    fn roles_break_the_symmetry() {
        let method = PieceMethodDescription::new("corners", vec![BufferDescription::new("UFR")]);
        let symmetry = corners(&method).unwrap().piece_symmetry();
        assert_eq!(symmetry.segments().len(), 1);
        assert_eq!(symmetry.segments()[0].len(), 7);
        assert!(!symmetry.fixed_are_ordered());

        let method = PieceMethodDescription::new(
            "corners",
            vec![
                BufferDescription::new("UFR").with_can_do_parity_twists(true),
                BufferDescription::new("UBL"),
            ],
        )
        .with_double_swaps(AlgSet::Partial(vec![AlgSubset {
            piece: "DFR".to_string(),
            subset: AlgSet::Uniform(UniformAlgSetMode::All),
        }]));
        let symmetry = corners(&method).unwrap().piece_symmetry();
        let names = symmetry
            .segments()
            .iter()
            .map(|segment| {
                segment
                    .iter()
                    .map(|&p| PieceDescription::corners().piece_name(p).to_string())
                    .collect_vec()
            })
            .collect_vec();
        assert_eq!(names, [vec!["UBR", "UFL"], vec!["DBR", "DFL", "DBL"]]);
        assert!(symmetry.fixed_are_ordered());

        let twist = method::TwistWithCost {
            orientations: vec![1, 2, 0, 0, 0, 0, 0, 0],
            cost: 1.0,
        };
        let method = method.with_twists_with_costs(vec![twist]);
        assert!(corners(&method).unwrap().piece_symmetry().is_none());
    }

    #[test_log::test]
    fn parity_twists_need_the_buffer() {
        let method = PieceMethodDescription::new(
            "corners",
            vec![
                BufferDescription::new("UFR").with_can_do_parity_twists(true),
                BufferDescription::new("UBL").with_five_cycles(true),
            ],
        );
        let decider = corners(&method).unwrap();
        let parity = Parity::new(piece("UFR"), piece("UBR"));
        assert_eq!(decider.sorted_parity_twist_pieces(parity).len(), 8);
        let parity = Parity::new(piece("UBL"), piece("UBR"));
        assert!(decider.sorted_parity_twist_pieces(parity).is_empty());
        assert_eq!(decider.max_cycle_length_for_buffer(piece("UBL")), 5);
    }
}

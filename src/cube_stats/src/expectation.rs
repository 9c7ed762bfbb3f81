use crate::{
    decider::Decider,
    error::{CubeStatsError, Result},
    method::{MethodDescription, PieceMethodDescription},
    solvable::{Scramble, ScrambleGroup},
    solver::Solver,
};
use cube_stats_core::{
    alg::{AlgShape, AlgTrace, Trace},
    alg_counts::AlgCounts,
    math::{Probabilistic, VectorSpace},
    permutation::{BigScrambleGroup, PiecePermutationDescription},
    piece::PieceDescription,
    start, success, working,
};
use fxhash::FxHashMap;
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{rc::Rc, time::Instant};

/// The expected alg counts of one piece type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgCountsRow {
    pub plural_name: String,
    pub alg_counts: AlgCounts,
}

/// The expected alg counts of every piece type, in execution order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgCountsData {
    pub rows: Vec<AlgCountsRow>,
}

impl AlgCountsData {
    /// # Errors
    ///
    /// Returns an error if the counts cannot be represented in TOML.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The expected number of algs for the whole puzzle.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.alg_counts.total()).sum()
    }
}

/// The expected number of algs of a whole solve with the given method.
///
/// # Errors
///
/// See [`expected_alg_counts`].
pub fn expected_algs(method_description: &MethodDescription) -> Result<f64> {
    Ok(expected_alg_counts(method_description)?.total())
}

/// The expected alg counts of every piece type of a solve with the given
/// method. The piece type executed first carries the parity over to the second
/// one, so only the second one can have odd permutations.
///
/// # Errors
///
/// Returns an error if the method description refers to unknown piece types or
/// pieces, or if its twists can't solve every twist.
pub fn expected_alg_counts(method_description: &MethodDescription) -> Result<AlgCountsData> {
    if let Some(unknown) = method_description
        .piece_method_descriptions
        .iter()
        .find(|d| PieceDescription::standard(&d.plural_name).is_none())
    {
        return Err(CubeStatsError::UnknownPieceType(unknown.plural_name.clone()));
    }

    let rows = method_description
        .execution_order
        .plural_names()
        .iter()
        .enumerate()
        .map(|(i, &plural_name)| {
            let piece_description = PieceDescription::standard(plural_name)
                .ok_or_else(|| CubeStatsError::UnknownPieceType(plural_name.to_string()))?;
            let piece_method_description =
                method_description.piece_method_description(&piece_description);
            let permutation_description =
                PiecePermutationDescription::new(piece_description, i > 0);
            Ok(AlgCountsRow {
                plural_name: plural_name.to_string(),
                alg_counts: expected_alg_counts_for_piece_type(
                    &permutation_description,
                    &piece_method_description,
                )?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AlgCountsData { rows })
}

/// The expected alg counts of one piece type, computed exactly from the
/// scramble classes.
///
/// # Errors
///
/// Returns an error if the method description doesn't fit the piece type, if
/// the scramble classes don't cover every scramble or if some class loses
/// probability along the way.
pub fn expected_alg_counts_for_piece_type(
    permutation_description: &PiecePermutationDescription,
    piece_method_description: &PieceMethodDescription,
) -> Result<AlgCounts> {
    let plural_name = permutation_description.piece_description().plural_name();
    info!(start!("Computing the expected algs for {}"), plural_name);
    let start = Instant::now();

    let solver = Solver::new(Decider::new(
        permutation_description.clone(),
        piece_method_description,
    )?)?;

    let groups = permutation_description.groups()?;
    let count = permutation_description.count()?;
    let covered: u128 = groups.iter().map(BigScrambleGroup::count).sum();
    if covered != count {
        return Err(CubeStatsError::InvariantViolation(format!(
            "The scramble groups of {plural_name} cover {covered} scrambles instead of {count}"
        )));
    }

    // Classes with the same cycle lengths only differ in which pieces are
    // permuted, and the solver reveals that anyway
    let mut shapes: FxHashMap<&[usize], u128> = FxHashMap::default();
    for group in &groups {
        *shapes.entry(group.sorted_cycle_lengths()).or_default() += group.count();
    }
    info!(
        working!("Solving {} cycle shapes of {} scramble groups"),
        shapes.len(),
        groups.len()
    );

    // Every shape shares the states it reaches once its first cycles are
    // solved, so one search serves all of them
    let symmetry = Rc::new(solver.decider().piece_symmetry());
    let search = solver.search::<ScrambleGroup, AlgShape>();
    let mut expected = AlgCounts::zero();
    for (cycle_lengths, shape_count) in shapes.into_iter().sorted() {
        let group = ScrambleGroup::new(permutation_description, cycle_lengths)
            .with_symmetry(Rc::clone(&symmetry));
        let alg_counts = search.alg_counts(&group);
        if !alg_counts.is_normalized() {
            return Err(CubeStatsError::InvariantViolation(format!(
                "The solves of cycle lengths {cycle_lengths:?} have a probability of {}",
                alg_counts.total_probability()
            )));
        }
        debug!(
            "Cycle lengths {:?} have {} possible solves",
            cycle_lengths,
            alg_counts.len()
        );
        // Both counts fit into an f64 with a small relative error
        let weight = shape_count as f64 / count as f64;
        expected = expected.plus(&alg_counts.expected_value().times(weight));
    }

    debug!("Solved {} distinct states", search.num_solved());
    info!(
        success!("Expected {:.4} algs for {} in {:.3}s"),
        expected.total(),
        plural_name,
        start.elapsed().as_secs_f64()
    );
    Ok(expected)
}

/// The average alg counts over the given concrete scrambles.
///
/// # Errors
///
/// Returns an error if the method description doesn't fit the piece type or if
/// there are no scrambles.
pub fn expected_alg_counts_for_scrambles(
    permutation_description: &PiecePermutationDescription,
    piece_method_description: &PieceMethodDescription,
    scrambles: &[Scramble],
) -> Result<AlgCounts> {
    if scrambles.is_empty() {
        return Err(CubeStatsError::InvariantViolation(
            "There are no scrambles to average over".to_string(),
        ));
    }
    let solver = Solver::new(Decider::new(
        permutation_description.clone(),
        piece_method_description,
    )?)?;
    // Full traces, so that this stays independent of how shapes count
    let search = solver.search::<Scramble, AlgTrace>();
    let alg_counts = scrambles
        .iter()
        .map(|scramble| {
            search
                .algs(scramble)
                .assert_deterministic()
                .count_merged_algs(|buffer| solver.decider().max_cycle_length_for_buffer(buffer))
        })
        .collect_vec();
    Ok(Probabilistic::uniform(alg_counts).expected_value())
}

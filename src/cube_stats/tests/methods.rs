use cube_stats::{
    ExecutionOrder, MethodDescription, UniformAlgSetMode, decider::Decider, solver::Solver,
};
use cube_stats_core::{permutation::PiecePermutationDescription, piece::PieceDescription};

const CLASSIC: &str = include_str!("../../../methods/classic.toml");
const FLOATING: &str = include_str!("../../../methods/floating.toml");

/// Build the solver of every piece type, which checks all piece names and
/// twist sets.
fn solvers(method: &MethodDescription) -> Vec<Solver> {
    method
        .execution_order
        .plural_names()
        .iter()
        .enumerate()
        .map(|(i, plural_name)| {
            let piece_description = PieceDescription::standard(plural_name).unwrap();
            let piece_method_description = method.piece_method_description(&piece_description);
            let description = PiecePermutationDescription::new(piece_description, i > 0);
            Solver::new(Decider::new(description, &piece_method_description).unwrap()).unwrap()
        })
        .collect()
}

#[test_log::test]
fn classic_is_the_default() {
    let method = MethodDescription::from_toml(CLASSIC).unwrap();
    assert_eq!(method, MethodDescription::default());
    assert_eq!(solvers(&method).len(), 2);
}

#[test_log::test]
fn floating_method() {
    let method = MethodDescription::from_toml(FLOATING).unwrap();
    assert_eq!(method.execution_order, ExecutionOrder::EC);

    let solvers = solvers(&method);
    let edges = solvers[0].decider();
    assert_eq!(edges.sorted_buffers().len(), 3);
    assert_eq!(edges.max_cycle_length_for_buffer(edges.favorite_buffer()), 5);
    // Buffers come last, the favorite buffer at the very end
    assert_eq!(edges.sorted_cycle_breaks().last(), Some(&edges.favorite_buffer()));

    let corners = solvers[1].decider();
    // All 2-twists and the 3-twists that include UFR
    assert_eq!(corners.twists_with_costs().len(), 28 * 2 + 21 * 2);
    assert!(corners.permutation_description().allow_odd_permutations());
    assert_eq!(
        method.piece_method_descriptions[0].double_swaps,
        cube_stats::AlgSet::Uniform(UniformAlgSetMode::OnlyOriented)
    );
}

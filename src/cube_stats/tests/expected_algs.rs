use cube_stats::{
    AlgSet, AlgSubset, BufferDescription, CubeStatsError, ExecutionOrder, MethodDescription,
    PieceMethodDescription, UniformAlgSetMode, expected_alg_counts,
    expected_alg_counts_for_piece_type, expected_alg_counts_for_scrambles, expected_algs,
    solvable::Scramble,
};
use cube_stats_core::{
    alg_counts::AlgCounts,
    math::{VectorSpace, probabilistic::PROBABILITY_TOLERANCE},
    permutation::PiecePermutationDescription,
    piece::PieceDescription,
};
use log::info;
use std::time::{Duration, Instant};

fn assert_close(actual: &AlgCounts, expected: &AlgCounts) {
    let difference = actual.plus(&expected.times(-1.0));
    let components = difference
        .cycles_by_length()
        .iter()
        .chain(difference.twists_by_num_unoriented())
        .chain(&[
            difference.double_swaps(),
            difference.parities(),
            difference.parity_twists(),
        ])
        .copied()
        .collect::<Vec<_>>();
    assert!(
        components.iter().all(|c| c.abs() < PROBABILITY_TOLERANCE),
        "{actual:?} is not {expected:?}"
    );
}

/// The grouped computation has to agree with solving every scramble.
fn assert_matches_brute_force(
    description: &PiecePermutationDescription,
    method: &PieceMethodDescription,
) {
    let grouped = expected_alg_counts_for_piece_type(description, method).unwrap();
    let brute_force =
        expected_alg_counts_for_scrambles(description, method, &Scramble::all(description))
            .unwrap();
    assert!(grouped.total() > 0.0);
    assert_close(&grouped, &brute_force);
}

fn small(num_pieces: usize, unoriented_types: u8, odd: bool) -> PiecePermutationDescription {
    PiecePermutationDescription::new(
        PieceDescription::new("pieces", num_pieces, unoriented_types),
        odd,
    )
}

#[test_log::test]
fn single_buffer_matches_brute_force() {
    let method = PieceMethodDescription::new("pieces", vec![BufferDescription::new("0")]);
    assert_matches_brute_force(&small(4, 2, true), &method);
}

#[test_log::test]
fn parity_twists_match_brute_force() {
    let method = PieceMethodDescription::new(
        "pieces",
        vec![
            BufferDescription::new("0")
                .with_can_do_parity_twists(true)
                .with_do_unoriented_before_parity(true),
        ],
    );
    assert_matches_brute_force(&small(4, 2, true), &method);

    let method = PieceMethodDescription::new(
        "pieces",
        vec![
            BufferDescription::new("0")
                .with_can_do_parity_twists(true)
                .with_do_unoriented_before_parity_twist(true),
        ],
    );
    assert_matches_brute_force(&small(5, 2, true), &method);
}

#[test_log::test]
fn floating_and_double_swaps_match_brute_force() {
    let method = PieceMethodDescription::new(
        "pieces",
        vec![
            BufferDescription::new("0"),
            BufferDescription::new("2").with_stay_with_solved_buffer(true),
        ],
    )
    .with_avoid_unoriented_if_we_can_float(true)
    .with_double_swaps(AlgSet::Uniform(UniformAlgSetMode::OnlyOriented));
    assert_matches_brute_force(&small(4, 2, true), &method);
}

#[test_log::test]
fn even_permutations_match_brute_force() {
    let method = PieceMethodDescription::new(
        "pieces",
        vec![
            BufferDescription::new("0").with_five_cycles(true),
            BufferDescription::new("1"),
        ],
    )
    .with_avoid_buffers_for_cycle_breaks(true)
    .with_double_swaps(AlgSet::Uniform(UniformAlgSetMode::All));
    assert_matches_brute_force(&small(5, 1, false), &method);
}

#[test_log::test]
fn interchangeable_pieces_match_brute_force() {
    // Pieces 1 2 and 4 5 can be renamed freely, the buffers can't
    let method = PieceMethodDescription::new(
        "pieces",
        vec![
            BufferDescription::new("0"),
            BufferDescription::new("3").with_stay_with_solved_buffer(true),
        ],
    )
    .with_avoid_buffers_for_cycle_breaks(true)
    .with_avoid_unoriented_if_we_can_float(true)
    .with_double_swaps(AlgSet::Partial(vec![AlgSubset {
        piece: "0".to_string(),
        subset: AlgSet::Partial(vec![AlgSubset {
            piece: "3".to_string(),
            subset: AlgSet::Uniform(UniformAlgSetMode::All),
        }]),
    }]));
    assert_matches_brute_force(&small(6, 1, true), &method);

    let method = PieceMethodDescription::new(
        "pieces",
        vec![
            BufferDescription::new("2")
                .with_can_do_parity_twists(true)
                .with_do_unoriented_before_parity(true),
        ],
    );
    assert_matches_brute_force(&small(6, 1, true), &method);
}

#[test_log::test]
fn solved_scramble_needs_no_algs() {
    let description = small(4, 2, true);
    let method = PieceMethodDescription::new("pieces", vec![BufferDescription::new("0")]);
    let counts =
        expected_alg_counts_for_scrambles(&description, &method, &[Scramble::solved(&description)])
            .unwrap();
    assert_eq!(counts, AlgCounts::zero());
    assert_eq!(counts.total(), 0.0);
}

#[test_log::test]
fn corners_are_symmetric_under_relabeling() {
    let corners = PiecePermutationDescription::new(PieceDescription::corners(), false);
    let with_buffer =
        |buffer: &str| PieceMethodDescription::new("corners", vec![BufferDescription::new(buffer)]);

    let ufr = expected_alg_counts_for_piece_type(&corners, &with_buffer("UFR")).unwrap();
    // Enumerating all 20160 even permutations and 2187 orientations gives
    // 9814283 / 2449440 algs
    assert!(
        (ufr.total() - 9_814_283.0 / 2_449_440.0).abs() < 1e-9,
        "{}",
        ufr.total()
    );
    assert!((ufr.cycles_of_length(3) - 3.492_857_142_857_143).abs() < 1e-9);
    assert!((ufr.total_twists() - 0.513_888_480_632_307_7).abs() < 1e-9);
    assert_eq!(ufr.parities(), 0.0);

    let dbl = expected_alg_counts_for_piece_type(&corners, &with_buffer("DBL")).unwrap();
    assert_close(&ufr, &dbl);
}

#[test_log::test]
fn default_method_finishes() {
    let start = Instant::now();
    let total = expected_algs(&MethodDescription::default()).unwrap();
    let elapsed = start.elapsed();
    info!("Expected {total:.4} algs for the default method in {elapsed:?}");
    assert!(total.is_finite() && total > 9_814_283.0 / 2_449_440.0);
    assert!(elapsed < Duration::from_secs(120), "Took {elapsed:?}");
}

/// The first piece type is solved from an even permutation and hands the
/// parity to the second one.
fn assert_parity_goes_last(execution_order: ExecutionOrder) {
    let method = MethodDescription {
        execution_order,
        ..MethodDescription::default()
    };
    let data = expected_alg_counts(&method).unwrap();
    let plural_names = execution_order.plural_names();
    assert_eq!(
        data.rows.iter().map(|row| row.plural_name.as_str()).collect::<Vec<_>>(),
        plural_names
    );
    let [first, second] = &data.rows[..] else {
        panic!("Expected two rows but got {}", data.rows.len());
    };
    assert_eq!(first.alg_counts.parities(), 0.0);
    assert!(second.alg_counts.parities() > 0.0);

    let piece_description = PieceDescription::standard(plural_names[0]).unwrap();
    let piece_method_description = method.piece_method_description(&piece_description);
    let alone = expected_alg_counts_for_piece_type(
        &PiecePermutationDescription::new(piece_description, false),
        &piece_method_description,
    )
    .unwrap();
    assert_close(&first.alg_counts, &alone);
}

#[test_log::test]
fn corners_first() {
    assert_parity_goes_last(ExecutionOrder::CE);
}

#[test_log::test]
fn edges_first() {
    assert_parity_goes_last(ExecutionOrder::EC);
}

#[test_log::test]
fn method_errors() {
    let method = MethodDescription {
        execution_order: ExecutionOrder::CE,
        piece_method_descriptions: vec![PieceMethodDescription::new(
            "centers",
            vec![BufferDescription::new("U")],
        )],
    };
    assert_eq!(
        expected_alg_counts(&method).unwrap_err(),
        CubeStatsError::UnknownPieceType("centers".to_string())
    );

    let method = MethodDescription {
        execution_order: ExecutionOrder::CE,
        piece_method_descriptions: vec![PieceMethodDescription::new(
            "corners",
            vec![BufferDescription::new("UF")],
        )],
    };
    assert_eq!(
        expected_alg_counts(&method).unwrap_err(),
        CubeStatsError::UnknownPiece {
            plural_name: "corners".to_string(),
            piece: "UF".to_string()
        }
    );

    let method = MethodDescription {
        execution_order: ExecutionOrder::CE,
        piece_method_descriptions: vec![
            PieceMethodDescription::new("corners", vec![BufferDescription::new("UFR")])
                .with_max_floating_twist_length(0),
        ],
    };
    assert_eq!(
        expected_alg_counts(&method).unwrap_err(),
        CubeStatsError::InsufficientTwistSet {
            resolved: 1,
            reachable: 2187
        }
    );
}

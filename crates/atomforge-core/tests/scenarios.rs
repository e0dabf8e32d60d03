//! Reference scenarios run end to end through the public entry points.

use atomforge_core::atom::AtomKind;
use atomforge_core::config::Configuration;
use atomforge_core::engine::{Simulation, run_configuration, simulate};
use atomforge_core::grid::Coord;
use atomforge_core::id::OperatorId;
use atomforge_core::mech::Mech;
use atomforge_core::sim::RunResult;
use atomforge_core::test_utils::*;
use atomforge_core::validation::{ValidationError, check_uniqueness, verify_valid_operators};

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

fn corners() -> [Coord; 4] {
    [c(0, 0), c(7, 0), c(0, 7), c(7, 7)]
}

fn run_one(inputs: &[Coord], outputs: &[Coord]) -> Result<RunResult, ValidationError> {
    let (mechs, lengths, programs) = scenario_one_call();
    simulate(
        &mechs,
        &lengths,
        &programs,
        inputs,
        outputs,
        &scenario_one_kinds(),
        SCENARIO_FRAMES,
        SCENARIO_SIDE,
        None,
        None,
        None,
    )
}

// ===========================================================================
// Literal runs
// ===========================================================================

#[test]
fn scenario_one_scores() {
    let _ = env_logger::builder().is_test(true).try_init();
    let result = run_one(&scenario_one_inputs(), &scenario_one_outputs()).unwrap();
    assert_eq!(result.static_cost(), 3950);
    assert_eq!(result.delivered(), 1);
    assert_eq!(result.latency(), 46_000_000);
    assert_eq!(result.dynamic_cost(), 3_574_000_000);
}

#[test]
fn scenario_two_scores() {
    let result = run_configuration(scenario_two(), SCENARIO_FRAMES);
    assert_eq!(result.static_cost(), 3800);
    assert_eq!(result.delivered(), 2);
    assert_eq!(result.latency(), 32_000_000);
    assert_eq!(result.dynamic_cost(), 3_224_000_000);
}

#[test]
fn scenario_two_ends_with_known_board() {
    let mut sim = Simulation::new(scenario_two());
    sim.run(SCENARIO_FRAMES);
    assert_eq!(sim.atoms().len(), 12);
    assert_eq!(sim.atoms().next_id().0, 81);
    assert_eq!(sim.metrics().spawned, 39);
}

#[test]
fn initial_record_echoes_inputs() {
    let result = run_configuration(scenario_one(), SCENARIO_FRAMES);
    let initial = &result.initial;
    assert_eq!(initial.dimension, SCENARIO_SIDE);
    assert_eq!(initial.mechs, scenario_one_mechs());
    assert_eq!(initial.operator_inputs, scenario_one_inputs());
    assert_eq!(initial.operator_outputs, scenario_one_outputs());
    assert_eq!(initial.operator_types, scenario_one_kinds());
    assert_eq!(initial.program_lengths.len(), 8);
    assert_eq!(initial.faucets.len(), 1);
    assert_eq!(initial.sinks.len(), 3);
    assert!(initial.sinks.iter().all(|s| s.accepts == AtomKind::Saffron));
}

#[test]
fn solver_tag_is_echoed() {
    let config = Configuration::builder(SCENARIO_SIDE)
        .solver("greedy-v2")
        .mechs(scenario_one_mechs())
        .programs(scenario_one_programs())
        .build()
        .unwrap();
    let result = run_configuration(config, 5);
    assert_eq!(result.initial.solver.as_deref(), Some("greedy-v2"));
}

#[test]
fn zero_frames_reports_primed_board() {
    let result = run_configuration(scenario_one(), 0);
    assert_eq!(result.delivered(), 0);
    assert_eq!(result.terminal.spawned, 1);
    assert_eq!(result.terminal.atoms_remaining, 1);
    assert_eq!(result.terminal.remaining(AtomKind::Vanilla), 1);
    assert_eq!(result.dynamic_cost(), 0);
    assert_eq!(result.latency(), 0);
}

// ===========================================================================
// Validation scenarios
// ===========================================================================

#[test]
fn repeated_output_is_overlapping_operators() {
    let mut outputs = scenario_one_outputs();
    outputs[4] = outputs[3];
    assert_eq!(
        check_uniqueness(&scenario_one_inputs(), &outputs),
        Err(ValidationError::OverlappingOperators { cell: c(5, 4) })
    );
    assert_eq!(
        run_one(&scenario_one_inputs(), &outputs).unwrap_err(),
        ValidationError::OverlappingOperators { cell: c(5, 4) }
    );
}

#[test]
fn repeated_input_is_overlapping_operators() {
    let mut inputs = scenario_one_inputs();
    inputs[1] = inputs[0];
    assert_eq!(
        run_one(&inputs, &scenario_one_outputs()).unwrap_err(),
        ValidationError::OverlappingOperators { cell: c(1, 0) }
    );
}

#[test]
fn cell_pushed_out_of_grid_is_out_of_bounds() {
    let mut inputs = scenario_one_inputs();
    inputs[9] = c(1, 8);
    assert_eq!(
        verify_valid_operators(
            &corners(),
            &scenario_one_kinds(),
            &inputs,
            &scenario_one_outputs(),
            7
        ),
        Err(ValidationError::OutOfBounds { cell: c(1, 8) })
    );
    assert_eq!(
        run_one(&inputs, &scenario_one_outputs()).unwrap_err(),
        ValidationError::OutOfBounds { cell: c(1, 8) }
    );
}

#[test]
fn shared_piping_is_overlapping_piping() {
    // The shake's output is moved onto a corner marker.
    let mut outputs = scenario_one_outputs();
    outputs[2] = c(7, 0);
    let mut inputs = scenario_one_inputs();
    inputs[4] = c(6, 0);
    inputs[5] = c(5, 0);
    assert_eq!(
        verify_valid_operators(&corners(), &scenario_one_kinds(), &inputs, &outputs, 7),
        Err(ValidationError::OverlappingPiping {
            cell: c(7, 0),
            operator: OperatorId(2)
        })
    );
}

#[test]
fn twenty_six_mechs_exceed_the_limit() {
    let mechs: Vec<Mech> = (0..26).map(|i| Mech::new(i, c(0, 0))).collect();
    let programs = vec![program("_"); 26];
    let (lengths, instructions) = flatten(&programs);
    let err = simulate(
        &mechs,
        &lengths,
        &instructions,
        &[],
        &[],
        &[],
        SCENARIO_FRAMES,
        SCENARIO_SIDE,
        None,
        None,
        None,
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::MechLimitExceeded { count: 26 });
}

#[test]
fn twenty_five_mechs_are_accepted() {
    let mechs: Vec<Mech> = (0..25).map(|i| Mech::new(i, c(3, 3))).collect();
    let config = Configuration::builder(SCENARIO_SIDE)
        .mechs(mechs)
        .programs(vec![program("D,A"); 25])
        .build()
        .unwrap();
    assert_eq!(config.static_cost(), 25 * 150);
}

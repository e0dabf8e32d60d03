//! Adversarial input tests for the Atomforge engine.
//!
//! Tests edge cases that should either return errors or be handled gracefully
//! without panics.

use atomforge_core::atom::AtomKind;
use atomforge_core::config::Configuration;
use atomforge_core::engine::{Simulation, run_configuration, simulate};
use atomforge_core::faucet::{Faucet, Sink};
use atomforge_core::grid::Coord;
use atomforge_core::id::MechId;
use atomforge_core::mech::{Mech, MechStatus};
use atomforge_core::operator::OperatorKind;
use atomforge_core::program::{Instruction, parse_program};
use atomforge_core::test_utils::*;
use atomforge_core::validation::ValidationError;

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

/// Smallest legal grid: every cell is a corner.
#[test]
fn two_by_two_grid_runs() {
    let config = Configuration::builder(2)
        .mechs(vec![Mech::new(0, c(0, 0))])
        .programs(vec![program("Z,D,X,S,Z,A,X,W")])
        .build()
        .unwrap();
    let result = run_configuration(config, 200);
    // Vanilla never satisfies a saffron sink.
    assert_eq!(result.delivered(), 0);
    assert!(result.terminal.discarded > 0);
}

#[test]
fn one_cell_grid_is_rejected() {
    let err = Configuration::builder(1)
        .mechs(vec![Mech::new(0, c(0, 0))])
        .programs(vec![program("_")])
        .build()
        .unwrap_err();
    assert_eq!(err, ValidationError::InvalidDimension { side: 1 });
}

#[test]
fn mech_off_grid_is_rejected() {
    let err = Configuration::builder(8)
        .mechs(vec![Mech::new(4, c(8, 0))])
        .programs(vec![program("_")])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::MechOutOfBounds {
            id: MechId(4),
            position: c(8, 0)
        }
    );
}

#[test]
fn duplicate_mech_ids_are_rejected() {
    let err = Configuration::builder(8)
        .mechs(vec![Mech::new(3, c(0, 0)), Mech::new(3, c(1, 1))])
        .programs(vec![program("_"), program("_")])
        .build()
        .unwrap_err();
    assert_eq!(err, ValidationError::DuplicateMechId { id: MechId(3) });
}

#[test]
fn empty_program_is_rejected() {
    let err = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(0, 0))])
        .flat_programs(vec![0], vec![])
        .build()
        .unwrap_err();
    assert_eq!(err, ValidationError::EmptyProgram { index: 0 });
}

#[test]
fn program_lengths_must_cover_instructions() {
    let err = simulate(
        &[Mech::new(0, c(0, 0))],
        &[3],
        &[Instruction::Engage, Instruction::Right],
        &[],
        &[],
        &[],
        10,
        8,
        None,
        None,
        None,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationError::ProgramLengthMismatch {
            declared: 3,
            actual: 2
        }
    );
}

#[test]
fn unknown_instruction_symbol_is_rejected() {
    assert_eq!(
        parse_program("Z,Q,X"),
        Err(ValidationError::InvalidInstruction {
            symbol: "Q".to_string()
        })
    );
}

#[test]
fn operator_ports_short_of_arity() {
    let err = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(0, 0))])
        .programs(vec![program("_")])
        .operators(vec![c(2, 2)], vec![c(3, 2)], vec![OperatorKind::Stir])
        .build()
        .unwrap_err();
    assert!(matches!(err, ValidationError::ArityMismatch { .. }));
}

#[test]
fn faucet_off_grid_is_rejected() {
    let err = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(0, 0))])
        .programs(vec![program("_")])
        .faucets(vec![Faucet::new(0, AtomKind::Vanilla, c(-1, 0))])
        .build()
        .unwrap_err();
    assert_eq!(err, ValidationError::OutOfBounds { cell: c(-1, 0) });
}

#[test]
fn operator_port_on_faucet_cell_is_overlapping_piping() {
    let err = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(0, 0))])
        .programs(vec![program("_")])
        .faucets(vec![Faucet::new(0, AtomKind::Truffle, c(3, 3))])
        .operators(
            vec![c(3, 3)],
            vec![c(3, 4), c(3, 5), c(4, 5), c(5, 5), c(6, 5)],
            vec![OperatorKind::Smash],
        )
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::OverlappingPiping { cell, .. } if cell == c(3, 3)
    ));
}

#[test]
fn mismatched_volume_count_is_rejected() {
    let err = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(0, 0)), Mech::new(1, c(0, 0))])
        .programs(vec![program("_"), program("_")])
        .volumes(vec![1])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::VolumeCountMismatch {
            mechs: 2,
            volumes: 1
        }
    );
}

/// Every mech piled on the faucet, all waiting for the same atom.
#[test]
fn crowd_on_one_cell() {
    let mechs: Vec<Mech> = (0..25).map(|i| Mech::new(i, c(0, 0))).collect();
    let config = Configuration::builder(8)
        .mechs(mechs)
        .programs(vec![program("G,D,H,A"); 25])
        .build()
        .unwrap();
    let mut sim = Simulation::new(config);
    sim.run(100);
    for mech in sim.mechs() {
        assert!(mech.carrying.is_none() || mech.status == MechStatus::Closed);
    }
    let t = sim.terminal_record();
    assert!(t.atoms_remaining <= t.spawned);
}

/// A mech declared closed with nothing in its grip.
#[test]
fn closed_start_with_blocking_release_does_not_stall() {
    let config = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(5, 5)).with_status(MechStatus::Closed)])
        .programs(vec![program("H,D,Z,A")])
        .build()
        .unwrap();
    let mut sim = Simulation::new(config);
    sim.run(8);
    // Opens on the first H, then loops freely.
    assert_eq!(sim.mechs()[0].status, MechStatus::Open);
    assert_eq!(sim.mechs()[0].position, c(5, 5));
}

/// Faucets that only ever emit once, onto a cell nobody visits.
#[test]
fn limited_faucet_never_refills() {
    let config = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(4, 4))])
        .programs(vec![program("_")])
        .faucets(vec![Faucet::new(0, AtomKind::Saffron, c(2, 2)).with_limit(1)])
        .sinks(vec![Sink::new(0, c(2, 2), AtomKind::Saffron)])
        .build()
        .unwrap();
    let result = run_configuration(config, 50);
    // Primed, then swallowed by the sink sharing the cell.
    assert_eq!(result.terminal.spawned, 1);
    assert_eq!(result.delivered(), 1);
    assert_eq!(result.latency(), 1_000_000);
}

#[test]
fn zero_limit_faucet_never_primes() {
    let config = Configuration::builder(8)
        .mechs(vec![Mech::new(0, c(4, 4))])
        .programs(vec![program("_")])
        .faucets(vec![Faucet::new(0, AtomKind::Vanilla, c(2, 2)).with_limit(0)])
        .build()
        .unwrap();
    let sim = Simulation::new(config);
    assert!(sim.atoms().is_empty());
}

#[test]
fn large_grid_long_run() {
    let config = Configuration::builder(1 << 10)
        .mechs(vec![Mech::new(0, c(512, 512))])
        .programs(vec![program("D,D,S,A,W")])
        .build()
        .unwrap();
    let result = run_configuration(config, 5_000);
    assert_eq!(result.terminal.frames, 5_000);
    assert_eq!(result.dynamic_cost(), 0);
}

/// One truffle smashed into four vanilla: more atoms reach the sinks than
/// the faucet ever emitted, but never more mass.
#[test]
fn smashed_truffle_delivers_more_atoms_than_spawned() {
    let mut mechs = vec![Mech::new(0, c(2, 1))];
    mechs.extend((1..=4).map(|i| Mech::new(i, c(2 + i as i32, 2))));
    let sinks = (3..=6)
        .enumerate()
        .map(|(i, x)| Sink::new(i as u32, c(x, 3), AtomKind::Vanilla))
        .collect();
    let config = Configuration::builder(8)
        .mechs(mechs)
        .programs(vec![program("G,S,H,W"); 5])
        .faucets(vec![Faucet::new(0, AtomKind::Truffle, c(2, 1)).with_limit(1)])
        .sinks(sinks)
        .operators(
            vec![c(2, 2)],
            vec![c(3, 2), c(4, 2), c(5, 2), c(6, 2), c(7, 2)],
            vec![OperatorKind::Smash],
        )
        .build()
        .unwrap();

    let t = run_configuration(config, 10).terminal;
    assert_eq!(t.spawned, 1);
    assert_eq!(t.delivered, 4);
    assert_eq!(t.remaining(AtomKind::Saffron), 1);
    assert_eq!(t.dynamic_cost_total, 2 + 2250 + 8);

    assert_eq!(t.spawned_mass, 9);
    assert_eq!(t.delivered_mass, 4);
    assert_eq!(t.remaining_mass, 5);
    assert!(t.delivered_mass + t.discarded_mass + t.remaining_mass <= t.spawned_mass);
}

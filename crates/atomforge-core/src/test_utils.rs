//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).
//!
//! The two reference factories below run on the classic 8x8 layout for 80
//! frames and have known results.

use crate::config::Configuration;
use crate::grid::Coord;
use crate::mech::Mech;
use crate::operator::OperatorKind;
use crate::program::{Instruction, parse_program};

/// Frames the reference factories are scored over.
pub const SCENARIO_FRAMES: u64 = 80;

/// Side of the reference grid.
pub const SCENARIO_SIDE: u32 = 8;

fn coords(cells: &[(i32, i32)]) -> Vec<Coord> {
    cells.iter().copied().map(Coord::from).collect()
}

fn mechs(placements: &[(u32, (i32, i32))]) -> Vec<Mech> {
    placements
        .iter()
        .map(|&(id, pos)| Mech::new(id, Coord::from(pos)))
        .collect()
}

/// Parse a fixed program. Panics on bad text; test data only.
pub fn program(text: &str) -> Vec<Instruction> {
    parse_program(text).unwrap()
}

/// Flatten per-mech programs into the `(lengths, instructions)` form.
pub fn flatten(programs: &[Vec<Instruction>]) -> (Vec<usize>, Vec<Instruction>) {
    let lengths = programs.iter().map(Vec::len).collect();
    let instructions = programs.iter().flatten().copied().collect();
    (lengths, instructions)
}

// ===========================================================================
// Scenario one
// ===========================================================================

pub fn scenario_one_kinds() -> Vec<OperatorKind> {
    use OperatorKind::*;
    vec![Stir, Stir, Shake, Steam, Smash]
}

pub fn scenario_one_inputs() -> Vec<Coord> {
    coords(&[
        (1, 0),
        (2, 0),
        (1, 1),
        (2, 1),
        (4, 0),
        (4, 1),
        (3, 3),
        (4, 3),
        (5, 3),
        (1, 5),
    ])
}

pub fn scenario_one_outputs() -> Vec<Coord> {
    coords(&[
        (3, 0),
        (3, 1),
        (4, 2),
        (5, 4),
        (6, 4),
        (2, 5),
        (3, 5),
        (4, 5),
        (5, 5),
        (6, 5),
    ])
}

pub fn scenario_one_mechs() -> Vec<Mech> {
    mechs(&[
        (0, (0, 0)),
        (1, (0, 0)),
        (2, (3, 0)),
        (3, (4, 2)),
        (4, (3, 0)),
        (5, (5, 4)),
        (6, (6, 5)),
        (7, (6, 4)),
    ])
}

pub fn scenario_one_programs() -> Vec<Vec<Instruction>> {
    [
        "Z,D,X,A,Z,D,D,X,A,A",
        "_,Z,S,D,H,A,W,G,S,D,D,H,A,A,W",
        "G,D,H,A,S,G,D,H,A,W",
        "G,S,X,W,G,S,D,X,A,W",
        "G,S,S,S,X,W,W,W",
        "G,A,A,A,A,S,X,W,D,D,D,D",
        "G,S,S,D,X,A,W,W",
        "G,S,S,S,D,H,A,W,W,W",
    ]
    .into_iter()
    .map(program)
    .collect()
}

/// Mechs, program lengths, and flat instructions of scenario one, in the
/// shape [`crate::engine::simulate`] takes.
pub fn scenario_one_call() -> (Vec<Mech>, Vec<usize>, Vec<Instruction>) {
    let (lengths, instructions) = flatten(&scenario_one_programs());
    (scenario_one_mechs(), lengths, instructions)
}

/// Eight mechs feeding two stirs, a shake, a steam, and a smash.
pub fn scenario_one() -> Configuration {
    Configuration::builder(SCENARIO_SIDE)
        .mechs(scenario_one_mechs())
        .programs(scenario_one_programs())
        .operators(
            scenario_one_inputs(),
            scenario_one_outputs(),
            scenario_one_kinds(),
        )
        .build()
        .unwrap()
}

// ===========================================================================
// Scenario two
// ===========================================================================

pub fn scenario_two_inputs() -> Vec<Coord> {
    coords(&[
        (1, 0),
        (2, 0),
        (1, 1),
        (2, 1),
        (4, 0),
        (4, 1),
        (3, 2),
        (2, 2),
        (1, 2),
        (1, 4),
    ])
}

pub fn scenario_two_outputs() -> Vec<Coord> {
    coords(&[
        (3, 0),
        (3, 1),
        (4, 2),
        (1, 3),
        (2, 3),
        (2, 4),
        (2, 5),
        (1, 5),
        (1, 6),
        (0, 6),
    ])
}

pub fn scenario_two_mechs() -> Vec<Mech> {
    mechs(&[
        (0, (0, 0)),
        (1, (0, 0)),
        (2, (0, 0)),
        (3, (3, 0)),
        (4, (3, 1)),
        (5, (1, 3)),
        (6, (0, 6)),
    ])
}

pub fn scenario_two_programs() -> Vec<Vec<Instruction>> {
    [
        "G,D,H,A,G,D,D,H,A,A",
        "G,S,D,H,A,W,G,S,D,D,H,A,A,W",
        "G,S,D,D,H,A,A,W,G,S,D,H,A,W",
        "G,D,H,A,G,D,H,A,S,G,S,H,W,W",
        "G,D,H,S,G,A,A,A,H,D,D,W,G,D,H,S,G,A,A,H,D,W",
        "G,S,X,D,W,G,W,W,H,S,S,S,Z,W,W,W,A,H,S,S,S,S,D,Z,D,X,W,A,A,W",
        "G,S,X,D,W,G,S,A,X,D,W,W,G,S,S,A,X,W",
    ]
    .into_iter()
    .map(program)
    .collect()
}

/// Seven mechs on the same operator kinds, packed closer to the faucet.
pub fn scenario_two() -> Configuration {
    Configuration::builder(SCENARIO_SIDE)
        .mechs(scenario_two_mechs())
        .programs(scenario_two_programs())
        .operators(
            scenario_two_inputs(),
            scenario_two_outputs(),
            scenario_one_kinds(),
        )
        .build()
        .unwrap()
}

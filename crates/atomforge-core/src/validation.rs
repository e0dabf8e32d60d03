//! Static configuration checks and determinism validation.
//!
//! The static checks run once, before frame 0, and the first violation
//! aborts the whole call. [`validate_determinism`] is a debugging aid that
//! runs a configuration twice and compares per-frame state hashes.

use crate::config::{Configuration, MAX_MECHS};
use crate::engine::Simulation;
use crate::grid::{Coord, in_range};
use crate::id::{MechId, OperatorId};
use crate::operator::{OperatorKind, segment_operators};
use std::collections::{BTreeSet, VecDeque};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{count} mechs supplied, at most {MAX_MECHS} allowed")]
    MechLimitExceeded { count: usize },

    #[error("overlapping operators: cell {cell} is listed more than once")]
    OverlappingOperators { cell: Coord },

    #[error("operator cell {cell} is not within bounds")]
    OutOfBounds { cell: Coord },

    #[error("{operator} cells do not form one contiguous pipeline")]
    OperatorContinuityError { operator: OperatorId },

    #[error("overlapping piping: {operator} claims cell {cell}, which is already taken")]
    OverlappingPiping { cell: Coord, operator: OperatorId },

    #[error(
        "operator types need {expected_inputs} inputs and {expected_outputs} outputs, \
         got {found_inputs} and {found_outputs}"
    )]
    ArityMismatch {
        expected_inputs: usize,
        found_inputs: usize,
        expected_outputs: usize,
        found_outputs: usize,
    },

    #[error("unknown operator symbol '{symbol}'")]
    UnknownOperator { symbol: String },

    #[error("invalid instruction '{symbol}'")]
    InvalidInstruction { symbol: String },

    #[error("program {index} is empty")]
    EmptyProgram { index: usize },

    #[error("{mechs} mechs but {programs} programs")]
    ProgramCountMismatch { mechs: usize, programs: usize },

    #[error("program lengths sum to {declared} but {actual} instructions were supplied")]
    ProgramLengthMismatch { declared: usize, actual: usize },

    #[error("duplicate mech id {id}")]
    DuplicateMechId { id: MechId },

    #[error("{id} starts outside the grid at {position}")]
    MechOutOfBounds { id: MechId, position: Coord },

    #[error("grid side {side} is out of range")]
    InvalidDimension { side: u32 },

    #[error("{volumes} volumes supplied for {mechs} mechs")]
    VolumeCountMismatch { mechs: usize, volumes: usize },
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

/// Fail with [`ValidationError::OverlappingOperators`] if any cell occurs
/// twice among `inputs`, twice among `outputs`, or in both lists.
pub fn check_uniqueness(inputs: &[Coord], outputs: &[Coord]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for &cell in inputs.iter().chain(outputs) {
        if !seen.insert(cell) {
            return Err(ValidationError::OverlappingOperators { cell });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Placement and continuity
// ---------------------------------------------------------------------------

/// Check operator placement against the reserved `corners` and a board whose
/// largest valid coordinate is `dimension`.
///
/// Operators are visited in declaration order. Each cell must not already be
/// claimed by a corner marker or an earlier operator, and must lie in
/// `0..=dimension`. The cells of one operator must then form a single
/// 4-connected region.
pub fn verify_valid_operators(
    corners: &[Coord],
    kinds: &[OperatorKind],
    inputs: &[Coord],
    outputs: &[Coord],
    dimension: i32,
) -> Result<(), ValidationError> {
    let operators = segment_operators(kinds, inputs, outputs)?;
    let mut claimed: BTreeSet<Coord> = corners.iter().copied().collect();

    for op in &operators {
        for cell in op.cells() {
            if !claimed.insert(cell) {
                return Err(ValidationError::OverlappingPiping {
                    cell,
                    operator: op.id,
                });
            }
            if !in_range(cell, dimension) {
                return Err(ValidationError::OutOfBounds { cell });
            }
        }

        let cells: Vec<Coord> = op.cells().collect();
        if !is_contiguous(&cells) {
            return Err(ValidationError::OperatorContinuityError { operator: op.id });
        }
    }
    Ok(())
}

/// Whether `cells` form one region under edge adjacency.
fn is_contiguous(cells: &[Coord]) -> bool {
    let Some(&start) = cells.first() else {
        return true;
    };
    let mut reached = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(cell) = queue.pop_front() {
        for &next in cells {
            if cell.is_adjacent(&next) && reached.insert(next) {
                queue.push_back(next);
            }
        }
    }
    cells.iter().all(|c| reached.contains(c))
}

// ---------------------------------------------------------------------------
// Determinism validation
// ---------------------------------------------------------------------------

/// Result of a determinism validation run.
#[derive(Debug)]
pub struct DeterminismResult {
    /// Whether the two runs produced identical results.
    pub is_deterministic: bool,
    /// Frame at which divergence was first detected (if any).
    pub divergence_frame: Option<u64>,
    /// Hash log: (frame, hash_run1, hash_run2) for each frame.
    pub hash_log: Vec<(u64, u64, u64)>,
}

/// Run `config` twice side by side for `frames` frames and compare the
/// state hash after every frame.
pub fn validate_determinism(config: &Configuration, frames: u64) -> DeterminismResult {
    let mut run_a = Simulation::new(config.clone());
    let mut run_b = Simulation::new(config.clone());

    let mut hash_log = Vec::with_capacity(frames as usize);
    let mut divergence_frame = None;

    for _ in 0..frames {
        run_a.step();
        run_b.step();

        let hash_a = run_a.state_hash();
        let hash_b = run_b.state_hash();
        let frame = run_a.frame();
        hash_log.push((frame, hash_a, hash_b));

        if hash_a != hash_b && divergence_frame.is_none() {
            divergence_frame = Some(frame);
        }
    }

    if let Some(frame) = divergence_frame {
        log::warn!("determinism check diverged at frame={frame}");
    }

    DeterminismResult {
        is_deterministic: divergence_frame.is_none(),
        divergence_frame,
        hash_log,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

//! Immutable, validated run configuration.
//!
//! A [`Configuration`] can only be obtained from
//! [`ConfigurationBuilder::build`], which runs every static check. Once built
//! it is never mutated; each simulation run reads from it.

use crate::cost;
use crate::faucet::{self, Faucet, Sink};
use crate::grid::{Coord, Grid};
use crate::mech::Mech;
use crate::operator::{Operator, OperatorKind, segment_operators};
use crate::program::{Instruction, ProgramSet};
use crate::sim::InitialRecord;
use crate::validation::{ValidationError, check_uniqueness, verify_valid_operators};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hard limit on mechs per configuration.
pub const MAX_MECHS: usize = 25;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A validated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    solver: Option<String>,
    grid: Grid,
    /// Mechs in caller order.
    mechs: Vec<Mech>,
    /// Programs parallel to `mechs`.
    programs: ProgramSet,
    /// Indices into `mechs`, ascending by mech id.
    execution_order: Vec<usize>,
    operator_inputs: Vec<Coord>,
    operator_outputs: Vec<Coord>,
    operators: Vec<Operator>,
    faucets: Vec<Faucet>,
    sinks: Vec<Sink>,
    volumes: Vec<u32>,
    static_cost: u64,
}

impl Configuration {
    /// Start building a configuration on a board of side `side`.
    pub fn builder(side: u32) -> ConfigurationBuilder {
        ConfigurationBuilder::new(side)
    }

    pub fn solver(&self) -> Option<&str> {
        self.solver.as_deref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mechs(&self) -> &[Mech] {
        &self.mechs
    }

    pub fn programs(&self) -> &ProgramSet {
        &self.programs
    }

    /// Mech indices in the order they act each frame.
    pub fn execution_order(&self) -> &[usize] {
        &self.execution_order
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn faucets(&self) -> &[Faucet] {
        &self.faucets
    }

    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    pub fn volumes(&self) -> &[u32] {
        &self.volumes
    }

    pub fn static_cost(&self) -> u64 {
        self.static_cost
    }

    /// Echo of this configuration for the start of a run.
    pub fn initial_record(&self) -> InitialRecord {
        InitialRecord {
            solver: self.solver.clone(),
            dimension: self.grid.side(),
            mechs: self.mechs.clone(),
            program_lengths: self.programs.lengths().to_vec(),
            instructions: self.programs.instructions().to_vec(),
            operator_inputs: self.operator_inputs.clone(),
            operator_outputs: self.operator_outputs.clone(),
            operator_types: self.operators.iter().map(|op| op.kind).collect(),
            faucets: self.faucets.clone(),
            sinks: self.sinks.clone(),
            volumes: self.volumes.clone(),
            static_cost: self.static_cost,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects the raw call surface and validates it into a [`Configuration`].
///
/// Faucets and sinks default to the classic layout: one vanilla faucet on
/// the top-left corner and saffron sinks on the other three corners.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    side: u32,
    solver: Option<String>,
    mechs: Vec<Mech>,
    program_lengths: Vec<usize>,
    instructions: Vec<Instruction>,
    operator_inputs: Vec<Coord>,
    operator_outputs: Vec<Coord>,
    operator_types: Vec<OperatorKind>,
    faucets: Option<Vec<Faucet>>,
    sinks: Option<Vec<Sink>>,
    volumes: Vec<u32>,
}

impl ConfigurationBuilder {
    pub fn new(side: u32) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }

    /// Opaque caller identifier, echoed in the initial record.
    pub fn solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = Some(solver.into());
        self
    }

    pub fn mechs(mut self, mechs: Vec<Mech>) -> Self {
        self.mechs = mechs;
        self
    }

    /// One program per mech, in the same order as the mechs.
    pub fn programs(mut self, programs: Vec<Vec<Instruction>>) -> Self {
        self.program_lengths = programs.iter().map(Vec::len).collect();
        self.instructions = programs.into_iter().flatten().collect();
        self
    }

    /// Programs as a flattened buffer plus one length per mech.
    pub fn flat_programs(mut self, lengths: Vec<usize>, instructions: Vec<Instruction>) -> Self {
        self.program_lengths = lengths;
        self.instructions = instructions;
        self
    }

    /// Operators as flattened port lists, segmented by each type's arity.
    pub fn operators(
        mut self,
        inputs: Vec<Coord>,
        outputs: Vec<Coord>,
        types: Vec<OperatorKind>,
    ) -> Self {
        self.operator_inputs = inputs;
        self.operator_outputs = outputs;
        self.operator_types = types;
        self
    }

    pub fn faucets(mut self, faucets: Vec<Faucet>) -> Self {
        self.faucets = Some(faucets);
        self
    }

    pub fn sinks(mut self, sinks: Vec<Sink>) -> Self {
        self.sinks = Some(sinks);
        self
    }

    /// Per-mech volumes. Echoed only.
    pub fn volumes(mut self, volumes: Vec<u32>) -> Self {
        self.volumes = volumes;
        self
    }

    /// Run every static check and freeze the configuration.
    pub fn build(self) -> Result<Configuration, ValidationError> {
        self.validate().inspect_err(|err| {
            log::debug!("configuration rejected: {err}");
        })
    }

    fn validate(self) -> Result<Configuration, ValidationError> {
        if self.mechs.len() > MAX_MECHS {
            return Err(ValidationError::MechLimitExceeded {
                count: self.mechs.len(),
            });
        }
        if !(Grid::MIN_SIDE..=Grid::MAX_SIDE).contains(&self.side) {
            return Err(ValidationError::InvalidDimension { side: self.side });
        }
        let grid = Grid::new(self.side);

        let mut ids = BTreeSet::new();
        for mech in &self.mechs {
            if !ids.insert(mech.id) {
                return Err(ValidationError::DuplicateMechId { id: mech.id });
            }
            if !grid.contains(mech.position) {
                return Err(ValidationError::MechOutOfBounds {
                    id: mech.id,
                    position: mech.position,
                });
            }
        }

        if self.program_lengths.len() != self.mechs.len() {
            return Err(ValidationError::ProgramCountMismatch {
                mechs: self.mechs.len(),
                programs: self.program_lengths.len(),
            });
        }
        let programs = ProgramSet::from_flat(&self.program_lengths, self.instructions)?;

        if !self.volumes.is_empty() && self.volumes.len() != self.mechs.len() {
            return Err(ValidationError::VolumeCountMismatch {
                mechs: self.mechs.len(),
                volumes: self.volumes.len(),
            });
        }

        let faucets = self
            .faucets
            .unwrap_or_else(|| faucet::classic_faucets(&grid));
        let sinks = self.sinks.unwrap_or_else(|| faucet::classic_sinks(&grid));
        let endpoints = faucets
            .iter()
            .map(|f| f.position)
            .chain(sinks.iter().map(|s| s.position));
        let mut reserved: Vec<Coord> = grid.corners().to_vec();
        for cell in endpoints {
            if !grid.contains(cell) {
                return Err(ValidationError::OutOfBounds { cell });
            }
            if !reserved.contains(&cell) {
                reserved.push(cell);
            }
        }

        check_uniqueness(&self.operator_inputs, &self.operator_outputs)?;
        verify_valid_operators(
            &reserved,
            &self.operator_types,
            &self.operator_inputs,
            &self.operator_outputs,
            grid.max_index(),
        )?;
        let operators = segment_operators(
            &self.operator_types,
            &self.operator_inputs,
            &self.operator_outputs,
        )?;

        let mut execution_order: Vec<usize> = (0..self.mechs.len()).collect();
        execution_order.sort_by_key(|&i| self.mechs[i].id);

        let static_cost = cost::static_cost(
            self.mechs.len(),
            programs.total_instructions(),
            &self.operator_types,
        );

        Ok(Configuration {
            solver: self.solver,
            grid,
            mechs: self.mechs,
            programs,
            execution_order,
            operator_inputs: self.operator_inputs,
            operator_outputs: self.operator_outputs,
            operators,
            faucets,
            sinks,
            volumes: self.volumes,
            static_cost,
        })
    }
}

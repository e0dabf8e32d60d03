//! The frame driver.
//!
//! A [`Simulation`] owns one validated [`Configuration`] and all mutable state
//! of a single run. Each call to [`Simulation::step`] executes one frame in a
//! fixed four-stage order:
//!
//! 1. **Mechs** -- every mech, in ascending id order, executes one
//!    instruction of its looping program.
//! 2. **Operators** -- every operator, in declaration order, fires once if
//!    all its input ports hold the required atoms and all its output ports
//!    are empty.
//! 3. **Faucets** -- every faucet whose schedule permits emits an atom onto
//!    its cell if the cell is empty.
//! 4. **Sinks** -- every sink removes the free atom on its cell, counting it
//!    as delivered or discarded.
//!
//! Before frame 0 every faucet is primed with one atom.

use crate::atom::{AtomLocation, AtomTable};
use crate::config::Configuration;
use crate::cost::{HANDLING_COST, Metrics};
use crate::event::{Event, EventLog};
use crate::faucet::{Faucet, FaucetState, Sink};
use crate::grid::Coord;
use crate::mech::{Mech, MechState, MechStatus};
use crate::operator::OperatorKind;
use crate::program::Instruction;
use crate::record::{FrameRecord, Recording};
use crate::sim::{RunResult, SimState, StateHash, TerminalRecord};
use crate::validation::ValidationError;

/// One run of a configuration.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: Configuration,
    state: SimState,
    /// Mechs in execution order (ascending id).
    mechs: Vec<MechState>,
    atoms: AtomTable,
    faucet_states: Vec<FaucetState>,
    metrics: Metrics,
    events: EventLog,
    recording: Option<Recording>,
}

impl Simulation {
    /// Set up a run: place mechs and prime every faucet.
    pub fn new(config: Configuration) -> Self {
        let mechs = config
            .execution_order()
            .iter()
            .map(|&i| MechState::from_definition(&config.mechs()[i], i))
            .collect();
        let faucet_states = vec![FaucetState::default(); config.faucets().len()];

        let mut sim = Self {
            config,
            state: SimState::new(),
            mechs,
            atoms: AtomTable::new(),
            faucet_states,
            metrics: Metrics::new(),
            events: EventLog::default(),
            recording: None,
        };
        sim.prime_faucets();
        sim
    }

    /// Record a [`FrameRecord`] of the board now and after every frame.
    pub fn with_recording(mut self) -> Self {
        let mut recording = Recording::new();
        recording.push(self.capture());
        self.recording = Some(recording);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Frames executed so far.
    pub fn frame(&self) -> u64 {
        self.state.frame
    }

    /// Mechs in execution order.
    pub fn mechs(&self) -> &[MechState] {
        &self.mechs
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    pub fn take_recording(&mut self) -> Option<Recording> {
        self.recording.take()
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Execute one frame.
    pub fn step(&mut self) {
        let frame = self.state.frame;

        // Stage 1: mechs.
        self.stage_mechs(frame);
        // Stage 2: operators.
        self.stage_operators(frame);
        // Stage 3: faucets.
        self.stage_faucets(frame);
        // Stage 4: sinks.
        self.stage_sinks(frame);

        self.state.frame += 1;

        if self.recording.is_some() {
            let snapshot = self.capture();
            if let Some(recording) = self.recording.as_mut() {
                recording.push(snapshot);
            }
        }
    }

    /// Execute `frames` frames.
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// Final aggregates for the frames executed so far.
    pub fn terminal_record(&self) -> TerminalRecord {
        let mut remaining_by_kind = [0u64; 8];
        let mut remaining_mass = 0;
        for atom in self.atoms.iter() {
            remaining_by_kind[atom.kind.index() as usize] += 1;
            remaining_mass += atom.kind.mass() as u64;
        }
        TerminalRecord {
            frames: self.state.frame,
            delivered: self.metrics.delivered,
            latency: self.metrics.average_latency(),
            dynamic_cost: self.metrics.average_dynamic_cost(),
            latency_total: self.metrics.latency,
            dynamic_cost_total: self.metrics.dynamic_cost,
            discarded: self.metrics.discarded,
            spawned: self.metrics.spawned,
            atoms_remaining: self.atoms.len() as u64,
            remaining_by_kind,
            spawned_mass: self.metrics.spawned_mass,
            delivered_mass: self.metrics.delivered_mass,
            discarded_mass: self.metrics.discarded_mass,
            remaining_mass,
        }
    }

    /// Initial and terminal records of this run.
    pub fn result(&self) -> RunResult {
        RunResult {
            initial: self.config.initial_record(),
            terminal: self.terminal_record(),
        }
    }

    /// Hash of all mutable state.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.state.frame);
        for mech in &self.mechs {
            h.write_u32(mech.id.0);
            h.write_coord(mech.position);
            h.write_u8(mech.status as u8);
            h.write_u64(mech.carrying.map_or(u64::MAX, |a| a.0));
            h.write_u64(mech.cursor as u64);
        }
        for atom in self.atoms.iter() {
            h.write_u64(atom.id.0);
            h.write_u8(atom.kind.index());
            h.write_u64(atom.spawn_frame);
            match atom.location {
                AtomLocation::Floor(cell) => {
                    h.write_u8(0);
                    h.write_coord(cell);
                }
                AtomLocation::Carried(mech) => {
                    h.write_u8(1);
                    h.write_u32(mech.0);
                }
            }
        }
        for fs in &self.faucet_states {
            h.write_u32(fs.emitted);
            h.write_u64(fs.last_emission);
        }
        h.write_u64(self.metrics.delivered);
        h.write_u64(self.metrics.discarded);
        h.write_u64(self.metrics.spawned);
        h.write_u64(self.metrics.dynamic_cost);
        h.write_u64(self.metrics.latency);
        h.finish()
    }

    fn capture(&self) -> FrameRecord {
        FrameRecord::capture(self.state.frame, &self.mechs, &self.atoms)
    }

    // -----------------------------------------------------------------------
    // Priming
    // -----------------------------------------------------------------------

    fn prime_faucets(&mut self) {
        for (faucet, state) in self.config.faucets().iter().zip(&mut self.faucet_states) {
            if state.exhausted(faucet) {
                continue;
            }
            if let Some(atom) = self.atoms.spawn(faucet.kind, faucet.position, 0) {
                state.emitted += 1;
                state.last_emission = 0;
                self.metrics.record_spawn(faucet.kind);
                self.events.emit(Event::AtomEmitted {
                    faucet: faucet.id,
                    atom,
                    kind: faucet.kind,
                    frame: 0,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stage 1: mechs
    // -----------------------------------------------------------------------

    fn stage_mechs(&mut self, frame: u64) {
        for i in 0..self.mechs.len() {
            let mech = &self.mechs[i];
            let instruction = self
                .config
                .programs()
                .instruction_at(mech.program, mech.cursor);

            let advance = match instruction {
                Instruction::Up | Instruction::Left | Instruction::Down | Instruction::Right => {
                    self.move_mech(i, instruction, frame);
                    true
                }
                Instruction::Engage => self.engage(i, false, frame),
                Instruction::EngageWait => self.engage(i, true, frame),
                Instruction::Release => self.release(i, false, frame),
                Instruction::ReleaseWait => self.release(i, true, frame),
                Instruction::Noop => true,
            };

            if advance {
                let len = self.config.programs().lengths()[self.mechs[i].program];
                let mech = &mut self.mechs[i];
                mech.cursor = (mech.cursor + 1) % len;
            }
        }
    }

    fn move_mech(&mut self, i: usize, instruction: Instruction, frame: u64) {
        let Some(dir) = instruction.direction() else {
            return;
        };
        let mech = &mut self.mechs[i];
        match self.config.grid().step(mech.position, dir) {
            Some(to) => mech.position = to,
            None => self.events.emit(Event::MechBlocked {
                mech: mech.id,
                frame,
            }),
        }
    }

    /// Pick up the free atom under mech `i`. Returns whether the cursor
    /// advances.
    fn engage(&mut self, i: usize, wait: bool, frame: u64) -> bool {
        let mech = &mut self.mechs[i];
        if mech.status != MechStatus::Open {
            return true;
        }
        match self.atoms.lift(mech.position, mech.id) {
            Some(atom) => {
                mech.carrying = Some(atom);
                mech.status = MechStatus::Closed;
                self.metrics.charge(HANDLING_COST);
                self.events.emit(Event::AtomEngaged {
                    mech: mech.id,
                    atom,
                    cell: mech.position,
                    frame,
                });
                true
            }
            None if wait => {
                self.events.emit(Event::MechWaiting {
                    mech: mech.id,
                    frame,
                });
                false
            }
            None => true,
        }
    }

    /// Put down the atom held by mech `i`. Returns whether the cursor
    /// advances.
    fn release(&mut self, i: usize, wait: bool, frame: u64) -> bool {
        let mech = &mut self.mechs[i];
        if mech.status != MechStatus::Closed {
            return true;
        }
        let Some(atom) = mech.carrying else {
            // A gripper declared closed with nothing in it just opens.
            mech.status = MechStatus::Open;
            return true;
        };
        if self.atoms.place(atom, mech.position) {
            mech.carrying = None;
            mech.status = MechStatus::Open;
            self.metrics.charge(HANDLING_COST);
            self.events.emit(Event::AtomReleased {
                mech: mech.id,
                atom,
                cell: mech.position,
                frame,
            });
            true
        } else if wait {
            self.events.emit(Event::MechWaiting {
                mech: mech.id,
                frame,
            });
            false
        } else {
            true
        }
    }

    // -----------------------------------------------------------------------
    // Stage 2: operators
    // -----------------------------------------------------------------------

    fn stage_operators(&mut self, frame: u64) {
        for op in self.config.operators() {
            let recipe = op.kind.recipe();
            let inputs_ready = op
                .inputs
                .iter()
                .zip(recipe.inputs)
                .all(|(&cell, &kind)| self.atoms.free_at(cell).is_some_and(|a| a.kind == kind));
            let outputs_clear = op.outputs.iter().all(|&cell| !self.atoms.is_occupied(cell));
            if !inputs_ready || !outputs_clear {
                continue;
            }

            for &cell in &op.inputs {
                self.atoms.remove_free(cell);
            }
            for (&cell, &kind) in op.outputs.iter().zip(recipe.outputs) {
                self.atoms.spawn(kind, cell, frame);
            }
            self.metrics.charge(recipe.dynamic_cost);
            self.events.emit(Event::OperatorFired {
                operator: op.id,
                kind: op.kind,
                frame,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Stage 3: faucets
    // -----------------------------------------------------------------------

    fn stage_faucets(&mut self, frame: u64) {
        for (faucet, state) in self.config.faucets().iter().zip(&mut self.faucet_states) {
            if state.exhausted(faucet) {
                continue;
            }
            if frame + 1 - state.last_emission < faucet.effective_interval() {
                continue;
            }
            let Some(atom) = self.atoms.spawn(faucet.kind, faucet.position, frame) else {
                continue;
            };
            state.emitted += 1;
            state.last_emission = frame + 1;
            self.metrics.record_spawn(faucet.kind);
            self.events.emit(Event::AtomEmitted {
                faucet: faucet.id,
                atom,
                kind: faucet.kind,
                frame,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Stage 4: sinks
    // -----------------------------------------------------------------------

    fn stage_sinks(&mut self, frame: u64) {
        for sink in self.config.sinks() {
            let Some(atom) = self.atoms.remove_free(sink.position) else {
                continue;
            };
            if atom.kind == sink.accepts {
                let latency = self.metrics.record_delivery(frame, atom.kind);
                log::trace!(
                    "frame={frame} sink={} delivered atom={} latency={latency}",
                    sink.id.0,
                    atom.id.0
                );
                self.events.emit(Event::AtomDelivered {
                    sink: sink.id,
                    atom: atom.id,
                    latency,
                    frame,
                });
            } else {
                self.metrics.record_discard(atom.kind);
                self.events.emit(Event::AtomDiscarded {
                    sink: sink.id,
                    atom: atom.id,
                    kind: atom.kind,
                    frame,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// One-shot entry point
// ---------------------------------------------------------------------------

/// Validate a configuration, run it for `frame_count` frames, and report.
///
/// `faucets` and `sinks` default to the classic corner layout when `None`.
/// Any validation failure aborts before frame 0.
#[allow(clippy::too_many_arguments)]
pub fn simulate(
    mechs: &[Mech],
    program_lengths: &[usize],
    programs: &[Instruction],
    operator_inputs: &[Coord],
    operator_outputs: &[Coord],
    operator_types: &[OperatorKind],
    frame_count: u64,
    dimension: u32,
    faucets: Option<&[Faucet]>,
    sinks: Option<&[Sink]>,
    mech_volumes: Option<&[u32]>,
) -> Result<RunResult, ValidationError> {
    let mut builder = Configuration::builder(dimension)
        .mechs(mechs.to_vec())
        .flat_programs(program_lengths.to_vec(), programs.to_vec())
        .operators(
            operator_inputs.to_vec(),
            operator_outputs.to_vec(),
            operator_types.to_vec(),
        );
    if let Some(faucets) = faucets {
        builder = builder.faucets(faucets.to_vec());
    }
    if let Some(sinks) = sinks {
        builder = builder.sinks(sinks.to_vec());
    }
    if let Some(volumes) = mech_volumes {
        builder = builder.volumes(volumes.to_vec());
    }
    Ok(run_configuration(builder.build()?, frame_count))
}

/// Run an already validated configuration for `frame_count` frames.
pub fn run_configuration(config: Configuration, frame_count: u64) -> RunResult {
    let mut sim = Simulation::new(config);
    sim.events_mut().suppress_all();
    sim.run(frame_count);
    let result = sim.result();
    log::debug!(
        "run finished frames={frame_count} delivered={} static_cost={} latency={} dynamic_cost={}",
        result.delivered(),
        result.static_cost(),
        result.latency(),
        result.dynamic_cost()
    );
    result
}

// ===========================================================================
// Tests
// ===========================================================================

//! Simulation state, run reports, and the state hash.

use crate::atom::AtomKind;
use crate::faucet::{Faucet, Sink};
use crate::grid::Coord;
use crate::mech::Mech;
use crate::operator::OperatorKind;
use crate::program::Instruction;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Frame counter of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimState {
    /// Number of frames executed so far. Also the index of the next frame.
    pub frame: u64,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Run reports
// ---------------------------------------------------------------------------

/// Echo of the validated configuration, emitted before frame 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialRecord {
    pub solver: Option<String>,
    pub dimension: u32,
    pub mechs: Vec<Mech>,
    pub program_lengths: Vec<usize>,
    pub instructions: Vec<Instruction>,
    pub operator_inputs: Vec<Coord>,
    pub operator_outputs: Vec<Coord>,
    pub operator_types: Vec<OperatorKind>,
    pub faucets: Vec<Faucet>,
    pub sinks: Vec<Sink>,
    pub volumes: Vec<u32>,
    pub static_cost: u64,
}

/// Aggregates reported after the last frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalRecord {
    pub frames: u64,
    pub delivered: u64,
    /// Mean latency per delivery, fixed point scaled by 1,000,000.
    pub latency: u64,
    /// Mean dynamic cost per delivery, fixed point scaled by 1,000,000.
    pub dynamic_cost: u64,
    pub latency_total: u64,
    pub dynamic_cost_total: u64,
    pub discarded: u64,
    pub spawned: u64,
    /// Atoms still alive when the run ended, free or carried.
    pub atoms_remaining: u64,
    /// Count of remaining atoms per kind, indexed by [`AtomKind::index`].
    pub remaining_by_kind: [u64; 8],
    /// Totals in [`AtomKind::mass`] units. Operators never add mass, so
    /// `delivered_mass + discarded_mass + remaining_mass <= spawned_mass`.
    pub spawned_mass: u64,
    pub delivered_mass: u64,
    pub discarded_mass: u64,
    pub remaining_mass: u64,
}

impl TerminalRecord {
    pub fn remaining(&self, kind: AtomKind) -> u64 {
        self.remaining_by_kind[kind.index() as usize]
    }
}

/// Everything a completed run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub initial: InitialRecord,
    pub terminal: TerminalRecord,
}

impl RunResult {
    pub fn static_cost(&self) -> u64 {
        self.initial.static_cost
    }

    pub fn delivered(&self) -> u64 {
        self.terminal.delivered
    }

    pub fn latency(&self) -> u64 {
        self.terminal.latency
    }

    pub fn dynamic_cost(&self) -> u64 {
        self.terminal.dynamic_cost
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// 64-bit FNV-1a accumulator over run state, used to spot diverging runs.
/// Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    pub fn write_coord(&mut self, c: Coord) {
        self.write(&c.x.to_le_bytes());
        self.write(&c.y.to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

//! Atom sources and sinks.

use crate::atom::AtomKind;
use crate::grid::{Coord, Grid};
use crate::id::{FaucetId, SinkId};
use serde::{Deserialize, Serialize};

fn default_interval() -> u32 {
    1
}

/// Emits atoms of one kind onto a fixed cell.
///
/// A faucet places its first atom before frame 0. After that it emits
/// whenever its cell is free, at most once every `interval` frames, until
/// `limit` atoms have been emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faucet {
    pub id: FaucetId,
    pub kind: AtomKind,
    pub position: Coord,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Faucet {
    /// An unlimited faucet emitting every frame.
    pub fn new(id: u32, kind: AtomKind, position: Coord) -> Self {
        Self {
            id: FaucetId(id),
            kind,
            position,
            interval: 1,
            limit: None,
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Minimum frames between emissions. Zero is treated as one.
    pub fn effective_interval(&self) -> u64 {
        self.interval.max(1) as u64
    }
}

/// Removes atoms from a fixed cell. Atoms of `accepts` count as delivered;
/// anything else is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sink {
    pub id: SinkId,
    pub position: Coord,
    pub accepts: AtomKind,
}

impl Sink {
    pub fn new(id: u32, position: Coord, accepts: AtomKind) -> Self {
        Self {
            id: SinkId(id),
            position,
            accepts,
        }
    }
}

/// Emission bookkeeping for one faucet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaucetState {
    pub emitted: u32,
    /// Frame boundary (`frame + 1`) of the latest emission; 0 for priming.
    pub last_emission: u64,
}

impl FaucetState {
    pub(crate) fn exhausted(&self, faucet: &Faucet) -> bool {
        faucet.limit.is_some_and(|limit| self.emitted >= limit)
    }
}

// ---------------------------------------------------------------------------
// Classic layout
// ---------------------------------------------------------------------------

/// One vanilla faucet on the top-left corner.
pub fn classic_faucets(grid: &Grid) -> Vec<Faucet> {
    let [top_left, ..] = grid.corners();
    vec![Faucet::new(0, AtomKind::Vanilla, top_left)]
}

/// Saffron sinks on the three remaining corners.
pub fn classic_sinks(grid: &Grid) -> Vec<Sink> {
    let [_, top_right, bottom_left, bottom_right] = grid.corners();
    vec![
        Sink::new(0, top_right, AtomKind::Saffron),
        Sink::new(1, bottom_left, AtomKind::Saffron),
        Sink::new(2, bottom_right, AtomKind::Saffron),
    ]
}

//! Mech definitions and per-run mech state.

use crate::grid::Coord;
use crate::id::{AtomId, MechId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Static definition
// ---------------------------------------------------------------------------

/// Mech variants. Only one exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechKind {
    #[default]
    Singleton,
}

/// Gripper state. An open mech may engage an atom; a closed one may release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechStatus {
    #[default]
    Open,
    Closed,
}

/// Opaque caller-supplied tag. Never read by the simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Description(Vec<u8>);

impl Description {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Unpack a tag stored as a big-endian integer, dropping leading zero
    /// bytes. `0` yields an empty description.
    pub fn from_packed(packed: u128) -> Self {
        let bytes = packed.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        Self(bytes[start..].to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tag as text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Text rendering for display only. Invalid UTF-8 is replaced.
    pub fn display(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

/// A mech as declared in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mech {
    pub id: MechId,
    pub kind: MechKind,
    pub status: MechStatus,
    pub position: Coord,
    #[serde(default)]
    pub description: Description,
}

impl Mech {
    /// An open singleton mech with no description.
    pub fn new(id: u32, position: Coord) -> Self {
        Self {
            id: MechId(id),
            kind: MechKind::Singleton,
            status: MechStatus::Open,
            position,
            description: Description::default(),
        }
    }

    pub fn with_status(mut self, status: MechStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }
}

// ---------------------------------------------------------------------------
// Runtime state
// ---------------------------------------------------------------------------

/// Mutable per-run state of one mech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechState {
    pub id: MechId,
    pub position: Coord,
    pub status: MechStatus,
    pub carrying: Option<AtomId>,
    /// Index of the next instruction within the mech's own program.
    pub cursor: usize,
    /// Index of this mech's program in the configuration.
    pub(crate) program: usize,
}

impl MechState {
    pub(crate) fn from_definition(mech: &Mech, program: usize) -> Self {
        Self {
            id: mech.id,
            position: mech.position,
            status: mech.status,
            carrying: None,
            cursor: 0,
            program,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == MechStatus::Open
    }
}

//! Atom kinds, live atom records, and the per-run atom table.

use crate::grid::Coord;
use crate::id::{AtomId, MechId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Atom kinds
// ---------------------------------------------------------------------------

/// The eight kinds of atom. Discriminants are the wire indices used by
/// solution files and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AtomKind {
    Vanilla = 0,
    Hazelnut = 1,
    Chocolate = 2,
    Truffle = 3,
    Saffron = 4,
    Turtle = 5,
    Sandglass = 6,
    Wilted = 7,
}

impl AtomKind {
    pub const ALL: [AtomKind; 8] = [
        AtomKind::Vanilla,
        AtomKind::Hazelnut,
        AtomKind::Chocolate,
        AtomKind::Truffle,
        AtomKind::Saffron,
        AtomKind::Turtle,
        AtomKind::Sandglass,
        AtomKind::Wilted,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Vanilla-equivalent mass. No operator produces more mass than it
    /// consumes, so a board fed only vanilla can never deliver more atoms
    /// than its faucets emitted.
    pub fn mass(self) -> u32 {
        match self {
            AtomKind::Vanilla => 1,
            AtomKind::Hazelnut => 2,
            AtomKind::Chocolate => 4,
            AtomKind::Truffle => 9,
            AtomKind::Saffron => 5,
            AtomKind::Turtle | AtomKind::Sandglass | AtomKind::Wilted => 7,
        }
    }

    /// Single-character glyph for board dumps.
    pub fn glyph(self) -> char {
        match self {
            AtomKind::Vanilla => 'v',
            AtomKind::Hazelnut => 'h',
            AtomKind::Chocolate => 'c',
            AtomKind::Truffle => 't',
            AtomKind::Saffron => 's',
            AtomKind::Turtle => 'u',
            AtomKind::Sandglass => 'g',
            AtomKind::Wilted => 'w',
        }
    }
}

// ---------------------------------------------------------------------------
// Atom
// ---------------------------------------------------------------------------

/// Where an atom currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomLocation {
    /// Lying free on a cell.
    Floor(Coord),
    /// Held by a mech; moves with it.
    Carried(MechId),
}

/// A live atom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub id: AtomId,
    pub kind: AtomKind,
    /// Frame in which the atom was created by a faucet or an operator.
    pub spawn_frame: u64,
    pub location: AtomLocation,
}

impl Atom {
    pub fn is_free(&self) -> bool {
        matches!(self.location, AtomLocation::Floor(_))
    }
}

// ---------------------------------------------------------------------------
// AtomTable
// ---------------------------------------------------------------------------

/// Every live atom of a run, plus an index of free atoms by cell.
///
/// A cell holds at most one free atom. Carried atoms are not in the floor
/// index. Ids are handed out in spawn order starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomTable {
    atoms: BTreeMap<AtomId, Atom>,
    floor: BTreeMap<Coord, AtomId>,
    next_id: AtomId,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a free atom on `cell`. Returns `None` if the cell is taken.
    pub fn spawn(&mut self, kind: AtomKind, cell: Coord, frame: u64) -> Option<AtomId> {
        if self.floor.contains_key(&cell) {
            return None;
        }
        let id = self.next_id;
        self.next_id = id.next();
        self.atoms.insert(
            id,
            Atom {
                id,
                kind,
                spawn_frame: frame,
                location: AtomLocation::Floor(cell),
            },
        );
        self.floor.insert(cell, id);
        Some(id)
    }

    /// The free atom lying on `cell`.
    pub fn free_at(&self, cell: Coord) -> Option<&Atom> {
        self.floor.get(&cell).and_then(|id| self.atoms.get(id))
    }

    pub fn is_occupied(&self, cell: Coord) -> bool {
        self.floor.contains_key(&cell)
    }

    /// Hand the free atom on `cell` to `mech`.
    pub fn lift(&mut self, cell: Coord, mech: MechId) -> Option<AtomId> {
        let id = self.floor.remove(&cell)?;
        if let Some(atom) = self.atoms.get_mut(&id) {
            atom.location = AtomLocation::Carried(mech);
        }
        Some(id)
    }

    /// Put a carried atom down on `cell`. Fails if the cell is taken or the
    /// atom is unknown.
    pub fn place(&mut self, id: AtomId, cell: Coord) -> bool {
        if self.floor.contains_key(&cell) {
            return false;
        }
        let Some(atom) = self.atoms.get_mut(&id) else {
            return false;
        };
        atom.location = AtomLocation::Floor(cell);
        self.floor.insert(cell, id);
        true
    }

    /// Remove the free atom on `cell` from the world.
    pub fn remove_free(&mut self, cell: Coord) -> Option<Atom> {
        let id = self.floor.remove(&cell)?;
        self.atoms.remove(&id)
    }

    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(&id)
    }

    /// Live atoms in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.values()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Id the next spawned atom will receive.
    pub fn next_id(&self) -> AtomId {
        self.next_id
    }
}

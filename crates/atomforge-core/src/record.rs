//! Per-frame recordings of a run, for replay and visualisation.
//!
//! A [`Recording`] exports as `{"frames":[{"mechs":[...],"atoms":[...]}]}`.
//! Recordings are never read back by the engine.

use crate::atom::{AtomKind, AtomLocation, AtomTable};
use crate::grid::{Coord, Grid};
use crate::id::{AtomId, MechId};
use crate::mech::{MechState, MechStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A mech as seen at the end of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechSnapshot {
    pub id: MechId,
    pub position: Coord,
    pub status: MechStatus,
    pub carrying: Option<AtomId>,
}

/// An atom as seen at the end of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomSnapshot {
    pub id: AtomId,
    pub kind: AtomKind,
    pub position: Coord,
    /// Set while a mech holds the atom.
    pub carried_by: Option<MechId>,
}

/// Board contents after a frame. Frame 0 is the primed board before any
/// frame has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: u64,
    pub mechs: Vec<MechSnapshot>,
    pub atoms: Vec<AtomSnapshot>,
}

impl FrameRecord {
    pub(crate) fn capture(frame: u64, mechs: &[MechState], atoms: &AtomTable) -> Self {
        let positions: BTreeMap<MechId, Coord> = mechs.iter().map(|m| (m.id, m.position)).collect();

        let mechs = mechs
            .iter()
            .map(|m| MechSnapshot {
                id: m.id,
                position: m.position,
                status: m.status,
                carrying: m.carrying,
            })
            .collect();

        let atoms = atoms
            .iter()
            .filter_map(|atom| {
                let (position, carried_by) = match atom.location {
                    AtomLocation::Floor(cell) => (cell, None),
                    AtomLocation::Carried(mech) => (*positions.get(&mech)?, Some(mech)),
                };
                Some(AtomSnapshot {
                    id: atom.id,
                    kind: atom.kind,
                    position,
                    carried_by,
                })
            })
            .collect();

        Self {
            frame,
            mechs,
            atoms,
        }
    }

    /// ASCII dump of the board, one row per line. Free atoms show their
    /// kind glyph; cells holding a mech show `M` (or `m` when it carries);
    /// empty cells show `.`.
    pub fn board(&self, grid: &Grid) -> String {
        let side = grid.side() as usize;
        let mut rows = vec![vec!['.'; side]; side];
        let mut put = |c: Coord, ch: char| {
            if grid.contains(c) {
                rows[c.y as usize][c.x as usize] = ch;
            }
        };
        for atom in self.atoms.iter().filter(|a| a.carried_by.is_none()) {
            put(atom.position, atom.kind.glyph());
        }
        for mech in &self.mechs {
            put(mech.position, if mech.carrying.is_some() { 'm' } else { 'M' });
        }
        rows.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Every frame of a run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub frames: Vec<FrameRecord>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: FrameRecord) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mech::{Mech, MechState};

    fn sample() -> (Vec<MechState>, AtomTable) {
        let mechs = vec![
            MechState::from_definition(&Mech::new(0, Coord::new(1, 0)), 0),
            MechState::from_definition(&Mech::new(1, Coord::new(2, 2)), 1),
        ];
        let mut atoms = AtomTable::new();
        atoms.spawn(AtomKind::Vanilla, Coord::new(0, 0), 0);
        atoms.spawn(AtomKind::Saffron, Coord::new(2, 2), 0);
        (mechs, atoms)
    }

    #[test]
    fn capture_places_carried_atoms_on_their_mech() {
        let (mut mechs, mut atoms) = sample();
        let lifted = atoms.lift(Coord::new(2, 2), MechId(1)).unwrap();
        mechs[1].carrying = Some(lifted);
        mechs[1].position = Coord::new(3, 2);

        let frame = FrameRecord::capture(4, &mechs, &atoms);
        assert_eq!(frame.frame, 4);
        assert_eq!(frame.mechs.len(), 2);
        let carried = frame.atoms.iter().find(|a| a.id == lifted).unwrap();
        assert_eq!(carried.position, Coord::new(3, 2));
        assert_eq!(carried.carried_by, Some(MechId(1)));
    }

    #[test]
    fn board_renders_atoms_and_mechs() {
        let (mechs, atoms) = sample();
        let frame = FrameRecord::capture(0, &mechs, &atoms);
        let board = frame.board(&Grid::new(3));
        assert_eq!(board, "vM.\n...\n..M");
    }

    #[test]
    fn json_has_frames_mechs_atoms_shape() {
        let (mechs, atoms) = sample();
        let mut rec = Recording::new();
        rec.push(FrameRecord::capture(0, &mechs, &atoms));
        let value: serde_json::Value = serde_json::from_str(&rec.to_json().unwrap()).unwrap();
        let frames = value["frames"].as_array().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["mechs"].as_array().unwrap().len(), 2);
        assert_eq!(frames[0]["atoms"].as_array().unwrap().len(), 2);
        assert_eq!(frames[0]["atoms"][0]["kind"], "Vanilla");
        assert_eq!(frames[0]["mechs"][0]["position"]["x"], 1);
    }

    #[test]
    fn json_reads_back() {
        let (mechs, atoms) = sample();
        let mut rec = Recording::new();
        rec.push(FrameRecord::capture(0, &mechs, &atoms));
        let back = Recording::from_json(&rec.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, rec);
    }
}

//! Serde structs for solution files.
//!
//! A solution file describes one factory: its mechs, their programs, the
//! operator layout, and optionally faucets, sinks, grid side, and frame
//! count. The layout follows the long-standing JSON solution format:
//!
//! ```json
//! {
//!   "mechs": [{"id": "mech0", "typ": "SINGLETON", "status": "open",
//!              "index": {"x": 0, "y": 0}}],
//!   "operators": [{"input": [{"x": 1, "y": 0}, {"x": 2, "y": 0}],
//!                  "output": [{"x": 3, "y": 0}], "typ": {"symbol": "&"}}],
//!   "programs": ["Z,D,X,A"]
//! }
//! ```
//!
//! The same structure loads from RON and TOML. The loader resolves these
//! structs into a validated `Configuration`.

use atomforge_core::atom::AtomKind;
use serde::{Deserialize, Serialize};

/// Grid side used when a file does not name one.
pub const DEFAULT_DIMENSION: u32 = 8;

/// Frame count used when a file does not name one.
pub const DEFAULT_FRAMES: u64 = 80;

// ===========================================================================
// Solution
// ===========================================================================

/// A whole solution file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,
    #[serde(default = "default_dimension")]
    pub dimension: u32,
    #[serde(default = "default_frames")]
    pub frames: u64,
    pub mechs: Vec<MechData>,
    /// One program per mech, in mech order.
    pub programs: Vec<String>,
    #[serde(default)]
    pub operators: Vec<OperatorData>,
    /// Absent means the classic layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faucets: Option<Vec<FaucetData>>,
    /// Absent means the classic layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinks: Option<Vec<SinkData>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<u32>,
}

fn default_dimension() -> u32 {
    DEFAULT_DIMENSION
}

fn default_frames() -> u64 {
    DEFAULT_FRAMES
}

// ===========================================================================
// Mechs
// ===========================================================================

/// A mech entry. `id` carries the numeric id in its trailing digits
/// (`"mech12"` is mech 12).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechData {
    pub id: String,
    #[serde(default = "default_typ")]
    pub typ: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub index: CoordData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw tag bytes, for tags that are not valid UTF-8. Takes precedence
    /// over `description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_bytes: Option<Vec<u8>>,
}

fn default_typ() -> String {
    "SINGLETON".to_string()
}

fn default_status() -> String {
    "open".to_string()
}

/// A grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordData {
    pub x: i32,
    pub y: i32,
}

// ===========================================================================
// Operators
// ===========================================================================

/// An operator entry: its ports and its type symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorData {
    pub input: Vec<CoordData>,
    pub output: Vec<CoordData>,
    pub typ: OperatorTypeData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorTypeData {
    pub symbol: String,
}

// ===========================================================================
// Faucets and sinks
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaucetData {
    pub kind: AtomKind,
    pub position: CoordData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkData {
    pub position: CoordData,
    pub accepts: AtomKind,
}

//! Operator kinds and placed operators.
//!
//! Dispatch is a fixed lookup table keyed by [`OperatorKind`]: each entry
//! lists the atom kind required on every input port, the kind produced on
//! every output port, and the static and per-application costs.

use crate::atom::AtomKind;
use crate::grid::Coord;
use crate::id::OperatorId;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};

use AtomKind::*;

// ---------------------------------------------------------------------------
// Recipe table
// ---------------------------------------------------------------------------

/// Transform rule for one operator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    /// Required atom kind per input port, in port order.
    pub inputs: &'static [AtomKind],
    /// Produced atom kind per output port, in port order.
    pub outputs: &'static [AtomKind],
    /// Cost of placing the operator, charged once per configuration.
    pub static_cost: u64,
    /// Cost charged each time the operator fires.
    pub dynamic_cost: u64,
}

const RECIPES: [Recipe; 8] = [
    // Stir
    Recipe {
        inputs: &[Vanilla, Vanilla],
        outputs: &[Hazelnut],
        static_cost: 250,
        dynamic_cost: 25,
    },
    // Shake
    Recipe {
        inputs: &[Hazelnut, Hazelnut],
        outputs: &[Chocolate],
        static_cost: 500,
        dynamic_cost: 50,
    },
    // Steam
    Recipe {
        inputs: &[Hazelnut, Chocolate, Chocolate],
        outputs: &[Truffle, Vanilla],
        static_cost: 750,
        dynamic_cost: 325,
    },
    // Smash
    Recipe {
        inputs: &[Truffle],
        outputs: &[Vanilla, Vanilla, Vanilla, Vanilla, Saffron],
        static_cost: 1000,
        dynamic_cost: 2250,
    },
    // Evolve
    Recipe {
        inputs: &[Vanilla, Vanilla, Saffron],
        outputs: &[Turtle],
        static_cost: 1250,
        dynamic_cost: 400,
    },
    // Slow
    Recipe {
        inputs: &[Turtle],
        outputs: &[Sandglass],
        static_cost: 1500,
        dynamic_cost: 150,
    },
    // Wilt
    Recipe {
        inputs: &[Sandglass],
        outputs: &[Wilted],
        static_cost: 1750,
        dynamic_cost: 100,
    },
    // Bake
    Recipe {
        inputs: &[Wilted, Chocolate],
        outputs: &[Saffron, Saffron],
        static_cost: 2000,
        dynamic_cost: 600,
    },
];

// ---------------------------------------------------------------------------
// OperatorKind
// ---------------------------------------------------------------------------

/// The eight operator types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    Stir = 0,
    Shake = 1,
    Steam = 2,
    Smash = 3,
    Evolve = 4,
    Slow = 5,
    Wilt = 6,
    Bake = 7,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 8] = [
        OperatorKind::Stir,
        OperatorKind::Shake,
        OperatorKind::Steam,
        OperatorKind::Smash,
        OperatorKind::Evolve,
        OperatorKind::Slow,
        OperatorKind::Wilt,
        OperatorKind::Bake,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn recipe(self) -> &'static Recipe {
        &RECIPES[self as usize]
    }

    pub fn input_arity(self) -> usize {
        self.recipe().inputs.len()
    }

    pub fn output_arity(self) -> usize {
        self.recipe().outputs.len()
    }

    /// Symbol used by solution files.
    pub fn symbol(self) -> char {
        match self {
            OperatorKind::Stir => '&',
            OperatorKind::Shake => '%',
            OperatorKind::Steam => '^',
            OperatorKind::Smash => '#',
            OperatorKind::Evolve => '§',
            OperatorKind::Slow => '|',
            OperatorKind::Wilt => '~',
            OperatorKind::Bake => '!',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.symbol() == symbol)
    }
}

// ---------------------------------------------------------------------------
// Placed operator
// ---------------------------------------------------------------------------

/// An operator placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
    pub kind: OperatorKind,
    pub inputs: Vec<Coord>,
    pub outputs: Vec<Coord>,
}

impl Operator {
    /// Every cell the operator occupies, inputs first.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).copied()
    }
}

/// Split flattened port lists into one [`Operator`] per entry of `kinds`,
/// consuming as many cells as each kind's arity requires.
pub fn segment_operators(
    kinds: &[OperatorKind],
    inputs: &[Coord],
    outputs: &[Coord],
) -> Result<Vec<Operator>, ValidationError> {
    let expected_inputs: usize = kinds.iter().map(|k| k.input_arity()).sum();
    let expected_outputs: usize = kinds.iter().map(|k| k.output_arity()).sum();
    if expected_inputs != inputs.len() || expected_outputs != outputs.len() {
        return Err(ValidationError::ArityMismatch {
            expected_inputs,
            found_inputs: inputs.len(),
            expected_outputs,
            found_outputs: outputs.len(),
        });
    }

    let mut operators = Vec::with_capacity(kinds.len());
    let (mut i, mut o) = (0, 0);
    for (index, &kind) in kinds.iter().enumerate() {
        let (ni, no) = (kind.input_arity(), kind.output_arity());
        operators.push(Operator {
            id: OperatorId(index as u32),
            kind,
            inputs: inputs[i..i + ni].to_vec(),
            outputs: outputs[o..o + no].to_vec(),
        });
        i += ni;
        o += no;
    }
    Ok(operators)
}

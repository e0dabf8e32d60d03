//! Mech instruction alphabet and program storage.
//!
//! All programs of a configuration live in one flattened buffer with a
//! per-mech length table. A mech executes exactly one instruction per frame
//! and wraps to the start of its program after the last one.

use crate::grid::Direction;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// One step of a mech program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// `W`
    Up,
    /// `A`
    Left,
    /// `S`
    Down,
    /// `D`
    Right,
    /// `Z`: pick up the free atom on the mech's cell, if any.
    Engage,
    /// `X`: drop the carried atom on the mech's cell, if the cell is free.
    Release,
    /// `G`: like [`Instruction::Engage`], but wait on an empty cell.
    EngageWait,
    /// `H`: like [`Instruction::Release`], but wait on an occupied cell.
    ReleaseWait,
    /// `_`
    Noop,
}

impl Instruction {
    pub const ALL: [Instruction; 9] = [
        Instruction::Up,
        Instruction::Left,
        Instruction::Down,
        Instruction::Right,
        Instruction::Engage,
        Instruction::Release,
        Instruction::EngageWait,
        Instruction::ReleaseWait,
        Instruction::Noop,
    ];

    pub fn symbol(self) -> char {
        match self {
            Instruction::Up => 'W',
            Instruction::Left => 'A',
            Instruction::Down => 'S',
            Instruction::Right => 'D',
            Instruction::Engage => 'Z',
            Instruction::Release => 'X',
            Instruction::EngageWait => 'G',
            Instruction::ReleaseWait => 'H',
            Instruction::Noop => '_',
        }
    }

    /// Parse a single symbol. `.` is accepted as an alias for the no-op.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Instruction::Noop),
            s => Self::ALL.into_iter().find(|i| i.symbol() == s),
        }
    }

    /// The movement direction, for the four movement instructions.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Instruction::Up => Some(Direction::Up),
            Instruction::Left => Some(Direction::Left),
            Instruction::Down => Some(Direction::Down),
            Instruction::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Parse a program written as comma-separated symbols (`"Z,D,X,A"`).
/// Without commas, every non-whitespace character is one instruction.
pub fn parse_program(text: &str) -> Result<Vec<Instruction>, ValidationError> {
    let parse_token = |token: &str| {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Instruction::from_symbol(c).ok_or_else(|| ValidationError::InvalidInstruction {
                    symbol: token.to_string(),
                })
            }
            _ => Err(ValidationError::InvalidInstruction {
                symbol: token.to_string(),
            }),
        }
    };

    if text.contains(',') {
        text.split(',').map(str::trim).map(parse_token).collect()
    } else {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                Instruction::from_symbol(c).ok_or_else(|| ValidationError::InvalidInstruction {
                    symbol: c.to_string(),
                })
            })
            .collect()
    }
}

/// Render a program in the comma-separated form accepted by [`parse_program`].
pub fn format_program(program: &[Instruction]) -> String {
    let symbols: Vec<String> = program.iter().map(|i| i.symbol().to_string()).collect();
    symbols.join(",")
}

// ---------------------------------------------------------------------------
// ProgramSet
// ---------------------------------------------------------------------------

/// Every mech program of a configuration, stored flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSet {
    instructions: Vec<Instruction>,
    lengths: Vec<usize>,
    offsets: Vec<usize>,
}

impl ProgramSet {
    /// Build from a flattened buffer and a length per program. The lengths
    /// must be non-zero and sum to the buffer length.
    pub fn from_flat(
        lengths: &[usize],
        instructions: Vec<Instruction>,
    ) -> Result<Self, ValidationError> {
        if let Some(index) = lengths.iter().position(|&l| l == 0) {
            return Err(ValidationError::EmptyProgram { index });
        }
        let declared: usize = lengths.iter().sum();
        if declared != instructions.len() {
            return Err(ValidationError::ProgramLengthMismatch {
                declared,
                actual: instructions.len(),
            });
        }

        let mut offsets = Vec::with_capacity(lengths.len());
        let mut at = 0;
        for &len in lengths {
            offsets.push(at);
            at += len;
        }

        Ok(Self {
            instructions,
            lengths: lengths.to_vec(),
            offsets,
        })
    }

    /// Number of programs.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// The instructions of program `index`.
    pub fn program(&self, index: usize) -> &[Instruction] {
        let start = self.offsets[index];
        &self.instructions[start..start + self.lengths[index]]
    }

    /// Instruction `cursor` of program `index`, wrapping past the end.
    pub fn instruction_at(&self, index: usize, cursor: usize) -> Instruction {
        let len = self.lengths[index];
        self.instructions[self.offsets[index] + cursor % len]
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// The flattened instruction buffer.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn total_instructions(&self) -> usize {
        self.instructions.len()
    }
}

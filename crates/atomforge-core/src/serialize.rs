//! Binary encoding of run results and recordings.
//!
//! Both payloads are encoded with `bitcode` behind a versioned header so a
//! reader can reject foreign or newer data before trusting the payload.

use crate::record::Recording;
use crate::sim::RunResult;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying an encoded [`RunResult`].
pub const RESULT_MAGIC: u32 = 0xA70F_0001;

/// Magic number identifying an encoded [`Recording`].
pub const RECORDING_MAGIC: u32 = 0xA70F_0002;

/// Wire format version written into every header.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure to encode a payload.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Reasons an encoded payload is refused.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{expected:08X}, got 0x{found:08X}")]
    InvalidMagic { expected: u32, found: u32 },
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("data from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header prepended to every encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadHeader {
    pub magic: u32,
    pub version: u32,
    /// Frames covered by the payload.
    pub frames: u64,
}

impl PayloadHeader {
    pub fn new(magic: u32, frames: u64) -> Self {
        Self {
            magic,
            version: FORMAT_VERSION,
            frames,
        }
    }

    /// Check the header against the magic the caller expects.
    pub fn validate(&self, expected_magic: u32) -> Result<(), DeserializeError> {
        if self.magic != expected_magic {
            return Err(DeserializeError::InvalidMagic {
                expected: expected_magic,
                found: self.magic,
            });
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    header: PayloadHeader,
    payload: T,
}

fn encode<T: Serialize>(header: PayloadHeader, payload: &T) -> Result<Vec<u8>, SerializeError> {
    #[derive(Serialize)]
    struct EnvelopeRef<'a, T> {
        header: PayloadHeader,
        payload: &'a T,
    }
    bitcode::serialize(&EnvelopeRef { header, payload })
        .map_err(|e| SerializeError::Encode(e.to_string()))
}

fn decode<T>(data: &[u8], expected_magic: u32) -> Result<T, DeserializeError>
where
    T: for<'de> Deserialize<'de>,
{
    let envelope: Envelope<T> =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    envelope.header.validate(expected_magic)?;
    Ok(envelope.payload)
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

impl RunResult {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        encode(
            PayloadHeader::new(RESULT_MAGIC, self.terminal.frames),
            self,
        )
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DeserializeError> {
        decode(data, RESULT_MAGIC)
    }
}

impl Recording {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        let frames = self.frames.last().map_or(0, |f| f.frame);
        encode(PayloadHeader::new(RECORDING_MAGIC, frames), self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DeserializeError> {
        decode(data, RECORDING_MAGIC)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Simulation, run_configuration};
    use crate::test_utils::*;

    #[test]
    fn result_survives_encoding() {
        let result = run_configuration(scenario_one(), 30);
        let data = result.to_bytes().unwrap();
        assert_eq!(RunResult::from_bytes(&data).unwrap(), result);
    }

    #[test]
    fn recording_survives_encoding() {
        let mut sim = Simulation::new(scenario_two()).with_recording();
        sim.run(5);
        let rec = sim.take_recording().unwrap();
        let back = Recording::from_bytes(&rec.to_bytes().unwrap()).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn result_bytes_are_not_a_recording() {
        let data = run_configuration(scenario_one(), 3).to_bytes().unwrap();
        // Same envelope layout, different payload: either the payload fails
        // to decode or the magic check rejects it.
        assert!(Recording::from_bytes(&data).is_err());
    }

    #[test]
    fn header_rejects_wrong_magic() {
        let header = PayloadHeader::new(0xDEAD_BEEF, 0);
        assert!(matches!(
            header.validate(RESULT_MAGIC),
            Err(DeserializeError::InvalidMagic {
                expected: RESULT_MAGIC,
                found: 0xDEAD_BEEF
            })
        ));
    }

    #[test]
    fn header_rejects_future_and_old_versions() {
        let future = PayloadHeader {
            magic: RESULT_MAGIC,
            version: FORMAT_VERSION + 1,
            frames: 0,
        };
        assert!(matches!(
            future.validate(RESULT_MAGIC),
            Err(DeserializeError::FutureVersion(v)) if v == FORMAT_VERSION + 1
        ));
        let old = PayloadHeader {
            magic: RESULT_MAGIC,
            version: 0,
            frames: 0,
        };
        assert!(matches!(
            old.validate(RESULT_MAGIC),
            Err(DeserializeError::UnsupportedVersion(0))
        ));
    }

    #[test]
    fn future_version_payload_is_rejected() {
        let result = run_configuration(scenario_one(), 3);
        let header = PayloadHeader {
            magic: RESULT_MAGIC,
            version: FORMAT_VERSION + 1,
            frames: 3,
        };
        let data = encode(header, &result).unwrap();
        assert!(matches!(
            RunResult::from_bytes(&data),
            Err(DeserializeError::FutureVersion(_))
        ));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        match RunResult::from_bytes(&[0u8; 10]) {
            Err(DeserializeError::Decode(_)) => {}
            other => panic!("expected Decode error, got {other:?}"),
        }
    }
}

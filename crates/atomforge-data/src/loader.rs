//! Resolution pipeline: reads solution files and builds a validated
//! `Configuration`.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! (de)serialization helpers, plus the conversion from [`SolutionData`] into
//! engine types and back.

use crate::schema::{
    CoordData, FaucetData, MechData, OperatorData, OperatorTypeData, SinkData, SolutionData,
};
use atomforge_core::config::Configuration;
use atomforge_core::faucet::{Faucet, Sink};
use atomforge_core::grid::Coord;
use atomforge_core::mech::{Description, Mech, MechStatus};
use atomforge_core::operator::OperatorKind;
use atomforge_core::program::{Instruction, format_program, parse_program};
use atomforge_core::validation::ValidationError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading or writing a solution.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// No solution file with the requested base name exists.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// Extension other than `.json`, `.ron` or `.toml`.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same solution exists in more than one format.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// The file is not well-formed in its format.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A serialization error occurred.
    #[error("could not write {format:?}: {detail}")]
    Write { format: Format, detail: String },

    /// A mech id carries no trailing number.
    #[error("mech id '{id}' in {file} has no numeric suffix")]
    InvalidMechId { file: PathBuf, id: String },

    #[error("unknown mech type '{typ}' in {file}")]
    UnknownMechType { file: PathBuf, typ: String },

    #[error("unknown mech status '{status}' in {file}")]
    UnknownMechStatus { file: PathBuf, status: String },

    #[error("unknown operator symbol '{symbol}' in {file}")]
    UnknownOperator { file: PathBuf, symbol: String },

    /// The file parsed but describes an invalid configuration.
    #[error("invalid solution in {file}: {source}")]
    Invalid {
        file: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Solution file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Format implied by `path`'s extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find `{base_name}.ron`, `.toml` or `.json` in `dir`. Having more than one
/// of them is an error; having none is `Ok(None)`.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// [`find_data_file`] that treats absence as an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// (De)serialization
// ===========================================================================

/// Deserialize `content` in the given format. `file` only labels errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read `path` and parse it in the format its extension names.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Render a solution in the given format.
pub fn serialize_solution(data: &SolutionData, format: Format) -> Result<String, DataLoadError> {
    let write_error = |detail: String| DataLoadError::Write { format, detail };
    match format {
        Format::Ron => ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())
            .map_err(|e| write_error(e.to_string())),
        Format::Json => {
            serde_json::to_string_pretty(data).map_err(|e| write_error(e.to_string()))
        }
        Format::Toml => toml::to_string(data).map_err(|e| write_error(e.to_string())),
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

/// A loaded solution: the validated configuration and how long to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub config: Configuration,
    pub frames: u64,
}

/// Load and validate a solution file.
pub fn load_solution(path: &Path) -> Result<Solution, DataLoadError> {
    let data: SolutionData = deserialize_file(path)?;
    let solution = resolve_solution(data, path)?;
    log::debug!(
        "loaded {} with {} mechs and {} operators",
        path.display(),
        solution.config.mechs().len(),
        solution.config.operators().len()
    );
    Ok(solution)
}

/// Load `{base_name}.{ron,toml,json}` from `dir`.
pub fn load_solution_from_dir(dir: &Path, base_name: &str) -> Result<Solution, DataLoadError> {
    load_solution(&require_data_file(dir, base_name)?)
}

/// Write a configuration as a solution file; the format follows the extension.
pub fn write_solution(
    path: &Path,
    config: &Configuration,
    frames: u64,
) -> Result<(), DataLoadError> {
    let format = detect_format(path)?;
    let text = serialize_solution(&export_solution(config, frames), format)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Resolve parsed file contents into a validated [`Solution`].
pub fn resolve_solution(data: SolutionData, file: &Path) -> Result<Solution, DataLoadError> {
    let mechs = data
        .mechs
        .iter()
        .map(|m| resolve_mech(m, file))
        .collect::<Result<Vec<_>, _>>()?;

    let invalid = |source: ValidationError| DataLoadError::Invalid {
        file: file.to_path_buf(),
        source,
    };
    let programs = data
        .programs
        .iter()
        .map(|p| parse_program(&p.to_uppercase()))
        .collect::<Result<Vec<Vec<Instruction>>, _>>()
        .map_err(invalid)?;

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut kinds = Vec::with_capacity(data.operators.len());
    for op in &data.operators {
        inputs.extend(op.input.iter().copied().map(coord));
        outputs.extend(op.output.iter().copied().map(coord));
        kinds.push(resolve_operator_kind(&op.typ.symbol, file)?);
    }

    let mut builder = Configuration::builder(data.dimension)
        .mechs(mechs)
        .programs(programs)
        .operators(inputs, outputs, kinds)
        .volumes(data.volumes);
    if let Some(solver) = data.solver {
        builder = builder.solver(solver);
    }
    if let Some(faucets) = data.faucets {
        builder = builder.faucets(
            faucets
                .into_iter()
                .enumerate()
                .map(|(i, f)| resolve_faucet(i, f))
                .collect(),
        );
    }
    if let Some(sinks) = data.sinks {
        builder = builder.sinks(
            sinks
                .into_iter()
                .enumerate()
                .map(|(i, s)| Sink::new(i as u32, coord(s.position), s.accepts))
                .collect(),
        );
    }

    let config = builder.build().map_err(invalid)?;
    Ok(Solution {
        config,
        frames: data.frames,
    })
}

fn coord(c: CoordData) -> Coord {
    Coord::new(c.x, c.y)
}

/// The number formed by the trailing decimal digits of `id`.
fn parse_mech_id(id: &str) -> Option<u32> {
    let stem = id.trim_end_matches(|c: char| c.is_ascii_digit());
    id[stem.len()..].parse().ok()
}

fn resolve_mech(data: &MechData, file: &Path) -> Result<Mech, DataLoadError> {
    let id = parse_mech_id(&data.id).ok_or_else(|| DataLoadError::InvalidMechId {
        file: file.to_path_buf(),
        id: data.id.clone(),
    })?;
    if !data.typ.eq_ignore_ascii_case("singleton") {
        return Err(DataLoadError::UnknownMechType {
            file: file.to_path_buf(),
            typ: data.typ.clone(),
        });
    }
    let status = match data.status.to_ascii_lowercase().as_str() {
        "open" => MechStatus::Open,
        "close" | "closed" => MechStatus::Closed,
        _ => {
            return Err(DataLoadError::UnknownMechStatus {
                file: file.to_path_buf(),
                status: data.status.clone(),
            });
        }
    };

    let mut mech = Mech::new(id, coord(data.index)).with_status(status);
    if let Some(bytes) = &data.description_bytes {
        mech = mech.with_description(Description::new(bytes.clone()));
    } else if let Some(text) = &data.description {
        mech = mech.with_description(Description::new(text.as_bytes()));
    }
    Ok(mech)
}

fn resolve_operator_kind(symbol: &str, file: &Path) -> Result<OperatorKind, DataLoadError> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => OperatorKind::from_symbol(c),
        _ => None,
    }
    .ok_or_else(|| DataLoadError::UnknownOperator {
        file: file.to_path_buf(),
        symbol: symbol.to_string(),
    })
}

fn resolve_faucet(index: usize, data: FaucetData) -> Faucet {
    let mut faucet = Faucet::new(index as u32, data.kind, coord(data.position));
    if let Some(interval) = data.interval {
        faucet = faucet.with_interval(interval);
    }
    if let Some(limit) = data.limit {
        faucet = faucet.with_limit(limit);
    }
    faucet
}

// ===========================================================================
// Export
// ===========================================================================

fn coord_data(c: Coord) -> CoordData {
    CoordData { x: c.x, y: c.y }
}

/// Text when the tag is UTF-8, raw bytes otherwise; nothing when empty.
fn export_description(description: &Description) -> (Option<String>, Option<Vec<u8>>) {
    if description.is_empty() {
        return (None, None);
    }
    match description.as_text() {
        Some(text) => (Some(text.to_string()), None),
        None => (None, Some(description.as_bytes().to_vec())),
    }
}

/// Describe a configuration as solution file contents. Faucets and sinks
/// are always written out explicitly.
pub fn export_solution(config: &Configuration, frames: u64) -> SolutionData {
    let mechs = config
        .mechs()
        .iter()
        .map(|m| {
            let (description, description_bytes) = export_description(&m.description);
            MechData {
                id: format!("mech{}", m.id.0),
                typ: "SINGLETON".to_string(),
                status: match m.status {
                    MechStatus::Open => "open",
                    MechStatus::Closed => "close",
                }
                .to_string(),
                index: coord_data(m.position),
                description,
                description_bytes,
            }
        })
        .collect();

    let programs = (0..config.programs().len())
        .map(|i| format_program(config.programs().program(i)))
        .collect();

    let operators = config
        .operators()
        .iter()
        .map(|op| OperatorData {
            input: op.inputs.iter().copied().map(coord_data).collect(),
            output: op.outputs.iter().copied().map(coord_data).collect(),
            typ: OperatorTypeData {
                symbol: op.kind.symbol().to_string(),
            },
        })
        .collect();

    let faucets = config
        .faucets()
        .iter()
        .map(|f| FaucetData {
            kind: f.kind,
            position: coord_data(f.position),
            interval: (f.interval != 1).then_some(f.interval),
            limit: f.limit,
        })
        .collect();

    let sinks = config
        .sinks()
        .iter()
        .map(|s| SinkData {
            position: coord_data(s.position),
            accepts: s.accepts,
        })
        .collect();

    SolutionData {
        solver: config.solver().map(str::to_string),
        dimension: config.grid().side(),
        frames,
        mechs,
        programs,
        operators,
        faucets: Some(faucets),
        sinks: Some(sinks),
        volumes: config.volumes().to_vec(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

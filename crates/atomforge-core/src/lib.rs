//! Atomforge Core -- a deterministic, frame-stepped production simulator.
//!
//! Programmable mechs move over a square grid, picking up and putting down
//! atoms. Operators transform atoms placed on their input ports into new
//! atoms on their output ports; faucets supply raw atoms and sinks consume
//! finished ones. A run is scored on static cost, deliveries, latency, and
//! dynamic cost. Identical inputs always produce identical results.
//!
//! # Four-Stage Frame
//!
//! Each call to [`engine::Simulation::step`] advances the run by one frame:
//!
//! 1. **Mechs** -- each mech, in ascending id order, executes one
//!    instruction of its looping program.
//! 2. **Operators** -- each operator, in declaration order, fires if its
//!    inputs are present and its outputs are clear.
//! 3. **Faucets** -- faucets whose schedule allows it refill their cell.
//! 4. **Sinks** -- sinks remove the atom on their cell, delivering or
//!    discarding it.
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Configuration::builder(8)
//!     .mechs(vec![Mech::new(0, Coord::new(0, 0))])
//!     .programs(vec![parse_program("Z,D,X,A")?])
//!     .build()?;
//! let result = engine::run_configuration(config, 80);
//! println!("{} delivered", result.delivered());
//! ```
//!
//! # Key Types
//!
//! - [`config::Configuration`] -- Validated, immutable description of a
//!   factory, built through [`config::ConfigurationBuilder`].
//! - [`engine::Simulation`] -- Mutable state of one run and the frame driver.
//! - [`engine::simulate`] -- One-shot entry point over flat input lists.
//! - [`validation`] -- Static checks on operator layouts and determinism
//!   checking.
//! - [`cost::Metrics`] -- Delivery, latency, and dynamic cost accumulators.
//! - [`sim::RunResult`] -- Initial and terminal records of a run.
//! - [`record::Recording`] -- Optional per-frame snapshots for replay.
//! - [`serialize`] -- Versioned binary encoding via bitcode.

pub mod atom;
pub mod batch;
pub mod config;
pub mod cost;
pub mod engine;
pub mod event;
pub mod faucet;
pub mod grid;
pub mod id;
pub mod mech;
pub mod operator;
pub mod program;
pub mod record;
pub mod serialize;
pub mod sim;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

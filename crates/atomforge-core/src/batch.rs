//! Independent runs of many configurations.
//!
//! Each job owns its own [`Simulation`](crate::engine::Simulation), so jobs
//! share nothing. With the `parallel` feature the jobs fan out over the rayon
//! pool; results always come back in job order and match a sequential run.

use crate::config::Configuration;
use crate::engine::run_configuration;
use crate::sim::RunResult;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run every `(configuration, frames)` job and collect the results in order.
pub fn run_batch(jobs: &[(Configuration, u64)]) -> Vec<RunResult> {
    log::debug!("running batch of {} configurations", jobs.len());

    #[cfg(feature = "parallel")]
    let results = jobs
        .par_iter()
        .map(|(config, frames)| run_configuration(config.clone(), *frames))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = jobs
        .iter()
        .map(|(config, frames)| run_configuration(config.clone(), *frames))
        .collect();

    results
}

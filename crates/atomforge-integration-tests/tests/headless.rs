//! Cross-crate headless runs: solution files in, scored and recorded runs
//! out.
//!
//! Each test goes through the file loader rather than the in-memory
//! fixtures, so the data crate and the engine are exercised together.

use std::fs;
use std::path::PathBuf;

use atomforge_core::atom::AtomKind;
use atomforge_core::batch::run_batch;
use atomforge_core::engine::{Simulation, run_configuration};
use atomforge_core::event::{Event, EventKind};
use atomforge_core::record::Recording;
use atomforge_core::sim::RunResult;
use atomforge_core::test_utils::*;
use atomforge_core::validation::validate_determinism;
use atomforge_data::loader::write_solution;
use atomforge_data::{Solution, load_solution};

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "atomforge_headless_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write both reference factories to disk and load them back.
fn load_scenarios(suffix: &str) -> (PathBuf, Solution, Solution) {
    let dir = make_test_dir(suffix);
    let one = dir.join("scenario_one.json");
    let two = dir.join("scenario_two.ron");
    write_solution(&one, &scenario_one(), SCENARIO_FRAMES).unwrap();
    write_solution(&two, &scenario_two(), SCENARIO_FRAMES).unwrap();
    let one = load_solution(&one).unwrap();
    let two = load_solution(&two).unwrap();
    (dir, one, two)
}

#[test]
fn loaded_scenarios_score_as_reference() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (dir, one, two) = load_scenarios("score");

    let r1 = run_configuration(one.config, one.frames);
    let r2 = run_configuration(two.config, two.frames);
    assert_eq!(
        (r1.static_cost(), r1.delivered(), r1.latency(), r1.dynamic_cost()),
        (3950, 1, 46_000_000, 3_574_000_000)
    );
    assert_eq!(
        (r2.static_cost(), r2.delivered(), r2.latency(), r2.dynamic_cost()),
        (3800, 2, 32_000_000, 3_224_000_000)
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn batch_of_loaded_solutions_matches_sequential_runs() {
    let (dir, one, two) = load_scenarios("batch");
    let jobs = vec![
        (one.config.clone(), one.frames),
        (two.config.clone(), two.frames),
        (one.config.clone(), 20),
    ];
    let results = run_batch(&jobs);
    for ((config, frames), result) in jobs.into_iter().zip(&results) {
        assert_eq!(&run_configuration(config, frames), result);
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn loaded_solution_is_deterministic() {
    let (dir, one, _) = load_scenarios("determinism");
    let report = validate_determinism(&one.config, one.frames);
    assert!(report.is_deterministic);
    assert_eq!(report.hash_log.len() as u64, one.frames);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn result_bytes_survive_a_trip_through_disk() {
    let dir = make_test_dir("result_bytes");
    let result = run_configuration(scenario_two(), SCENARIO_FRAMES);
    let path = dir.join("scenario_two.bin");
    fs::write(&path, result.to_bytes().unwrap()).unwrap();
    let back = RunResult::from_bytes(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(back, result);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn recording_exports_replayable_json() {
    let mut sim = Simulation::new(scenario_one()).with_recording();
    sim.run(SCENARIO_FRAMES);
    let recording = sim.take_recording().unwrap();
    assert_eq!(recording.len() as u64, SCENARIO_FRAMES + 1);

    let json = recording.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let frames = value["frames"].as_array().unwrap();
    assert_eq!(frames.len(), recording.len());
    for frame in frames {
        assert_eq!(frame["mechs"].as_array().unwrap().len(), 8);
    }

    // The last frame holds exactly the atoms still alive.
    let last = recording.frames.last().unwrap();
    assert_eq!(last.atoms.len(), sim.atoms().len());
    assert_eq!(Recording::from_json(&json).unwrap(), recording);
}

#[test]
fn board_dump_shows_every_mech() {
    let mut sim = Simulation::new(scenario_two()).with_recording();
    sim.run(12);
    let recording = sim.take_recording().unwrap();
    let config = sim.config();
    for frame in &recording.frames {
        let board = frame.board(config.grid());
        let rows: Vec<&str> = board.lines().collect();
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r.chars().count() == 8));
        assert!(board.contains('M') || board.contains('m'));
    }
}

#[test]
fn delivery_events_agree_with_metrics() {
    let mut sim = Simulation::new(scenario_two());
    sim.run(SCENARIO_FRAMES);

    let deliveries: Vec<&Event> = sim.events().events(EventKind::AtomDelivered).collect();
    assert_eq!(deliveries.len() as u64, sim.metrics().delivered);
    let latency: u64 = deliveries
        .iter()
        .map(|e| match e {
            Event::AtomDelivered { latency, .. } => *latency,
            _ => 0,
        })
        .sum();
    assert_eq!(latency, sim.metrics().latency);

    let discards = sim.events().total_emitted(EventKind::AtomDiscarded);
    assert_eq!(discards, sim.metrics().discarded);
    let emitted = sim.events().total_emitted(EventKind::AtomEmitted);
    assert_eq!(emitted, sim.metrics().spawned);

    let discarded_kinds: Vec<AtomKind> = sim
        .events()
        .events(EventKind::AtomDiscarded)
        .filter_map(|e| match e {
            Event::AtomDiscarded { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert!(discarded_kinds.iter().all(|k| *k != AtomKind::Saffron));
}

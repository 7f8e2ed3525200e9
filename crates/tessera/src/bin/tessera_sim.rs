//! # TESSERA Simulation Driver
//!
//! Headless run of the fixed-step simulation.
//!
//! ```text
//! tessera_sim [CONFIG_PATH]
//! ```
//!
//! Without a path the built-in defaults are used. `RUST_LOG` overrides the
//! configured log filter.

use std::env;
use std::process;

use tessera::{telemetry, SimConfig, Simulation};

fn main() {
    let config = match env::args_os().nth(1) {
        Some(path) => SimConfig::load(&path),
        None => Ok(SimConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(error) => {
            eprintln!("tessera_sim: {error}");
            process::exit(1);
        }
    };

    if let Err(error) = telemetry::init_logging(&config.logging) {
        eprintln!("tessera_sim: {error}");
        process::exit(1);
    }

    let mut simulation = match Simulation::new(config) {
        Ok(simulation) => simulation,
        Err(error) => {
            eprintln!("tessera_sim: {error}");
            process::exit(1);
        }
    };
    let summary = simulation.run();

    println!(
        "{} frames, {} of {} entities alive, {:.3} ms wall ({:.3} ms/frame, {} over budget)",
        summary.frames,
        summary.live_entities,
        summary.spawned,
        summary.wall_time.as_secs_f64() * 1000.0,
        summary.avg_frame_ms(),
        summary.frames_over_budget,
    );
}

//! Config-to-summary runs of the simulation host.

use std::fs;
use std::process;

use tessera::{ConfigError, Lifetime, Position, SimConfig, Simulation, Velocity};

/// Writes `text` to a file unique to this test process and returns its path.
fn write_config(name: &str, text: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("tessera-{}-{name}.toml", process::id()));
    if let Err(error) = fs::write(&path, text) {
        panic!("cannot write {}: {error}", path.display());
    }
    path
}

fn start(config: SimConfig) -> Simulation {
    match Simulation::new(config) {
        Ok(sim) => sim,
        Err(error) => panic!("simulation rejected config: {error}"),
    }
}

fn load(name: &str, text: &str) -> SimConfig {
    let path = write_config(name, text);
    let config = SimConfig::load(&path);
    let _ = fs::remove_file(&path);
    match config {
        Ok(config) => config,
        Err(error) => panic!("config rejected: {error}"),
    }
}

#[test]
fn file_config_drives_the_run() {
    let config = load(
        "run",
        r#"
            [simulation]
            timestep = 0.05
            frames = 20

            [scene]
            entities = 500
            moving_ratio = 1.0
            seed = 3
        "#,
    );
    let mut sim = start(config);
    let summary = sim.run();

    assert_eq!(summary.frames, 20);
    assert_eq!(summary.spawned, 500);
    assert_eq!(summary.live_entities, 500);
    assert_eq!(sim.world().frame(), 20);
    assert_eq!(sim.world().manager().component_count::<Velocity>(), 500);
    assert_eq!(sim.world().manager().component_count::<Lifetime>(), 0);
}

#[test]
fn lifetimes_empty_the_world() {
    let config = load(
        "lifetime",
        r#"
            [simulation]
            timestep = 0.1
            frames = 10

            [scene]
            entities = 1000
            lifetime = 0.5
        "#,
    );
    let mut sim = start(config);

    let mut live = Vec::new();
    for _ in 0..10 {
        live.push(sim.step().live_entities);
    }

    assert_eq!(live[0], 1000);
    assert_eq!(*live.last().unwrap_or(&usize::MAX), 0);
    assert!(live.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(sim.world().view::<Position>().count(), 0);
}

#[test]
fn seeds_reproduce_and_differ() {
    let run = |seed: u64| {
        let mut config = SimConfig::default();
        config.simulation.frames = 5;
        config.scene.entities = 64;
        config.scene.seed = seed;
        let mut sim = start(config);
        sim.run();
        sim.world()
            .view::<Position>()
            .map(|(_, position)| *position)
            .collect::<Vec<_>>()
    };

    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn invalid_file_reports_key() {
    let path = write_config("invalid", "[scene]\nmoving_ratio = 2.0\n");
    let result = SimConfig::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(ConfigError::Invalid(message)) => assert!(message.contains("scene.moving_ratio")),
        other => panic!("expected invalid config, got {other:?}"),
    }
}

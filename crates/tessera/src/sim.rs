//! # Simulation Loop
//!
//! Drives a [`World`] at a fixed timestep:
//!
//! ```text
//! new()   spawn the scene from the seeded RNG, register systems
//! step()  World::update(timestep), time it, record FrameStats
//! run()   step() for every configured frame, return a RunSummary
//! ```
//!
//! The loop does not sleep between steps; it runs as fast as the systems
//! allow and reports steps that took longer than the timestep.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::World;

use crate::components::{Lifetime, Position, Velocity};
use crate::config::{ConfigResult, SimConfig};
use crate::physics::{LifetimeSystem, PhysicsSystem};

/// Frames between two debug summaries.
pub const SUMMARY_INTERVAL: u64 = 60;

/// Half extent of the square spawn area, in world units.
pub const SPAWN_EXTENT: f32 = 1_000.0;

/// Largest velocity component given to moving entities, in units per second.
pub const MAX_SPEED: f32 = 10.0;

/// Timing of one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number, starting at zero.
    pub frame: u64,
    /// Wall time spent in `World::update`, in microseconds.
    pub elapsed_us: u64,
    /// Live entities after the step.
    pub live_entities: usize,
}

/// Aggregate statistics of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps executed.
    pub frames: u64,
    /// Entities spawned for the scene.
    pub spawned: usize,
    /// Live entities after the last step.
    pub live_entities: usize,
    /// Wall time of the whole run.
    pub wall_time: Duration,
    /// Slowest step, in microseconds.
    pub max_frame_us: u64,
    /// Steps that took longer than the timestep.
    pub frames_over_budget: u64,
}

impl RunSummary {
    /// Returns the average step time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.wall_time.as_secs_f64() * 1000.0 / self.frames as f64
    }
}

/// A seeded scene plus its fixed-step driver.
pub struct Simulation {
    world: World,
    config: SimConfig,
    spawned: usize,
    /// Time budget of one step.
    budget: Duration,
    max_frame_us: u64,
    frames_over_budget: u64,
}

impl Simulation {
    /// Builds the scene described by `config`.
    ///
    /// Every entity gets a [`Position`]; a `moving_ratio` share also gets a
    /// [`Velocity`], and with a non-zero `lifetime` every entity gets a
    /// [`Lifetime`]. Systems run lifetime first, physics second.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`](crate::config::ConfigError::Invalid) for any value [`SimConfig::validate`]
    /// rejects. Nothing is spawned in that case.
    pub fn new(config: SimConfig) -> ConfigResult<Self> {
        config.validate()?;
        let budget = config.simulation.step_duration()?;

        let mut world = World::with_capacity(config.scene.entities as usize);
        let spawned = spawn_scene(&mut world, &config);

        world.add_system(LifetimeSystem::new()).add_system(PhysicsSystem);

        tracing::info!(
            entities = spawned,
            moving = world.manager().component_count::<Velocity>(),
            seed = config.scene.seed,
            "scene spawned"
        );

        Ok(Self {
            world,
            config,
            spawned,
            budget,
            max_frame_us: 0,
            frames_over_budget: 0,
        })
    }

    /// Runs one fixed step.
    pub fn step(&mut self) -> FrameStats {
        let frame = self.world.frame();
        let start = Instant::now();
        self.world.update(self.config.simulation.timestep);
        let elapsed = start.elapsed();

        let stats = FrameStats {
            frame,
            elapsed_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            live_entities: self.world.entity_count(),
        };
        self.record(stats, elapsed);
        stats
    }

    fn record(&mut self, stats: FrameStats, elapsed: Duration) {
        self.max_frame_us = self.max_frame_us.max(stats.elapsed_us);

        if elapsed > self.budget {
            self.frames_over_budget += 1;
            tracing::warn!(
                frame = stats.frame,
                elapsed_us = stats.elapsed_us,
                budget_us = u64::try_from(self.budget.as_micros()).unwrap_or(u64::MAX),
                "frame exceeded time budget"
            );
        }

        if (stats.frame + 1) % SUMMARY_INTERVAL == 0 {
            tracing::debug!(
                frame = stats.frame,
                live = stats.live_entities,
                max_frame_us = self.max_frame_us,
                over_budget = self.frames_over_budget,
                "frame summary"
            );
        }
    }

    /// Runs every configured frame and summarizes the run.
    pub fn run(&mut self) -> RunSummary {
        let frames = self.config.simulation.frames;
        tracing::info!(
            frames,
            timestep = self.config.simulation.timestep,
            "simulation starting"
        );

        let start = Instant::now();
        for _ in 0..frames {
            self.step();
        }

        let summary = RunSummary {
            frames,
            spawned: self.spawned,
            live_entities: self.world.entity_count(),
            wall_time: start.elapsed(),
            max_frame_us: self.max_frame_us,
            frames_over_budget: self.frames_over_budget,
        };
        tracing::info!(
            frames = summary.frames,
            live = summary.live_entities,
            wall_ms = u64::try_from(summary.wall_time.as_millis()).unwrap_or(u64::MAX),
            avg_frame_ms = summary.avg_frame_ms(),
            over_budget = summary.frames_over_budget,
            "simulation finished"
        );
        summary
    }

    /// Returns the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the simulated world mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the configuration the simulation was built with.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

/// Spawns the entities of `config.scene` into `world`. Returns how many.
fn spawn_scene(world: &mut World, config: &SimConfig) -> usize {
    let scene = &config.scene;
    let mut rng = ChaCha8Rng::seed_from_u64(scene.seed);

    for _ in 0..scene.entities {
        let position = Position::new(
            rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
            rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
        );
        let mut entity = world.create_entity();
        entity.add(position);

        if rng.gen_bool(scene.moving_ratio) {
            entity.add(Velocity::new(
                rng.gen_range(-MAX_SPEED..=MAX_SPEED),
                rng.gen_range(-MAX_SPEED..=MAX_SPEED),
            ));
        }
        if scene.lifetime > 0.0 {
            entity.add(Lifetime::new(scene.lifetime));
        }
    }

    scene.entities as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, SceneConfig, SimulationConfig};

    fn simulation(config: SimConfig) -> Simulation {
        match Simulation::new(config) {
            Ok(sim) => sim,
            Err(error) => panic!("config rejected: {error}"),
        }
    }

    fn config(entities: u32, frames: u64, lifetime: f32) -> SimConfig {
        SimConfig {
            simulation: SimulationConfig {
                timestep: 0.1,
                frames,
            },
            scene: SceneConfig {
                entities,
                moving_ratio: 0.5,
                lifetime,
                seed: 9,
            },
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_scene_matches_config() {
        let sim = simulation(config(200, 1, 0.0));
        let manager = sim.world().manager();

        assert_eq!(sim.world().entity_count(), 200);
        assert_eq!(manager.component_count::<Position>(), 200);
        assert_eq!(manager.component_count::<Lifetime>(), 0);
        let moving = manager.component_count::<Velocity>();
        assert!(moving > 50 && moving < 150, "moving = {moving}");
        assert_eq!(sim.world().system_count(), 2);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let first = simulation(config(50, 1, 0.0));
        let second = simulation(config(50, 1, 0.0));

        let a: Vec<Position> = first.world().view::<Position>().map(|(_, p)| *p).collect();
        let b: Vec<Position> = second.world().view::<Position>().map(|(_, p)| *p).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_step_counts_frames() {
        let mut sim = simulation(config(10, 3, 0.0));
        let first = sim.step();
        let second = sim.step();

        assert_eq!(first.frame, 0);
        assert_eq!(second.frame, 1);
        assert_eq!(second.live_entities, 10);
        assert_eq!(sim.world().frame(), 2);
    }

    #[test]
    fn test_run_expires_lifetimes() {
        let mut sim = simulation(config(30, 5, 0.25));
        let summary = sim.run();

        assert_eq!(summary.frames, 5);
        assert_eq!(summary.spawned, 30);
        assert_eq!(summary.live_entities, 0);
        assert_eq!(sim.world().entity_count(), 0);
        assert!(summary.avg_frame_ms() >= 0.0);
    }

    #[test]
    fn test_moving_entities_move() {
        let mut sim = simulation(config(20, 1, 0.0));
        let before: Vec<_> = sim
            .world()
            .view::<(Position, Velocity)>()
            .map(|(entity, (position, velocity))| (entity, *position, *velocity))
            .collect();

        sim.step();

        for (entity, position, velocity) in before {
            let now = sim.world().entity(entity).get::<Position>();
            assert!((now.x - (position.x + velocity.x * 0.1)).abs() < 1e-3);
            assert!((now.y - (position.y + velocity.y * 0.1)).abs() < 1e-3);
        }
        assert_eq!(sim.config().simulation.frames, 1);
        sim.world_mut().manager_mut().clear();
        assert_eq!(sim.world().entity_count(), 0);
    }

    #[test]
    fn test_unvalidated_config_is_rejected() {
        let mut negative = config(10, 1, 0.0);
        negative.simulation.timestep = -1.0;
        let mut huge = config(10, 1, 0.0);
        huge.simulation.timestep = f32::MAX;
        let mut ratio = config(10, 1, 0.0);
        ratio.scene.moving_ratio = 1.5;

        for (bad, key) in [
            (negative, "simulation.timestep"),
            (huge, "simulation.timestep"),
            (ratio, "scene.moving_ratio"),
        ] {
            match Simulation::new(bad) {
                Err(ConfigError::Invalid(message)) => assert!(message.contains(key), "{message}"),
                Err(other) => panic!("expected invalid config, got {other}"),
                Ok(_) => panic!("accepted a config with a bad {key}"),
            }
        }
    }
}

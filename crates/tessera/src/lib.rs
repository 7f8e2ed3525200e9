//! # TESSERA
//!
//! Fixed-step simulation host for the `tessera_core` ECS.
//!
//! ## Modules
//!
//! - `components`: Position, Velocity, Lifetime and their slot ids
//! - `physics`: the systems that move and expire entities
//! - `config`: TOML configuration and its validation
//! - `sim`: scene spawning and the fixed-step loop
//! - `telemetry`: logging bootstrap for the binary
//!
//! ## Example
//!
//! ```rust
//! use tessera::{SimConfig, Simulation};
//!
//! let config = SimConfig::from_toml_str(
//!     "[simulation]\nframes = 3\n[scene]\nentities = 100\n",
//! )?;
//! let summary = Simulation::new(config)?.run();
//!
//! assert_eq!(summary.frames, 3);
//! assert_eq!(summary.live_entities, 100);
//! # Ok::<(), tessera::ConfigError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod config;
pub mod physics;
pub mod sim;
pub mod telemetry;

// Re-export the engine
pub use tessera_core as core;

// Re-export commonly used types
pub use components::{ComponentKind, Lifetime, Position, Velocity};
pub use config::{ConfigError, ConfigResult, SimConfig};
pub use physics::{LifetimeSystem, PhysicsSystem};
pub use sim::{FrameStats, RunSummary, Simulation};

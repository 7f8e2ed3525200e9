//! # Simulation Configuration
//!
//! Loaded once at startup from a TOML file. Every key is optional:
//!
//! ```toml
//! [simulation]
//! timestep = 0.016666668   # seconds per fixed step
//! frames = 600             # steps to run
//!
//! [scene]
//! entities = 10000         # entities to spawn
//! moving_ratio = 0.5       # fraction that also get a Velocity
//! lifetime = 0.0           # seconds before an entity expires, 0 = never
//! seed = 42                # scene RNG seed
//!
//! [logging]
//! filter = "info"          # tracing EnvFilter directive
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors that can occur while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fixed-step loop settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seconds per step.
    pub timestep: f32,
    /// Number of steps to run.
    pub frames: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            frames: 600,
        }
    }
}

impl SimulationConfig {
    /// Returns the timestep as a [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless the timestep is a positive
    /// number of seconds that a `Duration` can hold.
    pub fn step_duration(&self) -> ConfigResult<Duration> {
        let timestep = self.timestep;
        match Duration::try_from_secs_f32(timestep) {
            Ok(step) if !step.is_zero() => Ok(step),
            _ => Err(ConfigError::Invalid(format!(
                "simulation.timestep must be a positive number of seconds, got {timestep}"
            ))),
        }
    }
}

/// Initial scene settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Entities to spawn, each with a Position.
    pub entities: u32,
    /// Fraction of entities that also get a Velocity.
    pub moving_ratio: f64,
    /// Seconds before an entity expires; `0` spawns immortal entities.
    pub lifetime: f32,
    /// RNG seed. The same seed always spawns the same scene.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            entities: 10_000,
            moving_ratio: 0.5,
            lifetime: 0.0,
            seed: 42,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Loop settings.
    pub simulation: SimulationConfig,
    /// Scene settings.
    pub scene: SceneConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl SimConfig {
    /// Loads and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.step_duration()?;
        if self.simulation.frames == 0 {
            return Err(ConfigError::Invalid("simulation.frames must be at least 1".to_owned()));
        }

        let ratio = self.scene.moving_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::Invalid(format!(
                "scene.moving_ratio must be within 0..=1, got {ratio}"
            )));
        }
        let lifetime = self.scene.lifetime;
        if !lifetime.is_finite() || lifetime < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scene.lifetime must be zero or a positive number of seconds, got {lifetime}"
            )));
        }

        if let Err(error) = EnvFilter::try_new(&self.logging.filter) {
            return Err(ConfigError::Invalid(format!(
                "logging.filter {:?} is not a valid directive: {error}",
                self.logging.filter
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = SimConfig::from_toml_str("").map_err(|e| e.to_string());
        assert_eq!(config, Ok(SimConfig::default()));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let text = r#"
            [simulation]
            frames = 10

            [scene]
            entities = 5
            seed = 7
        "#;
        let config = SimConfig::from_toml_str(text).map_err(|e| e.to_string());
        let config = match config {
            Ok(config) => config,
            Err(error) => panic!("valid config rejected: {error}"),
        };

        assert_eq!(config.simulation.frames, 10);
        assert_eq!(config.simulation.timestep, SimulationConfig::default().timestep);
        assert_eq!(config.scene.entities, 5);
        assert_eq!(config.scene.seed, 7);
        assert_eq!(config.scene.moving_ratio, 0.5);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let result = SimConfig::from_toml_str("[scene]\nentites = 3\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for text in [
            "[simulation]\ntimestep = 0.0\n",
            "[simulation]\ntimestep = -1.0\n",
            "[simulation]\nframes = 0\n",
            "[scene]\nmoving_ratio = 1.5\n",
            "[scene]\nlifetime = -2.0\n",
        ] {
            let result = SimConfig::from_toml_str(text);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "accepted: {text}");
        }
    }

    #[test]
    fn test_bad_filter_rejected() {
        let result = SimConfig::from_toml_str("[logging]\nfilter = \"tessera=loud\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SimConfig::load("/nonexistent/tessera.toml");
        match result {
            Err(ConfigError::Io { path, .. }) => assert!(path.ends_with("tessera.toml")),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = SimConfig::default();
        let text = toml::to_string(&config).map_err(|e| e.to_string());
        let parsed = text.and_then(|text| SimConfig::from_toml_str(&text).map_err(|e| e.to_string()));
        assert_eq!(parsed, Ok(config));
    }
}

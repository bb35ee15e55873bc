//! Configuration types deserialized from a `parcfg.toml` run configuration.
//!
//! This is the ambient configuration layer around the core: which device
//! part to target, the annealer's schedule constants, and the seed that
//! makes a run reproducible (spec §5 requires the engine to never self-seed).

use serde::Deserialize;

/// The top-level run configuration.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// Target device selection.
    pub device: DeviceConfig,
    /// Simulated-annealing schedule parameters.
    #[serde(default)]
    pub anneal: AnnealConfig,
    /// Logging verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Selects which physical part the netlist is placed onto.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// Full part number (e.g. `"SLG46620V"`).
    pub part: String,
}

/// Simulated-annealing schedule constants.
///
/// `seed` has no default: spec §5 requires the engine to consume a
/// caller-supplied seed rather than self-seeding, so a run configuration
/// that omits it fails validation rather than silently picking one.
#[derive(Debug, Deserialize)]
pub struct AnnealConfig {
    /// Seed for the annealer's pseudorandom number source.
    pub seed: Option<u64>,
    /// Geometric cooling multiplier applied to the temperature each step.
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,
    /// Temperature below which the schedule terminates.
    #[serde(default = "default_min_temperature")]
    pub min_temperature: f64,
    /// Candidate moves attempted per temperature step, as a multiplier of
    /// the netlist's movable-node count.
    #[serde(default = "default_moves_per_temp_multiplier")]
    pub moves_per_temp_multiplier: u32,
    /// Multiplier applied to `sqrt(num_movable_nodes)` to obtain the
    /// starting temperature.
    #[serde(default = "default_initial_temp_scale")]
    pub initial_temp_scale: f64,
}

fn default_cooling_rate() -> f64 {
    0.95
}

fn default_min_temperature() -> f64 {
    0.01
}

fn default_moves_per_temp_multiplier() -> u32 {
    10
}

fn default_initial_temp_scale() -> f64 {
    2.0
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            seed: None,
            cooling_rate: default_cooling_rate(),
            min_temperature: default_min_temperature(),
            moves_per_temp_multiplier: default_moves_per_temp_multiplier(),
            initial_temp_scale: default_initial_temp_scale(),
        }
    }
}

/// Logging verbosity for the driver's injected diagnostic sink.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Fine-grained internal tracing.
    Debug,
    /// Progress detail.
    Verbose,
    /// Notable but expected events (default).
    #[default]
    Notice,
    /// Only warnings and errors.
    Warning,
    /// Only errors.
    Error,
}

/// Logging configuration.
#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Minimum severity that reaches the rendered log.
    #[serde(default)]
    pub level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn anneal_defaults() {
        let toml = r#"
[device]
part = "SLG46620V"

[anneal]
seed = 42
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.anneal.seed, Some(42));
        assert_eq!(config.anneal.cooling_rate, 0.95);
        assert_eq!(config.anneal.min_temperature, 0.01);
        assert_eq!(config.anneal.moves_per_temp_multiplier, 10);
    }

    #[test]
    fn log_level_all_variants() {
        for (input, expected) in [
            ("debug", LogLevel::Debug),
            ("verbose", LogLevel::Verbose),
            ("notice", LogLevel::Notice),
            ("warning", LogLevel::Warning),
            ("error", LogLevel::Error),
        ] {
            let toml = format!(
                r#"
[device]
part = "SLG46620V"

[anneal]
seed = 1

[logging]
level = "{input}"
"#
            );
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.logging.level, expected);
        }
    }
}

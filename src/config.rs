use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::sampler::{DEFAULT_INTERVAL, DEFAULT_ITERATIONS, SamplerOptions, StopCondition};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampler: SamplerConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// 0 runs until interrupted.
    pub iterations: usize,
    pub interval_ms: u64,
    /// 0 means no wall-clock bound.
    pub max_duration_secs: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            iterations: DEFAULT_ITERATIONS,
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            max_duration_secs: 0,
        }
    }
}

impl SamplerConfig {
    pub fn options(&self) -> SamplerOptions {
        let mut stop = match self.iterations {
            0 => StopCondition::unbounded(),
            n => StopCondition::iterations(n),
        };
        if self.max_duration_secs > 0 {
            stop = stop.with_max_duration(Duration::from_secs(self.max_duration_secs));
        }
        SamplerOptions {
            interval: Duration::from_millis(self.interval_ms),
            stop,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub output: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            output: "auto".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Empty logs to stderr.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            file: String::new(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("perfcheck").join("config.toml"))
}

/// Loads the explicit path or the default location. Falls back to defaults
/// with a warning message when the file cannot be used. A missing default
/// file is not worth a warning.
pub fn load_config(explicit: Option<&Path>) -> (Config, Option<String>) {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Some(path) if path.exists() => path,
            _ => return (Config::default(), None),
        },
    };
    match read_config(&path) {
        Ok(config) => (config, None),
        Err(err) => (
            Config::default(),
            Some(format!("ignoring config {}: {err}", path.display())),
        ),
    }
}

fn read_config(path: &Path) -> Result<Config, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&contents).map_err(|e| e.to_string())
}

use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::level_filters::LevelFilter;

use crate::config::LoggingConfig;

pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::WARN)
}

/// Human-readable logs on stderr, or JSON lines when a file is configured.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level);

    if config.file.is_empty() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        return tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| eyre!("failed to set tracing subscriber: {e}"));
    }

    let output_path = Path::new(&config.file);
    ensure_parent_dir(output_path)?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(output_path)?;

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .json()
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!(parse_level("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" INFO "), LevelFilter::INFO);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
    }

    #[test]
    fn unknown_level_falls_back_to_warn() {
        assert_eq!(parse_level("loud"), LevelFilter::WARN);
    }

    #[test]
    fn parent_dir_is_created() {
        let dir = std::env::temp_dir().join("perfcheck_log_parent_test");
        let _ = fs::remove_dir_all(&dir);
        ensure_parent_dir(&dir.join("nested").join("log.jsonl")).unwrap();
        assert!(dir.join("nested").is_dir());
        let _ = fs::remove_dir_all(&dir);
    }
}

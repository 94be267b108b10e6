//! quizmap configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::statistics::{DEFAULT_TREND_WINDOW_DAYS, MAX_TREND_WINDOW_DAYS};

/// Top-level quizmap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizmapConfig {
    /// Days covered by the trend series.
    #[serde(default = "default_window")]
    pub trend_window_days: u32,
    /// Confidence level passed to the interval helper.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Fan the statistics computation out over blocking tasks.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Output directory for saved reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_window() -> u32 {
    DEFAULT_TREND_WINDOW_DAYS
}
fn default_confidence() -> f64 {
    0.95
}
fn default_parallel() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizmap-results")
}

impl QuizmapConfig {
    /// Check value ranges. Run after every source of values has been applied.
    pub fn validate(&self) -> Result<()> {
        check_trend_window(self.trend_window_days)
            .context("invalid trend_window_days")?;
        anyhow::ensure!(
            self.confidence > 0.0 && self.confidence < 1.0,
            "confidence must be between 0 and 1"
        );
        Ok(())
    }
}

/// A trend window must cover at least one day and at most [`MAX_TREND_WINDOW_DAYS`].
pub fn check_trend_window(days: u32) -> Result<()> {
    anyhow::ensure!(
        (1..=MAX_TREND_WINDOW_DAYS).contains(&days),
        "trend window must be between 1 and {MAX_TREND_WINDOW_DAYS} days, got {days}"
    );
    Ok(())
}

impl Default for QuizmapConfig {
    fn default() -> Self {
        Self {
            trend_window_days: default_window(),
            confidence: default_confidence(),
            parallel: default_parallel(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizmap.toml` in the current directory
/// 2. `~/.config/quizmap/config.toml`
///
/// Environment variable overrides: `QUIZMAP_TREND_WINDOW_DAYS`, `QUIZMAP_OUTPUT_DIR`.
pub fn load_config() -> Result<QuizmapConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmapConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizmap.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config: QuizmapConfig = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizmapConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Parse and check a config document.
pub fn parse_config(content: &str) -> Result<QuizmapConfig> {
    let config: QuizmapConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(
    config: &mut QuizmapConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(days) = lookup("QUIZMAP_TREND_WINDOW_DAYS") {
        config.trend_window_days = days
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZMAP_TREND_WINDOW_DAYS: '{days}'"))?;
    }
    if let Some(dir) = lookup("QUIZMAP_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmap"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = QuizmapConfig::default();
        assert_eq!(config.trend_window_days, 30);
        assert_eq!(config.confidence, 0.95);
        assert!(config.parallel);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config("trend_window_days = 7\nparallel = false\n").unwrap();
        assert_eq!(config.trend_window_days, 7);
        assert!(!config.parallel);
        assert_eq!(config.output_dir, PathBuf::from("./quizmap-results"));
    }

    #[test]
    fn parse_rejects_zero_window() {
        assert!(parse_config("trend_window_days = 0").is_err());
        assert!(parse_config("confidence = 1.5").is_err());
    }

    #[test]
    fn parse_rejects_oversized_window() {
        assert!(parse_config("trend_window_days = 3650").is_ok());
        let err = parse_config("trend_window_days = 3651").unwrap_err();
        assert!(format!("{err:#}").contains("between 1 and 3650"));
        assert!(check_trend_window(u32::MAX).is_err());
    }

    #[test]
    fn env_override_is_validated() {
        let mut config = QuizmapConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "QUIZMAP_TREND_WINDOW_DAYS").then(|| "0".to_string())
        })
        .unwrap();
        assert!(config.validate().is_err());

        let mut config = QuizmapConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "QUIZMAP_TREND_WINDOW_DAYS").then(|| "4000000000".to_string())
        })
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides() {
        let mut config = QuizmapConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            "QUIZMAP_TREND_WINDOW_DAYS" => Some("14".into()),
            "QUIZMAP_OUTPUT_DIR" => Some("/tmp/out".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.trend_window_days, 14);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));

        let bad = apply_env_overrides(&mut config, |key| {
            (key == "QUIZMAP_TREND_WINDOW_DAYS").then(|| "soon".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizmap.toml");
        std::fs::write(&path, "trend_window_days = 10\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.trend_window_days, 10);

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());

        std::fs::write(&path, "trend_window_days = 0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}

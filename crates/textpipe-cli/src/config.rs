//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Global configuration for textpipe
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub pipeline: PipelineSettings,
    pub workers: WorkersConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Root of the partitioned extraction tree.
    pub root: PathBuf,
    /// External PDF extraction command (reads the source path as its
    /// argument, writes the body to stdout). Unset means PDF tasks fail
    /// to the error sink instead of being misextracted.
    pub pdf_command: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./fulltext"),
            pdf_command: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Records per ingress packet.
    pub packet_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { packet_size: 100 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub default: usize,
    pub max: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            default: cpus.min(8),
            max: 16,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./textpipe.toml (current directory)
    /// 2. ~/.config/textpipe/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("textpipe.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "textpipe") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Startup-time sanity checks; misconfiguration is fatal here, not
    /// mid-run.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.pipeline.packet_size > 0, "packet_size must be positive");
        ensure!(self.workers.default >= 1, "workers.default must be >= 1");
        ensure!(
            self.workers.default <= self.workers.max,
            "workers.default ({}) exceeds workers.max ({})",
            self.workers.default,
            self.workers.max
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.extract.root, PathBuf::from("./fulltext"));
        assert!(config.extract.pdf_command.is_none());
        assert_eq!(config.pipeline.packet_size, 100);
        assert!(config.workers.default >= 1);
        config.validate().unwrap();
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[extract]
root = "/data/fulltext"
pdf_command = "pdftotext"

[pipeline]
packet_size = 25

[workers]
default = 4
max = 8
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.extract.root, PathBuf::from("/data/fulltext"));
        assert_eq!(config.extract.pdf_command.as_deref(), Some("pdftotext"));
        assert_eq!(config.pipeline.packet_size, 25);
        assert_eq!(config.workers.default, 4);
        config.validate().unwrap();
    }

    #[test]
    fn zero_packet_size_is_rejected() {
        let config: Config = toml::from_str("[pipeline]\npacket_size = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn workers_above_max_are_rejected() {
        let config: Config = toml::from_str("[workers]\ndefault = 32\nmax = 16\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textpipe.toml");
        std::fs::write(&path, "[pipeline]\npacket_size = 0\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::coverage::ColumnLayout;

/// Config file looked up in the source root when `--config` is not given.
pub const CONFIG_FILE: &str = "llvm-cov-xml.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub llvm_cov: LlvmCovConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportConfig {
    /// Output file, relative to the source root; "-" for stdout
    #[serde(default)]
    pub output: Option<String>,
    /// Paths or path prefixes to leave out, relative to the source root
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub layout: ColumnLayout,
}

#[derive(Debug, Deserialize)]
pub struct LlvmCovConfig {
    /// Program and leading arguments used to invoke llvm-cov
    #[serde(default = "default_llvm_cov_command")]
    pub command: Vec<String>,
    /// Instrumented executable
    #[serde(default)]
    pub binary: Option<String>,
    /// Merged profile data (`.profdata`)
    #[serde(default)]
    pub profdata: Option<String>,
}

impl Default for LlvmCovConfig {
    fn default() -> Self {
        Self {
            command: default_llvm_cov_command(),
            binary: None,
            profdata: None,
        }
    }
}

fn default_llvm_cov_command() -> Vec<String> {
    vec!["xcrun".to_string(), "llvm-cov".to_string()]
}

/// Minimum coverage percentages
#[derive(Debug, Default, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub line: Option<f64>,
    #[serde(default)]
    pub branch: Option<f64>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `llvm-cov-xml.toml` from `root` if present, defaults otherwise.
    pub fn load_from_root(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.llvm_cov.command.is_empty() {
            anyhow::bail!("llvm_cov.command must name a program");
        }

        if self.llvm_cov.binary.is_some() != self.llvm_cov.profdata.is_some() {
            anyhow::bail!("llvm_cov.binary and llvm_cov.profdata must be set together");
        }

        for (name, value) in [("line", self.thresholds.line), ("branch", self.thresholds.branch)] {
            if let Some(value) = value {
                if !(0.0..=100.0).contains(&value) {
                    anyhow::bail!("thresholds.{} must be between 0 and 100, got {}", name, value);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[report]
output = "build/coverage.xml"
exclude = ["Pods", "Tests/"]
layout = "count-first"

[llvm_cov]
command = ["llvm-cov"]
binary = "build/App"
profdata = "build/Coverage.profdata"

[thresholds]
line = 80.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        config.validate().unwrap();
        assert_eq!(config.report.output.as_deref(), Some("build/coverage.xml"));
        assert_eq!(config.report.exclude, vec!["Pods", "Tests/"]);
        assert_eq!(config.report.layout, ColumnLayout::CountFirst);
        assert_eq!(config.llvm_cov.command, vec!["llvm-cov"]);
        assert_eq!(config.thresholds.line, Some(80.0));
        assert_eq!(config.thresholds.branch, None);
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.report.layout, ColumnLayout::LineFirst);
        assert_eq!(config.llvm_cov.command, vec!["xcrun", "llvm-cov"]);
        assert!(config.report.exclude.is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let config: Config = toml::from_str("[llvm_cov]\nbinary = \"App\"\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[thresholds]\nbranch = 120.0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[llvm_cov]\ncommand = []\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_root() {
        let dir = tempdir().unwrap();
        let config = Config::load_from_root(dir.path()).unwrap();
        assert!(config.report.output.is_none());

        fs::write(dir.path().join(CONFIG_FILE), "[report]\noutput = \"-\"\n").unwrap();
        let config = Config::load_from_root(dir.path()).unwrap();
        assert_eq!(config.report.output.as_deref(), Some("-"));

        fs::write(dir.path().join(CONFIG_FILE), "[report\n").unwrap();
        assert!(Config::load_from_root(dir.path()).is_err());
    }
}

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::metar::DEFAULT_MAX_AGE_HOURS;

/// How decoded reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Summary => "summary",
            OutputFormat::Json => "json",
        }
    }

    pub const fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Summary, OutputFormat::Json]
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OutputFormat {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown output format '{value}'. Supported formats: summary, json.")),
        }
    }
}

/// Decoder settings stored on disk.
///
/// Example TOML:
/// ```toml
/// metar_max_age_hours = 3
/// strict = false
/// output = "json"
/// elevation_feet = 13.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hours after which an observation stops being current.
    pub metar_max_age_hours: i64,

    /// Reject reports containing groups no grammar recognized.
    pub strict: bool,

    pub output: OutputFormat,

    /// Field elevation used for pressure-altitude derivations.
    pub elevation_feet: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metar_max_age_hours: DEFAULT_MAX_AGE_HOURS,
            strict: false,
            output: OutputFormat::default(),
            elevation_feet: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = self.to_toml()?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "metar", "metar-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    fn validate(&self) -> Result<()> {
        if self.metar_max_age_hours <= 0 {
            return Err(anyhow!(
                "metar_max_age_hours must be positive, got {}.\n\
                 Hint: run `metar configure` to reset it.",
                self.metar_max_age_hours
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observation_window() {
        let cfg = Config::default();

        assert_eq!(cfg.metar_max_age_hours, 3);
        assert!(!cfg.strict);
        assert_eq!(cfg.output, OutputFormat::Summary);
        assert_eq!(cfg.elevation_feet, None);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_toml("strict = true\noutput = \"json\"").expect("valid toml");

        assert!(cfg.strict);
        assert_eq!(cfg.output, OutputFormat::Json);
        assert_eq!(cfg.metar_max_age_hours, 3);
    }

    #[test]
    fn toml_round_trip() {
        let cfg = Config {
            metar_max_age_hours: 2,
            strict: true,
            output: OutputFormat::Json,
            elevation_feet: Some(13.0),
        };

        let text = cfg.to_toml().expect("serializable");
        assert!(text.contains("output = \"json\""));
        assert_eq!(Config::from_toml(&text).expect("parsable"), cfg);
    }

    #[test]
    fn rejects_non_positive_age() {
        let err = Config::from_toml("metar_max_age_hours = 0").unwrap_err();

        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!(OutputFormat::try_from("JSON").expect("known format"), OutputFormat::Json);

        let err = OutputFormat::try_from("xml").unwrap_err();
        assert!(err.to_string().contains("Supported formats: summary, json"));
        assert_eq!(OutputFormat::all().len(), 2);
    }
}

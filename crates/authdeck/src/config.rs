use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::stage::StageConfig;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "authdeck";

pub const VALID_KEYS: &[&str] = &[
    "defaults.theme",
    "defaults.deck",
    "defaults.start_mode",
    "stage.refresh_interval_ms",
    "stage.retry_delays_ms",
    "stage.steady_recompute_ms",
    "stage.bypass_padding",
    "stage.pulse_step",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Built-in deck shown when no file is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_mode: Option<String>,
}

/// Stage timing and routing overrides. Unset fields keep the built-in values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delays_ms: Option<Vec<u64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steady_recompute_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_padding: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse_step: Option<f32>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `authdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# AuthDeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref()?.theme.as_deref()
    }

    pub fn deck(&self) -> Option<&str> {
        self.defaults.as_ref()?.deck.as_deref()
    }

    /// Zero-based slide to open on, from `defaults.start_mode`.
    pub fn start_slide(&self) -> Option<usize> {
        let mode = self.defaults.as_ref()?.start_mode.as_deref()?;
        mode.parse::<usize>().ok().map(|n| n.saturating_sub(1))
    }

    /// Built-in stage settings with any configured overrides applied.
    pub fn to_stage_config(&self) -> StageConfig {
        let mut config = StageConfig::default();
        let Some(stage) = &self.stage else {
            return config;
        };
        if let Some(ms) = stage.refresh_interval_ms {
            config.refresh_interval = Duration::from_millis(ms);
        }
        if let Some(delays) = &stage.retry_delays_ms {
            config.retry_delays = delays.iter().copied().map(Duration::from_millis).collect();
        }
        if let Some(ms) = stage.steady_recompute_ms {
            config.steady_recompute = Duration::from_millis(ms);
        }
        if let Some(padding) = stage.bypass_padding {
            config.routing.bypass_padding = padding;
        }
        if let Some(step) = stage.pulse_step {
            config.pulse_step = step;
        }
        config
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults_mut().theme = Some(value.to_string());
            }
            "defaults.deck" => {
                let Some(builtin) = crate::deck::builtin::find(value) else {
                    anyhow::bail!(
                        "Invalid deck: {value}. Must be one of: {}.",
                        crate::deck::builtin::names().join(", ")
                    );
                };
                self.defaults_mut().deck = Some(builtin.name.to_string());
            }
            "defaults.start_mode" => {
                if value != "first" && !matches!(value.parse::<usize>(), Ok(n) if n >= 1) {
                    anyhow::bail!(
                        "Invalid start_mode: {value}. Must be 'first' or a slide number."
                    );
                }
                self.defaults_mut().start_mode = Some(value.to_string());
            }
            "stage.refresh_interval_ms" => {
                self.stage_mut().refresh_interval_ms = Some(parse_ms(key, value)?);
            }
            "stage.retry_delays_ms" => {
                let delays = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| parse_ms(key, s))
                    .collect::<Result<Vec<_>>>()?;
                self.stage_mut().retry_delays_ms = Some(delays);
            }
            "stage.steady_recompute_ms" => {
                self.stage_mut().steady_recompute_ms = Some(parse_ms(key, value)?);
            }
            "stage.bypass_padding" => {
                self.stage_mut().bypass_padding = Some(parse_non_negative(key, value)?);
            }
            "stage.pulse_step" => {
                let step = parse_non_negative(key, value)?;
                if step == 0.0 {
                    anyhow::bail!("Invalid {key}: {value}. Must be greater than zero.");
                }
                self.stage_mut().pulse_step = Some(step);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    fn defaults_mut(&mut self) -> &mut DefaultsConfig {
        self.defaults.get_or_insert_with(DefaultsConfig::default)
    }

    fn stage_mut(&mut self) -> &mut StageSettings {
        self.stage.get_or_insert_with(StageSettings::default)
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|_| {
        anyhow::anyhow!("Invalid {key}: {value}. Must be a whole number of milliseconds.")
    })
}

fn parse_non_negative(key: &str, value: &str) -> Result<f32> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => anyhow::bail!("Invalid {key}: {value}. Must be a non-negative number."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_gives_default_stage() {
        assert_eq!(Config::default().to_stage_config(), StageConfig::default());
    }

    #[test]
    fn stage_overrides_apply() {
        let mut config = Config::default();
        config.set("stage.refresh_interval_ms", "0").unwrap();
        config.set("stage.retry_delays_ms", "50, 150").unwrap();
        config.set("stage.bypass_padding", "40").unwrap();
        config.set("stage.pulse_step", "1.0").unwrap();

        let stage = config.to_stage_config();
        assert_eq!(stage.refresh_interval, Duration::ZERO);
        assert_eq!(
            stage.retry_delays,
            vec![Duration::from_millis(50), Duration::from_millis(150)]
        );
        assert_eq!(stage.steady_recompute, Duration::from_millis(1000));
        assert_eq!(stage.routing.bypass_padding, 40.0);
        assert_eq!(stage.pulse_step, 1.0);
    }

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        assert!(config.set("defaults.theme", "sepia").is_err());
        assert!(config.set("defaults.deck", "saml").is_err());
        assert!(config.set("defaults.start_mode", "0").is_err());
        assert!(config.set("stage.refresh_interval_ms", "-5").is_err());
        assert!(config.set("stage.bypass_padding", "-1").is_err());
        assert!(config.set("stage.pulse_step", "0").is_err());
        assert!(config.set("stage.nope", "1").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn deck_name_is_normalised() {
        let mut config = Config::default();
        config.set("defaults.deck", "OIDC").unwrap();
        assert_eq!(config.deck(), Some("oidc"));
    }

    #[test]
    fn start_slide_is_zero_based() {
        let mut config = Config::default();
        assert_eq!(config.start_slide(), None);
        config.set("defaults.start_mode", "first").unwrap();
        assert_eq!(config.start_slide(), None);
        config.set("defaults.start_mode", "2").unwrap();
        assert_eq!(config.start_slide(), Some(1));
    }

    #[test]
    fn save_and_load_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!(
            "authdeck-config-{}/config.yaml",
            std::process::id()
        ));
        let mut config = Config::default();
        config.set("defaults.theme", "light").unwrap();
        config.set("stage.steady_recompute_ms", "500").unwrap();
        config.save_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# AuthDeck configuration"));
        assert_eq!(Config::load_from(&path).unwrap(), config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_mentions_config_show() {
        let err = Config::load_from(Path::new("/nonexistent/authdeck.yaml")).unwrap_err();
        assert!(err.to_string().contains("config show"));
    }
}

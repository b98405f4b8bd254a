// src/config/service.rs
//! TOML configuration with env overrides.
//!
//! Resolution:
//! 1) `$DAM_CONFIG_PATH` (must exist)
//! 2) `config/dam.toml` (optional; defaults when absent)
//!
//! Then env overrides (invalid values are ignored with a warning):
//! - `DAM_SCORING_POLICY`  "subjectivity" | "spike_divergence" (aliases "a" / "b")
//! - `DAM_TAGGER_MODEL`    path to the tagger model JSON
//! - `DAM_MAX_TEXT_CHARS`  positive integer
//! - `DAM_METRICS`         "1"/"true" | "0"/"false"

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::analyze::ScoringPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "config/dam.toml";
pub const ENV_CONFIG_PATH: &str = "DAM_CONFIG_PATH";

const ENV_SCORING_POLICY: &str = "DAM_SCORING_POLICY";
const ENV_TAGGER_MODEL: &str = "DAM_TAGGER_MODEL";
const ENV_MAX_TEXT_CHARS: &str = "DAM_MAX_TEXT_CHARS";
const ENV_METRICS: &str = "DAM_METRICS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    pub name: String,
    pub version: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "DAM Cognitive Firewall API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    pub policy: ScoringPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSection {
    /// Tagger model JSON; a missing file starts the service in degraded mode.
    pub tagger_model: PathBuf,
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            tagger_model: PathBuf::from("models/en_tagger.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_text_chars: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_text_chars: 100_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Expose `/metrics` (Prometheus exposition).
    pub metrics: bool,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self { metrics: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamConfig {
    pub service: ServiceSection,
    pub scoring: ScoringSection,
    pub oracle: OracleSection,
    pub limits: LimitsSection,
    pub http: HttpSection,
}

impl DamConfig {
    /// Resolve the config file (see module docs) and apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::load_from(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: DamConfig = toml::from_str(s)?;
        if cfg.limits.max_text_chars == 0 {
            cfg.limits.max_text_chars = LimitsSection::default().max_text_chars;
        }
        Ok(cfg)
    }

    /// Apply overrides from `lookup` (normally the process env).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SCORING_POLICY) {
            match raw.parse::<ScoringPolicy>() {
                Ok(p) => self.scoring.policy = p,
                Err(e) => warn!(var = ENV_SCORING_POLICY, error = %e, "ignoring override"),
            }
        }
        if let Some(raw) = lookup(ENV_TAGGER_MODEL) {
            let t = raw.trim();
            if !t.is_empty() {
                self.oracle.tagger_model = PathBuf::from(t);
            }
        }
        if let Some(raw) = lookup(ENV_MAX_TEXT_CHARS) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.limits.max_text_chars = n,
                _ => warn!(var = ENV_MAX_TEXT_CHARS, value = %raw, "ignoring override"),
            }
        }
        if let Some(raw) = lookup(ENV_METRICS) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => self.http.metrics = true,
                "0" | "false" | "off" => self.http.metrics = false,
                _ => warn!(var = ENV_METRICS, value = %raw, "ignoring override"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = DamConfig::from_toml_str(
            r#"
            [scoring]
            policy = "subjectivity"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.scoring.policy, ScoringPolicy::Subjectivity);
        assert_eq!(cfg.oracle, OracleSection::default());
        assert!(cfg.http.metrics);
        assert_eq!(cfg.service.name, "DAM Cognitive Firewall API");
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = DamConfig::from_toml_str("[scoring]\npolicy = \"vibes\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("vibes") || format!("{err:#}").contains("variant"));
    }

    #[test]
    fn env_overrides_apply_and_invalid_values_are_ignored() {
        let mut cfg = DamConfig::default();
        cfg.apply_env_overrides(env_of(&[
            ("DAM_SCORING_POLICY", "a"),
            ("DAM_TAGGER_MODEL", "/opt/models/x.json"),
            ("DAM_MAX_TEXT_CHARS", "not-a-number"),
            ("DAM_METRICS", "off"),
        ]));
        assert_eq!(cfg.scoring.policy, ScoringPolicy::Subjectivity);
        assert_eq!(cfg.oracle.tagger_model, PathBuf::from("/opt/models/x.json"));
        assert_eq!(cfg.limits.max_text_chars, LimitsSection::default().max_text_chars);
        assert!(!cfg.http.metrics);

        cfg.apply_env_overrides(env_of(&[("DAM_SCORING_POLICY", "nonsense")]));
        assert_eq!(cfg.scoring.policy, ScoringPolicy::Subjectivity);
    }

    #[test]
    fn zero_max_chars_falls_back_to_default() {
        let cfg = DamConfig::from_toml_str("[limits]\nmax_text_chars = 0\n").unwrap();
        assert_eq!(cfg.limits.max_text_chars, 100_000);
    }

    #[test]
    fn bundled_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let cfg = DamConfig::load_from(&path).unwrap();
        assert_eq!(cfg.scoring.policy, ScoringPolicy::SpikeDivergence);
    }
}

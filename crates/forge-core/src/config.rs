use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Service directory, relative to the project root.
    #[serde(default = "default_service_dir")]
    pub dir: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_service_name() -> String {
    paths::DEFAULT_SERVICE_NAME.to_string()
}

fn default_service_dir() -> String {
    paths::DEFAULT_SERVICE_DIR.to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            dir: default_service_dir(),
            region: default_region(),
        }
    }
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Text-generation backend settings. Absent means "always use templates".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub model_id: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_endpoint() -> String {
    "https://bedrock-runtime.us-east-1.amazonaws.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_output_tokens() -> u32 {
    3000
}

fn default_temperature() -> f32 {
    0.2
}

impl BackendConfig {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            endpoint: default_endpoint(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

// ---------------------------------------------------------------------------
// TemplatesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory holding `spec_template.md` / `openapi_skeleton.yaml`
    /// overrides, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            service: ServiceConfig::default(),
            backend: None,
            templates: TemplatesConfig::default(),
        }
    }
}

impl Config {
    /// Load `.forge/config.yaml`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Load from disk, then apply process environment overrides.
    pub fn load_with_env(root: &Path) -> Result<Self> {
        let mut cfg = Self::load(root)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply environment overrides through `lookup`:
    ///
    /// - `FORGE_MODEL_ID`, falling back to `BEDROCK_MODEL_ID`: enables the
    ///   backend (or replaces its model id)
    /// - `FORGE_BACKEND_URL`: backend endpoint
    /// - `AWS_REGION`: service region
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty("FORGE_MODEL_ID").or_else(|| non_empty("BEDROCK_MODEL_ID"))
        {
            let backend = self
                .backend
                .get_or_insert_with(|| BackendConfig::new(model.as_str()));
            backend.model_id = model;
        }
        if let Some(url) = non_empty("FORGE_BACKEND_URL") {
            if let Some(b) = &mut self.backend {
                b.endpoint = url;
            }
        }
        if let Some(region) = non_empty("AWS_REGION") {
            self.service.region = region;
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.service.region.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "service.region is empty".to_string(),
            });
        }
        if self.service.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "service.name is empty".to_string(),
            });
        }
        if escapes_root(&self.service.dir) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "service.dir '{}' points outside the project root",
                    self.service.dir
                ),
            });
        }

        if let Some(backend) = &self.backend {
            if backend.model_id.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "backend.model_id is empty".to_string(),
                });
            }
            if backend.timeout_secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "backend.timeout_secs must be greater than 0".to_string(),
                });
            }
            if !(0.0..=1.0).contains(&backend.temperature) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "backend.temperature {} is outside 0.0..=1.0",
                        backend.temperature
                    ),
                });
            }
            if let Some(var) = &backend.api_key_env {
                if std::env::var(var).is_err() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "backend.api_key_env names '{var}', which is not set; requests will be unauthenticated"
                        ),
                    });
                }
            }
        }

        warnings
    }
}

fn escapes_root(dir: &str) -> bool {
    let p = Path::new(dir);
    p.is_absolute() || p.components().any(|c| matches!(c, Component::ParentDir))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, cfg);
        assert!(parsed.backend.is_none());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.service.name, "customer-alerts");
        assert_eq!(cfg.service.region, "us-east-1");
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.backend = Some(BackendConfig::new("anthropic.claude-3-5-sonnet"));
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_backend_section_gets_defaults() {
        let yaml = "backend:\n  model_id: m1\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let b = cfg.backend.unwrap();
        assert_eq!(b.timeout_secs, 120);
        assert_eq!(b.max_output_tokens, 3000);
    }

    #[test]
    fn env_model_id_enables_backend() {
        let vars = env(&[("BEDROCK_MODEL_ID", "legacy"), ("AWS_REGION", "eu-west-1")]);
        let mut cfg = Config::default();
        cfg.apply_env(|k| vars.get(k).cloned());
        assert_eq!(cfg.backend.as_ref().unwrap().model_id, "legacy");
        assert_eq!(cfg.service.region, "eu-west-1");
    }

    #[test]
    fn forge_model_id_wins_over_legacy() {
        let vars = env(&[
            ("BEDROCK_MODEL_ID", "legacy"),
            ("FORGE_MODEL_ID", "primary"),
            ("FORGE_BACKEND_URL", "http://localhost:8080"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_env(|k| vars.get(k).cloned());
        let b = cfg.backend.unwrap();
        assert_eq!(b.model_id, "primary");
        assert_eq!(b.endpoint, "http://localhost:8080");
    }

    #[test]
    fn env_model_id_replaces_configured_model() {
        let mut b = BackendConfig::new("from-file");
        b.timeout_secs = 30;
        let mut cfg = Config {
            backend: Some(b),
            ..Config::default()
        };
        let vars = env(&[("FORGE_MODEL_ID", "from-env")]);
        cfg.apply_env(|k| vars.get(k).cloned());
        let b = cfg.backend.unwrap();
        assert_eq!(b.model_id, "from-env");
        assert_eq!(b.timeout_secs, 30);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let vars = env(&[("FORGE_MODEL_ID", "  ")]);
        let mut cfg = Config::default();
        cfg.apply_env(|k| vars.get(k).cloned());
        assert!(cfg.backend.is_none());
    }

    #[test]
    fn validate_flags_bad_backend() {
        let mut cfg = Config::default();
        let mut b = BackendConfig::new("");
        b.timeout_secs = 0;
        b.temperature = 1.5;
        cfg.backend = Some(b);
        let warnings = cfg.validate();
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count(),
            2
        );
        assert!(warnings.iter().any(|w| w.message.contains("temperature")));
    }

    #[test]
    fn validate_flags_service_dir_outside_root() {
        let mut cfg = Config::default();
        cfg.service.dir = "../elsewhere".to_string();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }

    #[test]
    fn default_config_is_clean() {
        assert!(Config::default().validate().is_empty());
    }
}

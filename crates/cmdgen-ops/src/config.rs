//! Configuration for the operations layer.
//!
//! Controls where generated artifacts land and how they are named.

use std::path::{Component, Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &["base_path", "domain_dir", "schema_dir", "namespace", "listen"];

/// Project naming and path configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Project root all generated files live under.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Domain root, relative to `base_path`.
    #[serde(default = "default_domain_dir")]
    pub domain_dir: PathBuf,

    /// Directory for command schemas, relative to the domain root.
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Namespace of the generated PHP classes.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Address the hook service listens on.
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_domain_dir() -> PathBuf {
    PathBuf::from("src/Domain")
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("Api/_schema")
}

fn default_namespace() -> String {
    "App\\Domain".to_string()
}

fn default_listen() -> String {
    "127.0.0.1:3311".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            domain_dir: default_domain_dir(),
            schema_dir: default_schema_dir(),
            namespace: default_namespace(),
            listen: default_listen(),
        }
    }
}

impl Config {
    /// Configuration rooted at `base_path` with defaults for everything else.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the default config file with environment overrides.
    pub fn load() -> OpsResult<Self> {
        Self::load_from(Self::config_file_path().as_deref())
    }

    /// Load configuration from an explicit file (if it exists) with environment overrides.
    pub fn load_from(path: Option<&Path>) -> OpsResult<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        Ok(Self::load_file(path)?.with_env_overrides())
    }

    /// Load only what is stored in the file, without environment overrides.
    ///
    /// Use this before [`Config::save_to`] so overrides never get persisted.
    pub fn load_file(path: Option<&Path>) -> OpsResult<Self> {
        match path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&contents)?)
            }
            _ => Ok(Self::default()),
        }
    }

    fn with_env_overrides(self) -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        Self {
            base_path: env("CMDGEN_BASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(self.base_path),
            domain_dir: env("CMDGEN_DOMAIN_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.domain_dir),
            schema_dir: env("CMDGEN_SCHEMA_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.schema_dir),
            namespace: env("CMDGEN_NAMESPACE").unwrap_or(self.namespace),
            listen: env("CMDGEN_LISTEN").unwrap_or(self.listen),
        }
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> OpsResult<()> {
        match Self::config_file_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Save configuration to an explicit file.
    pub fn save_to(&self, path: &Path) -> OpsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "cmdgen", "cmdgen")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Domain root: `base_path/domain_dir`.
    pub fn domain_root(&self) -> PathBuf {
        self.base_path.join(&self.domain_dir)
    }

    /// Directory command schemas are generated into.
    pub fn schema_root(&self) -> PathBuf {
        self.domain_root().join(&self.schema_dir)
    }

    /// Express `path` relative to `base_path`, without a leading separator.
    ///
    /// Paths outside the base are returned unchanged.
    pub fn relative_to_base(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.base_path).unwrap_or(path);
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .collect();
        parts.join("/")
    }

    /// Check that the configured paths can be used for generation.
    pub fn validate(&self) -> OpsResult<()> {
        if self.domain_dir.is_absolute() {
            return Err(OpsError::Config(format!(
                "domain_dir must be relative to base_path, got {}",
                self.domain_dir.display()
            )));
        }
        if self.schema_dir.is_absolute() {
            return Err(OpsError::Config(format!(
                "schema_dir must be relative to the domain root, got {}",
                self.schema_dir.display()
            )));
        }
        for (key, dir) in [("domain_dir", &self.domain_dir), ("schema_dir", &self.schema_dir)] {
            if dir.components().any(|c| matches!(c, Component::ParentDir)) {
                return Err(OpsError::Config(format!(
                    "{} must not contain '..', got {}",
                    key,
                    dir.display()
                )));
            }
        }
        if self.namespace.trim().is_empty() {
            return Err(OpsError::Config("namespace must not be empty".to_string()));
        }
        Ok(())
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_path" => Some(self.base_path.display().to_string()),
            "domain_dir" => Some(self.domain_dir.display().to_string()),
            "schema_dir" => Some(self.schema_dir.display().to_string()),
            "namespace" => Some(self.namespace.clone()),
            "listen" => Some(self.listen.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> OpsResult<()> {
        match key {
            "base_path" => self.base_path = PathBuf::from(value),
            "domain_dir" => self.domain_dir = PathBuf::from(value),
            "schema_dir" => self.schema_dir = PathBuf::from(value),
            "namespace" => self.namespace = value.to_string(),
            "listen" => {
                value
                    .parse::<std::net::SocketAddr>()
                    .map_err(|_| OpsError::Config(format!("Invalid listen address: {}", value)))?;
                self.listen = value.to_string();
            }
            _ => {
                return Err(OpsError::Config(format!(
                    "Unknown config key: {}. Valid keys: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = Config::with_base_path("/project");
        assert_eq!(config.domain_root(), PathBuf::from("/project/src/Domain"));
        assert_eq!(
            config.schema_root(),
            PathBuf::from("/project/src/Domain/Api/_schema")
        );
    }

    #[test]
    fn test_relative_to_base_strips_prefix_and_separator() {
        let config = Config::with_base_path("/project");
        let schema = config.schema_root().join("PlaceOrder-schema.json");
        assert_eq!(
            config.relative_to_base(&schema),
            "src/Domain/Api/_schema/PlaceOrder-schema.json"
        );
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let mut config = Config::default();
        config.set("namespace", "Shop\\Domain").unwrap();
        assert_eq!(config.get("namespace").as_deref(), Some("Shop\\Domain"));

        assert!(config.set("listen", "not an address").is_err());
        assert!(config.set("unknown", "x").is_err());
        assert!(config.set("domain_dir", "/abs").is_err());
    }

    #[test]
    fn test_parent_dir_components_are_rejected() {
        let mut config = Config::default();
        assert!(config.set("domain_dir", "../shared/Domain").is_err());
        assert!(config.set("schema_dir", "Api/../../_schema").is_err());

        config.domain_dir = PathBuf::from("src/../Domain");
        assert!(matches!(config.validate(), Err(OpsError::Config(_))));

        config.domain_dir = PathBuf::from("./src/Domain");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file_reads_stored_values_only() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        assert_eq!(Config::load_file(Some(&path)).unwrap(), Config::default());

        Config::with_base_path("/srv/app").save_to(&path).unwrap();
        let stored = Config::load_file(Some(&path)).unwrap();
        assert_eq!(stored.base_path, PathBuf::from("/srv/app"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"base_path": "/srv/app"}"#).unwrap();
        assert_eq!(config.base_path, PathBuf::from("/srv/app"));
        assert_eq!(config.namespace, "App\\Domain");
    }
}

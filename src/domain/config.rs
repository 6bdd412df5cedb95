use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a blood bank data store.
///
/// Stored as `config.toml` in the data root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Prefix shared by every persisted document.
    ///
    /// Two stores with different namespaces can share a data root without
    /// seeing each other's records. The export file is named
    /// `{namespace}_export.json`.
    namespace: String,

    /// How many requests the "recent requests" view shows.
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The key prefix for persisted documents.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Sets the key prefix.
    ///
    /// Blank values are ignored; returns whether the namespace changed.
    pub fn set_namespace(&mut self, namespace: &str) -> bool {
        let namespace = namespace.trim();
        if namespace.is_empty() || namespace == self.namespace {
            false
        } else {
            self.namespace = namespace.to_string();
            true
        }
    }

    /// File name used when exporting the store.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        format!("{}_export.json", self.namespace)
    }
}

fn default_namespace() -> String {
    "bdi".to_string()
}

const fn default_recent_limit() -> usize {
    6
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_namespace")]
        namespace: String,

        #[serde(default = "default_recent_limit")]
        recent_limit: usize,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                namespace,
                recent_limit,
            } => Self {
                namespace,
                recent_limit,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            namespace: config.namespace,
            recent_limit: config.recent_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nnamespace = \"clinic\"\nrecent_limit = 10\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.namespace(), "clinic");
        assert_eq!(config.recent_limit, 10);
        assert_eq!(config.export_file_name(), "clinic_export.json");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nrecent_limit = \"six\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        assert!(config.set_namespace("ward7"));
        assert!(!config.set_namespace("  "));

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}

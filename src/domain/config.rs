use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Money;

/// Session configuration.
///
/// Holds the settings that are fixed for a session: who is writing reviews,
/// and the trip budget to start from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Name recorded as the author of reviews written in this session.
    author: String,

    /// Trip budget used when a seed file does not specify one.
    pub budget: Money,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author: default_author(),
            budget: default_budget(),
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

    /// The session author.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Sets the session author.
    ///
    /// Blank names fall back to the default author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        let author = author.into();
        self.author = if author.trim().is_empty() {
            default_author()
        } else {
            author
        };
    }
}

fn default_author() -> String {
    "Current User".to_string()
}

const fn default_budget() -> Money {
    Money::from_major(2000)
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_author")]
        author: String,

        #[serde(default = "default_budget")]
        budget: Money,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { author, budget } => {
                let mut config = Self {
                    author: String::new(),
                    budget,
                };
                config.set_author(author);
                config
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            author: config.author,
            budget: config.budget,
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
        file.write_all(b"_version = \"1\"\nauthor = \"Jane Smith\"\nbudget = \"3500.50\"\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.author(), "Jane Smith");
        assert_eq!(config.budget, Money::from_minor(350_050));
    }

    #[test]
    fn numeric_budget_is_accepted() {
        let config: Config = toml::from_str("_version = \"1\"\nbudget = 1500\n").unwrap();
        assert_eq!(config.budget, Money::from_major(1500));
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
        file.write_all(b"_version = \"1\"\nbudget = \"lots\"\n").unwrap();

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
    fn blank_author_falls_back_to_default() {
        let config: Config = toml::from_str("_version = \"1\"\nauthor = \"  \"\n").unwrap();
        assert_eq!(config.author(), "Current User");
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.set_author("Mike Johnson");
        config.budget = Money::from_minor(99_999);

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}

use std::path::Path;

use serde::Deserialize;

/// Engine configuration, read from an optional TOML file. `DATABASE_URL`
/// (and, in the binaries, `--database-url`) takes precedence over the file.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_database_url() -> String {
    ":memory:".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).unwrap_or_else(|e| {
                    panic!("could not read config {}: {e}", path.display())
                });
                toml::from_str(&raw).unwrap_or_else(|e| {
                    panic!("could not parse config {}: {e}", path.display())
                })
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_in_memory() {
        assert_eq!(EngineConfig::default().database_url, ":memory:");
    }

    #[test]
    fn parses_toml() {
        let config: EngineConfig =
            toml::from_str("database_url = \"podium.sqlite\"").unwrap();
        assert_eq!(config.database_url, "podium.sqlite");
    }
}

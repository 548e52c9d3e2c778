//! User configuration for markview, read from a TOML file.
//!
//! Every section is optional. Unknown keys are rejected so typos surface as
//! a config error instead of being silently ignored.
//!
//! ```toml
//! [log]
//! log-file = "/tmp/markview.log"
//! max-level = "trace"
//!
//! [render]
//! typographer = false
//! highlight-theme = "InspiredGitHub"
//! ```

use directories::ProjectDirs;
use markview_core::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path:?}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
    /// Specify the log file path.
    ///
    /// Logs go to stderr when unset.
    pub log_file: Option<String>,

    /// Specify the max log level.
    pub max_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            max_level: "debug".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Log configuration.
    pub log: LogConfig,

    /// Rendering options applied to every render.
    pub render: RenderOptions,
}

/// Default location of the config file.
///
/// Linux: ~/.config/markview/config.toml
/// macOS: ~/Library/Application\ Support/org.markview.markview/config.toml
/// Windows: ~\AppData\Roaming\markview\markview\config\config.toml
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("org", "markview", "markview")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads the config from `specified_config_file`, or from the default location.
///
/// A missing file is not an error. When the file exists but cannot be read
/// or parsed, the default config is returned together with the error so the
/// caller can report it and carry on.
pub fn load_config(specified_config_file: Option<&Path>) -> (Config, Option<ConfigError>) {
    let Some(config_file) = specified_config_file
        .map(Path::to_path_buf)
        .or_else(default_config_file)
    else {
        return (Config::default(), None);
    };

    match read_config(&config_file) {
        Ok(Some(config)) => {
            tracing::debug!(?config_file, "Loaded config");
            (config, None)
        }
        Ok(None) => (Config::default(), None),
        Err(err) => (Config::default(), Some(err)),
    }
}

fn read_config(config_file: &Path) -> Result<Option<Config>, ConfigError> {
    let contents = match std::fs::read_to_string(config_file) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: config_file.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Toml {
            path: config_file.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "markview_config_{}_{name}.toml",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("Failed to write temp config");
        path
    }

    #[test]
    fn test_load_config() {
        let toml_content = r#"
          [log]
          max-level = "trace"
          log-file = "/tmp/markview.log"

          [render]
          typographer = false
          line-map = true
          highlight-theme = "InspiredGitHub"
"#;
        let user_config: Config =
            toml::from_str(toml_content).expect("Failed to deserialize config");

        assert_eq!(
            user_config,
            Config {
                log: LogConfig {
                    log_file: Some("/tmp/markview.log".to_string()),
                    max_level: "trace".to_string(),
                },
                render: RenderOptions {
                    typographer: false,
                    line_map: true,
                    highlight_theme: Some("InspiredGitHub".to_string()),
                    ..Default::default()
                },
            }
        );
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        toml::to_string_pretty(&config).expect("Serialize config is okay");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<Config>("[render]\nsmartypants = true").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("markview_config_does_not_exist.toml");
        let (config, err) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert!(err.is_none());
    }

    #[test]
    fn test_malformed_file_reports_error() {
        let path = temp_config("malformed", "[log\nmax-level = ");
        let (config, err) = load_config(Some(&path));
        std::fs::remove_file(&path).ok();
        assert_eq!(config, Config::default());
        assert!(matches!(err, Some(ConfigError::Toml { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_config("valid", "[render]\ntables = false\n");
        let (config, err) = load_config(Some(&path));
        std::fs::remove_file(&path).ok();
        assert!(err.is_none());
        assert!(!config.render.tables);
        assert_eq!(config.log, LogConfig::default());
    }
}

//! Configuration loading with environment overlays.
//!
//! Settings come from `default.toml`, optionally overlaid by a named
//! environment document (`development.toml`, `production.toml`, ...). The
//! merge is shallow: an overlay key replaces the same-named top-level table
//! wholesale, never key-by-key. The merged document is validated against an
//! embedded schema before it is handed to the rest of the program, so every
//! consumer can rely on the required keys being present and well-typed.

use directories::ProjectDirs;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Validated, immutable runtime settings. Constructed once at startup and
/// passed by reference to every component that needs it.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub ollama: OllamaSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaSettings {
    /// Model identifier passed with every generate request.
    pub model: String,
    /// Backend address. Optional; `OLLAMA_HOST` takes precedence and the
    /// client falls back to the fixed local default when both are unset.
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by tracing-subscriber's `EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Fatal configuration failure. Aborts startup; never converted into a
/// user-facing "errors are data" string the way inference failures are.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Validation(Vec<String>),
    Deserialize(String),
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "could not read {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "could not parse {}: {source}", path.display())
            }
            ConfigError::Validation(errors) => {
                write!(f, "configuration failed schema validation: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            ConfigError::Deserialize(msg) => {
                write!(f, "configuration has an unexpected shape: {msg}")
            }
            ConfigError::NoConfigDir => {
                write!(f, "could not determine a configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Schema for the merged configuration document. `ollama.model` and
/// `logging.level` are the keys the rest of the program depends on.
static SCHEMA: LazyLock<serde_json::Value> = LazyLock::new(|| {
    serde_json::json!({
        "type": "object",
        "required": ["ollama", "logging"],
        "properties": {
            "ollama": {
                "type": "object",
                "required": ["model"],
                "properties": {
                    "model": { "type": "string" },
                    "host": { "type": "string" }
                }
            },
            "logging": {
                "type": "object",
                "required": ["level"],
                "properties": {
                    "level": {
                        "type": "string",
                        "enum": ["DEBUG", "INFO", "WARN", "ERROR"]
                    }
                }
            }
        }
    })
});

impl Settings {
    /// Load settings from the resolved configuration directory, applying the
    /// named environment overlay when one is given.
    pub fn load(environment: Option<&str>) -> Result<Settings, ConfigError> {
        Self::load_from_dir(&config_dir()?, environment)
    }

    /// Load from an explicit directory. Split out so tests can point at a
    /// temporary directory instead of the real one.
    pub fn load_from_dir(dir: &Path, environment: Option<&str>) -> Result<Settings, ConfigError> {
        let default_path = dir.join("default.toml");
        let mut merged = read_table(&default_path)?;

        if let Some(env) = environment {
            let overlay_path = dir.join(format!("{env}.toml"));
            if overlay_path.exists() {
                let overlay = read_table(&overlay_path)?;
                // Shallow merge: the overlay's top-level entries replace the
                // defaults' same-named entries wholesale. Nested tables are
                // NOT deep-merged; a key present only in the default's table
                // disappears when the overlay redefines that table.
                for (key, value) in overlay {
                    merged.insert(key, value);
                }
            } else {
                tracing::warn!(
                    environment = env,
                    path = %overlay_path.display(),
                    "no overlay file for environment, using defaults"
                );
            }
        }

        validate(&merged)?;

        toml::Value::Table(merged)
            .try_into::<Settings>()
            .map_err(|e| ConfigError::Deserialize(e.to_string()))
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    contents
        .parse::<toml::Table>()
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn validate(table: &toml::Table) -> Result<(), ConfigError> {
    let instance = serde_json::to_value(table)
        .map_err(|e| ConfigError::Deserialize(e.to_string()))?;

    let validator = jsonschema::validator_for(&SCHEMA)
        .map_err(|e| ConfigError::Validation(vec![e.to_string()]))?;

    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| format!("{}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors))
    }
}

/// Prefer a `config/` directory next to the working directory (the layout
/// this repository ships); fall back to the platform configuration dir.
fn config_dir() -> Result<PathBuf, ConfigError> {
    let local = PathBuf::from("config");
    if local.is_dir() {
        return Ok(local);
    }
    ProjectDirs::from("org", "permacommons", "ember")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigError::NoConfigDir)
}

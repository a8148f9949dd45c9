//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::DeployerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for loading configuration and deployment files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse failure in {}: {reason}", .path.display())]
    ParseFailure { path: PathBuf, reason: String },

    /// A field is missing or has the wrong kind.
    #[error("schema mismatch at `{field}`: {reason}")]
    SchemaMismatch { field: String, reason: String },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a file, separating "absent" from other I/O failures.
pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DeployerConfig, ConfigError> {
    let content = read_file(path)?;
    let config: DeployerConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseFailure {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

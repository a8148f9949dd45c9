//! Top-level error for a deployment run.

use thiserror::Error;

use crate::blockchain::{ChainBuildError, IdentityError, SubmissionError};
use crate::config::ConfigError;

/// Any failure that ends a run. Nothing is retried.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Build(#[from] ChainBuildError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl DeployError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::Config(_) => 2,
            DeployError::Identity(_) => 3,
            DeployError::Build(_) => 4,
            DeployError::Submission(SubmissionError::RemoteRejection { .. }) => 5,
            DeployError::Submission(_) => 6,
        }
    }
}

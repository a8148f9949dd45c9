//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! deployer.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI flag overrides (main.rs)
//!     → DeployerConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - `ConfigError` is shared with the deployment registry loader

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DeployerConfig, NetworkConfig, ObservabilityConfig, TransactionConfig};
pub use validation::{validate_config, ValidationError};

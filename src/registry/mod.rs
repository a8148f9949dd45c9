//! Deployment registry subsystem.
//!
//! # Data Flow
//! ```text
//! deployments.json
//!     → loader.rs (read & parse untyped JSON)
//!     → normalize.rs (`foo_bar` keys become `fooBar`, recursively)
//!     → schema.rs (strict typed decode, field path on failure)
//!     → DeploymentRegistry (read-only for the run)
//! ```

pub mod loader;
pub mod normalize;
pub mod schema;

pub use loader::{load, load_str};
pub use normalize::{normalize_key, normalize_keys, DuplicateKey};
pub use schema::{CoinRef, CoreDeployment, DeploymentRegistry, FeederDeployment, SymbolRef, VaultRef};

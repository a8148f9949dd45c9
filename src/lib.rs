//! ABEX price feed deployer library.
//!
//! Loads a protocol deployment registry, builds a programmable transaction
//! that verifies a price attestation and creates price feeds, then signs and
//! submits it to the selected network.

pub mod blockchain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod observability;
pub mod registry;

pub use config::schema::DeployerConfig;
pub use deploy::{run, DeployParams};
pub use error::DeployError;

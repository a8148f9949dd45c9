//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! secret key (base64)  → wallet.rs      (SigningIdentity)
//! network name         → network.rs     (EndpointSet)
//! move calls           → transaction.rs (CallChain, lowered to wire.rs commands)
//! chain + identity     → submit.rs      (resolve, sign, execute via client.rs)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or signatures
//! - Every RPC call is bounded by the configured timeout
//! - Nothing is retried; one chain is one submission

pub mod client;
pub mod network;
pub mod submit;
pub mod transaction;
pub mod type_tag;
pub mod types;
pub mod wallet;
pub mod wire;

pub use client::RpcClient;
pub use network::{resolve_endpoints, EndpointSet, Network};
pub use submit::{ReportOptions, SubmissionReceipt, Submitter};
pub use transaction::{Argument, CallChain, CallStep, MoveTarget, ResultHandle};
pub use type_tag::TypeTag;
pub use types::{
    Address, ChainBuildError, IdentityError, ObjectId, SubmissionError, CLOCK_OBJECT_ID,
};
pub use wallet::SigningIdentity;

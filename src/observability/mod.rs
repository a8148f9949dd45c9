//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (RPC and submission counters, latency histograms)
//!
//! Consumers:
//!     → Terminal or log aggregation (plain or JSON lines)
//!     → Prometheus-format snapshot logged at the end of a run
//! ```
//!
//! # Design Decisions
//! - stdout is reserved for the receipt; every log line goes to stderr
//! - Secret key material never appears in a log field
//! - Metric updates are no-ops unless a recorder is installed

pub mod logging;
pub mod metrics;

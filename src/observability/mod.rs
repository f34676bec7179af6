//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and engine produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

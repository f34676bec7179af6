//! Car pooling core.
//!
//! # Data Flow
//! ```text
//! PUT /cars      → engine.replace_fleet → registry + capacity index
//! POST /journey  → engine.request_journey
//!                    → capacity.find_at_least(people)
//!                    → seat in car | append to waiting queue
//! POST /dropoff  → engine.dropoff
//!                    → free seats on car → promote waiting groups onto it
//! POST /locate   → engine.locate (read lock only)
//! ```
//!
//! # Design Decisions
//! - The registry owns every record; the index and queue only hold ids
//! - One write lock per operation, so no half-applied update is observable
//! - Car selection is deterministic: tightest fit, then lowest id

pub mod capacity;
pub mod engine;
pub mod queue;
pub mod registry;
pub mod types;

use std::sync::Arc;
use tokio::sync::RwLock;

pub use engine::PoolingEngine;
pub use types::{
    CarId, CarSpec, Dropoff, GroupId, Journey, Location, PoolStats, PoolingError, PoolingResult,
};

/// Engine handle shared between request handlers.
pub type SharedEngine = Arc<RwLock<PoolingEngine>>;

/// Wrap an engine for sharing.
pub fn shared(engine: PoolingEngine) -> SharedEngine {
    Arc::new(RwLock::new(engine))
}

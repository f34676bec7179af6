//! Car Pooling Service Library
//!
//! Assigns groups of people to cars with free seats, keeps the groups that
//! could not be seated in arrival order, and moves them into cars as seats
//! free up.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pooling;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pooling::{PoolingEngine, SharedEngine};

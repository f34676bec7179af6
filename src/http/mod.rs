//! HTTP request layer.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request id, trace, limits)
//!     → handlers.rs (one handler per endpoint)
//!         → request.rs (content type, body, JSON / form decoding)
//!         → pooling engine (one operation under the shared lock)
//!     → response.rs (status codes and bodies for failures)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{AppState, HttpServer, X_REQUEST_ID};

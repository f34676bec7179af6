//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Semaphore};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::pooling::{self, PoolingEngine, SharedEngine};

/// Header carrying the request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Metrics label for requests that matched no route.
const UNMATCHED_PATH: &str = "unmatched";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
}

/// HTTP server for the pooling service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    engine: SharedEngine,
    limiter: Arc<Semaphore>,
}

impl HttpServer {
    /// Create a new HTTP server with an empty pool.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_engine(config, pooling::shared(PoolingEngine::new()))
    }

    /// Create a server around an existing engine handle.
    pub fn with_engine(config: ServiceConfig, engine: SharedEngine) -> Self {
        let state = AppState {
            engine: engine.clone(),
        };
        let limiter = Arc::new(Semaphore::new(config.listener.max_concurrent_requests));
        let router = Self::build_router(&config, state, limiter.clone());
        Self {
            router,
            config,
            engine,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState, limiter: Arc<Semaphore>) -> Router {
        Router::new()
            .route(
                "/status",
                get(handlers::status).fallback(handlers::method_not_allowed),
            )
            .route(
                "/cars",
                put(handlers::put_cars).fallback(handlers::method_not_allowed),
            )
            .route(
                "/journey",
                post(handlers::post_journey).fallback(handlers::method_not_allowed),
            )
            .route(
                "/dropoff",
                post(handlers::post_dropoff).fallback(handlers::method_not_allowed),
            )
            .route(
                "/locate",
                post(handlers::post_locate).fallback(handlers::method_not_allowed),
            )
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(middleware::from_fn_with_state(limiter, limit_concurrency))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the engine behind the handlers.
    pub fn engine(&self) -> SharedEngine {
        self.engine.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. Requests still waiting for a slot at that point are
    /// answered with 503.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_concurrent_requests = self.config.listener.max_concurrent_requests,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        let limiter = self.limiter;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                limiter.close();
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Bound the number of requests processed at once. Excess requests wait, and
/// fail once the limiter is closed.
async fn limit_concurrency(
    State(limiter): State<Arc<Semaphore>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let _permit = limiter.acquire().await.map_err(|_| ApiError::Unavailable)?;
    Ok(next.run(request).await)
}

/// Count requests and their latency per matched route.
async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &path, response.status().as_u16(), start);
    response
}

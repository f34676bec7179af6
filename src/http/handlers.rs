//! Endpoint handlers.
//!
//! Each handler validates and decodes its input, then runs exactly one engine
//! operation under the shared lock.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::request::{
    parse_fleet, parse_group_form, parse_journey, require_body, require_content_type,
    CONTENT_TYPE_FORM, CONTENT_TYPE_JSON,
};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::pooling::{CarId, Dropoff, GroupId, Journey, Location};

/// Body of a successful locate.
#[derive(Debug, Serialize)]
pub struct CarView {
    pub id: CarId,
    pub seats: u8,
}

/// `GET /status`
pub async fn status() -> StatusCode {
    StatusCode::OK
}

/// Fallback for every route hit with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// `PUT /cars`: replace the fleet and forget every group.
pub async fn put_cars(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_body(&body)?;
    require_content_type(&headers, CONTENT_TYPE_JSON)?;

    let mut engine = state.engine.write().await;
    let cars = match parse_fleet(&body) {
        Ok(cars) => cars,
        Err(e) => {
            // A rejected upload still replaces the previous fleet.
            engine.reset();
            metrics::record_pool(&engine.stats());
            return Err(e);
        }
    };
    let result = engine.replace_fleet(cars);
    metrics::record_pool(&engine.stats());
    result?;

    Ok(StatusCode::OK)
}

/// `POST /journey`: 200 when seated, 202 when queued.
pub async fn post_journey(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_body(&body)?;
    require_content_type(&headers, CONTENT_TYPE_JSON)?;
    let request = parse_journey(&body)?;

    let mut engine = state.engine.write().await;
    let journey = engine.request_journey(request.id, request.people);
    metrics::record_pool(&engine.stats());
    drop(engine);

    match journey {
        Ok(Journey::Seated(_)) => {
            metrics::record_journey("seated");
            Ok(StatusCode::OK)
        }
        Ok(Journey::Queued) => {
            metrics::record_journey("queued");
            Ok(StatusCode::ACCEPTED)
        }
        Err(e) => {
            metrics::record_journey("rejected");
            Err(e.into())
        }
    }
}

/// `POST /dropoff`: 200 for a finished ride, 204 for a group that never rode.
pub async fn post_dropoff(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let id = group_form(&headers, &body)?;

    let mut engine = state.engine.write().await;
    let dropoff = engine.dropoff(id)?;
    metrics::record_pool(&engine.stats());
    drop(engine);

    match dropoff {
        Dropoff::Completed { promoted, .. } => {
            metrics::record_promotions(promoted);
            Ok(StatusCode::OK)
        }
        Dropoff::Cancelled => Ok(StatusCode::NO_CONTENT),
    }
}

/// `POST /locate`: the car a group rides in, 204 while it waits.
pub async fn post_locate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut response = match locate(&state, &headers, &body).await {
        Ok(Location::Riding { car, seats }) => {
            (StatusCode::OK, Json(CarView { id: car, seats })).into_response()
        }
        Ok(Location::Waiting) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    };
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(CONTENT_TYPE_JSON),
    );
    response
}

async fn locate(state: &AppState, headers: &HeaderMap, body: &Bytes) -> Result<Location, ApiError> {
    let id = group_form(headers, body)?;
    let engine = state.engine.read().await;
    Ok(engine.locate(id)?)
}

fn group_form(headers: &HeaderMap, body: &Bytes) -> Result<GroupId, ApiError> {
    require_body(body)?;
    require_content_type(headers, CONTENT_TYPE_FORM)?;
    parse_group_form(body)
}

//! Request validation and decoding.
//!
//! # Responsibilities
//! - Enforce content type and non-empty bodies
//! - Decode fleets and journey requests from JSON, checking every field
//! - Decode the single `ID=<n>` form used by dropoff and locate
//!
//! # Design Decisions
//! - Fields are decoded as optional first so a missing field gets its own message
//! - Numeric ranges are checked here; the engine checks them again

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde::Deserialize;

use crate::http::response::ApiError;
use crate::pooling::types::{MAX_PEOPLE, MAX_SEATS, MIN_PEOPLE, MIN_SEATS};
use crate::pooling::{CarId, CarSpec, GroupId};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// A validated journey request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyRequest {
    pub id: GroupId,
    pub people: u8,
}

#[derive(Deserialize)]
struct RawCar {
    id: Option<u64>,
    seats: Option<u64>,
}

#[derive(Deserialize)]
struct RawGroup {
    id: Option<u64>,
    #[serde(alias = "People")]
    people: Option<u64>,
}

/// Reject empty bodies.
pub fn require_body(body: &Bytes) -> Result<(), ApiError> {
    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }
    Ok(())
}

/// Require `expected` as media type; parameters such as `charset` are ignored.
pub fn require_content_type(headers: &HeaderMap, expected: &'static str) -> Result<(), ApiError> {
    let matches = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(expected));

    if matches {
        Ok(())
    } else {
        Err(ApiError::ContentType(expected))
    }
}

/// Decode a `PUT /cars` body.
pub fn parse_fleet(body: &[u8]) -> Result<Vec<CarSpec>, ApiError> {
    let raw: Vec<RawCar> =
        serde_json::from_slice(body).map_err(|e| ApiError::BadJson(e.to_string()))?;

    raw.into_iter()
        .map(|car| {
            let (Some(id), Some(seats)) = (car.id, car.seats) else {
                return Err(bad_json("id and seats are required for all cars"));
            };
            if id == 0 {
                return Err(bad_json("id must be different from 0"));
            }
            if seats < u64::from(MIN_SEATS) {
                return Err(bad_json(format!("seats must be > {}", MIN_SEATS - 1)));
            }
            if seats > u64::from(MAX_SEATS) {
                return Err(bad_json(format!("seats must be < {}", MAX_SEATS + 1)));
            }
            Ok(CarSpec {
                id: CarId(id),
                seats: seats as u8,
            })
        })
        .collect()
}

/// Decode a `POST /journey` body.
pub fn parse_journey(body: &[u8]) -> Result<JourneyRequest, ApiError> {
    let raw: RawGroup =
        serde_json::from_slice(body).map_err(|e| ApiError::BadJson(e.to_string()))?;

    let (Some(id), Some(people)) = (raw.id, raw.people) else {
        return Err(bad_json("id and people are required for all groups"));
    };
    if id == 0 {
        return Err(bad_json("id must be different from 0"));
    }
    if people < u64::from(MIN_PEOPLE) {
        return Err(bad_json(format!(
            "number of people should be between {MIN_PEOPLE} or {MAX_PEOPLE}"
        )));
    }
    if people > u64::from(MAX_PEOPLE) {
        return Err(bad_json(format!(
            "number of people should be {MAX_PEOPLE} at most"
        )));
    }

    Ok(JourneyRequest {
        id: GroupId(id),
        people: people as u8,
    })
}

/// Decode the `ID=<n>` form body shared by dropoff and locate.
pub fn parse_group_form(body: &[u8]) -> Result<GroupId, ApiError> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(body).into_owned().collect();

    let first_key = pairs.first().map(|(k, _)| k.as_str());
    if pairs.iter().any(|(k, _)| Some(k.as_str()) != first_key) {
        return Err(ApiError::FormMultipleKeys);
    }
    match first_key {
        Some("ID") => {}
        _ => return Err(ApiError::FormInvalidKey),
    }
    if pairs.len() != 1 {
        return Err(ApiError::FormMultipleIds);
    }

    match pairs[0].1.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(GroupId(id)),
        _ => Err(ApiError::FormInvalidId),
    }
}

fn bad_json(reason: impl Into<String>) -> ApiError {
    ApiError::BadJson(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_content_type_matching() {
        assert!(require_content_type(&headers("application/json"), CONTENT_TYPE_JSON).is_ok());
        assert!(require_content_type(
            &headers("application/json; charset=utf-8"),
            CONTENT_TYPE_JSON
        )
        .is_ok());
        assert!(matches!(
            require_content_type(&headers(CONTENT_TYPE_FORM), CONTENT_TYPE_JSON),
            Err(ApiError::ContentType(CONTENT_TYPE_JSON))
        ));
        assert!(require_content_type(&HeaderMap::new(), CONTENT_TYPE_FORM).is_err());
    }

    #[test]
    fn test_parse_fleet() {
        let cars = parse_fleet(br#"[{"id": 1, "seats": 4}, {"id": 2, "seats": 6}]"#).unwrap();
        assert_eq!(
            cars,
            vec![
                CarSpec { id: CarId(1), seats: 4 },
                CarSpec { id: CarId(2), seats: 6 }
            ]
        );
        assert!(parse_fleet(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_fleet_rejections() {
        let cases: &[(&[u8], &str)] = &[
            (br#"[{"seats": 4}]"#, "id and seats are required for all cars"),
            (br#"[{"id": 4}]"#, "id and seats are required for all cars"),
            (br#"[{"id": 0, "seats": 4}]"#, "id must be different from 0"),
            (br#"[{"id": 4, "seats": 0}]"#, "seats must be > 3"),
            (br#"[{"id": 4, "seats": 7}]"#, "seats must be < 7"),
        ];
        for (body, reason) in cases {
            let err = parse_fleet(body).unwrap_err();
            assert_eq!(err.to_string(), format!("Bad Input(JSON) format, {reason}"));
        }
        assert!(matches!(parse_fleet(b"["), Err(ApiError::BadJson(_))));
    }

    #[test]
    fn test_parse_journey() {
        assert_eq!(
            parse_journey(br#"{"id": 2, "people": 4}"#).unwrap(),
            JourneyRequest {
                id: GroupId(2),
                people: 4
            }
        );
        assert!(parse_journey(br#"{"id": 2}"#).is_err());
        assert!(parse_journey(br#"{"people": 2}"#).is_err());
        assert!(parse_journey(b"{").is_err());
    }

    #[test]
    fn test_parse_journey_rejections() {
        let cases: &[(&[u8], &str)] = &[
            (br#"{"people": 4}"#, "id and people are required for all groups"),
            (br#"{"id": 2}"#, "id and people are required for all groups"),
            (br#"{"id": 0, "people": 4}"#, "id must be different from 0"),
            (br#"{"id": 2, "people": 0}"#, "number of people should be between 1 or 6"),
            (br#"{"id": 2, "people": 7}"#, "number of people should be 6 at most"),
        ];
        for (body, reason) in cases {
            let err = parse_journey(body).unwrap_err();
            assert_eq!(err.to_string(), format!("Bad Input(JSON) format, {reason}"));
        }
    }

    #[test]
    fn test_parse_group_form() {
        assert_eq!(parse_group_form(b"ID=7").unwrap(), GroupId(7));
        assert!(matches!(
            parse_group_form(b"ID=7&IDX=8"),
            Err(ApiError::FormMultipleKeys)
        ));
        assert!(matches!(
            parse_group_form(b"IDX=7"),
            Err(ApiError::FormInvalidKey)
        ));
        assert!(matches!(
            parse_group_form(b"ID=7&ID=8"),
            Err(ApiError::FormMultipleIds)
        ));
        assert!(matches!(
            parse_group_form(b"ID=X"),
            Err(ApiError::FormInvalidId)
        ));
        assert!(matches!(
            parse_group_form(b"ID=0"),
            Err(ApiError::FormInvalidId)
        ));
        assert!(matches!(
            parse_group_form(b"ID=-3"),
            Err(ApiError::FormInvalidId)
        ));
    }
}

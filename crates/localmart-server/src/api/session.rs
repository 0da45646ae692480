//! The browsing session's accepted location.

use axum::{extract::State, Extension, Json};
use localmart_core::LocationCandidate;
use localmart_discovery::{verify_and_accept, AcceptedLocation, LocationSession, SessionId};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, map_discovery_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SetLocationRequest {
    pub pincode: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearLocationResponse {
    pub cleared: bool,
}

fn validate_pincode<'a>(req_id: &str, pincode: &'a str) -> Result<&'a str, ApiError> {
    let pincode = pincode.trim();
    if pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit()) {
        Ok(pincode)
    } else {
        Err(ApiError::new(
            req_id,
            "validation_error",
            "pincode must be 6 digits",
        ))
    }
}

pub(super) async fn get_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<ApiResponse<Option<AcceptedLocation>>>, ApiError> {
    let data = LocationSession::new(&state.pool, session_id)
        .current()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Verify a pincode picked from the search results and accept it.
///
/// The candidate is re-read from the lookup table rather than trusted from
/// the request body.
pub(super) async fn set_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session_id): Extension<SessionId>,
    Json(body): Json<SetLocationRequest>,
) -> Result<Json<ApiResponse<AcceptedLocation>>, ApiError> {
    let pincode = validate_pincode(&req_id.0, &body.pincode)?;

    let candidate: LocationCandidate = localmart_db::get_active_pincode(&state.pool, pincode)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e.into()))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "location_not_found",
                format!("no active location with pincode {pincode}"),
            )
        })?
        .into();

    let session = LocationSession::new(&state.pool, session_id);
    let data = verify_and_accept(&state.pool, &session, candidate)
        .await
        .map_err(|e| map_discovery_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn clear_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<ApiResponse<ClearLocationResponse>>, ApiError> {
    let cleared = LocationSession::new(&state.pool, session_id)
        .invalidate()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(session = %session_id, cleared, "location cleared");
    Ok(Json(ApiResponse {
        data: ClearLocationResponse { cleared },
        meta: ResponseMeta::new(req_id.0),
    }))
}

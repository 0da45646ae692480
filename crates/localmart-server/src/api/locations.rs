use axum::{
    extract::{Query, State},
    Extension, Json,
};
use localmart_core::LocationCandidate;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_discovery_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct LocationSearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Candidate areas for a typed query. Under three characters the list is
/// empty and no lookup runs.
pub(super) async fn search_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationSearchQuery>,
) -> Result<Json<ApiResponse<Vec<LocationCandidate>>>, ApiError> {
    let data = localmart_discovery::resolve_location(&state.pool, &query.q)
        .await
        .map_err(|e| map_discovery_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use localmart_core::{CatalogFilters, SortOrder};
use localmart_discovery::{resolve_catalog, CatalogResolution, LocationSession, SessionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, map_discovery_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct CatalogParams {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub business_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CatalogResponse {
    /// Sequence number of this request within the session.
    pub request_seq: u64,
    #[serde(flatten)]
    pub resolution: CatalogResolution,
}

fn parse_filters(req_id: &str, params: CatalogParams) -> Result<CatalogFilters, ApiError> {
    let sort_order = match params.sort.as_deref().map(str::trim) {
        None | Some("") => SortOrder::default(),
        Some(raw) => raw
            .parse::<SortOrder>()
            .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))?,
    };

    for (name, value) in [("min_price", params.min_price), ("max_price", params.max_price)] {
        if value.is_some_and(|v| v.is_sign_negative()) {
            return Err(ApiError::new(
                req_id,
                "validation_error",
                format!("{name} must not be negative"),
            ));
        }
    }
    if let (Some(min), Some(max)) = (params.min_price, params.max_price) {
        if min > max {
            return Err(ApiError::new(
                req_id,
                "validation_error",
                "min_price must not exceed max_price",
            ));
        }
    }

    Ok(CatalogFilters {
        search_text: params.search,
        category_id: params.category_id,
        sub_category_id: params.sub_category_id,
        business_type: params.business_type,
        price_floor: params.min_price,
        price_ceiling: params.max_price,
        sort_order,
    })
}

/// Catalog for the session's accepted location, via the pincode → city →
/// unscoped cascade.
///
/// A newer catalog request from the same session cancels this one, which
/// then answers `superseded`.
pub(super) async fn list_catalog(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session_id): Extension<SessionId>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<ApiResponse<CatalogResponse>>, ApiError> {
    let filters = parse_filters(&req_id.0, params)?;

    let ticket = state.sequencer.begin(session_id).await;
    let request_seq = ticket.seq();

    let work = async {
        let accepted = LocationSession::new(&state.pool, session_id)
            .current()
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        resolve_catalog(&state.pool, accepted.as_ref(), &filters, &state.discovery)
            .await
            .map_err(|e| map_discovery_error(req_id.0.clone(), &e))
    };

    let Some(result) = ticket.run(work).await else {
        tracing::debug!(session = %session_id, request_seq, "catalog request superseded");
        return Err(ApiError::new(
            req_id.0,
            "superseded",
            "a newer catalog request replaced this one",
        ));
    };

    Ok(Json(ApiResponse {
        data: CatalogResponse {
            request_seq,
            resolution: result?,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

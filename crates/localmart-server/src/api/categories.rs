use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SubCategoryItem {
    id: i64,
    name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryItem {
    id: i64,
    name: String,
    sub_categories: Vec<SubCategoryItem>,
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CategoryItem>>>, ApiError> {
    let rows = localmart_db::list_categories_with_sub_categories(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e.into()))?;

    let data = rows
        .into_iter()
        .map(|row| CategoryItem {
            id: row.id,
            name: row.name,
            sub_categories: row
                .sub_categories
                .into_iter()
                .map(|sub| SubCategoryItem {
                    id: sub.id,
                    name: sub.name,
                })
                .collect(),
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

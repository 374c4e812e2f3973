//! Catalog search handler.

use axum::extract::{Json, State};
use axum::response::Response;
use serde::Deserialize;

use crate::error::Result;
use crate::response;
use crate::services::search::{SearchQuery, SearchService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    item_name: Option<String>,
    category_name: Option<String>,
    sku: Option<String>,
}

/// `POST /search`
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Response> {
    let items = SearchService::new(state.pool())
        .search(&SearchQuery {
            item_name: body.item_name,
            category_name: body.category_name,
            sku: body.sku,
        })
        .await?;

    Ok(response::success(items))
}

//! Configuration handlers
//!
//! Returns public configuration settings to the frontend

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::routes::ApiResponse;
use crate::state::AppState;

/// Public configuration response
#[derive(Debug, Serialize)]
pub struct PublicConfig {
    /// Default rows per list page
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    /// Largest page size the server accepts
    #[serde(rename = "maxPageSize")]
    pub max_page_size: u64,
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ApiResponse<PublicConfig>> {
    Json(ApiResponse::success(PublicConfig {
        page_size: state.config.console.page_size,
        max_page_size: state.config.console.max_page_size,
    }))
}

//! Post handlers

use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::dashboard::post::PostForm;
use crate::dashboard::{PostDashboard, TablePage};
use crate::entity::post;
use crate::error::AppResult;
use crate::handlers::PageQuery;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// GET /api/organization/t_post
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<ApiResponse<TablePage<post::Model>>> {
    let result: AppResult<TablePage<post::Model>> = async {
        let mut dashboard = PostDashboard::new(state.client(), state.page_size(query.page_size));
        dashboard.table.go_to(query.current());
        dashboard.reload().await?;
        Ok(dashboard.view())
    }
    .await;
    Json(ApiResponse::from_result(result))
}

/// POST /api/organization/t_post
pub async fn add_post(
    State(state): State<AppState>,
    Json(form): Json<PostForm>,
) -> Json<ApiResponse<post::Model>> {
    let mut dashboard = PostDashboard::new(state.client(), state.page_size(None));
    Json(ApiResponse::from_result(dashboard.create(form).await))
}

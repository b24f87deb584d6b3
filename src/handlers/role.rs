//! Role handlers

use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::dashboard::role::RoleForm;
use crate::dashboard::{RoleDashboard, TablePage};
use crate::entity::role;
use crate::error::AppResult;
use crate::handlers::PageQuery;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// GET /api/organization/t_role
pub async fn get_roles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<ApiResponse<TablePage<role::Model>>> {
    let result: AppResult<TablePage<role::Model>> = async {
        let mut dashboard = RoleDashboard::new(state.client(), state.page_size(query.page_size));
        dashboard.table.go_to(query.current());
        dashboard.reload().await?;
        Ok(dashboard.view())
    }
    .await;
    Json(ApiResponse::from_result(result))
}

/// POST /api/organization/t_role
pub async fn add_role(
    State(state): State<AppState>,
    Json(form): Json<RoleForm>,
) -> Json<ApiResponse<role::Model>> {
    let mut dashboard = RoleDashboard::new(state.client(), state.page_size(None));
    Json(ApiResponse::from_result(dashboard.create(form).await))
}

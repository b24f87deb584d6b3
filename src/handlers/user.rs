//! User handlers
//!
//! The paged user list with associations, and association replacement

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::association::{replace_associations, AssociationKind, ReplaceSummary};
use crate::dashboard::user::UserPage;
use crate::dashboard::UserDashboard;
use crate::entity::user;
use crate::error::AppResult;
use crate::handlers::PageQuery;
use crate::resource::RowId;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// Replace association request
#[derive(Debug, Deserialize)]
pub struct AssociationRequest {
    pub ids: Vec<i64>,
}

/// GET /api/organization/t_user
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<ApiResponse<UserPage>> {
    let result: AppResult<UserPage> = async {
        let mut dashboard = UserDashboard::new(state.client(), state.page_size(query.page_size));
        dashboard.table.go_to(query.current());
        dashboard.open().await?;
        Ok(dashboard.view())
    }
    .await;
    Json(ApiResponse::from_result(result))
}

/// PUT /api/organization/t_user/:id/associations/:kind
pub async fn replace_user_associations(
    State(state): State<AppState>,
    Path((user_id, kind)): Path<(String, AssociationKind)>,
    Json(req): Json<AssociationRequest>,
) -> Json<ApiResponse<ReplaceSummary>> {
    let result: AppResult<ReplaceSummary> = async {
        let client = state.client();
        client.get::<user::Entity>(&RowId::from(user_id.as_str())).await?;
        replace_associations(&client, &user_id, kind, req.ids).await
    }
    .await;
    match &result {
        Ok(_) => tracing::info!("Saved {} of user {}", kind.field(), user_id),
        Err(e) => tracing::error!("Failed to save {} of user {}: {}", kind.field(), user_id, e),
    }
    Json(ApiResponse::from_result(result))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use crate::config::Config;
    use crate::routes::create_router;
    use crate::state::AppState;
    use crate::testing::{call, memory_db, seed_role, seed_user};

    #[tokio::test]
    async fn test_user_page_and_association_replace() {
        let db = memory_db().await;
        seed_user(&db, "u-1", "alice", "alice@example.com").await;
        seed_role(&db, 1, "admin", "admin").await;
        seed_role(&db, 2, "auditor", "audit").await;
        let app = create_router(AppState::new(db, Config::default()));

        let (_, body) = call(
            &app,
            Method::PUT,
            "/api/organization/t_user/u-1/associations/role",
            Some(json!({"ids": [1, 2]})),
        )
        .await;
        assert_eq!(body["code"], true);
        assert_eq!(body["data"]["added"], json!([1, 2]));

        let (_, body) = call(
            &app,
            Method::PUT,
            "/api/organization/t_user/u-1/associations/role",
            Some(json!({"ids": [2, 3]})),
        )
        .await;
        assert_eq!(body["data"]["removed"], json!([1]));
        assert_eq!(body["data"]["selection"], json!([2, 3]));

        let (_, body) = call(&app, Method::GET, "/api/organization/t_user?pageSize=5", None).await;
        let page = &body["data"];
        assert_eq!(page["total"], 1);
        assert_eq!(page["associations"]["u-1"]["role_ids"], json!([2, 3]));
        assert_eq!(page["role_options"][0]["label"], "admin");
        assert_eq!(page["cells"][0]["cells"]["role_ids"]["mode"], "view");
        assert_eq!(page["cells"][0]["cells"]["role_ids"]["tags"][1]["label"], "3");
    }

    #[tokio::test]
    async fn test_replace_for_missing_user_is_refused() {
        let app = create_router(AppState::new(memory_db().await, Config::default()));
        let (_, body) = call(
            &app,
            Method::PUT,
            "/api/organization/t_user/ghost/associations/dept",
            Some(json!({"ids": [1]})),
        )
        .await;
        assert_eq!(body["code"], false);
    }
}

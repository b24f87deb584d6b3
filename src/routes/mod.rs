use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{AppError, AppResult};
use crate::handlers;
use crate::state::AppState;

pub mod health;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: false,
            message: message.into(),
            data: None,
        }
    }

    /// Wrap a handler result; failures carry the human-readable message
    pub fn from_result(result: AppResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn from_error(e: &AppError) -> Self {
        e.log();
        Self::error(e.user_message())
    }
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Config routes
        .route("/config", get(handlers::config::get_config))
        // Generic resource routes
        .route("/resources/:table", get(handlers::resource::list_resource))
        .route("/resources/:table/delete", post(handlers::resource::delete_resource))
        .route(
            "/resources/:table/:id",
            get(handlers::resource::get_resource).patch(handlers::resource::update_resource),
        )
        // User routes
        .route("/organization/t_user", get(handlers::user::get_users))
        .route(
            "/organization/t_user/:id/associations/:kind",
            put(handlers::user::replace_user_associations),
        )
        // Department routes
        .route(
            "/organization/t_dept",
            get(handlers::department::get_department_tree).post(handlers::department::add_department),
        )
        .route(
            "/organization/t_dept/:id",
            patch(handlers::department::update_department),
        )
        .route(
            "/organization/t_dept/:id/members",
            get(handlers::department::get_department_members),
        )
        // Post routes
        .route(
            "/organization/t_post",
            get(handlers::post::get_posts).post(handlers::post::add_post),
        )
        // Role routes
        .route(
            "/organization/t_role",
            get(handlers::role::get_roles).post(handlers::role::add_role),
        );

    Router::new()
        .nest("/api", api_routes)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Fallback handler for 404
pub async fn fallback() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Not Found")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    use crate::config::Config;
    use crate::testing::{call, memory_db};

    async fn app() -> Router {
        create_router(AppState::new(memory_db().await, Config::default()))
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["database"], true);

        let (status, body) = call(&app, Method::GET, "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], false);
        assert_eq!(body["message"], "Not Found");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_config_exposes_page_sizes() {
        let app = app().await;
        let (_, body) = call(&app, Method::GET, "/api/config", None).await;
        assert_eq!(body["data"]["pageSize"], 10);
        assert_eq!(body["data"]["maxPageSize"], 100);
    }

    #[test]
    fn test_error_wrapper_keeps_message() {
        let reply: ApiResponse<()> = ApiResponse::from_error(&AppError::Validation("请输入部门名称".to_string()));
        assert!(!reply.code);
        assert_eq!(reply.message, "请输入部门名称");
        assert!(reply.data.is_none());
    }
}

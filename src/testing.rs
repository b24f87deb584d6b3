//! Shared fixtures for database-backed tests

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

use crate::db::auto_migrate;
use crate::entity::{department, post, role, user};
use crate::resource::ResourceClient;

/// Fresh in-memory SQLite database with every table created
pub async fn memory_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // A second pooled connection would see a different in-memory database
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("sqlite memory db");
    auto_migrate(&db).await.expect("auto migrate");
    db
}

pub async fn memory_client() -> ResourceClient {
    ResourceClient::new(memory_db().await)
}

pub async fn seed_user(db: &DatabaseConnection, id: &str, nickname: &str, email: &str) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        user_id: Set(id.to_string()),
        user_nickname: Set(Some(nickname.to_string())),
        user_email: Set(Some(email.to_string())),
        user_phone: Set(None),
        user_gender: Set(Some("2".to_string())),
        user_status: Set(Some("0".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed user")
}

pub async fn seed_dept(db: &DatabaseConnection, id: i64, name: &str, parent: i64) -> department::Model {
    let now = Utc::now();
    department::ActiveModel {
        dept_id: Set(id),
        dept_name: Set(name.to_string()),
        dept_parent_id: Set(parent),
        dept_status: Set("0".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed dept")
}

pub async fn seed_post(db: &DatabaseConnection, id: i64, name: &str) -> post::Model {
    let now = Utc::now();
    post::ActiveModel {
        post_id: Set(id),
        post_name: Set(name.to_string()),
        post_status: Set("0".to_string()),
        post_remark: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed post")
}

pub async fn seed_role(db: &DatabaseConnection, id: i64, name: &str, key: &str) -> role::Model {
    let now = Utc::now();
    role::ActiveModel {
        role_id: Set(id),
        role_name: Set(name.to_string()),
        role_key: Set(key.to_string()),
        role_status: Set("0".to_string()),
        role_remark: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed role")
}

/// Send one request through the router and decode the JSON reply
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

//! Resource handlers
//!
//! Generic list / get / update / delete over the named tables

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::dashboard::department::dept_fields;
use crate::dashboard::post::post_fields;
use crate::dashboard::role::role_fields;
use crate::dashboard::user::user_fields;
use crate::editor::{validate_patch, FieldSpec};
use crate::entity::{department, post, role, user, user_dept, user_post, user_role};
use crate::error::{AppError, AppResult};
use crate::resource::{
    Filter, ListQuery, Pagination, PaginationMode, Resource, ResourceClient, RowId, SortOrder, Sorter,
    Table,
};
use crate::routes::ApiResponse;
use crate::state::AppState;

/// Query parameters for list
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub current: Option<u64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u64>,
    pub mode: Option<PaginationMode>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    /// JSON array of filters
    pub filter: Option<String>,
}

impl ListParams {
    pub fn into_query(self, state: &AppState) -> AppResult<ListQuery> {
        let filters: Vec<Filter> = match self.filter.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw)?,
            _ => Vec::new(),
        };
        let sorters = self
            .sort
            .map(|field| Sorter {
                field,
                order: self.order.unwrap_or_default(),
            })
            .into_iter()
            .collect();
        Ok(ListQuery {
            filters,
            sorters,
            pagination: Pagination {
                current: self.current.unwrap_or(1).max(1),
                page_size: state.page_size(self.page_size),
                mode: self.mode.unwrap_or_default(),
            },
        })
    }
}

/// Body of a delete request
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// Run a generic operation against the entity behind `$table`
macro_rules! with_entity {
    ($table:expr, $op:ident ( $($arg:expr),* )) => {
        match $table {
            Table::User => $op::<user::Entity>($($arg),*).await,
            Table::Dept => $op::<department::Entity>($($arg),*).await,
            Table::Post => $op::<post::Entity>($($arg),*).await,
            Table::Role => $op::<role::Entity>($($arg),*).await,
            Table::UserDept => $op::<user_dept::Entity>($($arg),*).await,
            Table::UserPost => $op::<user_post::Entity>($($arg),*).await,
            Table::UserRole => $op::<user_role::Entity>($($arg),*).await,
        }
    };
}

/// Field rules a patch of `table` must pass before it is written
fn fields_of(table: Table) -> Vec<FieldSpec> {
    match table {
        Table::User => user_fields(),
        Table::Dept => dept_fields(),
        Table::Post => post_fields(),
        Table::Role => role_fields(),
        Table::UserDept | Table::UserPost | Table::UserRole => Vec::new(),
    }
}

fn addressable(table: &str) -> AppResult<Table> {
    let table: Table = table.parse()?;
    if table.is_junction() {
        return Err(AppError::BadRequest(format!("{} 不支持按ID访问", table)));
    }
    Ok(table)
}

async fn list_rows<E>(client: &ResourceClient, query: &ListQuery) -> AppResult<JsonValue>
where
    E: Resource,
    E::Model: Serialize + Sync,
{
    let page = client.list::<E>(query).await?;
    Ok(serde_json::to_value(page)?)
}

async fn get_row<E>(client: &ResourceClient, raw_id: &str) -> AppResult<JsonValue>
where
    E: Resource,
    E::Model: Serialize,
{
    let id = RowId::parse::<E>(raw_id)?;
    Ok(serde_json::to_value(client.get::<E>(&id).await?)?)
}

async fn update_row<E>(client: &ResourceClient, raw_id: &str, patch: &Map<String, JsonValue>) -> AppResult<JsonValue>
where
    E: Resource,
    E::Model: Serialize,
{
    let id = RowId::parse::<E>(raw_id)?;
    client.update::<E>(&id, patch).await?;
    Ok(serde_json::to_value(client.get::<E>(&id).await?)?)
}

async fn delete_rows<E: Resource>(client: &ResourceClient, filters: &[Filter]) -> AppResult<JsonValue> {
    let deleted = client.delete::<E>(filters).await?;
    Ok(serde_json::to_value(DeleteResponse { deleted })?)
}

fn parse_body<T: DeserializeOwned>(body: JsonValue) -> AppResult<T> {
    Ok(serde_json::from_value(body)?)
}

/// GET /api/resources/:table
pub async fn list_resource(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<ListParams>,
) -> Json<ApiResponse<JsonValue>> {
    let result: AppResult<JsonValue> = async {
        let table: Table = table.parse()?;
        let query = params.into_query(&state)?;
        let client = state.client();
        with_entity!(table, list_rows(&client, &query))
    }
    .await;
    Json(ApiResponse::from_result(result))
}

/// GET /api/resources/:table/:id
pub async fn get_resource(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
) -> Json<ApiResponse<JsonValue>> {
    let result: AppResult<JsonValue> = async {
        let table = addressable(&table)?;
        let client = state.client();
        with_entity!(table, get_row(&client, &id))
    }
    .await;
    Json(ApiResponse::from_result(result))
}

/// PATCH /api/resources/:table/:id
pub async fn update_resource(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
    Json(body): Json<JsonValue>,
) -> Json<ApiResponse<JsonValue>> {
    let result: AppResult<JsonValue> = async {
        let table = addressable(&table)?;
        let patch: Map<String, JsonValue> = parse_body(body)?;
        let patch = validate_patch(&fields_of(table), &patch)?;
        let client = state.client();
        with_entity!(table, update_row(&client, &id, &patch))
    }
    .await;
    if let Err(e) = &result {
        tracing::warn!("Update of {} {} failed: {}", table, id, e);
    }
    Json(ApiResponse::from_result(result))
}

/// POST /api/resources/:table/delete
pub async fn delete_resource(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(req): Json<DeleteRequest>,
) -> Json<ApiResponse<JsonValue>> {
    let result: AppResult<JsonValue> = async {
        let table: Table = table.parse()?;
        let client = state.client();
        with_entity!(table, delete_rows(&client, &req.filters))
    }
    .await;
    Json(ApiResponse::from_result(result))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use crate::config::Config;
    use crate::routes::create_router;
    use crate::state::AppState;
    use crate::testing::{call, memory_db, seed_dept, seed_role, seed_user};

    #[tokio::test]
    async fn test_list_with_filter_and_paging() {
        let db = memory_db().await;
        for (id, name) in [(1, "总部"), (2, "研发部"), (3, "研发二部")] {
            seed_dept(&db, id, name, 0).await;
        }
        let app = create_router(AppState::new(db, Config::default()));

        let (_, body) = call(&app, Method::GET, "/api/resources/t_dept?current=2&pageSize=2", None).await;
        assert_eq!(body["data"]["total"], 3);
        assert_eq!(body["data"]["rows"][0]["dept_id"], 3);

        let filter = r#"[{"field":"dept_name","operator":"contains","value":"研发"}]"#;
        let uri = format!(
            "/api/resources/t_dept?sort=dept_id&order=desc&filter={}",
            filter
                .bytes()
                .map(|b| format!("%{:02X}", b))
                .collect::<String>()
        );
        let (_, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["rows"][0]["dept_id"], 3);

        let (_, body) = call(
            &app,
            Method::GET,
            "/api/resources/t_dept?current=18446744073709551615&pageSize=10",
            None,
        )
        .await;
        assert_eq!(body["code"], false);
        assert!(body["message"].as_str().unwrap().contains("页码超出范围"));

        let (_, body) = call(&app, Method::GET, "/api/resources/t_file", None).await;
        assert_eq!(body["code"], false);
        assert!(body["message"].as_str().unwrap().contains("未知的资源"));
    }

    #[tokio::test]
    async fn test_get_and_patch() {
        let db = memory_db().await;
        seed_role(&db, 1, "管理员", "admin").await;
        seed_user(&db, "42", "alice", "old@example.com").await;
        let app = create_router(AppState::new(db, Config::default()));

        let (_, body) = call(&app, Method::GET, "/api/resources/t_role/1", None).await;
        assert_eq!(body["data"]["role_key"], "admin");

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/resources/t_user/42",
            Some(json!({"user_email": "new@example.com"})),
        )
        .await;
        assert_eq!(body["code"], true);
        assert_eq!(body["data"]["user_email"], "new@example.com");

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/resources/t_user/42",
            Some(json!({"user_email": "not-an-email", "user_status": "9"})),
        )
        .await;
        assert_eq!(body["code"], false);
        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/resources/t_dept/1",
            Some(json!({"dept_status": "7"})),
        )
        .await;
        assert_eq!(body["code"], false);
        assert_eq!(body["message"], "状态的取值无效: 7");

        let (_, body) = call(&app, Method::GET, "/api/resources/t_user/42", None).await;
        assert_eq!(body["data"]["user_email"], "new@example.com");
        assert_eq!(body["data"]["user_status"], "0");

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/resources/t_role/9",
            Some(json!({"role_name": "x"})),
        )
        .await;
        assert_eq!(body["code"], false);

        let (_, body) = call(&app, Method::GET, "/api/resources/t_role/abc", None).await;
        assert_eq!(body["code"], false);

        let (_, body) = call(&app, Method::GET, "/api/resources/t_user_role/42", None).await;
        assert_eq!(body["code"], false);
    }

    #[tokio::test]
    async fn test_delete_requires_filters() {
        let db = memory_db().await;
        seed_role(&db, 1, "管理员", "admin").await;
        seed_role(&db, 2, "审计员", "audit").await;
        let app = create_router(AppState::new(db, Config::default()));

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/resources/t_role/delete",
            Some(json!({"filters": []})),
        )
        .await;
        assert_eq!(body["code"], false);

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/resources/t_role/delete",
            Some(json!({"filters": [{"field": "role_id", "value": 2}]})),
        )
        .await;
        assert_eq!(body["data"]["deleted"], 1);
    }
}

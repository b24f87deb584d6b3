//! Resource client
//!
//! Thin data-provider style access to the named organization tables:
//! list / get / update / insert / delete. Every failure is returned once to
//! the caller; nothing here retries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ColumnType, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IdenStatic, IntoActiveModel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait, Value,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::entity::{department, post, role, user, user_dept, user_post, user_role};
use crate::error::{AppError, AppResult, OptionExt};

const UPDATED_AT: &str = "updated_at";

/// Named tables reachable through the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    #[serde(rename = "t_user")]
    User,
    #[serde(rename = "t_dept")]
    Dept,
    #[serde(rename = "t_post")]
    Post,
    #[serde(rename = "t_role")]
    Role,
    #[serde(rename = "t_user_dept")]
    UserDept,
    #[serde(rename = "t_user_post")]
    UserPost,
    #[serde(rename = "t_user_role")]
    UserRole,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::User,
        Table::Dept,
        Table::Post,
        Table::Role,
        Table::UserDept,
        Table::UserPost,
        Table::UserRole,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::User => "t_user",
            Table::Dept => "t_dept",
            Table::Post => "t_post",
            Table::Role => "t_role",
            Table::UserDept => "t_user_dept",
            Table::UserPost => "t_user_post",
            Table::UserRole => "t_user_role",
        }
    }

    /// Junction tables have a composite key and are not addressable by a single id
    pub fn is_junction(self) -> bool {
        matches!(self, Table::UserDept | Table::UserPost | Table::UserRole)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| AppError::NotFound(format!("未知的资源: {}", s)))
    }
}

/// An entity the client knows how to address
pub trait Resource: EntityTrait {
    const TABLE: Table;

    /// Column used by `get` / `update` to address one row
    fn id_column() -> Self::Column;
}

impl Resource for user::Entity {
    const TABLE: Table = Table::User;

    fn id_column() -> Self::Column {
        user::Column::UserId
    }
}

impl Resource for department::Entity {
    const TABLE: Table = Table::Dept;

    fn id_column() -> Self::Column {
        department::Column::DeptId
    }
}

impl Resource for post::Entity {
    const TABLE: Table = Table::Post;

    fn id_column() -> Self::Column {
        post::Column::PostId
    }
}

impl Resource for role::Entity {
    const TABLE: Table = Table::Role;

    fn id_column() -> Self::Column {
        role::Column::RoleId
    }
}

impl Resource for user_dept::Entity {
    const TABLE: Table = Table::UserDept;

    fn id_column() -> Self::Column {
        user_dept::Column::UserId
    }
}

impl Resource for user_post::Entity {
    const TABLE: Table = Table::UserPost;

    fn id_column() -> Self::Column {
        user_post::Column::UserId
    }
}

impl Resource for user_role::Entity {
    const TABLE: Table = Table::UserRole;

    fn id_column() -> Self::Column {
        user_role::Column::UserId
    }
}

/// Row identifier: integer keys for departments/posts/roles, text for users
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl RowId {
    /// Parse a raw path segment according to the id column type of `E`
    pub fn parse<E: Resource>(raw: &str) -> AppResult<Self> {
        if is_integer(E::id_column().def().get_column_type()) {
            raw.trim()
                .parse::<i64>()
                .map(RowId::Int)
                .map_err(|_| AppError::Validation(format!("无效的ID: {}", raw)))
        } else {
            Ok(RowId::Text(raw.to_string()))
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{}", id),
            RowId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        RowId::Int(id)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        RowId::Text(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        RowId::Text(id)
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        match id {
            RowId::Int(id) => Value::from(id),
            RowId::Text(id) => Value::from(id),
        }
    }
}

/// Filter operators understood by `list` and `delete`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    #[default]
    Eq,
    Ne,
    In,
    Contains,
    Null,
    Nnull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: JsonValue,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Eq,
            value: value.into(),
        }
    }

    pub fn is_in<V: Into<JsonValue>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::In,
            value: JsonValue::Array(values.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorter {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Sorter {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    #[default]
    Server,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub current: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    #[serde(default)]
    pub mode: PaginationMode,
}

impl Pagination {
    /// Rows skipped before the current page; must fit a signed SQL offset
    pub fn offset(&self) -> AppResult<u64> {
        (self.current.max(1) - 1)
            .checked_mul(self.page_size.max(1))
            .filter(|offset| *offset <= i64::MAX as u64)
            .ok_or_else(|| AppError::Validation(format!("页码超出范围: {}", self.current)))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: 10,
            mode: PaginationMode::Server,
        }
    }
}

/// Filters, sorters and pagination for one `list` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub sorters: Vec<Sorter>,
    pub pagination: Pagination,
}

impl ListQuery {
    /// Unpaginated query returning every matching row
    pub fn all() -> Self {
        Self {
            pagination: Pagination {
                mode: PaginationMode::Off,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn page(current: u64, page_size: u64) -> Self {
        Self {
            pagination: Pagination {
                current,
                page_size,
                mode: PaginationMode::Server,
            },
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sorter(mut self, sorter: Sorter) -> Self {
        self.sorters.push(sorter);
        self
    }
}

/// One page of rows plus the total number of matching rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

/// Resource client over a SeaORM connection
#[derive(Clone, Debug)]
pub struct ResourceClient {
    db: DatabaseConnection,
}

impl ResourceClient {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn into_inner(self) -> DatabaseConnection {
        self.db
    }

    /// Start a transaction for multi-statement writes
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        Ok(self.db.begin().await?)
    }

    /// List rows matching `query`
    pub async fn list<E>(&self, query: &ListQuery) -> AppResult<Page<E::Model>>
    where
        E: Resource,
        E::Model: Sync,
    {
        let mut select = E::find().filter(condition::<E>(&query.filters)?);
        for sorter in &query.sorters {
            let column = resolve_column::<E>(&sorter.field)?;
            select = select.order_by(column, sorter.order.into());
        }
        if query.sorters.is_empty() {
            select = select.order_by(E::id_column(), Order::Asc);
        }

        match query.pagination.mode {
            PaginationMode::Off => {
                let rows = select.all(&self.db).await?;
                let total = rows.len() as u64;
                Ok(Page { rows, total })
            }
            PaginationMode::Server => {
                let offset = query.pagination.offset()?;
                let total = select.clone().count(&self.db).await?;
                let rows = select
                    .offset(offset)
                    .limit(query.pagination.page_size.max(1))
                    .all(&self.db)
                    .await?;
                Ok(Page { rows, total })
            }
        }
    }

    /// Fetch one row by id
    pub async fn get<E: Resource>(&self, id: &RowId) -> AppResult<E::Model> {
        E::find()
            .filter(E::id_column().eq(id.clone()))
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("{} 中不存在记录 {}", E::TABLE, id))
    }

    /// Apply a column -> value patch to one row with a single UPDATE.
    /// `updated_at` is stamped when the table has it and the patch does not set it.
    pub async fn update<E: Resource>(&self, id: &RowId, patch: &Map<String, JsonValue>) -> AppResult<u64> {
        if patch.is_empty() {
            return Err(AppError::Validation("没有需要保存的字段".to_string()));
        }

        let id_column = E::id_column();
        let mut stmt = E::update_many();
        for (field, value) in patch {
            let column = resolve_column::<E>(field)?;
            if column.as_str() == id_column.as_str() {
                return Err(AppError::Validation(format!("不能修改主键字段 {}", field)));
            }
            stmt = stmt.col_expr(column, Expr::value(to_db_value(&column, value)?));
        }
        if !patch.contains_key(UPDATED_AT) {
            if let Ok(column) = E::Column::from_str(UPDATED_AT) {
                stmt = stmt.col_expr(column, Expr::value(Value::from(Utc::now())));
            }
        }

        let result = stmt.filter(id_column.eq(id.clone())).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("{} 中不存在记录 {}", E::TABLE, id)));
        }

        tracing::debug!("Updated {} {} ({} fields)", E::TABLE, id, patch.len());
        Ok(result.rows_affected)
    }

    /// Bulk insert; an empty batch issues nothing
    pub async fn insert<E, A>(&self, rows: Vec<A>) -> AppResult<u64>
    where
        E: Resource,
        A: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<A>,
    {
        if rows.is_empty() {
            return Ok(0);
        }
        Ok(E::insert_many(rows).exec_without_returning(&self.db).await?)
    }

    /// Insert one row and return it with its generated key
    pub async fn create<A>(&self, row: A) -> AppResult<<A::Entity as EntityTrait>::Model>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        Ok(row.insert(&self.db).await?)
    }

    /// Delete every row matching `filters`; an empty filter list is refused
    pub async fn delete<E: Resource>(&self, filters: &[Filter]) -> AppResult<u64> {
        if filters.is_empty() {
            return Err(AppError::Validation("删除操作必须指定过滤条件".to_string()));
        }
        let result = E::delete_many()
            .filter(condition::<E>(filters)?)
            .exec(&self.db)
            .await?;
        tracing::debug!("Deleted {} rows from {}", result.rows_affected, E::TABLE);
        Ok(result.rows_affected)
    }
}

fn resolve_column<E: EntityTrait>(field: &str) -> AppResult<E::Column> {
    E::Column::from_str(field).map_err(|_| AppError::Validation(format!("未知字段: {}", field)))
}

fn is_integer(column_type: &ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::BigInteger | ColumnType::Integer | ColumnType::SmallInteger | ColumnType::TinyInteger
    )
}

fn condition<E: EntityTrait>(filters: &[Filter]) -> AppResult<Condition> {
    let mut cond = Condition::all();
    for filter in filters {
        let column = resolve_column::<E>(&filter.field)?;
        let expr = match filter.operator {
            FilterOperator::Eq => column.eq(to_db_value(&column, &filter.value)?),
            FilterOperator::Ne => column.ne(to_db_value(&column, &filter.value)?),
            FilterOperator::In => {
                let values = match &filter.value {
                    JsonValue::Array(items) => items
                        .iter()
                        .map(|v| to_db_value(&column, v))
                        .collect::<AppResult<Vec<_>>>()?,
                    other => vec![to_db_value(&column, other)?],
                };
                column.is_in(values)
            }
            FilterOperator::Contains => {
                let needle = match &filter.value {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                column.contains(needle.as_str())
            }
            FilterOperator::Null => column.is_null(),
            FilterOperator::Nnull => column.is_not_null(),
        };
        cond = cond.add(expr);
    }
    Ok(cond)
}

/// Convert a JSON value into a database value typed after the column
fn to_db_value<C: ColumnTrait>(column: &C, value: &JsonValue) -> AppResult<Value> {
    let invalid = || AppError::Validation(format!("字段 {} 的值无效: {}", column.as_str(), value));
    let column_type = column.def().get_column_type().clone();

    if is_integer(&column_type) {
        let number = match value {
            JsonValue::Null => None,
            JsonValue::Number(n) => Some(n.as_i64().ok_or_else(invalid)?),
            JsonValue::String(s) => Some(s.trim().parse::<i64>().map_err(|_| invalid())?),
            _ => return Err(invalid()),
        };
        return Ok(Value::from(number));
    }

    match column_type {
        ColumnType::TimestampWithTimeZone | ColumnType::Timestamp | ColumnType::DateTime => {
            let stamp = match value {
                JsonValue::Null => None,
                JsonValue::String(s) => Some(
                    DateTime::parse_from_rfc3339(s)
                        .map_err(|_| invalid())?
                        .with_timezone(&Utc),
                ),
                _ => return Err(invalid()),
            };
            Ok(Value::from(stamp))
        }
        _ => {
            let text = match value {
                JsonValue::Null => None,
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Number(n) => Some(n.to_string()),
                JsonValue::Bool(b) => Some(b.to_string()),
                _ => return Err(invalid()),
            };
            Ok(Value::from(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_client, seed_dept, seed_role, seed_user};
    use sea_orm::{DbBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn patch(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(table.name().parse::<Table>().unwrap(), table);
        }
        assert!(matches!("t_file".parse::<Table>(), Err(AppError::NotFound(_))));
        assert!(Table::UserRole.is_junction());
        assert!(!Table::Dept.is_junction());
    }

    #[test]
    fn test_row_id_parse_follows_id_column() {
        assert_eq!(RowId::parse::<department::Entity>("12").unwrap(), RowId::Int(12));
        assert!(RowId::parse::<department::Entity>("abc").is_err());
        assert_eq!(
            RowId::parse::<user::Entity>("9b2f").unwrap(),
            RowId::Text("9b2f".to_string())
        );
    }

    #[test]
    fn test_filter_deserialize_defaults_to_eq() {
        let filter: Filter = serde_json::from_value(json!({"field": "dept_name", "value": "研发"})).unwrap();
        assert_eq!(filter.operator, FilterOperator::Eq);
        let filter: Filter =
            serde_json::from_value(json!({"field": "role_id", "operator": "in", "value": [1, 2]})).unwrap();
        assert_eq!(filter, Filter::is_in("role_id", [1, 2]));
    }

    #[test]
    fn test_page_offset_overflow_is_rejected() {
        let page = |current, page_size| Pagination {
            current,
            page_size,
            mode: PaginationMode::Server,
        };
        assert_eq!(page(3, 10).offset().unwrap(), 20);
        assert_eq!(page(0, 10).offset().unwrap(), 0);
        assert!(matches!(page(u64::MAX, 10).offset(), Err(AppError::Validation(_))));
        assert!(matches!(page(u64::MAX / 2, 4).offset(), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_issues_exactly_one_statement() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let client = ResourceClient::new(db);

        let affected = client
            .update::<user::Entity>(&RowId::from("42"), &patch(json!({"user_email": "x@y.com"})))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let log = format!("{:?}", client.into_inner().into_transaction_log());
        assert_eq!(log.matches("UPDATE").count(), 1);
        assert!(log.contains("t_user"));
        assert!(log.contains("user_email"));
        assert!(log.contains("updated_at"));
        assert!(log.contains("x@y.com"));
        assert!(log.contains("42"));
        assert!(!log.contains("user_nickname"));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let client = memory_client().await;
        let result = client
            .update::<role::Entity>(&RowId::Int(7), &patch(json!({"role_name": "审计员"})))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_fields() {
        let client = memory_client().await;
        seed_role(client.conn(), 1, "管理员", "admin").await;

        let unknown = client
            .update::<role::Entity>(&RowId::Int(1), &patch(json!({"role_color": "red"})))
            .await;
        assert!(matches!(unknown, Err(AppError::Validation(_))));

        let key = client
            .update::<role::Entity>(&RowId::Int(1), &patch(json!({"role_id": 5})))
            .await;
        assert!(matches!(key, Err(AppError::Validation(_))));

        let empty = client.update::<role::Entity>(&RowId::Int(1), &Map::new()).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at_and_converts_types() {
        let client = memory_client().await;
        let before = seed_dept(client.conn(), 3, "研发部", 0).await;
        seed_dept(client.conn(), 1, "总部", 0).await;

        client
            .update::<department::Entity>(
                &RowId::Int(3),
                &patch(json!({"dept_parent_id": "1", "dept_status": 1})),
            )
            .await
            .unwrap();

        let after = client.get::<department::Entity>(&RowId::Int(3)).await.unwrap();
        assert_eq!(after.dept_parent_id, 1);
        assert_eq!(after.dept_status, "1");
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_pages() {
        let client = memory_client().await;
        for (id, name) in [(1, "总部"), (2, "研发部"), (3, "研发二部"), (4, "市场部")] {
            seed_dept(client.conn(), id, name, 0).await;
        }

        let page = client
            .list::<department::Entity>(
                &ListQuery::page(1, 2).with_sorter(Sorter {
                    field: "dept_id".to_string(),
                    order: SortOrder::Desc,
                }),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.rows.iter().map(|d| d.dept_id).collect::<Vec<_>>(), vec![4, 3]);

        let page = client
            .list::<department::Entity>(&ListQuery::page(2, 3))
            .await
            .unwrap();
        assert_eq!(page.rows.iter().map(|d| d.dept_id).collect::<Vec<_>>(), vec![4]);

        let found = client
            .list::<department::Entity>(&ListQuery::all().with_filter(Filter {
                field: "dept_name".to_string(),
                operator: FilterOperator::Contains,
                value: json!("研发"),
            }))
            .await
            .unwrap();
        assert_eq!(found.total, 2);

        let picked = client
            .list::<department::Entity>(&ListQuery::all().with_filter(Filter::is_in("dept_id", [1, 4])))
            .await
            .unwrap();
        assert_eq!(picked.rows.iter().map(|d| d.dept_id).collect::<Vec<_>>(), vec![1, 4]);

        let bad = client
            .list::<department::Entity>(&ListQuery::all().with_filter(Filter::eq("dept_color", "red")))
            .await;
        assert!(matches!(bad, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let client = memory_client().await;
        seed_user(client.conn(), "u-1", "alice", "alice@example.com").await;
        seed_user(client.conn(), "u-2", "bob", "bob@example.com").await;

        let alice = client.get::<user::Entity>(&RowId::from("u-1")).await.unwrap();
        assert_eq!(alice.user_nickname.as_deref(), Some("alice"));

        let missing = client.get::<user::Entity>(&RowId::from("u-9")).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let refused = client.delete::<user::Entity>(&[]).await;
        assert!(matches!(refused, Err(AppError::Validation(_))));

        let deleted = client
            .delete::<user::Entity>(&[Filter::eq("user_id", "u-2")])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        let rest = client.list::<user::Entity>(&ListQuery::all()).await.unwrap();
        assert_eq!(rest.total, 1);
    }

    #[tokio::test]
    async fn test_bulk_insert() {
        let client = memory_client().await;
        let inserted = client
            .insert::<user_role::Entity, user_role::ActiveModel>(Vec::new())
            .await
            .unwrap();
        assert_eq!(inserted, 0);

        let now = Utc::now();
        let rows = [1, 2]
            .into_iter()
            .map(|role_id| user_role::ActiveModel {
                user_id: sea_orm::Set("u-1".to_string()),
                role_id: sea_orm::Set(role_id),
                del_flag: sea_orm::Set("0".to_string()),
                created_at: sea_orm::Set(now),
                updated_at: sea_orm::Set(now),
            })
            .collect();
        let inserted = client.insert::<user_role::Entity, _>(rows).await.unwrap();
        assert_eq!(inserted, 2);

        let page = client
            .list::<user_role::Entity>(&ListQuery::all().with_filter(Filter::eq("user_id", "u-1")))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }
}

//! Dashboard views
//!
//! Server-side view controllers for the four organization lists. Each one
//! owns its list query, the loaded page, an inline editor and the notices
//! produced by its last actions.

pub mod department;
pub mod post;
pub mod role;
pub mod user;

pub use department::DepartmentDashboard;
pub use post::PostDashboard;
pub use role::RoleDashboard;
pub use user::UserDashboard;

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::{EntityTrait, ModelTrait, Value};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::editor::{Cell, FieldSpec, FieldValue, InlineEditor, OptionItem, SaveAction};
use crate::entity::code::Status;
use crate::error::{AppError, AppResult};
use crate::resource::{ListQuery, Page, Resource, ResourceClient, RowId};

pub const SAVED: &str = "保存成功";
pub const SAVE_FAILED: &str = "保存失败";
pub const CREATED: &str = "创建成功";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice carrying the backend message, or a generic one
    pub fn error(err: &AppError) -> Self {
        let message = err.user_message();
        Self {
            level: NoticeLevel::Error,
            message: if message.trim().is_empty() {
                SAVE_FAILED.to_string()
            } else {
                message
            },
        }
    }
}

/// Rendered cells of one row keyed by field name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub id: RowId,
    pub cells: BTreeMap<&'static str, Cell>,
}

/// Serializable snapshot of a table view
#[derive(Debug, Serialize)]
pub struct TablePage<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub cells: Vec<RenderedRow>,
    pub notices: Vec<Notice>,
}

/// A paged list of one resource with inline editing
pub struct TableView<E: Resource> {
    client: ResourceClient,
    pub query: ListQuery,
    pub editor: InlineEditor,
    page: Page<E::Model>,
    notices: Vec<Notice>,
}

impl<E> TableView<E>
where
    E: Resource,
    E::Model: Sync,
{
    pub fn new(client: ResourceClient, fields: Vec<FieldSpec>, query: ListQuery) -> Self {
        Self {
            client,
            query,
            editor: InlineEditor::new(fields),
            page: Page::default(),
            notices: Vec::new(),
        }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn rows(&self) -> &[E::Model] {
        &self.page.rows
    }

    pub fn total(&self) -> u64 {
        self.page.total
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn go_to(&mut self, current: u64) {
        self.query.pagination.current = current.max(1);
    }

    /// Refetch the current page
    pub async fn reload(&mut self) -> AppResult<()> {
        match self.client.list::<E>(&self.query).await {
            Ok(page) => {
                self.page = page;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", E::TABLE, e);
                self.notices.push(Notice::error(&e));
                Err(e)
            }
        }
    }

    pub fn row(&self, id: &RowId) -> Option<&E::Model> {
        self.page
            .rows
            .iter()
            .find(|row| row_id_of::<E>(row).as_ref() == Some(id))
    }

    /// Start editing a column of `row_id`, seeded with its current value
    pub async fn start_edit(&mut self, row_id: RowId, field: &str) -> AppResult<()> {
        let seed = match self.row(&row_id) {
            Some(row) => field_value::<E>(row, field),
            None => {
                let row = self.client.get::<E>(&row_id).await?;
                field_value::<E>(&row, field)
            }
        }
        .ok_or_else(|| AppError::Validation(format!("未知字段: {}", field)))?;
        self.editor.start(row_id, field, seed)
    }

    /// Take the active edit out of the editor, reporting an invalid context
    pub fn take_pending(&mut self) -> AppResult<(RowId, SaveAction)> {
        match self.editor.take_for_save() {
            Ok(pending) => Ok((pending.key.row_id.clone(), pending.action())),
            Err(e) => {
                self.notices.push(Notice::error(&e));
                Err(e)
            }
        }
    }

    /// Save the active edit as a column patch
    pub async fn save(&mut self) -> AppResult<()> {
        let (row_id, action) = self.take_pending()?;
        match action {
            SaveAction::Scalar(patch) => self.write_scalar(&row_id, &patch).await,
            SaveAction::Associations { kind, .. } => {
                let err = AppError::BadRequest(format!("{} 不支持{}关联", E::TABLE, kind.label()));
                self.finish(Err(err)).await
            }
        }
    }

    pub async fn write_scalar(&mut self, row_id: &RowId, patch: &Map<String, JsonValue>) -> AppResult<()> {
        let result = self.client.update::<E>(row_id, patch).await.map(|_| ());
        self.finish(result).await
    }

    /// Report the outcome of a write and refetch the page either way
    pub async fn finish(&mut self, result: AppResult<()>) -> AppResult<()> {
        self.finish_with(result, SAVED).await
    }

    /// Like `finish`, with a specific success message
    pub async fn finish_with(&mut self, result: AppResult<()>, saved: &str) -> AppResult<()> {
        match &result {
            Ok(()) => self.notices.push(Notice::success(saved)),
            Err(e) => {
                tracing::error!("Failed to save {}: {}", E::TABLE, e);
                self.notices.push(Notice::error(e));
            }
        }
        // a failed refetch leaves its own notice
        let _ = self.reload().await;
        result
    }

    /// Render every loaded row; `value_of` overrides values the row does not carry
    pub fn render_rows<'a, V, O>(&self, value_of: V, options_of: O) -> Vec<RenderedRow>
    where
        V: Fn(&E::Model, &FieldSpec) -> Option<FieldValue>,
        O: Fn(&FieldSpec) -> &'a [OptionItem],
    {
        self.page
            .rows
            .iter()
            .filter_map(|row| {
                let id = row_id_of::<E>(row)?;
                let cells = self
                    .editor
                    .fields()
                    .iter()
                    .map(|spec| {
                        let current = value_of(row, spec)
                            .or_else(|| field_value::<E>(row, spec.name))
                            .unwrap_or(FieldValue::Text(None));
                        (spec.name, self.editor.render_cell(&id, spec, &current, options_of(spec)))
                    })
                    .collect();
                Some(RenderedRow { id, cells })
            })
            .collect()
    }

    /// Render rows whose fields are all plain columns
    pub fn render(&self) -> Vec<RenderedRow> {
        self.render_rows(|_, _| None, |_: &FieldSpec| -> &'static [OptionItem] { &[] })
    }

    /// Snapshot with `cells`, draining the notices
    pub fn view_with(&mut self, cells: Vec<RenderedRow>) -> TablePage<E::Model> {
        TablePage {
            rows: self.page.rows.clone(),
            total: self.page.total,
            cells,
            notices: self.take_notices(),
        }
    }

    pub fn view(&mut self) -> TablePage<E::Model> {
        let cells = self.render();
        self.view_with(cells)
    }
}

/// Id of a loaded row
pub fn row_id_of<E: Resource>(row: &E::Model) -> Option<RowId> {
    match row.get(E::id_column()) {
        Value::BigInt(Some(id)) => Some(RowId::Int(id)),
        Value::Int(Some(id)) => Some(RowId::Int(id.into())),
        Value::String(Some(id)) => Some(RowId::Text(*id)),
        _ => None,
    }
}

/// Current value of a column as an editor value
pub fn field_value<E: EntityTrait>(row: &E::Model, field: &str) -> Option<FieldValue> {
    let column = E::Column::from_str(field).ok()?;
    let value = match row.get(column) {
        Value::String(text) => FieldValue::Text(text.map(|t| *t)),
        Value::BigInt(n) => FieldValue::Text(n.map(|n| n.to_string())),
        Value::Int(n) => FieldValue::Text(n.map(|n| n.to_string())),
        Value::ChronoDateTimeUtc(t) => FieldValue::Text(t.map(|t| t.to_rfc3339())),
        _ => FieldValue::Text(None),
    };
    Some(value)
}

/// Trimmed value of a required text input
pub fn required(value: &str, label: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("请输入{}", label)));
    }
    Ok(value.to_string())
}

/// Status code of a create form; forms start at "0"
pub fn status_or_default(value: Option<&str>, label: &str) -> AppResult<String> {
    match value.map(str::trim) {
        None => Ok(Status::default().code().to_string()),
        Some("") => Err(AppError::Validation(format!("请选择{}", label))),
        Some(code) => Status::from_code(code)
            .map(|s| s.code().to_string())
            .ok_or_else(|| AppError::Validation(format!("{}的取值无效: {}", label, code))),
    }
}

/// Optional text input; blank reads as absent
pub fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn format_created_at(created_at: Option<&DateTime<Utc>>) -> String {
    match created_at {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::post;
    use crate::testing::{memory_client, seed_post};
    use chrono::TimeZone;

    #[test]
    fn test_form_helpers() {
        assert_eq!(required("  研发部 ", "部门名称").unwrap(), "研发部");
        assert!(matches!(required(" ", "部门名称"), Err(AppError::Validation(_))));
        assert_eq!(status_or_default(None, "状态").unwrap(), "0");
        assert_eq!(status_or_default(Some("1"), "状态").unwrap(), "1");
        assert!(status_or_default(Some(""), "状态").is_err());
        assert!(status_or_default(Some("5"), "状态").is_err());
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" a ")), Some("a".to_string()));
    }

    #[test]
    fn test_format_created_at() {
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 0).unwrap();
        assert_eq!(format_created_at(Some(&t)), "2024-03-09 08:05:00");
        assert_eq!(format_created_at(None), "—");
    }

    #[test]
    fn test_error_notice_falls_back() {
        let notice = Notice::error(&AppError::Internal(String::new()));
        assert_eq!(notice.message, SAVE_FAILED);
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_row_helpers() {
        let client = memory_client().await;
        let row = seed_post(client.conn(), 8, "前端").await;
        assert_eq!(row_id_of::<post::Entity>(&row), Some(RowId::Int(8)));
        assert_eq!(
            field_value::<post::Entity>(&row, "post_name"),
            Some(FieldValue::text("前端"))
        );
        assert_eq!(
            field_value::<post::Entity>(&row, "post_remark"),
            Some(FieldValue::Text(None))
        );
        assert_eq!(field_value::<post::Entity>(&row, "nope"), None);
    }
}

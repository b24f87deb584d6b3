//! Role list

use chrono::Utc;
use sea_orm::{NotSet, Set};
use serde::Deserialize;

use super::{format_created_at, optional, required, status_or_default, Notice, TablePage, TableView, CREATED};
use crate::editor::{EditorKind, FieldSpec, FieldValue};
use crate::entity::role;
use crate::error::AppResult;
use crate::resource::{ListQuery, ResourceClient, RowId, Sorter};

pub fn role_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("role_name", "角色名称", EditorKind::Text),
        FieldSpec::new("role_key", "权限字符", EditorKind::Text),
        FieldSpec::new("role_status", "状态", EditorKind::status()),
        FieldSpec::new("role_remark", "备注", EditorKind::Text),
        FieldSpec::new("created_at", "创建时间", EditorKind::ReadOnly),
    ]
}

/// New role form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleForm {
    pub role_name: String,
    pub role_key: String,
    #[serde(default)]
    pub role_status: Option<String>,
    #[serde(default)]
    pub role_remark: Option<String>,
}

pub struct RoleDashboard {
    pub table: TableView<role::Entity>,
}

impl RoleDashboard {
    pub fn new(client: ResourceClient, page_size: u64) -> Self {
        let query = ListQuery::page(1, page_size).with_sorter(Sorter::asc("role_id"));
        Self {
            table: TableView::new(client, role_fields(), query),
        }
    }

    pub async fn reload(&mut self) -> AppResult<()> {
        self.table.reload().await
    }

    pub async fn start_edit(&mut self, role_id: i64, field: &str) -> AppResult<()> {
        self.table.start_edit(RowId::Int(role_id), field).await
    }

    pub fn set_buffer(&mut self, value: FieldValue) -> AppResult<()> {
        self.table.editor.set_buffer(value)
    }

    pub async fn save(&mut self) -> AppResult<()> {
        self.table.save().await
    }

    pub async fn create(&mut self, form: RoleForm) -> AppResult<role::Model> {
        let result = self.insert(&form).await;
        match &result {
            Ok(created) => {
                tracing::info!("Created role {} ({})", created.role_key, created.role_id);
                self.table.notify(Notice::success(CREATED));
                let _ = self.table.reload().await;
            }
            Err(e) => self.table.notify(Notice::error(e)),
        }
        result
    }

    async fn insert(&self, form: &RoleForm) -> AppResult<role::Model> {
        let name = required(&form.role_name, "角色名称")?;
        let key = required(&form.role_key, "权限字符")?;
        let status = status_or_default(form.role_status.as_deref(), "状态")?;
        let now = Utc::now();
        self.table
            .client()
            .create(role::ActiveModel {
                role_id: NotSet,
                role_name: Set(name),
                role_key: Set(key),
                role_status: Set(status),
                role_remark: Set(optional(form.role_remark.as_deref())),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .await
    }

    pub fn view(&mut self) -> TablePage<role::Model> {
        let cells = self.table.render_rows(
            |row, spec| {
                (spec.name == "created_at").then(|| FieldValue::text(format_created_at(Some(&row.created_at))))
            },
            |_: &FieldSpec| -> &'static [crate::editor::OptionItem] { &[] },
        );
        self.table.view_with(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Cell;
    use crate::error::AppError;
    use crate::testing::{memory_client, seed_role};

    #[tokio::test]
    async fn test_initial_sort_is_role_id_asc() {
        let client = memory_client().await;
        seed_role(client.conn(), 3, "auditor", "audit").await;
        seed_role(client.conn(), 1, "admin", "admin").await;
        let mut dashboard = RoleDashboard::new(client, 10);
        dashboard.reload().await.unwrap();

        let ids: Vec<i64> = dashboard.table.rows().iter().map(|r| r.role_id).collect();
        assert_eq!(ids, vec![1, 3]);

        let page = dashboard.view();
        let expected = format_created_at(Some(&page.rows[0].created_at));
        assert!(matches!(
            &page.cells[0].cells["created_at"],
            Cell::View { text, .. } if *text == expected
        ));
    }

    #[tokio::test]
    async fn test_created_at_is_not_editable() {
        let client = memory_client().await;
        seed_role(client.conn(), 1, "admin", "admin").await;
        let mut dashboard = RoleDashboard::new(client, 10);
        dashboard.reload().await.unwrap();
        assert!(dashboard.start_edit(1, "created_at").await.is_err());
    }

    #[tokio::test]
    async fn test_edit_key_and_create() {
        let client = memory_client().await;
        seed_role(client.conn(), 1, "admin", "admin").await;
        let mut dashboard = RoleDashboard::new(client, 10);
        dashboard.reload().await.unwrap();

        dashboard.start_edit(1, "role_key").await.unwrap();
        dashboard.set_buffer(FieldValue::text("root")).unwrap();
        dashboard.save().await.unwrap();
        assert_eq!(dashboard.table.rows()[0].role_key, "root");
        assert_eq!(dashboard.table.notices().last().unwrap(), &Notice::success(crate::dashboard::SAVED));

        let no_key = dashboard
            .create(RoleForm {
                role_name: "运维".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(no_key, Err(AppError::Validation(_))));

        let created = dashboard
            .create(RoleForm {
                role_name: "运维".to_string(),
                role_key: "ops".to_string(),
                role_status: Some("1".to_string()),
                role_remark: Some("值班".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.role_status, "1");
        assert_eq!(created.role_remark.as_deref(), Some("值班"));
        assert_eq!(dashboard.table.total(), 2);
        assert_eq!(dashboard.table.notices().last().unwrap(), &Notice::success(CREATED));
    }
}

//! Post list

use chrono::Utc;
use sea_orm::{NotSet, Set};
use serde::Deserialize;

use super::{optional, required, status_or_default, Notice, TablePage, TableView, CREATED};
use crate::editor::{EditorKind, FieldSpec, FieldValue};
use crate::entity::post;
use crate::error::AppResult;
use crate::resource::{ListQuery, ResourceClient, RowId};

pub fn post_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("post_name", "岗位名称", EditorKind::Text),
        FieldSpec::new("post_status", "状态", EditorKind::status()),
        FieldSpec::new("post_remark", "备注", EditorKind::Text),
    ]
}

/// New post form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    pub post_name: String,
    #[serde(default)]
    pub post_status: Option<String>,
    #[serde(default)]
    pub post_remark: Option<String>,
}

pub struct PostDashboard {
    pub table: TableView<post::Entity>,
}

impl PostDashboard {
    pub fn new(client: ResourceClient, page_size: u64) -> Self {
        Self {
            table: TableView::new(client, post_fields(), ListQuery::page(1, page_size)),
        }
    }

    pub async fn reload(&mut self) -> AppResult<()> {
        self.table.reload().await
    }

    pub async fn start_edit(&mut self, post_id: i64, field: &str) -> AppResult<()> {
        self.table.start_edit(RowId::Int(post_id), field).await
    }

    pub fn set_buffer(&mut self, value: FieldValue) -> AppResult<()> {
        self.table.editor.set_buffer(value)
    }

    pub async fn save(&mut self) -> AppResult<()> {
        self.table.save().await
    }

    pub async fn create(&mut self, form: PostForm) -> AppResult<post::Model> {
        let result = self.insert(&form).await;
        match &result {
            Ok(created) => {
                tracing::info!("Created post {} ({})", created.post_name, created.post_id);
                self.table.notify(Notice::success(CREATED));
                let _ = self.table.reload().await;
            }
            Err(e) => self.table.notify(Notice::error(e)),
        }
        result
    }

    async fn insert(&self, form: &PostForm) -> AppResult<post::Model> {
        let name = required(&form.post_name, "岗位名称")?;
        let status = status_or_default(form.post_status.as_deref(), "状态")?;
        let now = Utc::now();
        self.table
            .client()
            .create(post::ActiveModel {
                post_id: NotSet,
                post_name: Set(name),
                post_status: Set(status),
                post_remark: Set(optional(form.post_remark.as_deref())),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .await
    }

    pub fn view(&mut self) -> TablePage<post::Model> {
        self.table.view()
    }
}

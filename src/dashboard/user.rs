//! User list
//!
//! Paged users with their department/post/role associations, inline editing
//! of scalar columns and association multi-selects, and the create form.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{optional, required, Notice, RenderedRow, TableView, CREATED, SAVED};
use crate::association::{
    replace_associations, replace_associations_in, AssociationKind, AssociationStore, Associations,
};
use crate::editor::{is_email, EditorKind, FieldSpec, FieldValue, OptionItem, SaveAction};
use crate::entity::code::{Gender, Status};
use crate::entity::{department, post, role, user};
use crate::error::{AppError, AppResult};
use crate::resource::{ListQuery, ResourceClient, RowId, Sorter};

pub fn user_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("user_nickname", "昵称", EditorKind::Text),
        FieldSpec::new("user_email", "邮箱", EditorKind::Email),
        FieldSpec::new("user_phone", "手机号", EditorKind::Text),
        FieldSpec::new("user_gender", "性别", EditorKind::gender()),
        FieldSpec::new("user_status", "状态", EditorKind::status()),
        FieldSpec::new("dept_ids", "部门", EditorKind::MultiSelect(AssociationKind::Dept)),
        FieldSpec::new("post_ids", "岗位", EditorKind::MultiSelect(AssociationKind::Post)),
        FieldSpec::new("role_ids", "角色", EditorKind::MultiSelect(AssociationKind::Role)),
    ]
}

/// New user form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    pub user_nickname: String,
    pub user_email: String,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub user_gender: Option<String>,
    #[serde(default)]
    pub dept_ids: Vec<i64>,
    #[serde(default)]
    pub post_ids: Vec<i64>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// Serializable snapshot of the user list
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub rows: Vec<user::Model>,
    pub total: u64,
    pub associations: HashMap<String, Associations>,
    pub cells: Vec<RenderedRow>,
    pub dept_options: Vec<OptionItem>,
    pub post_options: Vec<OptionItem>,
    pub role_options: Vec<OptionItem>,
    pub notices: Vec<Notice>,
}

pub struct UserDashboard {
    pub table: TableView<user::Entity>,
    pub associations: AssociationStore,
    dept_options: Vec<OptionItem>,
    post_options: Vec<OptionItem>,
    role_options: Vec<OptionItem>,
}

impl UserDashboard {
    pub fn new(client: ResourceClient, page_size: u64) -> Self {
        Self {
            table: TableView::new(client, user_fields(), ListQuery::page(1, page_size)),
            associations: AssociationStore::new(),
            dept_options: Vec::new(),
            post_options: Vec::new(),
            role_options: Vec::new(),
        }
    }

    /// Load option lists and the first page
    pub async fn open(&mut self) -> AppResult<()> {
        self.load_options().await?;
        self.reload().await
    }

    /// Department, post and role option lists, each ordered by name
    pub async fn load_options(&mut self) -> AppResult<()> {
        let client = self.table.client().clone();

        let depts = client
            .list::<department::Entity>(&ListQuery::all().with_sorter(Sorter::asc("dept_name")))
            .await?;
        self.dept_options = depts
            .rows
            .into_iter()
            .map(|d| OptionItem {
                value: d.dept_id,
                label: d.dept_name,
            })
            .collect();

        let posts = client
            .list::<post::Entity>(&ListQuery::all().with_sorter(Sorter::asc("post_name")))
            .await?;
        self.post_options = posts
            .rows
            .into_iter()
            .map(|p| OptionItem {
                value: p.post_id,
                label: p.post_name,
            })
            .collect();

        let roles = client
            .list::<role::Entity>(&ListQuery::all().with_sorter(Sorter::asc("role_name")))
            .await?;
        self.role_options = roles
            .rows
            .into_iter()
            .map(|r| OptionItem {
                value: r.role_id,
                label: r.role_name,
            })
            .collect();

        Ok(())
    }

    pub fn options(&self, kind: AssociationKind) -> &[OptionItem] {
        match kind {
            AssociationKind::Dept => &self.dept_options,
            AssociationKind::Post => &self.post_options,
            AssociationKind::Role => &self.role_options,
        }
    }

    pub fn visible_ids(&self) -> Vec<String> {
        self.table.rows().iter().map(|u| u.user_id.clone()).collect()
    }

    /// Refetch the page, then the associations of the users on it
    pub async fn reload(&mut self) -> AppResult<()> {
        self.table.reload().await?;
        self.refresh_associations().await
    }

    async fn refresh_associations(&mut self) -> AppResult<()> {
        let ids = self.visible_ids();
        if let Err(e) = self.associations.refresh(self.table.client(), &ids).await {
            tracing::error!("Failed to load user associations: {}", e);
            self.table.notify(Notice::error(&e));
            return Err(e);
        }
        Ok(())
    }

    pub async fn start_edit(&mut self, user_id: &str, field: &str) -> AppResult<()> {
        match AssociationKind::from_field(field) {
            Some(kind) => {
                let ids = self
                    .associations
                    .ids_for(self.table.client(), user_id, kind)
                    .await?;
                self.table
                    .editor
                    .start(RowId::from(user_id), field, FieldValue::ids(ids))
            }
            None => self.table.start_edit(RowId::from(user_id), field).await,
        }
    }

    pub fn set_buffer(&mut self, value: FieldValue) -> AppResult<()> {
        self.table.editor.set_buffer(value)
    }

    pub fn cancel(&mut self) {
        self.table.editor.cancel();
    }

    /// Write the active edit, report the outcome and refetch
    pub async fn save(&mut self) -> AppResult<()> {
        let (row_id, action) = self.table.take_pending()?;
        let user_id = row_id.to_string();

        let (result, saved) = match action {
            SaveAction::Scalar(patch) => {
                let result = self
                    .table
                    .client()
                    .update::<user::Entity>(&row_id, &patch)
                    .await
                    .map(|_| ());
                (result, SAVED)
            }
            SaveAction::Associations { kind, ids } => {
                let result = replace_associations(self.table.client(), &user_id, kind, ids)
                    .await
                    .map(|summary| self.associations.record(&user_id, kind, summary.selection));
                (result, kind.saved_message())
            }
        };

        let result = self.table.finish_with(result, saved).await;
        let _ = self.refresh_associations().await;
        result
    }

    /// Validate and insert a new user with its initial associations
    pub async fn create(&mut self, form: UserForm) -> AppResult<user::Model> {
        let result = self.insert_user(form).await;
        match &result {
            Ok(created) => {
                tracing::info!("Created user {}", created.user_id);
                self.table.notify(Notice::success(CREATED));
                let _ = self.reload().await;
            }
            Err(e) => self.table.notify(Notice::error(e)),
        }
        result
    }

    async fn insert_user(&mut self, form: UserForm) -> AppResult<user::Model> {
        let nickname = required(&form.user_nickname, "昵称")?;
        let email = required(&form.user_email, "邮箱")?;
        if !is_email(&email) {
            return Err(AppError::Validation("邮箱格式不正确".to_string()));
        }
        let gender = match optional(form.user_gender.as_deref()) {
            None => Gender::Unknown,
            Some(code) => match code.as_str() {
                "0" => Gender::Male,
                "1" => Gender::Female,
                "2" => Gender::Unknown,
                _ => return Err(AppError::Validation(format!("性别的取值无效: {}", code))),
            },
        };

        let now = Utc::now();
        let txn = self.table.client().begin().await?;
        let created = user::ActiveModel {
            user_id: Set(Uuid::new_v4().to_string()),
            user_nickname: Set(Some(nickname)),
            user_email: Set(Some(email)),
            user_phone: Set(optional(form.user_phone.as_deref())),
            user_gender: Set(Some(gender.code().to_string())),
            user_status: Set(Some(Status::Normal.code().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut saved = Vec::new();
        for (kind, ids) in [
            (AssociationKind::Dept, form.dept_ids),
            (AssociationKind::Post, form.post_ids),
            (AssociationKind::Role, form.role_ids),
        ] {
            if ids.is_empty() {
                continue;
            }
            let summary = replace_associations_in(&txn, &created.user_id, kind, ids).await?;
            saved.push((kind, summary.selection));
        }
        txn.commit().await?;

        for (kind, selection) in saved {
            self.associations.record(&created.user_id, kind, selection);
        }
        Ok(created)
    }

    pub fn render(&self) -> Vec<RenderedRow> {
        self.table.render_rows(
            |row, spec| match spec.kind {
                EditorKind::MultiSelect(kind) => Some(FieldValue::ids(
                    self.associations
                        .get(&row.user_id)
                        .map(|a| a.get(kind).iter().copied().collect::<Vec<_>>())
                        .unwrap_or_default(),
                )),
                _ => None,
            },
            |spec| match spec.kind {
                EditorKind::MultiSelect(kind) => self.options(kind),
                _ => &[],
            },
        )
    }

    pub fn view(&mut self) -> UserPage {
        let associations = self
            .table
            .rows()
            .iter()
            .map(|u| {
                let entry = self.associations.get(&u.user_id).cloned().unwrap_or_default();
                (u.user_id.clone(), entry)
            })
            .collect();
        UserPage {
            rows: self.table.rows().to_vec(),
            total: self.table.total(),
            associations,
            cells: self.render(),
            dept_options: self.dept_options.clone(),
            post_options: self.post_options.clone(),
            role_options: self.role_options.clone(),
            notices: self.table.take_notices(),
        }
    }
}

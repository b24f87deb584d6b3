//! Department tree
//!
//! All departments are loaded at once and shown as a tree with status tags
//! and member counts. Editing goes through a side form for the selected
//! node instead of inline cells.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{required, status_or_default, Notice, CREATED, SAVED};
use crate::association::member_counts;
use crate::editor::{EditorKind, FieldSpec, OptionItem, Tag};
use crate::entity::code::{Status, DEL_FLAG_LIVE};
use crate::entity::{department, user, user_dept};
use crate::error::{AppError, AppResult};
use crate::resource::{Filter, ListQuery, ResourceClient, RowId};
use crate::tree::{build_forest, Forest, TreeItem, TreeNode, TreeReport};

pub const NO_PARENT: &str = "无";

/// Column rules for department patches
pub fn dept_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("dept_name", "部门名称", EditorKind::Text),
        FieldSpec::new("dept_status", "状态", EditorKind::status()),
    ]
}

/// Tree node shown for one department
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeptNode {
    pub dept_id: i64,
    pub dept_name: String,
    pub dept_parent_id: i64,
    pub dept_status: String,
    pub status: Tag,
    pub member_count: u64,
}

impl TreeItem for DeptNode {
    fn id(&self) -> i64 {
        self.dept_id
    }

    fn parent_id(&self) -> i64 {
        self.dept_parent_id
    }
}

/// Entry of the parent tree-select on the create form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentOption {
    pub value: i64,
    pub title: String,
    #[serde(skip)]
    parent: i64,
}

impl TreeItem for ParentOption {
    fn id(&self) -> i64 {
        self.value
    }

    fn parent_id(&self) -> i64 {
        self.parent
    }
}

/// Department edit / create form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeptForm {
    pub dept_name: String,
    #[serde(default)]
    pub dept_parent_id: i64,
    #[serde(default)]
    pub dept_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentPage {
    pub tree: Vec<TreeNode<DeptNode>>,
    pub report: TreeReport,
    pub parent_options: Vec<OptionItem>,
    pub notices: Vec<Notice>,
}

fn status_tag(code: &str) -> Tag {
    match Status::from_code(code) {
        Some(status) => Tag {
            label: status.label().to_string(),
            color: Some(status.color()),
        },
        None => Tag {
            label: code.to_string(),
            color: None,
        },
    }
}

pub struct DepartmentDashboard {
    client: ResourceClient,
    departments: Vec<department::Model>,
    forest: Forest<DeptNode>,
    selected: Option<i64>,
    form: DeptForm,
    notices: Vec<Notice>,
}

impl DepartmentDashboard {
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            departments: Vec::new(),
            forest: build_forest(Vec::new()),
            selected: None,
            form: DeptForm::default(),
            notices: Vec::new(),
        }
    }

    pub fn departments(&self) -> &[department::Model] {
        &self.departments
    }

    pub fn forest(&self) -> &Forest<DeptNode> {
        &self.forest
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn form(&self) -> &DeptForm {
        &self.form
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Refetch every department with member counts and rebuild the tree
    pub async fn reload(&mut self) -> AppResult<()> {
        let loaded = match self.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!("Failed to load departments: {}", e);
                self.notices.push(Notice::error(&e));
                return Err(e);
            }
        };
        let (departments, counts) = loaded;

        let nodes = departments
            .iter()
            .map(|d| DeptNode {
                dept_id: d.dept_id,
                dept_name: d.dept_name.clone(),
                dept_parent_id: d.dept_parent_id,
                dept_status: d.dept_status.clone(),
                status: status_tag(&d.dept_status),
                member_count: counts.get(&d.dept_id).copied().unwrap_or(0),
            })
            .collect();
        self.forest = build_forest(nodes);
        self.departments = departments;

        if let Some(id) = self.selected {
            if !self.departments.iter().any(|d| d.dept_id == id) {
                self.selected = None;
                self.form = DeptForm::default();
            }
        }
        Ok(())
    }

    async fn load(&self) -> AppResult<(Vec<department::Model>, HashMap<i64, u64>)> {
        let departments = self
            .client
            .list::<department::Entity>(&ListQuery::all())
            .await?
            .rows;
        let counts = member_counts(&self.client).await?;
        Ok((departments, counts))
    }

    /// Select a node and fill the edit form with it
    pub fn select(&mut self, dept_id: i64) -> AppResult<&DeptForm> {
        let dept = self
            .departments
            .iter()
            .find(|d| d.dept_id == dept_id)
            .ok_or_else(|| AppError::NotFound(format!("部门不存在: {}", dept_id)))?;
        self.form = DeptForm {
            dept_name: dept.dept_name.clone(),
            dept_parent_id: dept.dept_parent_id,
            dept_status: Some(dept.dept_status.clone()),
        };
        self.selected = Some(dept_id);
        Ok(&self.form)
    }

    /// Parent choices: "无" first, then every department except the selected one
    pub fn parent_options(&self) -> Vec<OptionItem> {
        std::iter::once(OptionItem {
            value: 0,
            label: NO_PARENT.to_string(),
        })
        .chain(
            self.departments
                .iter()
                .filter(|d| Some(d.dept_id) != self.selected)
                .map(|d| OptionItem {
                    value: d.dept_id,
                    label: d.dept_name.clone(),
                }),
        )
        .collect()
    }

    /// Parent tree-select for the create form
    pub fn parent_tree(&self) -> Vec<TreeNode<ParentOption>> {
        let options = self
            .departments
            .iter()
            .map(|d| ParentOption {
                value: d.dept_id,
                title: d.dept_name.clone(),
                parent: d.dept_parent_id,
            })
            .collect();
        build_forest(options).roots
    }

    /// Save name, parent and status of the selected department
    pub async fn save_selected(&mut self, form: DeptForm) -> AppResult<()> {
        let result = self.update_selected(&form).await;
        match &result {
            Ok(()) => {
                self.form = form;
                self.notices.push(Notice::success(SAVED));
            }
            Err(e) => {
                tracing::error!("Failed to save department: {}", e);
                self.notices.push(Notice::error(e));
            }
        }
        let _ = self.reload().await;
        result
    }

    async fn update_selected(&self, form: &DeptForm) -> AppResult<()> {
        let dept_id = self
            .selected
            .ok_or_else(|| AppError::Validation("请先选择部门".to_string()))?;
        let name = required(&form.dept_name, "部门名称")?;
        let parent = form.dept_parent_id.max(0);
        if parent == dept_id {
            return Err(AppError::Validation("上级部门不能是自身".to_string()));
        }
        let status = status_or_default(form.dept_status.as_deref(), "状态")?;

        let mut patch = Map::new();
        patch.insert("dept_name".to_string(), JsonValue::from(name));
        patch.insert("dept_parent_id".to_string(), JsonValue::from(parent));
        patch.insert("dept_status".to_string(), JsonValue::from(status));
        self.client
            .update::<department::Entity>(&RowId::Int(dept_id), &patch)
            .await?;
        Ok(())
    }

    /// Create a department; status defaults to normal and parent to none
    pub async fn create(&mut self, form: DeptForm) -> AppResult<department::Model> {
        let result = self.insert(&form).await;
        match &result {
            Ok(created) => {
                tracing::info!("Created department {} ({})", created.dept_name, created.dept_id);
                self.notices.push(Notice::success(CREATED));
                let _ = self.reload().await;
            }
            Err(e) => self.notices.push(Notice::error(e)),
        }
        result
    }

    async fn insert(&self, form: &DeptForm) -> AppResult<department::Model> {
        let name = required(&form.dept_name, "部门名称")?;
        let status = status_or_default(form.dept_status.as_deref(), "状态")?;
        let now = Utc::now();
        self.client
            .create(department::ActiveModel {
                dept_id: NotSet,
                dept_name: Set(name),
                dept_parent_id: Set(form.dept_parent_id.max(0)),
                dept_status: Set(status),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .await
    }

    /// Live members of a department, read through the junction table
    pub async fn members(&self, dept_id: i64) -> AppResult<Vec<user::Model>> {
        let links = self
            .client
            .list::<user_dept::Entity>(
                &ListQuery::all()
                    .with_filter(Filter::eq("dept_id", dept_id))
                    .with_filter(Filter::eq("del_flag", DEL_FLAG_LIVE)),
            )
            .await?
            .rows;
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids = links.into_iter().map(|l| l.user_id);
        let users = self
            .client
            .list::<user::Entity>(&ListQuery::all().with_filter(Filter::is_in("user_id", user_ids)))
            .await?;
        Ok(users.rows)
    }

    pub fn view(&mut self) -> DepartmentPage {
        DepartmentPage {
            tree: self.forest.roots.clone(),
            report: self.forest.report.clone(),
            parent_options: self.parent_options(),
            notices: std::mem::take(&mut self.notices),
        }
    }
}

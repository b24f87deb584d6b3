//! Department entity - 部门表
//!
//! 表名: t_dept

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tree::TreeItem;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "t_dept")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub dept_id: i64,

    /// 部门名称
    #[sea_orm(column_type = "String(Some(64))")]
    pub dept_name: String,

    /// 父部门ID (0 表示顶级部门，不做存在性校验)
    pub dept_parent_id: i64,

    /// 状态: 0=正常, 1=停用, 2=删除
    #[sea_orm(column_type = "String(Some(1))")]
    pub dept_status: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// 自引用关系由 tree 模块在内存中组装

impl ActiveModelBehavior for ActiveModel {}

impl TreeItem for Model {
    fn id(&self) -> i64 {
        self.dept_id
    }

    fn parent_id(&self) -> i64 {
        self.dept_parent_id
    }
}

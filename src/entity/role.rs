//! Role entity - 角色表
//!
//! 表名: t_role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "t_role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub role_id: i64,

    /// 角色名称
    #[sea_orm(column_type = "String(Some(64))")]
    pub role_name: String,

    /// 权限标识
    #[sea_orm(column_type = "String(Some(100))")]
    pub role_key: String,

    /// 状态: 0=正常, 1=停用, 2=删除
    #[sea_orm(column_type = "String(Some(1))")]
    pub role_status: String,

    /// 备注
    #[sea_orm(column_type = "String(Some(500))", nullable)]
    pub role_remark: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

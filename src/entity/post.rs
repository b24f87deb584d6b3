//! Post entity - 岗位表
//!
//! 表名: t_post

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "t_post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub post_id: i64,

    /// 岗位名称
    #[sea_orm(column_type = "String(Some(64))")]
    pub post_name: String,

    /// 状态: 0=正常, 1=停用, 2=删除
    #[sea_orm(column_type = "String(Some(1))")]
    pub post_status: String,

    /// 备注
    #[sea_orm(column_type = "String(Some(500))", nullable)]
    pub post_remark: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

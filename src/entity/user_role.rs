//! UserRole entity - 用户角色关联表
//!
//! 表名: t_user_role
//! (user_id, role_id) 为联合主键，每对关系最多一行

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "t_user_role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(64))")]
    pub user_id: String,

    /// 角色ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i64,

    /// 软删除标记: "0" 有效
    #[sea_orm(column_type = "String(Some(1))")]
    pub del_flag: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! User entity - 用户表
//!
//! 表名: t_user
//! user_id 由外部认证服务分配 (字符串)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "t_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(64))")]
    pub user_id: String,

    /// 昵称
    #[sea_orm(column_type = "String(Some(64))", nullable)]
    pub user_nickname: Option<String>,

    /// 邮箱
    #[sea_orm(column_type = "String(Some(128))", nullable)]
    pub user_email: Option<String>,

    /// 手机号
    #[sea_orm(column_type = "String(Some(32))", nullable)]
    pub user_phone: Option<String>,

    /// 性别: 0=男, 1=女, 2=未知
    #[sea_orm(column_type = "String(Some(1))", nullable)]
    pub user_gender: Option<String>,

    /// 状态: 0=正常, 1=停用, 2=删除
    #[sea_orm(column_type = "String(Some(1))", nullable)]
    pub user_status: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// 部门/岗位/角色关联通过 t_user_dept / t_user_post / t_user_role 手动查询

impl ActiveModelBehavior for ActiveModel {}

//! Entity module - SeaORM 实体定义
//!
//! 组织机构相关的四张主表与三张用户关联表

pub mod code;
pub mod department;
pub mod post;
pub mod role;
pub mod user;
pub mod user_dept;
pub mod user_post;
pub mod user_role;

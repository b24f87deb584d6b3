//! 状态与性别编码
//!
//! 数据库中以字符串编码 "0"/"1"/"2" 存储，这里提供类型化的读写与显示

use serde::{Deserialize, Serialize};

/// 通用状态 (用户、部门、岗位、角色共用)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// 正常
    #[default]
    Normal,
    /// 停用
    Disabled,
    /// 删除
    Deleted,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Normal, Status::Disabled, Status::Deleted];

    pub fn code(self) -> &'static str {
        match self {
            Status::Normal => "0",
            Status::Disabled => "1",
            Status::Deleted => "2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Normal => "正常",
            Status::Disabled => "停用",
            Status::Deleted => "删除",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Status::Normal => "green",
            Status::Disabled => "orange",
            Status::Deleted => "red",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

/// 用户性别
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// 男
    Male,
    /// 女
    Female,
    /// 未知
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];

    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "0",
            Gender::Female => "1",
            Gender::Unknown => "2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
            Gender::Unknown => "未知",
        }
    }

    /// Anything that is not male or female reads as unknown.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("0") => Gender::Male,
            Some("1") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// 关联表软删除标记: 有效行
pub const DEL_FLAG_LIVE: &str = "0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::from_code("0"), Some(Status::Normal));
        assert_eq!(Status::from_code("2"), Some(Status::Deleted));
        assert_eq!(Status::from_code("7"), None);
        assert_eq!(Status::Disabled.label(), "停用");
        assert_eq!(Status::default().code(), "0");
    }

    #[test]
    fn test_gender_fallback() {
        assert_eq!(Gender::from_code(Some("1")), Gender::Female);
        assert_eq!(Gender::from_code(Some("x")), Gender::Unknown);
        assert_eq!(Gender::from_code(None).label(), "未知");
    }
}

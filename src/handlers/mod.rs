//! Request handlers module

use serde::Deserialize;

pub mod config;
pub mod department;
pub mod post;
pub mod resource;
pub mod role;
pub mod user;

/// Paging parameters of the organization list pages
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub current: Option<u64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u64>,
}

impl PageQuery {
    pub fn current(&self) -> u64 {
        self.current.unwrap_or(1).max(1)
    }
}

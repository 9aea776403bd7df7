pub mod document;
pub mod ocr_artifact;
pub mod project;
pub mod user;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    Id,
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub order_by: OrderBy,
    pub order: Order,
    pub limit: i64,
    pub offset: i64,
    pub filter: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            order_by: OrderBy::Id,
            order: Order::Asc,
            limit: 100,
            offset: 0,
            filter: None,
        }
    }
}

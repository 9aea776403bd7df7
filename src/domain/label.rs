use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dimensions and format of a rendered page image, echoed back by the
/// synthesizer so label offsets can be interpreted without re-reading the
/// source document. `None` when the OCR provider never reported them
/// (e.g. an engine that skips rasterization entirely).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageProperties {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A single annotation value. `TextLabel` in the domain model is this same
/// struct with `start`/`end` populated; a block-target label with both
/// `None` is a plain classification value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockLabel {
    pub id: Uuid,
    pub position: Position,
    pub content: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLabel {
    pub id: Uuid,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PageProperties>,
    #[serde(default)]
    pub blocks: Vec<BlockLabel>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLabelData {
    #[serde(default)]
    pub pages: Vec<PageLabel>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl DocumentLabelData {
    pub fn empty() -> Self {
        Self {
            pages: Vec::new(),
            labels: Vec::new(),
        }
    }
}

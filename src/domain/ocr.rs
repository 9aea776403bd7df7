use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Node kind in an OCR result tree. Mirrors the page/block/line/word
/// hierarchy both supported OCR providers produce, regardless of engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrItemType {
    Page,
    Block,
    Paragraph,
    Line,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrRelationshipType {
    Child,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrRelationship {
    #[serde(rename = "type")]
    pub kind: OcrRelationshipType,
    pub id: Uuid,
}

/// A single bounding-box node in an OCR result tree. `content` is only
/// populated for leaf-level nodes that actually carry recognized text;
/// providers are free to leave it `None` for structural nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: OcrItemType,
    pub page: u32,
    pub content: Option<String>,
    pub confidence: Option<f32>,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub relationships: Vec<OcrRelationship>,
}

impl OcrItem {
    pub fn child_ids(&self) -> impl Iterator<Item = &Uuid> {
        self.relationships
            .iter()
            .filter(|r| matches!(r.kind, OcrRelationshipType::Child))
            .map(|r| &r.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    pub id: Uuid,
    pub items: Vec<OcrItem>,
}

impl OcrResult {
    pub fn pages(&self) -> impl Iterator<Item = &OcrItem> {
        self.items.iter().filter(|i| i.kind == OcrItemType::Page)
    }

    pub fn find(&self, id: &Uuid) -> Option<&OcrItem> {
        self.items.iter().find(|i| i.id == *id)
    }
}

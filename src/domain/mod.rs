pub mod label;
pub mod ocr;
pub mod project_config;

pub use label::{BlockLabel, DocumentLabelData, Label, PageLabel, PageProperties, Position};
pub use ocr::{OcrItem, OcrItemType, OcrRelationship, OcrRelationshipType, OcrResult};
pub use project_config::{
    FileProviderConfig, LabelDefinition, LabelTarget, LabelType, LayoutOcrConfig,
    LocalFileProviderConfig, LocalOcrConfig, ObjectStoreFileProviderConfig, OcrProviderConfig,
    ProjectConfig,
};

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types::{Block, BlockType, FeatureType, RelationshipType};
use image::DynamicImage;
use uuid::Uuid;

use crate::domain::ocr::{OcrItem, OcrItemType, OcrRelationship, OcrRelationshipType, OcrResult};
use crate::domain::project_config::LayoutOcrConfig;
use crate::error::{AppError, AppResult};
use crate::providers::cloud_session::{CloudSession, ResolvedAwsConfig};

use super::OcrProvider;

pub struct LayoutOcrProvider {
    config: LayoutOcrConfig,
    session: Arc<CloudSession>,
}

impl LayoutOcrProvider {
    pub async fn new(config: LayoutOcrConfig) -> AppResult<Self> {
        let aws_config = ResolvedAwsConfig::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            &config.aws_region_name,
            &config.aws_account_id,
            &config.aws_role_name,
        )?;
        let session = Arc::new(CloudSession::new(aws_config).await);
        Ok(Self { config, session })
    }
}

fn map_block_type(block_type: &BlockType) -> OcrItemType {
    match block_type {
        BlockType::Page => OcrItemType::Page,
        BlockType::Line => OcrItemType::Line,
        BlockType::Word => OcrItemType::Word,
        _ => OcrItemType::Block,
    }
}

fn convert_block(block: &Block, page: u32) -> AppResult<Option<OcrItem>> {
    let kind = block
        .block_type()
        .map(map_block_type)
        .unwrap_or(OcrItemType::Block);

    let Some(id_str) = block.id() else {
        return Ok(None);
    };
    let id = Uuid::parse_str(id_str)
        .map_err(|err| AppError::ocr(format!("textract returned a non-uuid block id: {err}")))?;

    let geometry = block
        .geometry()
        .and_then(|g| g.bounding_box())
        .ok_or_else(|| AppError::ocr("textract block missing bounding box"))?;

    let mut relationships = Vec::new();
    for relationship in block.relationships() {
        if relationship.r#type() != Some(&RelationshipType::Child) {
            continue;
        }
        for child_id in relationship.ids() {
            let child_uuid = Uuid::parse_str(child_id).map_err(|err| {
                AppError::ocr(format!("textract returned a non-uuid relationship id: {err}"))
            })?;
            relationships.push(OcrRelationship {
                kind: OcrRelationshipType::Child,
                id: child_uuid,
            });
        }
    }

    let content = if kind == OcrItemType::Word {
        block.text().map(|s| s.to_string())
    } else {
        None
    };

    Ok(Some(OcrItem {
        id,
        kind,
        page,
        content,
        confidence: block.confidence(),
        left: geometry.left() as f64,
        top: geometry.top() as f64,
        width: geometry.width() as f64,
        height: geometry.height() as f64,
        relationships,
    }))
}

#[async_trait]
impl OcrProvider for LayoutOcrProvider {
    async fn ocr(&self, images: &[DynamicImage]) -> AppResult<OcrResult> {
        let client = self.session.textract_client().await?;
        let format = crate::images::parse_image_format(&self.config.image_format)?;

        let mut items = Vec::new();
        for (index, image) in images.iter().enumerate() {
            let page = (index + 1) as u32;

            let rgb_image = image.to_rgb8();
            let mut buffer = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(rgb_image)
                .write_to(&mut buffer, format)
                .map_err(|err| AppError::ocr(format!("failed to encode page for textract: {err}")))?;

            let document = aws_sdk_textract::types::Document::builder()
                .bytes(Blob::new(buffer.into_inner()))
                .build();

            let response = client
                .analyze_document()
                .document(document)
                .feature_types(FeatureType::Layout)
                .send()
                .await
                .map_err(|err| AppError::ocr(format!("textract analyze_document failed: {err}")))?;

            for block in response.blocks() {
                if let Some(item) = convert_block(block, page)? {
                    items.push(item);
                }
            }
        }

        Ok(OcrResult {
            id: Uuid::new_v4(),
            items,
        })
    }
}

pub mod layout_ocr;
pub mod local_ocr;

use async_trait::async_trait;
use image::DynamicImage;

use crate::domain::ocr::OcrResult;
use crate::error::AppResult;

/// Performs recognition over a set of already-rasterized pages and returns
/// a single flattened tree covering all of them. Implementations own their
/// own concurrency (Textract: one request per page; tesseract: one
/// blocking process per page) and report page numbers starting at 1.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn ocr(&self, images: &[DynamicImage]) -> AppResult<OcrResult>;
}

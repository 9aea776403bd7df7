pub mod local;
pub mod object_store;

use async_trait::async_trait;
use image::DynamicImage;
use serde::Serialize;

use crate::error::AppResult;
use crate::images;

/// A single rasterized, base64-encoded page as returned over the wire.
/// Shape matches the document content endpoint exactly: callers never see
/// the underlying image bytes, just this record.
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    pub content: String,
    pub page: u32,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub format: String,
    pub mode: String,
}

/// Operates on a single logical path inside a configured root. Unlike the
/// stateful "open a path, then operate" object the provider is modeled on,
/// every method here takes its target path directly: there is no handle to
/// thread through an async context manager, so a provider instance can be
/// shared across concurrent scans instead of being locked to one path.
#[async_trait]
pub trait FileProvider: Send + Sync {
    async fn is_file(&self, path: &str) -> AppResult<bool>;

    async fn is_folder(&self, path: &str) -> AppResult<bool>;

    async fn read(&self, path: &str) -> AppResult<Vec<u8>>;

    async fn list(&self, path: &str) -> AppResult<Vec<String>>;

    fn pdf_dpi(&self) -> u32;

    fn image_format(&self) -> &str;

    /// Converts a file to one or all pages as decoded images. PDFs are
    /// rasterized page by page at the configured DPI; any other file is
    /// treated as a single page image and `page` must be `None` or `1`.
    async fn read_as_images(&self, path: &str, page: Option<u32>) -> AppResult<Vec<DynamicImage>> {
        let bytes = self.read(path).await?;

        let rendered = if path.to_lowercase().ends_with(".pdf") {
            images::render_pdf_pages(&bytes, self.pdf_dpi(), page)?
        } else {
            match page {
                Some(p) if p != 1 => return Ok(Vec::new()),
                _ => {
                    let image = images::decode_image(&bytes)?;
                    vec![images::RenderedPage { page: 1, image }]
                }
            }
        };

        Ok(rendered.into_iter().map(|r| r.image).collect())
    }

    /// Same as `read_as_images`, but each image is serialized to the
    /// configured image format and base64-encoded for wire transport.
    async fn read_as_base64_images(
        &self,
        path: &str,
        page: Option<u32>,
    ) -> AppResult<Vec<PageContent>> {
        let images = self.read_as_images(path, page).await?;
        let format = images::parse_image_format(self.image_format())?;

        let mut result = Vec::with_capacity(images.len());
        for (index, image) in images.into_iter().enumerate() {
            let page_number = page.unwrap_or((index + 1) as u32);
            let content = images::encode_base64(&image, format)?;
            result.push(PageContent {
                content,
                page: page_number,
                width: image.width(),
                height: image.height(),
                aspect_ratio: image.width() as f64 / image.height() as f64,
                format: self.image_format().to_uppercase(),
                mode: color_mode(&image),
            });
        }

        Ok(result)
    }
}

fn color_mode(image: &image::DynamicImage) -> String {
    use image::DynamicImage::*;
    match image {
        ImageLuma8(_) => "L",
        ImageLumaA8(_) => "LA",
        ImageRgb8(_) => "RGB",
        ImageRgba8(_) => "RGBA",
        ImageLuma16(_) => "I;16",
        ImageLumaA16(_) => "LA;16",
        ImageRgb16(_) => "RGB;16",
        ImageRgba16(_) => "RGBA;16",
        ImageRgb32F(_) => "RGBF",
        ImageRgba32F(_) => "RGBAF",
        _ => "RGB",
    }
    .to_string()
}

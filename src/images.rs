use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;

use crate::error::{AppError, AppResult};

/// A single page rendered and encoded, ready to be embedded in a JSON
/// response or handed to an OCR provider.
pub struct RenderedPage {
    pub page: u32,
    pub image: DynamicImage,
}

fn bind_pdfium() -> AppResult<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|err| AppError::internal(format!("failed to bind pdfium library: {err}")))?;
    Ok(Pdfium::new(bindings))
}

/// Rasterizes every page of a PDF (or a single page when `page` is set) at
/// the configured DPI. `page` is 1-indexed to match the rest of the domain.
pub fn render_pdf_pages(bytes: &[u8], dpi: u32, page: Option<u32>) -> AppResult<Vec<RenderedPage>> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|err| AppError::decode(format!("failed to load PDF: {err}")))?;

    let scale = dpi as f32 / 72.0;

    let mut rendered = Vec::new();
    for (index, pdf_page) in document.pages().iter().enumerate() {
        let page_number = (index + 1) as u32;
        if let Some(requested) = page {
            if requested != page_number {
                continue;
            }
        }

        let pixel_width = (pdf_page.width().value * scale) as i32;
        let pixel_height = (pdf_page.height().value * scale) as i32;

        let bitmap = pdf_page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(pixel_width)
                    .set_target_height(pixel_height)
                    .render_form_data(true),
            )
            .map_err(|err| AppError::internal(format!("failed to render PDF page: {err}")))?;

        rendered.push(RenderedPage {
            page: page_number,
            image: bitmap.as_image(),
        });
    }

    Ok(rendered)
}

pub fn decode_image(bytes: &[u8]) -> AppResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|err| AppError::decode(err.to_string()))
}

pub fn parse_image_format(name: &str) -> AppResult<ImageFormat> {
    ImageFormat::from_extension(name.to_lowercase())
        .ok_or_else(|| AppError::bad_request(format!("unsupported image format: {name}")))
}

pub fn encode_base64(image: &DynamicImage, format: ImageFormat) -> AppResult<String> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(|err| AppError::internal(format!("failed to encode image: {err}")))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(buffer.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_image_formats() {
        assert!(matches!(parse_image_format("jpeg").unwrap(), ImageFormat::Jpeg));
        assert!(matches!(parse_image_format("PNG").unwrap(), ImageFormat::Png));
    }

    #[test]
    fn rejects_unknown_image_format() {
        assert!(parse_image_format("not-a-format").is_err());
    }
}

use std::collections::HashMap;
use std::io::Write;
use std::process::Command;

use async_trait::async_trait;
use image::DynamicImage;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::domain::ocr::{OcrItem, OcrItemType, OcrRelationship, OcrRelationshipType, OcrResult};
use crate::domain::project_config::LocalOcrConfig;
use crate::error::{AppError, AppResult};

use super::OcrProvider;

pub struct LocalOcrProvider {
    config: LocalOcrConfig,
    binary: String,
}

impl LocalOcrProvider {
    pub fn new(config: LocalOcrConfig, binary: String) -> Self {
        Self { config, binary }
    }
}

/// One row of tesseract's `tsv` output format.
#[derive(Debug, Clone)]
struct TsvRow {
    level: u32,
    page_num: u32,
    block_num: u32,
    par_num: u32,
    line_num: u32,
    word_num: u32,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    conf: i32,
    text: String,
}

fn item_type_for_level(level: u32) -> Option<OcrItemType> {
    match level {
        1 => Some(OcrItemType::Page),
        2 => Some(OcrItemType::Block),
        3 => Some(OcrItemType::Paragraph),
        4 => Some(OcrItemType::Line),
        5 => Some(OcrItemType::Word),
        _ => None,
    }
}

fn row_key(row: &TsvRow) -> (u32, u32, u32, u32, u32) {
    (
        row.page_num,
        row.block_num,
        row.par_num,
        row.line_num,
        row.word_num,
    )
}

fn parse_tsv(tsv: &str) -> AppResult<Vec<TsvRow>> {
    let mut lines = tsv.lines();
    let header = lines
        .next()
        .ok_or_else(|| AppError::ocr("tesseract produced empty tsv output"))?;
    let columns: Vec<&str> = header.split('\t').collect();
    let index_of = |name: &str| -> AppResult<usize> {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| AppError::ocr(format!("tesseract tsv missing column '{name}'")))
    };

    let level_idx = index_of("level")?;
    let page_idx = index_of("page_num")?;
    let block_idx = index_of("block_num")?;
    let par_idx = index_of("par_num")?;
    let line_idx = index_of("line_num")?;
    let word_idx = index_of("word_num")?;
    let left_idx = index_of("left")?;
    let top_idx = index_of("top")?;
    let width_idx = index_of("width")?;
    let height_idx = index_of("height")?;
    let conf_idx = index_of("conf")?;
    let text_idx = index_of("text")?;

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let field = |idx: usize| fields.get(idx).copied().unwrap_or("");
        let parse_u32 = |s: &str| -> AppResult<u32> {
            s.parse()
                .map_err(|_| AppError::ocr(format!("invalid tesseract tsv integer: '{s}'")))
        };
        rows.push(TsvRow {
            level: parse_u32(field(level_idx))?,
            page_num: parse_u32(field(page_idx))?,
            block_num: parse_u32(field(block_idx))?,
            par_num: parse_u32(field(par_idx))?,
            line_num: parse_u32(field(line_idx))?,
            word_num: parse_u32(field(word_idx))?,
            left: field(left_idx).parse().unwrap_or(0.0),
            top: field(top_idx).parse().unwrap_or(0.0),
            width: field(width_idx).parse().unwrap_or(0.0),
            height: field(height_idx).parse().unwrap_or(0.0),
            conf: field(conf_idx).parse().unwrap_or(-1),
            text: field(text_idx).to_string(),
        });
    }
    Ok(rows)
}

fn convert_rows(rows: &[TsvRow], page: u32, width: u32, height: u32) -> AppResult<Vec<OcrItem>> {
    let mut id_map: HashMap<(u32, u32, u32, u32, u32), Uuid> = HashMap::new();
    for row in rows {
        let key = row_key(row);
        if id_map.insert(key, Uuid::new_v4()).is_some() {
            return Err(AppError::ocr("duplicate tesseract tsv row key"));
        }
    }

    let mut items = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let Some(kind) = item_type_for_level(row.level) else {
            continue;
        };
        let key = row_key(row);
        let id = id_map[&key];

        let mut relationships = Vec::new();
        for candidate in rows.iter() {
            if candidate.level != row.level + 1 {
                continue;
            }
            let is_child = match row.level {
                1 => candidate.page_num == row.page_num,
                2 => candidate.page_num == row.page_num && candidate.block_num == row.block_num,
                3 => {
                    candidate.page_num == row.page_num
                        && candidate.block_num == row.block_num
                        && candidate.par_num == row.par_num
                }
                4 => {
                    candidate.page_num == row.page_num
                        && candidate.block_num == row.block_num
                        && candidate.par_num == row.par_num
                        && candidate.line_num == row.line_num
                }
                _ => false,
            };
            if is_child {
                relationships.push(OcrRelationship {
                    kind: OcrRelationshipType::Child,
                    id: id_map[&row_key(candidate)],
                });
            }
        }

        items.push(OcrItem {
            id,
            kind,
            page,
            content: if row.text.is_empty() {
                None
            } else {
                Some(row.text.clone())
            },
            confidence: if row.conf == -1 {
                None
            } else {
                Some(row.conf as f32)
            },
            left: round5(row.left / width as f64),
            top: round5(row.top / height as f64),
            width: round5(row.width / width as f64),
            height: round5(row.height / height as f64),
            relationships,
        });
        let _ = index;
    }

    Ok(items)
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

fn ocr_page_blocking(
    binary: &str,
    language: &str,
    image: &DynamicImage,
    page: u32,
) -> AppResult<Vec<OcrItem>> {
    let mut input = NamedTempFile::with_suffix(".png")
        .map_err(|err| AppError::ocr(format!("failed to create temp file: {err}")))?;
    image
        .write_to(&mut input, image::ImageFormat::Png)
        .map_err(|err| AppError::ocr(format!("failed to write temp image: {err}")))?;
    input
        .flush()
        .map_err(|err| AppError::ocr(format!("failed to flush temp image: {err}")))?;

    let output = Command::new(binary)
        .arg(input.path())
        .arg("stdout")
        .arg("--psm")
        .arg("1")
        .arg("-l")
        .arg(language)
        .arg("tsv")
        .output()
        .map_err(|err| AppError::ocr(format!("failed to run tesseract: {err}")))?;

    if !output.status.success() {
        return Err(AppError::ocr(format!(
            "tesseract exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let tsv = String::from_utf8_lossy(&output.stdout);
    let rows = parse_tsv(&tsv)?;
    convert_rows(&rows, page, image.width().max(1), image.height().max(1))
}

#[async_trait]
impl OcrProvider for LocalOcrProvider {
    async fn ocr(&self, images: &[DynamicImage]) -> AppResult<OcrResult> {
        let mut items = Vec::new();
        for (index, image) in images.iter().enumerate() {
            let page = (index + 1) as u32;
            let image = image.clone();
            let binary = self.binary.clone();
            let language = self.config.language.clone();
            let page_items =
                tokio::task::spawn_blocking(move || ocr_page_blocking(&binary, &language, &image, page))
                    .await
                    .map_err(|err| AppError::internal(format!("ocr task panicked: {err}")))??;
            items.extend(page_items);
        }
        Ok(OcrResult {
            id: Uuid::new_v4(),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t\n2\t1\t1\t0\t0\t0\t0\t0\t100\t50\t-1\t\n5\t1\t1\t1\t1\t1\t0\t0\t20\t10\t95\thello\n";

    #[test]
    fn parses_tsv_and_builds_tree() {
        let rows = parse_tsv(SAMPLE_TSV).unwrap();
        assert_eq!(rows.len(), 3);
        let items = convert_rows(&rows, 1, 100, 100).unwrap();
        assert_eq!(items.len(), 3);
        let page_item = items.iter().find(|i| i.kind == OcrItemType::Page).unwrap();
        assert_eq!(page_item.relationships.len(), 1);
        let word_item = items.iter().find(|i| i.kind == OcrItemType::Word).unwrap();
        assert_eq!(word_item.content.as_deref(), Some("hello"));
        assert_eq!(word_item.confidence, Some(95.0));
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let duplicated = format!("{SAMPLE_TSV}5\t1\t1\t1\t1\t1\t0\t0\t20\t10\t95\thello\n");
        let rows = parse_tsv(&duplicated).unwrap();
        assert!(convert_rows(&rows, 1, 100, 100).is_err());
    }
}

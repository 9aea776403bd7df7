use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::label::{BlockLabel, DocumentLabelData, PageLabel, Position};
use crate::domain::ocr::{OcrItem, OcrItemType, OcrResult};

/// Builds a fresh, empty-labels `DocumentLabelData` from a freshly OCR'd
/// result. Deterministic: the same `OcrResult` bytes always produce the
/// same output, since the walk order follows `ocr_result.items` and never
/// consults anything outside it.
pub fn synthesize(ocr_result: &OcrResult) -> DocumentLabelData {
    let by_id: HashMap<Uuid, &OcrItem> =
        ocr_result.items.iter().map(|item| (item.id, item)).collect();

    // child_id -> ids of items that list it as a `child`. Brings parent
    // discovery for block dedup from O(N^2) to O(N).
    let mut parents_of: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for item in &ocr_result.items {
        for child_id in item.child_ids() {
            parents_of.entry(*child_id).or_default().push(item.id);
        }
    }

    let is_block_child = |item_id: &Uuid| -> bool {
        parents_of
            .get(item_id)
            .map(|parents| {
                parents
                    .iter()
                    .filter_map(|id| by_id.get(id))
                    .any(|parent| parent.kind == OcrItemType::Block)
            })
            .unwrap_or(false)
    };

    let mut pages: Vec<PageLabel> = ocr_result
        .items
        .iter()
        .filter(|item| item.kind == OcrItemType::Page)
        .map(|page_item| PageLabel {
            id: page_item.id,
            page: page_item.page,
            properties: None,
            blocks: Vec::new(),
            labels: Vec::new(),
        })
        .collect();

    let mut seen_block_ids: std::collections::HashSet<Uuid> = std::collections::HashSet::new();

    for item in &ocr_result.items {
        if item.kind != OcrItemType::Block {
            continue;
        }
        if is_block_child(&item.id) {
            continue;
        }
        if !seen_block_ids.insert(item.id) {
            continue;
        }

        let Some(page_label) = pages.iter_mut().find(|p| p.page == item.page) else {
            continue;
        };

        let content = build_block_content(&by_id, &parents_of, item).trim().to_string();

        page_label.blocks.push(BlockLabel {
            id: item.id,
            position: Position {
                left: item.left,
                top: item.top,
                width: item.width,
                height: item.height,
            },
            content: if content.is_empty() { None } else { Some(content) },
            labels: Vec::new(),
        });
    }

    DocumentLabelData {
        pages,
        labels: Vec::new(),
    }
}

fn build_block_content(
    by_id: &HashMap<Uuid, &OcrItem>,
    _parents_of: &HashMap<Uuid, Vec<Uuid>>,
    item: &OcrItem,
) -> String {
    let mut buffer = String::new();
    walk_item_content(by_id, item, &mut buffer);
    buffer
}

fn walk_item_content(by_id: &HashMap<Uuid, &OcrItem>, item: &OcrItem, buffer: &mut String) {
    if let Some(content) = &item.content {
        if !content.is_empty() {
            buffer.push_str(content);
            buffer.push(' ');
        }
    }

    for child_id in item.child_ids() {
        let Some(child) = by_id.get(child_id) else {
            continue;
        };
        match child.kind {
            OcrItemType::Paragraph => {
                if !buffer.is_empty() && !buffer.ends_with('\n') {
                    let trimmed = buffer.trim_end().to_string();
                    *buffer = trimmed;
                    buffer.push_str("\n\n");
                }
            }
            OcrItemType::Line => {
                if !buffer.is_empty() && !buffer.ends_with('\n') {
                    let trimmed = buffer.trim_end().to_string();
                    *buffer = trimmed;
                    buffer.push('\n');
                }
            }
            _ => {}
        }
        walk_item_content(by_id, child, buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ocr::{OcrRelationship, OcrRelationshipType};

    fn item(
        id: Uuid,
        kind: OcrItemType,
        page: u32,
        content: Option<&str>,
        children: Vec<Uuid>,
    ) -> OcrItem {
        OcrItem {
            id,
            kind,
            page,
            content: content.map(|s| s.to_string()),
            confidence: None,
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 1.0,
            relationships: if children.is_empty() {
                Vec::new()
            } else {
                vec![OcrRelationship {
                    kind: OcrRelationshipType::Child,
                    id: children[0],
                }]
                .into_iter()
                .chain(children.into_iter().skip(1).map(|id| OcrRelationship {
                    kind: OcrRelationshipType::Child,
                    id,
                }))
                .collect()
            },
        }
    }

    #[test]
    fn builds_one_page_label_per_page_item() {
        let page_id = Uuid::new_v4();
        let result = OcrResult {
            id: Uuid::new_v4(),
            items: vec![item(page_id, OcrItemType::Page, 1, None, vec![])],
        };
        let data = synthesize(&result);
        assert_eq!(data.pages.len(), 1);
        assert_eq!(data.pages[0].page, 1);
        assert_eq!(data.pages[0].id, page_id);
        assert!(data.pages[0].blocks.is_empty());
    }

    #[test]
    fn nested_blocks_collapse_to_outermost() {
        let page_id = Uuid::new_v4();
        let outer_block = Uuid::new_v4();
        let inner_block = Uuid::new_v4();
        let word_id = Uuid::new_v4();

        let result = OcrResult {
            id: Uuid::new_v4(),
            items: vec![
                item(page_id, OcrItemType::Page, 1, None, vec![outer_block]),
                item(outer_block, OcrItemType::Block, 1, None, vec![inner_block]),
                item(inner_block, OcrItemType::Block, 1, None, vec![word_id]),
                item(word_id, OcrItemType::Word, 1, Some("hello"), vec![]),
            ],
        };

        let data = synthesize(&result);
        assert_eq!(data.pages[0].blocks.len(), 1);
        assert_eq!(data.pages[0].blocks[0].id, outer_block);
        assert_eq!(data.pages[0].blocks[0].content.as_deref(), Some("hello"));
    }

    #[test]
    fn line_break_inserted_between_line_children() {
        let page_id = Uuid::new_v4();
        let block_id = Uuid::new_v4();
        let line1 = Uuid::new_v4();
        let line2 = Uuid::new_v4();
        let word1 = Uuid::new_v4();
        let word2 = Uuid::new_v4();

        let result = OcrResult {
            id: Uuid::new_v4(),
            items: vec![
                item(page_id, OcrItemType::Page, 1, None, vec![block_id]),
                item(block_id, OcrItemType::Block, 1, None, vec![line1, line2]),
                item(line1, OcrItemType::Line, 1, None, vec![word1]),
                item(line2, OcrItemType::Line, 1, None, vec![word2]),
                item(word1, OcrItemType::Word, 1, Some("first"), vec![]),
                item(word2, OcrItemType::Word, 1, Some("second"), vec![]),
            ],
        };

        let data = synthesize(&result);
        let content = data.pages[0].blocks[0].content.as_deref().unwrap();
        assert_eq!(content, "first\nsecond");
    }
}

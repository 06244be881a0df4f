//! Shared PDF dictionary utilities used by the assembler and the inspector.

use lopdf::{decode_text_string, Dictionary, Document, Object};

/// Page attributes a page may inherit from its ancestors in the page tree
/// (PDF 32000-1 §7.7.3.4).
pub const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

const MAX_TREE_DEPTH: usize = 64;

/// Extract a text string value from a PDF dictionary for a given key.
///
/// Handles both PDFDocEncoding and UTF-16BE strings. Returns `None` when the
/// key is missing, not a string, or empty.
pub fn extract_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = dict.get(key).ok()?;
    decode_text_string(value)
        .ok()
        .or_else(|| {
            value
                .as_str()
                .ok()
                .map(|s| String::from_utf8_lossy(s).into_owned())
        })
        .filter(|s| !s.is_empty())
}

/// Resolve a value that might be inline or a reference to a dictionary.
pub fn resolve_dict<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Dictionary> {
    match value.as_reference() {
        Ok(id) => document.get_dictionary(id).ok(),
        Err(_) => value.as_dict().ok(),
    }
}

/// Copy inherited page attributes from the page's ancestors onto `page`
/// wherever `page` does not define them itself.
pub fn inherit_page_attributes(document: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = document.get_dictionary(parent_id) else {
            break;
        };

        for key in INHERITABLE_PAGE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
}

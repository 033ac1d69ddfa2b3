
use serde_json::Value;

use crate::dataset::Document;

pub const DEFAULT_PER_DOC_CHAR_LIMIT: usize = 600;

/// Metadata keys checked, in order, for a document's display name
const NAME_KEYS: &[&str] = &["name", "restaurant", "title"];

/// Render retrieved documents as numbered, truncated blocks.
///
/// Each block is a `---` separator, a `#<n> <name>` header and the first
/// `per_doc_char_limit` characters of the document text. Truncation is by
/// character and may cut a word in half. Blocks keep the input order and are
/// joined with newlines; no documents yields an empty string.
#[inline]
pub fn format_docs(docs: &[Document], per_doc_char_limit: usize) -> String {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| {
            let position = i + 1;
            let text: String = doc.text.chars().take(per_doc_char_limit).collect();
            format!("---\n#{} {}\n{}", position, display_name(doc, position), text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn display_name(doc: &Document, position: usize) -> String {
    NAME_KEYS
        .iter()
        .find_map(|key| doc.metadata.get(*key).and_then(name_from_value))
        .unwrap_or_else(|| format!("Restaurant #{}", position))
}

fn name_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Record;

/// Display fields copied into document metadata when the dataset has them
pub const METADATA_FIELDS: &[&str] = &[
    "name",
    "restaurant",
    "cleanliness",
    "service",
    "pricing",
    "food/drinks",
    "ambience",
    "overall",
    "what_to_try",
    "price_per_head",
    "location",
];

const FIELD_SEPARATOR: &str = " | ";

/// A unit of retrievable text plus metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "page_content")]
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    #[inline]
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }

    /// Build the indexable document for a dataset row; its id is the row index
    #[inline]
    pub fn from_record(record: &Record, columns: &[String]) -> Self {
        let (text, metadata) = row_to_text_and_metadata(record, columns);
        Self::new(record.row_index.to_string(), text, metadata)
    }
}

impl From<String> for Document {
    #[inline]
    fn from(text: String) -> Self {
        Self {
            id: String::new(),
            text,
            metadata: Map::new(),
        }
    }
}

/// Flatten a record into `column: value` pairs joined by `" | "` plus its display metadata.
///
/// Columns are visited in the given order and cells without a value are skipped.
#[inline]
pub fn row_to_text_and_metadata(record: &Record, columns: &[String]) -> (String, Map<String, Value>) {
    let text = columns
        .iter()
        .filter_map(|column| {
            record
                .get(column)
                .filter(|value| value.is_present())
                .map(|value| format!("{}: {}", column, value))
        })
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);

    let mut metadata = Map::new();
    metadata.insert("row_index".to_string(), Value::from(record.row_index));
    for field in METADATA_FIELDS {
        if let Some(value) = record.get(field).filter(|value| value.is_present()) {
            metadata.insert((*field).to_string(), value.to_json());
        }
    }

    (text, metadata)
}

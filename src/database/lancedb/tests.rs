use super::*;
use serde_json::json;

#[test]
fn embedding_record_structure() {
    let mut metadata = serde_json::Map::new();
    metadata.insert("restaurant".to_string(), json!("Green Leaf"));
    metadata.insert("row_index".to_string(), json!(0));

    let record = EmbeddingRecord {
        document: Document::new("0", "restaurant: Green Leaf", metadata),
        vector: vec![0.1, 0.2, 0.3],
    };

    assert_eq!(record.document.id, "0");
    assert_eq!(record.vector.len(), 3);
    assert_eq!(
        record.document.metadata.get("restaurant"),
        Some(&json!("Green Leaf"))
    );
}

#[test]
fn embedding_record_serialization() {
    let record = EmbeddingRecord {
        document: Document::new("7", "restaurant: Smoke House", serde_json::Map::new()),
        vector: vec![1.0, 0.0],
    };

    let json = serde_json::to_string(&record).expect("can serialize json");
    let deserialized: EmbeddingRecord = serde_json::from_str(&json).expect("can parse json");

    assert_eq!(record.document, deserialized.document);
    assert_eq!(record.vector, deserialized.vector);
}

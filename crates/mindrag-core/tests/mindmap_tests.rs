use mindrag_core::mindmap::{MindmapDocument, MindmapPayload};
use mindrag_core::Error;
use serde_json::json;

fn canonical() -> serde_json::Value {
    json!({
        "participants": [{"name": "Alice"}],
        "main_topics": [{"topic": "Budget", "introduced_by": "Alice"}],
        "relationships": [{"from": "Alice", "to": "Bob", "type": "agrees_with", "initiated_by": "Alice"}]
    })
}

#[test]
fn all_shapes_normalize_to_the_same_document() {
    let expected = MindmapDocument::from_value(canonical()).expect("canonical");

    let structured = MindmapPayload::from(canonical()).normalize().expect("structured");
    let encoded = MindmapPayload::Encoded(canonical().to_string()).normalize().expect("encoded");
    let blocks = MindmapPayload::Blocks(vec![canonical()]).normalize().expect("blocks");

    assert_eq!(structured, expected);
    assert_eq!(encoded, expected);
    assert_eq!(blocks, expected);
}

#[test]
fn payload_variant_follows_json_type() {
    assert!(matches!(MindmapPayload::from(json!("{}")), MindmapPayload::Encoded(_)));
    assert!(matches!(MindmapPayload::from(json!([])), MindmapPayload::Blocks(_)));
    assert!(matches!(MindmapPayload::from(json!({})), MindmapPayload::Document(_)));
}

#[test]
fn legacy_blocks_are_merged_in_order() {
    let payload = MindmapPayload::Blocks(vec![
        json!({"speakers": ["Alice", "Bob"], "graph": {"nodes": []}}),
        json!({"speakers": ["Alice"], "main_topics": [{"topic": "First"}]}),
        json!({"speakers": ["Bob"], "main_topics": [{"topic": "Second"}], "relationships": [{"from": "Bob"}]}),
    ]);
    let doc = payload.normalize().expect("merged");
    let topics: Vec<&str> = doc.main_topics.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(topics, vec!["First", "Second"]);
    assert_eq!(doc.relationships.len(), 1);
    let names: Vec<&str> = doc.participants.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[test]
fn blocks_without_topics_are_malformed() {
    let err = MindmapPayload::Blocks(vec![json!({"graph": {}})]).normalize().unwrap_err();
    assert!(matches!(err, Error::MalformedInput(ref msg) if msg.contains("none of the 1 blocks")), "{err}");
}

#[test]
fn broken_encoding_is_malformed() {
    let err = MindmapPayload::Encoded("{not json".to_string()).normalize().unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));

    let twice = serde_json::to_string(&canonical().to_string()).expect("encode");
    let err = MindmapPayload::Encoded(twice).normalize().unwrap_err();
    assert!(matches!(err, Error::MalformedInput(ref msg) if msg.contains("more than once")), "{err}");
}

#[test]
fn scalar_document_is_malformed() {
    let err = MindmapPayload::from(json!(7)).normalize().unwrap_err();
    assert!(matches!(err, Error::MalformedInput(ref msg) if msg.contains("a number")), "{err}");
}

#[test]
fn reads_payload_from_file() {
    let tmp = tempfile::tempdir().expect("tmp");
    let path = tmp.path().join("mindmap.json");
    std::fs::write(&path, serde_json::to_string(&canonical().to_string()).expect("encode")).expect("write");

    let raw = std::fs::read_to_string(&path).expect("read");
    let doc = MindmapPayload::from_json_str(&raw).expect("payload").normalize().expect("doc");
    assert_eq!(doc.main_topics[0].topic, "Budget");
}

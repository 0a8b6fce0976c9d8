use std::collections::HashSet;

use mindrag_core::extract::extract_chunks;
use mindrag_core::mindmap::MindmapDocument;
use mindrag_core::types::ChunkKind;
use mindrag_core::Error;
use serde_json::json;

fn sample() -> MindmapDocument {
    MindmapDocument::from_value(json!({
        "participants": [{"name": "Alice"}, {"name": "Bob"}],
        "main_topics": [
            {
                "topic": "Budget",
                "introduced_by": "Alice",
                "introduced_at": "00:01:10",
                "sentiment": "neutral",
                "subtopics": [
                    {
                        "subtopic": "Hiring freeze",
                        "introduced_by": "Bob",
                        "stance": "against",
                        "targeted_at": "Alice",
                        "discussed_by": ["Alice", "Bob"],
                        "sentiment": "negative"
                    }
                ]
            },
            {
                "topic": "Offsite",
                "introduced_by": "Bob",
                "introduced_at": "00:09:00",
                "sentiment": "positive"
            }
        ],
        "relationships": [
            {"from": "Alice", "to": "Bob", "type": "agrees_with", "initiated_by": "Alice"}
        ]
    }))
    .expect("valid document")
}

#[test]
fn chunks_follow_document_order() {
    let chunks = extract_chunks(&sample());
    let kinds: Vec<ChunkKind> = chunks.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ChunkKind::Topic, ChunkKind::Subtopic, ChunkKind::Topic, ChunkKind::Relationship]
    );
    assert!(chunks[0].text.contains("Budget"));
    assert!(chunks[1].text.contains("Hiring freeze"));
    assert!(chunks[2].text.contains("Offsite"));
}

#[test]
fn renders_every_field() {
    let chunks = extract_chunks(&sample());
    assert_eq!(chunks[0].text, "Topic: Budget introduced by Alice at 00:01:10. Sentiment: neutral.");
    assert_eq!(
        chunks[1].text,
        "Subtopic: Hiring freeze introduced by Bob (against toward Alice). Discussed by Alice, Bob. Sentiment: negative"
    );
    assert_eq!(chunks[3].text, "Relationship: Alice agrees_with Bob (initiated by Alice)");
}

#[test]
fn ids_are_unique_and_repeatable() {
    let first = extract_chunks(&sample());
    let second = extract_chunks(&sample());
    let ids: HashSet<&str> = first.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), first.len());
    assert_eq!(first, second);
}

#[test]
fn budget_scenario_yields_two_chunks() {
    let doc = MindmapDocument::from_value(json!({
        "main_topics": [{"topic": "Budget", "introduced_by": "Alice"}],
        "relationships": [{"from": "Alice", "to": "Bob", "type": "agrees_with", "initiated_by": "Alice"}]
    }))
    .expect("doc");
    let chunks = extract_chunks(&doc);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].kind, ChunkKind::Topic);
    assert_eq!(chunks[1].kind, ChunkKind::Relationship);
}

#[test]
fn missing_fields_render_empty() {
    let doc = MindmapDocument::from_value(json!({
        "main_topics": [{"topic": "Roadmap", "subtopics": [{"subtopic": "Q3"}]}]
    }))
    .expect("doc");
    let chunks = extract_chunks(&doc);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "Topic: Roadmap introduced by  at . Sentiment: .");
    assert_eq!(chunks[1].text, "Subtopic: Q3 introduced by  ( toward ). Discussed by . Sentiment: ");
}

#[test]
fn non_string_fields_are_rendered() {
    let doc = MindmapDocument::from_value(json!({
        "main_topics": [{
            "topic": "Metrics",
            "introduced_by": null,
            "introduced_at": 42,
            "sentiment": true,
            "subtopics": [{"subtopic": "Latency", "targeted_at": ["Ops", "Dev"], "discussed_by": "Carol"}]
        }],
        "relationships": null
    }))
    .expect("doc");
    let chunks = extract_chunks(&doc);
    assert_eq!(chunks[0].text, "Topic: Metrics introduced by  at 42. Sentiment: true.");
    assert!(chunks[1].text.contains("( toward Ops, Dev)"));
    assert!(chunks[1].text.contains("Discussed by Carol."));
}

#[test]
fn empty_document_yields_no_chunks() {
    let doc = MindmapDocument::from_value(json!({"main_topics": [], "relationships": []})).expect("doc");
    assert!(doc.is_empty());
    assert!(extract_chunks(&doc).is_empty());
}

#[test]
fn missing_topics_key_is_malformed() {
    let err = MindmapDocument::from_value(json!({"relationships": []})).unwrap_err();
    assert!(matches!(err, Error::MalformedInput(ref msg) if msg.contains("main_topics")), "{err}");
}

#[test]
fn topics_must_be_a_sequence() {
    let err = MindmapDocument::from_value(json!({"main_topics": "Budget"})).unwrap_err();
    assert!(matches!(err, Error::MalformedInput(ref msg) if msg.contains("a string")), "{err}");

    let err = MindmapDocument::from_json_str("[1, 2").unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
}

#[test]
fn relationships_are_optional() {
    let doc = MindmapDocument::from_value(json!({"main_topics": [{"topic": "Solo"}]})).expect("doc");
    assert!(doc.relationships.is_empty());
    assert_eq!(extract_chunks(&doc).len(), 1);
}

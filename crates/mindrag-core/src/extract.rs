//! Mindmap → chunk extraction.
//!
//! Output order is fixed: each topic followed by its subtopics, in document
//! order, then every relationship. The vector index breaks distance ties by
//! this order, so it must not change between builds of the same document.

use crate::mindmap::{MindmapDocument, Relationship, Subtopic, Topic};
use crate::types::{Chunk, ChunkKind};

pub fn extract_chunks(doc: &MindmapDocument) -> Vec<Chunk> {
    let subtopic_count: usize = doc.main_topics.iter().map(|t| t.subtopics.len()).sum();
    let mut chunks = Vec::with_capacity(doc.main_topics.len() + subtopic_count + doc.relationships.len());

    for (t, topic) in doc.main_topics.iter().enumerate() {
        chunks.push(Chunk { id: format!("topic:{t}"), text: render_topic(topic), kind: ChunkKind::Topic });
        for (s, sub) in topic.subtopics.iter().enumerate() {
            chunks.push(Chunk {
                id: format!("subtopic:{t}.{s}"),
                text: render_subtopic(sub),
                kind: ChunkKind::Subtopic,
            });
        }
    }
    for (r, rel) in doc.relationships.iter().enumerate() {
        chunks.push(Chunk {
            id: format!("relationship:{r}"),
            text: render_relationship(rel),
            kind: ChunkKind::Relationship,
        });
    }
    chunks
}

pub fn render_topic(topic: &Topic) -> String {
    format!(
        "Topic: {} introduced by {} at {}. Sentiment: {}.",
        topic.topic, topic.introduced_by, topic.introduced_at, topic.sentiment
    )
}

pub fn render_subtopic(sub: &Subtopic) -> String {
    format!(
        "Subtopic: {} introduced by {} ({} toward {}). Discussed by {}. Sentiment: {}",
        sub.subtopic,
        sub.introduced_by,
        sub.stance,
        sub.targeted_at,
        sub.discussed_by.join(", "),
        sub.sentiment
    )
}

pub fn render_relationship(rel: &Relationship) -> String {
    format!("Relationship: {} {} {} (initiated by {})", rel.from, rel.relation, rel.to, rel.initiated_by)
}

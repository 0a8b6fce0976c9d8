//! Canonical mindmap document and the boundary normalization that produces it.
//!
//! Conversations have been stored in three shapes: a JSON-encoded string, a
//! legacy list of blocks, and a structured object. [`MindmapPayload`] tags
//! which one arrived and [`MindmapPayload::normalize`] turns any of them into a
//! [`MindmapDocument`], so the retrieval engine only ever sees one shape.
//!
//! Leaf fields are lenient: numbers and booleans are rendered as text, lists
//! are comma-joined, and `null` or absent fields become empty strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MindmapDocument {
    #[serde(default, alias = "speakers", deserialize_with = "null_as_empty")]
    pub participants: Vec<Participant>,
    pub main_topics: Vec<Topic>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Topic {
    #[serde(deserialize_with = "lenient_text")]
    pub topic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub introduced_by: String,
    #[serde(deserialize_with = "lenient_text")]
    pub introduced_at: String,
    #[serde(deserialize_with = "lenient_text")]
    pub sentiment: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subtopics: Vec<Subtopic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Subtopic {
    #[serde(deserialize_with = "lenient_text")]
    pub subtopic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub introduced_by: String,
    #[serde(deserialize_with = "lenient_text")]
    pub stance: String,
    #[serde(deserialize_with = "lenient_text")]
    pub targeted_at: String,
    #[serde(deserialize_with = "lenient_list")]
    pub discussed_by: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub sentiment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Relationship {
    #[serde(deserialize_with = "lenient_text")]
    pub from: String,
    #[serde(deserialize_with = "lenient_text")]
    pub to: String,
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub relation: String,
    #[serde(deserialize_with = "lenient_text")]
    pub initiated_by: String,
}

impl MindmapDocument {
    /// Validate the required top-level shape, then deserialize leniently.
    pub fn from_value(value: Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(Error::MalformedInput(format!(
                "expected an object at the top level, found {}",
                value_kind(&value)
            )));
        };
        match obj.get("main_topics") {
            None => return Err(Error::MalformedInput("missing required key `main_topics`".to_string())),
            Some(topics) if !topics.is_array() => {
                return Err(Error::MalformedInput(format!(
                    "`main_topics` must be a sequence, found {}",
                    value_kind(topics)
                )))
            }
            Some(_) => {}
        }
        serde_json::from_value(value).map_err(|e| Error::MalformedInput(e.to_string()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|e| Error::MalformedInput(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// True when there is nothing to extract.
    pub fn is_empty(&self) -> bool {
        self.main_topics.is_empty() && self.relationships.is_empty()
    }

    fn absorb(&mut self, other: MindmapDocument) {
        for p in other.participants {
            if !self.participants.iter().any(|known| known.name == p.name) {
                self.participants.push(p);
            }
        }
        self.main_topics.extend(other.main_topics);
        self.relationships.extend(other.relationships);
    }
}

/// A mindmap as it arrives from storage, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum MindmapPayload {
    /// The document serialized into a JSON string.
    Encoded(String),
    /// Legacy list of blocks; blocks carrying `main_topics` are merged in order.
    Blocks(Vec<Value>),
    /// Already-structured object.
    Document(Value),
}

impl From<Value> for MindmapPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(raw) => Self::Encoded(raw),
            Value::Array(blocks) => Self::Blocks(blocks),
            other => Self::Document(other),
        }
    }
}

impl MindmapPayload {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str::<Value>(raw)
            .map(Self::from)
            .map_err(|e| Error::MalformedInput(format!("invalid JSON: {e}")))
    }

    pub fn normalize(self) -> Result<MindmapDocument> {
        match self {
            Self::Encoded(raw) => {
                let value: Value = serde_json::from_str(&raw)
                    .map_err(|e| Error::MalformedInput(format!("encoded mindmap is not valid JSON: {e}")))?;
                if value.is_string() {
                    return Err(Error::MalformedInput("mindmap is encoded more than once".to_string()));
                }
                Self::from(value).normalize()
            }
            Self::Blocks(blocks) => {
                let total = blocks.len();
                let mut merged: Option<MindmapDocument> = None;
                for (i, block) in blocks.into_iter().enumerate() {
                    if block.get("main_topics").is_none() {
                        continue;
                    }
                    let doc = MindmapDocument::from_value(block)
                        .map_err(|e| Error::MalformedInput(format!("block {i}: {e}")))?;
                    match merged.as_mut() {
                        Some(acc) => acc.absorb(doc),
                        None => merged = Some(doc),
                    }
                }
                merged.ok_or_else(|| {
                    Error::MalformedInput(format!("none of the {total} blocks carries `main_topics`"))
                })
            }
            Self::Document(value) => MindmapDocument::from_value(value),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(render(&Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().map(render).filter(|s| !s.is_empty()).collect(),
        Value::Null => Vec::new(),
        other => {
            let single = render(&other);
            if single.is_empty() { Vec::new() } else { vec![single] }
        }
    };
    Ok(list)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<'de> Deserialize<'de> for Participant {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Participants appear both as `{"name": ..}` objects and as bare speaker names.
        let name = match Value::deserialize(deserializer)? {
            Value::Object(map) => map.get("name").map(render).unwrap_or_default(),
            other => render(&other),
        };
        Ok(Self { name })
    }
}

//! JSON loading for content files.
//!
//! Content is parsed into a [`JsonNode`] tree rather than `serde_json::Value`
//! because object keys must keep their order *and* their duplicates: a
//! duplicated entity ID inside one object is a finding, not something the
//! parser may silently collapse.
//!
//! A syntax error produces exactly one ERROR and no document. There is no
//! partial-document recovery.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Number;

use crate::issue::{Issue, IssueSink, Location};

/// A parsed JSON value that preserves duplicate object keys.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Any JSON number.
    Number(Number),
    /// A string.
    String(String),
    /// An array.
    Array(Vec<JsonNode>),
    /// An object, entries in document order.
    Object(JsonObject),
}

/// Object entries in document order, duplicates included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonObject(Vec<(String, JsonNode)>);

impl JsonObject {
    /// Build an object from entries.
    #[must_use]
    pub fn from_entries(entries: Vec<(String, JsonNode)>) -> Self {
        Self(entries)
    }

    /// Value for `key`. With duplicate keys the last one wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonNode> {
        self.0.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonNode)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the object has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl JsonNode {
    /// JSON type name used in messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(n) if n.is_f64() => "float",
            Self::Number(_) => "integer",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// String contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[JsonNode]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Entries, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Integer value. Floats and booleans are not integers.
    ///
    /// Unsigned values beyond `i64::MAX` saturate.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) if !n.is_f64() => n
                .as_i64()
                .or_else(|| n.as_u64().map(|_| i64::MAX)),
            _ => None,
        }
    }

    /// Numeric value of any JSON number. Booleans are not numbers.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Whether this is `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for JsonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(obj) => {
                f.write_str("{")?;
                for (i, (key, value)) in obj.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl<'de> Deserialize<'de> for JsonNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = JsonNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonNode, E> {
        Ok(JsonNode::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonNode, E> {
        Ok(JsonNode::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonNode, E> {
        Ok(JsonNode::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonNode, E> {
        Number::from_f64(v)
            .map(JsonNode::Number)
            .ok_or_else(|| E::custom("number is not finite"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonNode, E> {
        Ok(JsonNode::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonNode, E> {
        Ok(JsonNode::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonNode, E> {
        Ok(JsonNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonNode, E> {
        Ok(JsonNode::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonNode, D::Error> {
        JsonNode::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonNode::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonNode, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, JsonNode>()? {
            entries.push((key, value));
        }
        Ok(JsonNode::Object(JsonObject(entries)))
    }
}

/// Parse `content` into a document.
///
/// On a syntax error one ERROR is recorded in `sink` (with the parser's line
/// and column) and `None` is returned; the caller must skip every other
/// check for this file.
pub fn parse_document(content: &str, sink: &mut IssueSink<'_>) -> Option<JsonNode> {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);
    match serde_json::from_str::<JsonNode>(text) {
        Ok(node) => Some(node),
        Err(e) => {
            let full = e.to_string();
            let message = full
                .rsplit_once(" at line ")
                .map_or(full.as_str(), |(head, _)| head);
            let location = Location::with_column(sink.file().to_path_buf(), e.line(), e.column());
            sink.push(Issue::error(
                location,
                format!("JSON syntax error: {message}"),
            ));
            None
        }
    }
}

/// Maps byte offsets in a file to 1-based line numbers and finds where keys
/// and string values appear.
///
/// Lookups are textual and best-effort; when nothing matches they fall back
/// to line 1.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    content: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Index `content`.
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            content,
            line_starts,
        }
    }

    /// 1-based line containing byte `offset`.
    #[must_use]
    pub fn line_of_offset(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Line of the `occurrence`-th (0-based) appearance of `key` as a key
    /// of an object opened at nesting `depth`.
    ///
    /// Every `{` or `[` opens one level, so the keys of a top-level object
    /// are at depth 1 and the keys of objects inside a top-level array are at
    /// depth 2. Keys of the same name deeper in the file are not counted.
    #[must_use]
    pub fn key_line(&self, key: &str, depth: usize, occurrence: usize) -> usize {
        let needle = quoted(key);
        let raw = &needle[1..needle.len() - 1];
        self.keys_at_depth(depth)
            .into_iter()
            .filter(|(_, candidate)| *candidate == raw)
            .nth(occurrence)
            .map_or(1, |(offset, _)| self.line_of_offset(offset))
    }

    /// Line of the `occurrence`-th (0-based) appearance of `value` as a
    /// string value.
    #[must_use]
    pub fn string_line(&self, value: &str, occurrence: usize) -> usize {
        self.find_quoted(value, occurrence, false)
    }

    fn find_quoted(&self, text: &str, occurrence: usize, as_key: bool) -> usize {
        let needle = quoted(text);
        self.content
            .match_indices(needle.as_str())
            .filter(|(offset, _)| {
                let rest = self.content[offset + needle.len()..].trim_start();
                rest.starts_with(':') == as_key
            })
            .nth(occurrence)
            .map_or(1, |(offset, _)| self.line_of_offset(offset))
    }

    /// Offset and raw (still escaped) text of every object key at `depth`.
    fn keys_at_depth(&self, depth: usize) -> Vec<(usize, &'a str)> {
        let content = self.content;
        let bytes = content.as_bytes();
        let mut keys = Vec::new();
        let mut level = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'{' | b'[' => level += 1,
                b'}' | b']' => level = level.saturating_sub(1),
                b'"' => {
                    let start = i;
                    i += 1;
                    while i < bytes.len() && bytes[i] != b'"' {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                    let end = i.min(bytes.len());
                    let after = (end + 1).min(bytes.len());
                    if level == depth && content[after..].trim_start().starts_with(':') {
                        keys.push((start, &content[start + 1..end]));
                    }
                }
                _ => {}
            }
            i += 1;
        }
        keys
    }
}

/// `text` as a JSON string literal, quotes included.
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

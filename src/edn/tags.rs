use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, bail};

use crate::edn::instant::parse_instant;
use crate::edn::EdnValue;

pub const INST_TAG: &str = "inst";

/// Signature shared by caller-supplied and built-in tag transformers.
pub type Transform = dyn Fn(EdnValue) -> anyhow::Result<EdnValue>;

/// Tag transformers consulted while reading.
///
/// Caller entries take precedence; the built-in `inst` transformer answers
/// only when the caller has not registered their own.
#[derive(Default)]
pub struct TagTransformers {
    transformers: HashMap<String, Box<Transform>>,
}

impl TagTransformers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, tag: impl Into<String>, transform: F) -> Self
    where
        F: Fn(EdnValue) -> anyhow::Result<EdnValue> + 'static,
    {
        self.insert(tag, transform);
        self
    }

    pub fn insert<F>(&mut self, tag: impl Into<String>, transform: F)
    where
        F: Fn(EdnValue) -> anyhow::Result<EdnValue> + 'static,
    {
        self.transformers.insert(tag.into(), Box::new(transform));
    }

    pub fn get(&self, tag: &str) -> Option<&Transform> {
        if let Some(transform) = self.transformers.get(tag) {
            return Some(transform.as_ref());
        }
        let builtin: &Transform = match tag {
            INST_TAG => &read_instant,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }
}

impl fmt::Debug for TagTransformers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("TagTransformers").field("tags", &tags).finish()
    }
}

/// Built-in `#inst`: an ISO-8601 string becomes epoch milliseconds.
pub fn read_instant(value: EdnValue) -> anyhow::Result<EdnValue> {
    let text = match value {
        EdnValue::String(text) => text,
        other => bail!("#inst requires a string value, got {}", other.type_name()),
    };
    parse_instant(&text)
        .map(EdnValue::Instant)
        .ok_or_else(|| anyhow!("Invalid instant format: {}", text))
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NotePilotError, Result};

/// Category tag of a highlight. The set is open: anything not recognised is
/// kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Summary,
    Insight,
    Question,
    Action,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Summary => "summary",
            Category::Insight => "insight",
            Category::Question => "question",
            Category::Action => "action",
            Category::Other(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "summary" => Category::Summary,
            "insight" => Category::Insight,
            "question" => Category::Question,
            "action" => Category::Action,
            _ => Category::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a dropped highlight attaches relative to its target node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Child,
    #[default]
    Sibling,
}

/// One entry of the outline tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub id: String,
    pub label: String,
    /// Position in the source video, in seconds.
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, time: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            time,
            category: None,
            note: None,
            children: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Category name used in rendered output.
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map_or("unknown", Category::as_str)
    }
}

/// A highlight record as produced by the highlight source, both in the
/// configuration file and as the payload of a drop.
///
/// `title` and `shape` are presentation hints. Only `id` and one of
/// `label`/`title` are required to turn a payload into an outline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

impl HighlightPayload {
    /// Parse a payload from its serialized (JSON) form.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| NotePilotError::PayloadParse {
            reason: e.to_string(),
        })
    }

    /// Label shown on the highlight board; prefers the presentation title.
    pub fn display_label(&self) -> Option<&str> {
        self.title.as_deref().or(self.label.as_deref())
    }

    /// Normalize the payload into a leaf outline node. A missing time is
    /// replaced by `fallback_time` (the current playback position).
    pub fn into_node(self, fallback_time: f64) -> Result<OutlineNode> {
        if self.id.trim().is_empty() {
            return Err(NotePilotError::MissingField { field: "id" });
        }

        let label = self
            .label
            .or(self.title)
            .ok_or(NotePilotError::MissingField { field: "label" })?;

        let time = self.time.unwrap_or(fallback_time);
        if !time.is_finite() || time < 0.0 {
            return Err(NotePilotError::InvalidTime { time });
        }

        Ok(OutlineNode {
            id: self.id,
            label,
            time,
            category: self.category,
            note: self.note,
            children: Vec::new(),
        })
    }
}

//! Material and announcement items.
//!
//! Items are decoded leniently from whatever the publishing process wrote:
//! numbers and booleans become strings, a non-array `tags` becomes empty,
//! and empty strings are treated as absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The two lists a page can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Materials,
    Announcements,
}

impl ListKind {
    pub fn label(&self) -> &'static str {
        match self {
            ListKind::Materials => "materials",
            ListKind::Announcements => "announcements",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A downloadable course material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,

    /// Category such as `LECTURE` or `PDF`; compared case-insensitively
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub year: Option<String>,

    /// ISO `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: Option<String>,

    /// Resource path relative to the page directory
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
}

impl Material {
    /// Decode one entry of a normalized payload; non-objects are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }

    /// Upper-cased, trimmed type, if any.
    pub fn type_label(&self) -> Option<String> {
        self.kind
            .as_deref()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
    }

    /// Whether the resource can be shown in the PDF preview.
    pub fn is_pdf(&self) -> bool {
        self.url
            .as_deref()
            .map(|u| u.trim().to_lowercase().ends_with(".pdf"))
            .unwrap_or(false)
    }
}

/// A dated announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub body: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub date: Option<String>,

    /// Last day (inclusive) the announcement is shown
    #[serde(default, deserialize_with = "lenient::text")]
    pub expires: Option<String>,

    #[serde(default, deserialize_with = "lenient::truthy")]
    pub important: bool,

    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
}

impl Announcement {
    /// Decode one entry of a normalized payload; non-objects are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }
}

/// Field decoders that never fail on unexpected JSON types.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Stringify a scalar the way a browser would concatenate it.
    pub fn stringify(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(stringify(&value).filter(|s| !s.is_empty()))
    }

    pub fn tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let Value::Array(entries) = value else {
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .filter_map(stringify)
            .filter(|t| !t.is_empty())
            .collect())
    }

    pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        })
    }
}

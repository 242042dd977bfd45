use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Read-only view over one CMS descriptor object.
///
/// The content API and the search index name the same fields differently
/// (`guid` vs `objectId`, `path` vs `localId`, ...), so every accessor takes
/// the list of accepted keys and returns the first non-null match.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Descriptor<'a> {
    pub fn new(value: &'a Value) -> Result<Self, AppError> {
        value
            .as_object()
            .map(|fields| Self { fields })
            .ok_or_else(|| AppError::Decode(format!("expected an object, got {}", type_name(value))))
    }

    pub fn value(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .find_map(|key| self.fields.get(*key).filter(|v| !v.is_null()))
    }

    /// Optional text field. Numbers and booleans are stringified, multi-valued
    /// fields are joined with `", "`.
    pub fn string(&self, keys: &[&str]) -> Option<String> {
        self.value(keys).and_then(as_text)
    }

    pub fn string_or_default(&self, keys: &[&str]) -> String {
        self.string(keys).unwrap_or_default()
    }

    pub fn require(&self, keys: &[&str]) -> Result<String, AppError> {
        self.string(keys)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Decode(format!("missing field '{}'", keys[0])))
    }

    pub fn flag(&self, keys: &[&str]) -> bool {
        match self.value(keys) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn date(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        self.string(keys).and_then(|raw| parse_date(&raw))
    }

    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        match self.value(keys)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Elements of a repeating-group field, see [`collection_items`].
    pub fn items(&self, keys: &[&str]) -> Vec<&'a Value> {
        self.value(keys).map(collection_items).unwrap_or_default()
    }
}

/// Flatten a repeating group into its elements.
///
/// Groups arrive as `{"item": [..]}`, as `{"item": {..}}` when the group has a
/// single element, or as a bare array.
pub fn collection_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("item") {
            Some(inner) => collection_items(inner),
            None => vec![value],
        },
        other => vec![other],
    }
}

/// Parse a CMS timestamp. Dates without an offset are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Convert a repository path into the URL the site renders it at.
///
/// `/site/website/articles/2020/hello/index.xml` becomes `/articles/2020/hello`
/// and `/site/website/index.xml` becomes `/`.
pub fn store_url_to_render_url(path: &str) -> String {
    let trimmed = path.strip_prefix("/site/website").unwrap_or(path);
    let trimmed = trimmed
        .strip_suffix("/index.xml")
        .or_else(|| trimmed.strip_suffix(".xml"))
        .unwrap_or(trimmed);

    if trimmed.is_empty() || trimmed == "/index" {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(as_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

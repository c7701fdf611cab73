//! Template values: generated resume data classified by shape.

use serde_json::{Map, Value};

use crate::models::resume::GeneratedResume;

/// Contact fields joined into the reserved `{{urls}}` line, in output order.
const CONTACT_FIELDS: [&str; 4] = ["email", "phone", "linkedin", "github"];

/// One element of a list-valued field.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Text(String),
    Record(Map<String, Value>),
}

/// A template value, by the way it is substituted.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Replaced in place.
    Scalar(String),
    /// Expanded into one bullet paragraph per item.
    List(Vec<ListItem>),
    /// Replaced in place as `title: description` or a field dump.
    Record(Map<String, Value>),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => FieldValue::List(items.iter().map(list_item).collect()),
            Value::Object(map) => FieldValue::Record(map.clone()),
            other => FieldValue::Scalar(scalar_text(other)),
        }
    }
}

fn list_item(value: &Value) -> ListItem {
    match value {
        Value::Object(map) => ListItem::Record(map.clone()),
        other => ListItem::Text(scalar_text(other)),
    }
}

/// Text of a JSON value as it appears in the document. Null renders as nothing.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Ordered template fields plus the composed contact line.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateData {
    fields: Vec<(String, FieldValue)>,
    contact_line: String,
}

impl TemplateData {
    /// Builds template data from a JSON object, keeping key order.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let contact_line = CONTACT_FIELDS
            .iter()
            .filter_map(|key| map.get(*key))
            .map(scalar_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty() && !text.eq_ignore_ascii_case("none"))
            .collect::<Vec<_>>()
            .join(" | ");

        let fields = map
            .iter()
            .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
            .collect();

        Self {
            fields,
            contact_line,
        }
    }

    pub fn from_resume(resume: &GeneratedResume) -> Self {
        match serde_json::to_value(resume) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            _ => Self::from_map(&Map::new()),
        }
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn contact_line(&self) -> &str {
        &self.contact_line
    }
}

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One project entry produced by the generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub technologies: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

/// One certification entry produced by the generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub provider: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
}

/// Structured resume content returned by the text-generation service.
///
/// Field names double as template token names (`{{career_objective}}` etc).
/// Keys the schema does not know are kept in `extra` and stay substitutable.
///
/// Model output is loosely typed: null reads as "", numbers and booleans as
/// text, and a lone value where a list is expected as a one-item list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResume {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub github: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub career_objective: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub education: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub experience: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub certifications: Vec<CertificationEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An element of a list field: built from plain text or from a JSON object.
trait ListEntry: Sized {
    fn from_text(text: String) -> Self;
    fn from_object(map: Map<String, Value>) -> Result<Self, serde_json::Error>;
}

impl ListEntry for String {
    fn from_text(text: String) -> Self {
        text
    }

    fn from_object(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        Ok(Value::Object(map).to_string())
    }
}

impl ListEntry for ProjectEntry {
    fn from_text(title: String) -> Self {
        ProjectEntry {
            title,
            ..Default::default()
        }
    }

    fn from_object(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }
}

impl ListEntry for CertificationEntry {
    fn from_text(title: String) -> Self {
        CertificationEntry {
            title,
            ..Default::default()
        }
    }

    fn from_object(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: ListEntry,
{
    let entry = |value: Value| -> Result<Option<T>, D::Error> {
        match value {
            Value::Null => Ok(None),
            Value::Object(map) => T::from_object(map).map(Some).map_err(D::Error::custom),
            other => {
                let text = value_text(other);
                Ok((!text.trim().is_empty()).then(|| T::from_text(text)))
            }
        }
    };

    match Value::deserialize(deserializer)? {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.extend(entry(item)?);
            }
            Ok(out)
        }
        single => Ok(entry(single)?.into_iter().collect()),
    }
}

impl GeneratedResume {
    /// True when the generator produced no usable content at all.
    pub fn is_empty(&self) -> bool {
        *self == GeneratedResume::default()
    }

    /// Fills blank contact fields from the values the submitter typed in.
    /// The model is told to preserve them but does not always echo them back.
    pub fn backfill_contact(
        &mut self,
        full_name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        linkedin: Option<&str>,
        github: Option<&str>,
    ) {
        fill_if_blank(&mut self.full_name, full_name);
        fill_if_blank(&mut self.email, email);
        fill_if_blank(&mut self.phone, phone);
        fill_if_blank(&mut self.linkedin, linkedin);
        fill_if_blank(&mut self.github, github);
    }
}

fn fill_if_blank(field: &mut String, fallback: Option<&str>) {
    if field.trim().is_empty() {
        if let Some(value) = fallback.map(str::trim).filter(|v| !v.is_empty()) {
            *field = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_resume_full_deserializes_correctly() {
        let json = r#"{
            "full_name": "Manjunath",
            "email": "manju@example.com",
            "phone": "7788878878",
            "linkedin": "https://linkedin.com/in/manju",
            "github": "https://github.com/manju",
            "career_objective": "Aspiring backend engineer.",
            "education": "B.Tech in CSE, JNTU, 2024",
            "skills": ["Python", "Java", "SQL", "HTML", "CSS"],
            "projects": [
                {"title": "Ecommerce Clone", "technologies": "React, Node", "description": "Built a store."}
            ],
            "experience": ["Lab work", "Coding practice"],
            "certifications": [
                {"title": "AWS Workshop", "provider": "Nxtwave", "date": "2023"}
            ]
        }"#;

        let r: GeneratedResume = serde_json::from_str(json).unwrap();
        assert_eq!(r.full_name, "Manjunath");
        assert_eq!(r.skills.len(), 5);
        assert_eq!(r.projects[0].technologies, "React, Node");
        assert_eq!(r.certifications[0].provider, "Nxtwave");
        assert!(r.extra.is_empty());
        assert!(!r.is_empty());
    }

    #[test]
    fn test_unknown_keys_land_in_extra() {
        let json = r#"{"full_name": "A", "languages": ["English", "Hindi"]}"#;
        let r: GeneratedResume = serde_json::from_str(json).unwrap();
        assert_eq!(r.extra.len(), 1);
        assert!(r.extra.contains_key("languages"));
    }

    #[test]
    fn test_empty_object_is_empty() {
        let r: GeneratedResume = serde_json::from_str("{}").unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn test_null_and_numbers_read_as_text() {
        let json = r#"{
            "full_name": "Manjunath",
            "email": "a@b.com",
            "phone": null,
            "linkedin": 42,
            "github": false,
            "certifications": [{"title": "AWS Workshop", "provider": null, "date": 2023}]
        }"#;
        let r: GeneratedResume = serde_json::from_str(json).unwrap();
        assert_eq!(r.phone, "");
        assert_eq!(r.linkedin, "42");
        assert_eq!(r.github, "false");
        assert_eq!(r.certifications[0].provider, "");
        assert_eq!(r.certifications[0].date, "2023");
    }

    #[test]
    fn test_lone_values_become_lists() {
        let json = r#"{
            "skills": "Rust",
            "experience": null,
            "projects": {"title": "Shop", "description": "Built a store."},
            "certifications": ["AWS Workshop", null, ""]
        }"#;
        let r: GeneratedResume = serde_json::from_str(json).unwrap();
        assert_eq!(r.skills, vec!["Rust"]);
        assert!(r.experience.is_empty());
        assert_eq!(r.projects.len(), 1);
        assert_eq!(r.projects[0].title, "Shop");
        assert_eq!(r.certifications.len(), 1);
        assert_eq!(r.certifications[0].title, "AWS Workshop");
    }

    #[test]
    fn test_list_items_of_mixed_shape() {
        let json = r#"{"skills": ["Rust", 3, {"name": "SQL"}], "education": ["B.Tech", "2024"]}"#;
        let r: GeneratedResume = serde_json::from_str(json).unwrap();
        assert_eq!(r.skills, vec!["Rust", "3", r#"{"name":"SQL"}"#]);
        assert_eq!(r.education, "B.Tech, 2024");
    }

    #[test]
    fn test_backfill_contact_only_fills_blanks() {
        let mut r = GeneratedResume {
            email: "kept@example.com".to_string(),
            ..Default::default()
        };
        r.backfill_contact(
            Some("Asha Rao"),
            Some("form@example.com"),
            Some(" 12345 "),
            Some(""),
            None,
        );
        assert_eq!(r.full_name, "Asha Rao");
        assert_eq!(r.email, "kept@example.com");
        assert_eq!(r.phone, "12345");
        assert_eq!(r.linkedin, "");
        assert_eq!(r.github, "");
    }
}

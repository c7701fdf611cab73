//! Placeholder substitution over a paragraph modelled as styled spans.
//!
//! Independent of any document library: the caller hands in the runs of one
//! paragraph as `Span`s and applies the returned `Rewrite` to its native
//! objects. Run boundaries carry formatting only, so tokens are searched in
//! the concatenated text.
//!
//! Rules, in order:
//! 1. `{{urls}}` present: substitute the contact line and stop this pass;
//!    `rewrite_paragraph` then runs one more pass for the remaining tokens.
//! 2. Every other `{{key}}` with data: scalars and records inline; the first
//!    list-valued token expands the paragraph into one bullet per item.
//! 3. Unknown tokens stay as literal text.
//!
//! A rewritten paragraph always collapses to a single span carrying the
//! style of its first run.

use serde_json::{Map, Value};

use crate::render::fields::{scalar_text, FieldValue, ListItem, TemplateData};

pub const BULLET: &str = "•";
pub const CONTACT_TOKEN: &str = "urls";

#[derive(Debug, Clone, PartialEq)]
pub struct Span<S> {
    pub text: String,
    pub style: S,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite<S> {
    /// No token with data: leave the paragraph alone.
    Unchanged,
    /// Keep the paragraph in place with this one run.
    Inline(Span<S>),
    /// Replace the paragraph with one bullet paragraph per span, in order.
    /// Empty when a list field is empty and nothing else was in the paragraph.
    Bullets(Vec<Span<S>>),
}

pub fn placeholder(key: &str) -> String {
    format!("{{{{{key}}}}}")
}

/// Computes the rewrite of one paragraph.
pub fn rewrite<S: Clone>(spans: &[Span<S>], data: &TemplateData) -> Rewrite<S> {
    let Some(first) = spans.first() else {
        return Rewrite::Unchanged;
    };
    let mut text: String = spans.iter().map(|s| s.text.as_str()).collect();
    if !text.contains("{{") {
        return Rewrite::Unchanged;
    }
    let style = first.style.clone();

    let contact = placeholder(CONTACT_TOKEN);
    if text.contains(&contact) {
        return Rewrite::Inline(Span {
            text: text.replace(&contact, data.contact_line()),
            style,
        });
    }

    let mut changed = false;
    let mut expansion: Option<(String, Vec<String>)> = None;

    for (key, value) in data.fields() {
        let token = placeholder(key);
        if !text.contains(&token) {
            continue;
        }
        changed = true;
        match value {
            FieldValue::List(items) if expansion.is_none() => {
                // Substituted last, once every inline token is resolved.
                expansion = Some((token, items.iter().map(bullet_line).collect()));
            }
            FieldValue::List(items) => {
                let lines: Vec<String> = items.iter().map(bullet_line).collect();
                text = text.replace(&token, &lines.join("\n"));
            }
            FieldValue::Scalar(s) => text = text.replace(&token, s),
            FieldValue::Record(map) => text = text.replace(&token, &record_text(map)),
        }
    }

    if !changed {
        return Rewrite::Unchanged;
    }

    let Some((token, lines)) = expansion else {
        return Rewrite::Inline(Span { text, style });
    };

    let (prefix, suffix) = text.split_once(&token).unwrap_or((text.as_str(), ""));
    let suffix = suffix.replace(&token, &lines.join("\n"));

    if lines.is_empty() {
        let rest = format!("{prefix}{suffix}");
        return if rest.trim().is_empty() {
            Rewrite::Bullets(Vec::new())
        } else {
            Rewrite::Inline(Span { text: rest, style })
        };
    }

    let last = lines.len() - 1;
    let bullets = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let mut text = line;
            if i == 0 {
                text.insert_str(0, prefix);
            }
            if i == last {
                text.push_str(&suffix);
            }
            Span {
                text,
                style: style.clone(),
            }
        })
        .collect();

    Rewrite::Bullets(bullets)
}

/// Rewrites one paragraph completely: a contact-line pass is followed by a
/// second pass so other tokens next to `{{urls}}` are filled too.
pub fn rewrite_paragraph<S: Clone>(spans: &[Span<S>], data: &TemplateData) -> Rewrite<S> {
    let contact = placeholder(CONTACT_TOKEN);
    let has_contact = spans
        .iter()
        .map(|s| s.text.as_str())
        .collect::<String>()
        .contains(&contact);

    match rewrite(spans, data) {
        Rewrite::Inline(span) if has_contact => {
            match rewrite(std::slice::from_ref(&span), data) {
                Rewrite::Unchanged => Rewrite::Inline(span),
                second => second,
            }
        }
        other => other,
    }
}

/// `• item`, or for records `• title, provider (date)` with the description
/// on a line of its own.
fn bullet_line(item: &ListItem) -> String {
    match item {
        ListItem::Text(text) => format!("{BULLET} {text}"),
        ListItem::Record(map) => {
            let mut line = field(map, "title");
            let provider = field(map, "provider");
            if !provider.is_empty() {
                line.push_str(", ");
                line.push_str(&provider);
            }
            let date = field(map, "date");
            if !date.is_empty() {
                line.push_str(&format!(" ({date})"));
            }
            let description = field(map, "description");
            if !description.is_empty() {
                line.push('\n');
                line.push_str(&description);
            }
            format!("{BULLET} {line}")
        }
    }
}

fn record_text(map: &Map<String, Value>) -> String {
    match (map.get("title"), map.get("description")) {
        (Some(title), Some(description)) => {
            format!("{}: {}", scalar_text(title), scalar_text(description))
        }
        _ => serde_json::to_string_pretty(map).unwrap_or_default(),
    }
}

fn field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .map(scalar_text)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> TemplateData {
        match value {
            Value::Object(m) => TemplateData::from_map(&m),
            _ => panic!("expected object"),
        }
    }

    /// Runs with distinct styles so we can tell which one survives.
    fn spans(parts: &[&str]) -> Vec<Span<usize>> {
        parts
            .iter()
            .enumerate()
            .map(|(i, p)| Span {
                text: p.to_string(),
                style: i,
            })
            .collect()
    }

    fn texts(rewrite: Rewrite<usize>) -> Vec<String> {
        match rewrite {
            Rewrite::Bullets(b) => b.into_iter().map(|s| s.text).collect(),
            other => panic!("expected bullets, got {other:?}"),
        }
    }

    #[test]
    fn test_list_expands_to_one_bullet_per_item() {
        let d = data(json!({"skills": ["A", "B", "C"]}));
        let out = texts(rewrite(&spans(&["{{skills}}"]), &d));
        assert_eq!(out, vec!["• A", "• B", "• C"]);
    }

    #[test]
    fn test_list_keeps_input_order_and_duplicates() {
        let d = data(json!({"experience": ["z", "a", "z"]}));
        let out = texts(rewrite(&spans(&["{{experience}}"]), &d));
        assert_eq!(out, vec!["• z", "• a", "• z"]);
    }

    #[test]
    fn test_token_split_across_runs() {
        let d = data(json!({"full_name": "Asha Rao"}));
        let out = rewrite(&spans(&["Name: {{full", "_na", "me}}!"]), &d);
        assert_eq!(
            out,
            Rewrite::Inline(Span {
                text: "Name: Asha Rao!".into(),
                style: 0
            })
        );
    }

    #[test]
    fn test_contact_token_takes_precedence() {
        let d = data(json!({
            "email": "a@b.com",
            "phone": null,
            "linkedin": "",
            "github": "g",
            "full_name": "Asha"
        }));
        let out = rewrite(&spans(&["{{urls}}"]), &d);
        assert_eq!(
            out,
            Rewrite::Inline(Span {
                text: "a@b.com | g".into(),
                style: 0
            })
        );

        // One pass stops at the contact line.
        let out = rewrite(&spans(&["{{full_name}} ", "{{urls}}"]), &d);
        assert_eq!(
            out,
            Rewrite::Inline(Span {
                text: "{{full_name}} a@b.com | g".into(),
                style: 0
            })
        );
    }

    #[test]
    fn test_paragraph_rewrite_fills_tokens_beside_contact_line() {
        let d = data(json!({"email": "a@b.com", "github": "g", "full_name": "Asha"}));
        let out = rewrite_paragraph(&spans(&["{{full_name}} ", "{{urls}}"]), &d);
        assert_eq!(
            out,
            Rewrite::Inline(Span {
                text: "Asha a@b.com | g".into(),
                style: 0
            })
        );

        // Without a contact token it is a single pass.
        let d = data(json!({"skills": ["A", "B"]}));
        assert_eq!(
            rewrite_paragraph(&spans(&["{{skills}}"]), &d),
            rewrite(&spans(&["{{skills}}"]), &d)
        );
    }

    #[test]
    fn test_unknown_token_left_untouched() {
        let d = data(json!({"full_name": "Asha"}));
        assert_eq!(rewrite(&spans(&["{{hobbies}}"]), &d), Rewrite::Unchanged);

        let out = rewrite(&spans(&["{{full_name}} likes {{hobbies}}"]), &d);
        assert_eq!(
            out,
            Rewrite::Inline(Span {
                text: "Asha likes {{hobbies}}".into(),
                style: 0
            })
        );
    }

    #[test]
    fn test_plain_paragraph_unchanged() {
        let d = data(json!({"full_name": "Asha"}));
        assert_eq!(rewrite(&spans(&["Hello", " world"]), &d), Rewrite::Unchanged);
        assert_eq!(rewrite::<usize>(&[], &d), Rewrite::Unchanged);
    }

    #[test]
    fn test_record_list_bullets() {
        let d = data(json!({
            "certifications": [
                {"title": "AWS Workshop", "provider": "Nxtwave", "date": "2023"},
                {"title": "Rust Course", "provider": "", "date": ""}
            ],
            "projects": [
                {"title": "Shop", "technologies": "React", "description": "Built a store."}
            ]
        }));
        let out = texts(rewrite(&spans(&["{{certifications}}"]), &d));
        assert_eq!(out, vec!["• AWS Workshop, Nxtwave (2023)", "• Rust Course"]);

        let out = texts(rewrite(&spans(&["{{projects}}"]), &d));
        assert_eq!(out, vec!["• Shop\nBuilt a store."]);
    }

    #[test]
    fn test_single_record_inline() {
        let d = data(json!({
            "highlight": {"title": "Hackathon", "description": "Won first place"},
            "meta": {"b": 1, "a": 2}
        }));
        let out = rewrite(&spans(&["{{highlight}}"]), &d);
        assert_eq!(
            out,
            Rewrite::Inline(Span {
                text: "Hackathon: Won first place".into(),
                style: 0
            })
        );

        match rewrite(&spans(&["{{meta}}"]), &d) {
            Rewrite::Inline(span) => {
                let b = span.text.find("\"b\"").unwrap();
                let a = span.text.find("\"a\"").unwrap();
                assert!(b < a, "field order must be preserved: {}", span.text);
            }
            other => panic!("expected inline, got {other:?}"),
        }
    }

    #[test]
    fn test_surrounding_text_wraps_bullets() {
        let d = data(json!({"skills": ["A", "B"]}));
        let out = texts(rewrite(&spans(&["Skills: {{skills}} (core)"]), &d));
        assert_eq!(out, vec!["Skills: • A", "• B (core)"]);
    }

    #[test]
    fn test_empty_list_removes_bare_paragraph() {
        let d = data(json!({"skills": []}));
        assert_eq!(
            rewrite(&spans(&["{{skills}}"]), &d),
            Rewrite::Bullets(Vec::new())
        );
        assert_eq!(
            rewrite(&spans(&["Skills: {{skills}}"]), &d),
            Rewrite::Inline(Span {
                text: "Skills: ".into(),
                style: 0
            })
        );
    }

    #[test]
    fn test_second_list_in_paragraph_is_inlined() {
        let d = data(json!({"skills": ["A", "B"], "experience": ["X"]}));
        let out = texts(rewrite(&spans(&["{{skills}} / {{experience}}"]), &d));
        assert_eq!(out, vec!["• A", "• B / • X"]);
    }

    #[test]
    fn test_scalars_and_list_together() {
        let d = data(json!({"full_name": "Asha", "skills": ["A", "B"]}));
        let out = rewrite(&spans(&["{{full_name}}: ", "{{skills}}"]), &d);
        assert_eq!(
            out,
            Rewrite::Bullets(vec![
                Span {
                    text: "Asha: • A".into(),
                    style: 0
                },
                Span {
                    text: "• B".into(),
                    style: 0
                },
            ])
        );
    }
}

//! Content Generator: turns an intake record into structured resume data.
//!
//! One prompt, one request, no retry. Any failure (transport, API status,
//! unparseable reply, empty object) collapses into `GenerationOutcome::Empty`;
//! callers treat that as "generation failed" and stop the pipeline.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::generation::prompts::{RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::intake::IntakeRecord;
use crate::models::resume::GeneratedResume;

/// Result of one generation attempt.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum GenerationOutcome {
    Generated(GeneratedResume),
    /// Nothing usable came back. `reason` is for logs only.
    Empty { reason: String },
}

impl GenerationOutcome {
    fn empty(reason: impl Into<String>) -> Self {
        GenerationOutcome::Empty {
            reason: reason.into(),
        }
    }
}

/// The content generator seam. `AppState` carries an `Arc<dyn ContentGenerator>`.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, record: &IntakeRecord) -> GenerationOutcome;
}

/// Generator backed by the chat completions client.
pub struct LlmContentGenerator {
    llm: LlmClient,
}

impl LlmContentGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate(&self, record: &IntakeRecord) -> GenerationOutcome {
        let prompt = build_prompt(record);
        info!(
            "Requesting resume content for submission {} ({} prompt chars)",
            record.id,
            prompt.len()
        );

        match self
            .llm
            .call_json::<GeneratedResume>(&prompt, RESUME_SYSTEM)
            .await
        {
            Ok(resume) => accept(resume),
            Err(e) => {
                warn!("Resume generation failed for submission {}: {e}", record.id);
                GenerationOutcome::empty(e.to_string())
            }
        }
    }
}

fn accept(resume: GeneratedResume) -> GenerationOutcome {
    if resume.is_empty() {
        warn!("Generator returned an empty resume object");
        GenerationOutcome::empty("generator returned no fields")
    } else {
        GenerationOutcome::Generated(resume)
    }
}

/// Builds the generation prompt, embedding every intake field verbatim.
pub fn build_prompt(record: &IntakeRecord) -> String {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();
    let job_description = record
        .job_description
        .as_deref()
        .filter(|jd| !jd.trim().is_empty())
        .unwrap_or("Not provided")
        .to_string();

    fill_placeholders(
        RESUME_PROMPT_TEMPLATE,
        &[
            ("json_only_instruction", JSON_ONLY_INSTRUCTION.to_string()),
            ("full_name", field(&record.full_name)),
            ("email", field(&record.email_address)),
            ("phone", field(&record.phone_number)),
            ("career_objective", field(&record.career_objective)),
            ("education", field(&record.education)),
            ("skills", field(&record.skills)),
            ("projects", field(&record.projects)),
            ("experience", field(&record.work_experience)),
            ("certifications", field(&record.certifications)),
            ("linkedin", field(&record.linkedin_url)),
            ("github", field(&record.github_url)),
            ("job_description", job_description),
        ],
    )
}

/// Single-pass `{name}` replacement, so braces inside user input are never
/// re-expanded. Unknown `{...}` groups (the JSON skeleton) are copied as-is.
fn fill_placeholders(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 1024);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm_client::tests::{completion, stub_server};
    use crate::models::intake::VerificationState;
    use axum::http::StatusCode;
    use std::time::Duration;

    pub(crate) fn record() -> IntakeRecord {
        IntakeRecord {
            id: 1,
            full_name: Some("Manjunath".into()),
            email_address: Some("manju@example.com".into()),
            phone_number: Some("7788878878".into()),
            career_objective: Some("To obtain a challenging role.".into()),
            education: Some("B.Tech in CSE, JNTU, 2024".into()),
            skills: Some("Python, Java, {SQL}".into()),
            projects: Some("Ecommerce Clone".into()),
            work_experience: Some("Fresher".into()),
            certifications: Some("AWS Workshop by Nxtwave".into()),
            linkedin_url: Some("https://linkedin.com/in/manju".into()),
            github_url: None,
            transaction_id: Some("TXN1".into()),
            payment_confirmation: Some("yes".into()),
            payment_screenshot: None,
            job_description: None,
            is_verified: VerificationState::Verified,
            resume_sent: false,
            submission_timestamp: Some("2024-05-01T10:15:30+00:00".into()),
        }
    }

    #[test]
    fn test_prompt_embeds_every_field() {
        let prompt = build_prompt(&record());
        assert!(prompt.contains("Full Name: Manjunath"));
        assert!(prompt.contains("Email: manju@example.com"));
        assert!(prompt.contains("Phone: 7788878878"));
        assert!(prompt.contains("Education: B.Tech in CSE, JNTU, 2024"));
        assert!(prompt.contains("Experience: Fresher"));
        assert!(prompt.contains("LinkedIn: https://linkedin.com/in/manju"));
        assert!(prompt.contains("GitHub: \n"));
        assert!(prompt.contains("Job Description (optional): Not provided"));
        assert!(prompt.contains(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_prompt_keeps_user_braces_and_schema() {
        let prompt = build_prompt(&record());
        assert!(prompt.contains("Skills: Python, Java, {SQL}"));
        assert!(prompt.contains(r#"{"title": "", "provider": "", "date": ""}"#));
        assert!(!prompt.contains("{full_name}"));
    }

    #[test]
    fn test_fill_placeholders_single_pass() {
        let out = fill_placeholders(
            "{a}-{b}",
            &[("a", "{b}".to_string()), ("b", "x".to_string())],
        );
        assert_eq!(out, "{b}-x");
    }

    #[test]
    fn test_empty_object_is_empty_outcome() {
        assert!(matches!(
            accept(GeneratedResume::default()),
            GenerationOutcome::Empty { .. }
        ));
    }

    #[tokio::test]
    async fn test_generate_parses_reply() {
        let reply = r#"{"full_name": "Manjunath", "skills": ["Python", "Java"]}"#;
        let base = stub_server(StatusCode::OK, completion(reply)).await;
        let llm = LlmClient::new("key".into(), base, Duration::from_secs(5)).unwrap();

        match LlmContentGenerator::new(llm).generate(&record()).await {
            GenerationOutcome::Generated(resume) => {
                assert_eq!(resume.full_name, "Manjunath");
                assert_eq!(resume.skills, vec!["Python", "Java"]);
            }
            other => panic!("expected generated resume, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_accepts_null_contact_field() {
        let reply = r#"{"full_name": "Manjunath", "email": "a@b.com", "phone": null, "linkedin": "", "github": "g", "skills": ["Python"]}"#;
        let base = stub_server(StatusCode::OK, completion(reply)).await;
        let llm = LlmClient::new("key".into(), base, Duration::from_secs(5)).unwrap();

        match LlmContentGenerator::new(llm).generate(&record()).await {
            GenerationOutcome::Generated(resume) => {
                assert_eq!(resume.phone, "");
                assert_eq!(resume.github, "g");
            }
            other => panic!("expected generated resume, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_accepts_numeric_certification_date() {
        let reply = r#"{"full_name": "Manjunath", "certifications": [{"title": "AWS Workshop", "provider": "Nxtwave", "date": 2023}]}"#;
        let base = stub_server(StatusCode::OK, completion(reply)).await;
        let llm = LlmClient::new("key".into(), base, Duration::from_secs(5)).unwrap();

        match LlmContentGenerator::new(llm).generate(&record()).await {
            GenerationOutcome::Generated(resume) => {
                assert_eq!(resume.certifications[0].date, "2023");
            }
            other => panic!("expected generated resume, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_invalid_json_is_empty() {
        let base = stub_server(StatusCode::OK, completion("Sure! Here is your resume.")).await;
        let llm = LlmClient::new("key".into(), base, Duration::from_secs(5)).unwrap();

        let outcome = LlmContentGenerator::new(llm).generate(&record()).await;
        assert!(matches!(outcome, GenerationOutcome::Empty { .. }));
    }

    #[tokio::test]
    async fn test_generate_api_failure_is_empty() {
        let base = stub_server(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"error": {"message": "overloaded"}}),
        )
        .await;
        let llm = LlmClient::new("key".into(), base, Duration::from_secs(5)).unwrap();

        let outcome = LlmContentGenerator::new(llm).generate(&record()).await;
        assert_eq!(
            outcome,
            GenerationOutcome::Empty {
                reason: "API error (status 500): overloaded".to_string()
            }
        );
    }
}

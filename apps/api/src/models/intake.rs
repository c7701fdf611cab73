use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sqlx::FromRow;

/// Payment verification status of a submission.
/// Stored and serialized as an integer: 0 unverified, 1 verified, -1 rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum VerificationState {
    #[default]
    Unverified = 0,
    Verified = 1,
    Rejected = -1,
}

impl From<VerificationState> for i32 {
    fn from(state: VerificationState) -> Self {
        state as i32
    }
}

impl TryFrom<i32> for VerificationState {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VerificationState::Unverified),
            1 => Ok(VerificationState::Verified),
            -1 => Ok(VerificationState::Rejected),
            other => Err(format!("unknown verification state {other}")),
        }
    }
}

/// Operator decision on a submission's payment proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    /// Parses the wire action. Only `verify` and `reject` are accepted.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "verify" => Some(Verdict::Approve),
            "reject" => Some(Verdict::Reject),
            _ => None,
        }
    }

    pub fn state(self) -> VerificationState {
        match self {
            Verdict::Approve => VerificationState::Verified,
            Verdict::Reject => VerificationState::Rejected,
        }
    }
}

/// A persisted resume request, one row of `resume_requests`.
/// Status flags serialize as the stored integers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IntakeRecord {
    pub id: i64,
    pub full_name: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub career_objective: Option<String>,
    pub education: Option<String>,
    pub skills: Option<String>,
    pub projects: Option<String>,
    pub work_experience: Option<String>,
    pub certifications: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub transaction_id: Option<String>,
    #[sqlx(rename = "payment_checkbox")]
    pub payment_confirmation: Option<String>,
    pub payment_screenshot: Option<String>,
    pub job_description: Option<String>,
    pub is_verified: VerificationState,
    #[serde(serialize_with = "flag_as_int")]
    pub resume_sent: bool,
    /// RFC 3339 text. Rows written by earlier deployments carry naive ISO 8601.
    pub submission_timestamp: Option<String>,
}

fn flag_as_int<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i32(i32::from(*flag))
}

/// Body of `POST /submit`. Form tools send loosely typed values, so every field
/// accepts a string, number, boolean, null or list of those and is stored as text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntakeSubmission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub career_objective: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub education: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub skills: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub projects: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub work_experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub certifications: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub github_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_id: Option<String>,
    #[serde(
        default,
        alias = "☑️_payment_confirmation_checkbox",
        deserialize_with = "lenient_text"
    )]
    pub payment_confirmation: Option<String>,
    #[serde(
        default,
        alias = "📤_upload_screenshot_of_payment",
        deserialize_with = "lenient_text"
    )]
    pub payment_screenshot: Option<String>,
    #[serde(
        default,
        alias = "paste_the_job_description_(jd)_or_job_post",
        deserialize_with = "lenient_text"
    )]
    pub job_description: Option<String>,
}

impl IntakeSubmission {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        *self == IntakeSubmission::default()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Deserializes a record id given either as an integer or a numeric string.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("id must be an integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom("id must be an integer")),
        _ => Err(D::Error::custom("id must be an integer")),
    }
}

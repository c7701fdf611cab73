//! Generate-and-send: verified record → generated content → filled document → email.
//!
//! Stages run strictly in order and the first failure aborts the rest. The
//! record stays `resume_sent = false` unless every stage succeeded.

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::generator::GenerationOutcome;
use crate::notify::RESUME_SUBJECT;
use crate::state::AppState;

pub async fn generate_and_send(state: &AppState, id: i64) -> Result<(), AppError> {
    // Held until the record is marked sent, so a concurrent verify or a second
    // generate on the same id waits for this run to finish.
    let _guard = state.store.lock_record(id).await;

    let record = state.store.get_verified(id).await?.ok_or_else(|| {
        AppError::NotFound("Submission not found or not verified".to_string())
    })?;

    let mut resume = match state.generator.generate(&record).await {
        GenerationOutcome::Generated(resume) => resume,
        GenerationOutcome::Empty { reason } => {
            error!("Submission {id}: generation produced nothing ({reason})");
            return Err(AppError::Generation(
                "GPT returned empty or invalid data".to_string(),
            ));
        }
    };
    resume.backfill_contact(
        record.full_name.as_deref(),
        record.email_address.as_deref(),
        record.phone_number.as_deref(),
        record.linkedin_url.as_deref(),
        record.github_url.as_deref(),
    );

    let document = state.filler.fill(&resume).await?;
    info!("Submission {id}: resume written to {}", document.display());

    let recipient = record.email_address.as_deref().unwrap_or_default().trim();
    state
        .notifier
        .send(recipient, RESUME_SUBJECT, &document, true)
        .await?;
    if let Some(render_dir) = document.parent() {
        if let Err(e) = tokio::fs::remove_dir(render_dir).await {
            warn!("Failed to remove render directory {}: {e}", render_dir.display());
        }
    }

    state.store.mark_sent(id).await?;
    info!("Submission {id}: resume generated and emailed");
    Ok(())
}

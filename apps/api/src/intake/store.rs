//! Submission Store: the `resume_requests` table plus per-record serialization.
//!
//! Rows are inserted once and never deleted. Only the two status columns change
//! after insert: `is_verified` (verify endpoint) and `resume_sent` (pipeline).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use crate::errors::AppError;
use crate::models::intake::{IntakeRecord, IntakeSubmission, Verdict, VerificationState};

/// Async locks keyed by record id. SQLite serializes single statements but not
/// the read-generate-mark sequence of the pipeline, so verify and
/// generate-and-send on the same id take this lock first.
#[derive(Default)]
struct RecordLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl RecordLocks {
    async fn acquire(&self, id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Drop entries nobody holds or waits on.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Clone)]
pub struct SubmissionStore {
    pool: SqlitePool,
    locks: Arc<RecordLocks>,
}

impl SubmissionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(RecordLocks::default()),
        }
    }

    /// Holds exclusive access to one record until the guard drops.
    pub async fn lock_record(&self, id: i64) -> OwnedMutexGuard<()> {
        self.locks.acquire(id).await
    }

    /// Inserts a new submission, unverified and unsent. Returns the assigned id.
    pub async fn create(&self, submission: &IntakeSubmission) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO resume_requests
                (full_name, email_address, phone_number, career_objective, education,
                 skills, projects, work_experience, certifications, linkedin_url,
                 github_url, transaction_id, payment_checkbox, payment_screenshot,
                 job_description, is_verified, resume_sent, submission_timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&submission.full_name)
        .bind(&submission.email_address)
        .bind(&submission.phone_number)
        .bind(&submission.career_objective)
        .bind(&submission.education)
        .bind(&submission.skills)
        .bind(&submission.projects)
        .bind(&submission.work_experience)
        .bind(&submission.certifications)
        .bind(&submission.linkedin_url)
        .bind(&submission.github_url)
        .bind(&submission.transaction_id)
        .bind(&submission.payment_confirmation)
        .bind(&submission.payment_screenshot)
        .bind(&submission.job_description)
        .bind(VerificationState::Unverified)
        .bind(false)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!("Stored submission {id}");
        Ok(id)
    }

    /// All submissions in insertion order.
    pub async fn list(&self) -> Result<Vec<IntakeRecord>, AppError> {
        Ok(
            sqlx::query_as::<_, IntakeRecord>("SELECT * FROM resume_requests ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    #[cfg(test)]
    pub async fn get(&self, id: i64) -> Result<Option<IntakeRecord>, AppError> {
        Ok(
            sqlx::query_as::<_, IntakeRecord>("SELECT * FROM resume_requests WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Returns the record only when its payment has been verified.
    pub async fn get_verified(&self, id: i64) -> Result<Option<IntakeRecord>, AppError> {
        Ok(sqlx::query_as::<_, IntakeRecord>(
            "SELECT * FROM resume_requests WHERE id = ? AND is_verified = ?",
        )
        .bind(id)
        .bind(VerificationState::Verified)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Records the operator's verdict. An absent id is reported as not found.
    pub async fn set_verification(&self, id: i64, verdict: Verdict) -> Result<(), AppError> {
        let _guard = self.lock_record(id).await;

        let result = sqlx::query("UPDATE resume_requests SET is_verified = ? WHERE id = ?")
            .bind(verdict.state())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Submission {id} not found")));
        }

        info!("Submission {id} marked {:?}", verdict.state());
        Ok(())
    }

    pub async fn mark_sent(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE resume_requests SET resume_sent = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Submission {id} not found")));
        }

        info!("Submission {id} marked sent");
        Ok(())
    }
}

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{Admission, JobStore, StatusCounts, StoreError};
use crate::domain::{CanonicalUrl, Job, JobId, JobStatus, Transcript, TransitionError};

/// Postgres-backed job store. Dedup atomicity comes from the partial unique
/// index on `canonical_url` over non-terminal rows; transitions are guarded
/// UPDATEs keyed on the current status.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        row.map(job_from_row).transpose()
    }

    async fn require(&self, id: JobId) -> Result<Job, StoreError> {
        self.fetch(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.as_uuid().to_string()))
    }

    /// Applies a status-guarded transition; when no row matches the guard,
    /// reports the refusal with the job's actual status.
    async fn guarded_transition(
        &self,
        id: JobId,
        target: JobStatus,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Job, StoreError> {
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) => job_from_row(row),
            None => {
                let current = self.require(id).await?;
                Err(StoreError::TransitionRefused(TransitionError {
                    from: current.status,
                    to: target,
                }))
            }
        }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn insert_or_get_active(&self, job: Job) -> Result<Admission, StoreError> {
        // Two passes cover the race where the in-flight job terminates
        // between a conflicting insert and the dedup lookup.
        for _ in 0..2 {
            let inserted = sqlx::query(
                r#"
                INSERT INTO jobs (id, source_url, canonical_url, status, progress,
                                  submitted_at, estimated_processing_secs, billed_tokens)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (canonical_url) WHERE status IN ('queued', 'processing')
                DO NOTHING
                "#,
            )
            .bind(job.id.as_uuid())
            .bind(&job.source_url)
            .bind(job.canonical_url.as_str())
            .bind(job.status.as_str())
            .bind(i16::from(job.progress))
            .bind(job.submitted_at)
            .bind(job.estimated_processing_secs as i32)
            .bind(job.billed_tokens as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

            if inserted.rows_affected() == 1 {
                return Ok(Admission::Created(job));
            }

            if let Some(existing) = self.find_active_by_url(&job.canonical_url).await? {
                return Ok(Admission::InFlight(existing));
            }
        }

        Err(StoreError::QueryFailed(
            "dedup insert kept conflicting with a vanishing row".to_string(),
        ))
    }

    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, source_url, canonical_url, status, progress,
                              submitted_at, completed_at, estimated_processing_secs,
                              transcript, billed_tokens)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.source_url)
        .bind(job.canonical_url.as_str())
        .bind(job.status.as_str())
        .bind(i16::from(job.progress))
        .bind(job.submitted_at)
        .bind(job.completed_at)
        .bind(job.estimated_processing_secs as i32)
        .bind(
            job.transcript
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?,
        )
        .bind(job.billed_tokens as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        self.fetch(id).await
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn begin_processing(&self, id: JobId) -> Result<Job, StoreError> {
        let query = sqlx::query(
            "UPDATE jobs SET status = 'processing' WHERE id = $1 AND status = 'queued' RETURNING *",
        )
        .bind(id.as_uuid());
        self.guarded_transition(id, JobStatus::Processing, query)
            .await
    }

    #[instrument(skip(self, transcript), fields(job_id = %id.as_uuid()))]
    async fn complete(
        &self,
        id: JobId,
        transcript: Transcript,
        billed_tokens: u64,
    ) -> Result<Job, StoreError> {
        let transcript_json = serde_json::to_value(&transcript)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        let query = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'completed', progress = 100, current_step = NULL,
                completed_at = NOW(), transcript = $2, billed_tokens = $3
            WHERE id = $1 AND status = 'processing'
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(transcript_json)
        .bind(billed_tokens as i64);
        self.guarded_transition(id, JobStatus::Completed, query)
            .await
    }

    #[instrument(skip(self, message), fields(job_id = %id.as_uuid()))]
    async fn fail(&self, id: JobId, code: &str, message: &str) -> Result<Job, StoreError> {
        let query = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'failed', completed_at = NOW(), error_code = $2, error_message = $3
            WHERE id = $1 AND status IN ('queued', 'processing')
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(code)
        .bind(message);
        self.guarded_transition(id, JobStatus::Failed, query).await
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn cancel(&self, id: JobId) -> Result<Job, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'cancelled', completed_at = NOW()
            WHERE id = $1 AND status IN ('queued', 'processing')
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) => job_from_row(row),
            // Terminal already: cancellation is a no-op.
            None => self.require(id).await,
        }
    }

    async fn record_progress(
        &self,
        id: JobId,
        progress: u8,
        step: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET progress = GREATEST(progress, $2),
                current_step = CASE WHEN progress <= $2 THEN COALESCE($3, current_step)
                                    ELSE current_step END
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(i16::from(progress.min(100)))
        .bind(step)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    async fn find_active_by_url(&self, url: &CanonicalUrl) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(
            "SELECT * FROM jobs WHERE canonical_url = $1 AND status IN ('queued', 'processing')",
        )
        .bind(url.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        row.map(job_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query("SELECT * FROM jobs ORDER BY submitted_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        rows.into_iter().map(job_from_row).collect()
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query("SELECT * FROM jobs WHERE status = $1 ORDER BY submitted_at DESC")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        rows.into_iter().map(job_from_row).collect()
    }

    async fn counts(&self) -> Result<StatusCounts, StoreError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM jobs GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let status: String = row
                .try_get("status")
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            let n: i64 = row
                .try_get("n")
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            let n = n as u64;
            match status.parse::<JobStatus>() {
                Ok(JobStatus::Queued) => counts.queued = n,
                Ok(JobStatus::Processing) => counts.processing = n,
                Ok(JobStatus::Completed) => counts.completed = n,
                Ok(JobStatus::Failed) => counts.failed = n,
                Ok(JobStatus::Cancelled) => counts.cancelled = n,
                Err(e) => return Err(StoreError::QueryFailed(e)),
            }
        }
        Ok(counts)
    }
}

fn job_from_row(row: PgRow) -> Result<Job, StoreError> {
    let query_failed = |e: sqlx::Error| StoreError::QueryFailed(e.to_string());

    let canonical: String = row.try_get("canonical_url").map_err(query_failed)?;
    let canonical_url =
        CanonicalUrl::parse(&canonical).map_err(|e| StoreError::QueryFailed(e.to_string()))?;

    let status: String = row.try_get("status").map_err(query_failed)?;
    let status = status.parse::<JobStatus>().map_err(StoreError::QueryFailed)?;

    let transcript: Option<serde_json::Value> = row.try_get("transcript").map_err(query_failed)?;
    let transcript = transcript
        .map(serde_json::from_value::<Transcript>)
        .transpose()
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

    let progress: i16 = row.try_get("progress").map_err(query_failed)?;
    let estimated: i32 = row
        .try_get("estimated_processing_secs")
        .map_err(query_failed)?;
    let billed: i64 = row.try_get("billed_tokens").map_err(query_failed)?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get("id").map_err(query_failed)?),
        source_url: row.try_get("source_url").map_err(query_failed)?,
        canonical_url,
        status,
        progress: progress.clamp(0, 100) as u8,
        current_step: row.try_get("current_step").map_err(query_failed)?,
        submitted_at: row.try_get("submitted_at").map_err(query_failed)?,
        completed_at: row.try_get("completed_at").map_err(query_failed)?,
        estimated_processing_secs: estimated.max(0) as u32,
        transcript,
        error_code: row.try_get("error_code").map_err(query_failed)?,
        error_message: row.try_get("error_message").map_err(query_failed)?,
        billed_tokens: billed.max(0) as u64,
    })
}

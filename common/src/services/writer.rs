use crate::domain::SkillSummary;
use crate::error::{ReportError, Result};
use crate::repositories::SkillSummaryRepository;
use crate::settings::WriteMode;
use mongodb::error::{ErrorKind, WriteFailure as DriverWriteFailure};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// A summary the store refused to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub index: usize,
    pub org_id: Uuid,
    pub year_month: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub deleted: u64,
    pub inserted: usize,
    pub failures: Vec<WriteFailure>,
}

/// Loads computed summaries into the report collection.
pub struct ReportWriter {
    repo: Arc<dyn SkillSummaryRepository>,
    mode: WriteMode,
}

impl ReportWriter {
    pub fn new(repo: Arc<dyn SkillSummaryRepository>, mode: WriteMode) -> Self {
        Self { repo, mode }
    }

    /// An empty batch never touches the collection, whatever the mode.
    pub async fn write(&self, org_id: Uuid, summaries: &[SkillSummary]) -> Result<WriteReport> {
        if summaries.is_empty() {
            tracing::warn!("No summaries to insert for organization {}", org_id);
            return Ok(WriteReport::default());
        }

        match self.mode {
            WriteMode::ReplaceAll => {
                let deleted = self.repo.delete_all().await?;
                tracing::info!("Deleted entire collection: {} documents", deleted);
                self.insert_all(deleted, summaries).await
            }
            WriteMode::ReplaceOrg => {
                let deleted = self.repo.delete_for_org(org_id).await?;
                tracing::info!(
                    "Deleted {} documents for organization {}",
                    deleted,
                    org_id
                );
                self.insert_all(deleted, summaries).await
            }
            WriteMode::Upsert => self.upsert_each(summaries).await,
        }
    }

    async fn insert_all(&self, deleted: u64, summaries: &[SkillSummary]) -> Result<WriteReport> {
        let documents = summaries.iter().map(SkillSummary::to_document).collect();
        let outcome = self.repo.insert_unordered(documents).await?;

        let failures = outcome
            .errors
            .into_iter()
            .map(|e| {
                let failure = failure_for(summaries, e.index, e.message);
                tracing::error!(
                    "Failed to insert summary {} ({} {}): {}",
                    failure.index,
                    failure.org_id,
                    failure.year_month,
                    failure.message
                );
                failure
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Inserted {} of {} documents ({} failed)",
            outcome.inserted,
            summaries.len(),
            failures.len()
        );

        Ok(WriteReport {
            deleted,
            inserted: outcome.inserted,
            failures,
        })
    }

    async fn upsert_each(&self, summaries: &[SkillSummary]) -> Result<WriteReport> {
        let mut report = WriteReport::default();
        for (index, summary) in summaries.iter().enumerate() {
            match self.repo.upsert(summary).await {
                Ok(()) => report.inserted += 1,
                Err(ReportError::Store(e)) if is_rejected_write(&e) => {
                    tracing::error!(
                        "Failed to upsert summary {} ({} {}): {}",
                        index,
                        summary.org_id,
                        summary.year_month,
                        e
                    );
                    report
                        .failures
                        .push(failure_for(summaries, index, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!("Upserted {} documents", report.inserted);
        Ok(report)
    }
}

/// The server refused this one document. Anything else (network, auth, timeouts) is fatal.
fn is_rejected_write(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(DriverWriteFailure::WriteError(_))
    )
}

fn failure_for(summaries: &[SkillSummary], index: usize, message: String) -> WriteFailure {
    match summaries.get(index) {
        Some(summary) => WriteFailure {
            index,
            org_id: summary.org_id,
            year_month: summary.year_month.clone(),
            message,
        },
        None => WriteFailure {
            index,
            org_id: Uuid::nil(),
            year_month: String::new(),
            message,
        },
    }
}

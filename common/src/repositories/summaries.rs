use crate::domain::{uuid_binary, SkillSummary};
use crate::error::Result;
use bson::{doc, Document};
use futures::TryStreamExt;
#[cfg(test)]
use mockall::automock;
use mongodb::error::ErrorKind;
use mongodb::options::{FindOptions, InsertManyOptions, UpdateOptions};
use mongodb::{Collection, Database};
use uuid::Uuid;

/// A single document the store refused during an unordered insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWriteError {
    /// Position of the document in the submitted batch.
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub errors: Vec<RowWriteError>,
}

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SkillSummaryRepository: Send + Sync {
    /// Removes every document in the report collection.
    async fn delete_all(&self) -> Result<u64>;

    async fn delete_for_org(&self, org_id: Uuid) -> Result<u64>;

    /// Unordered insert. Per-document failures are returned, not raised.
    async fn insert_unordered(&self, documents: Vec<Document>) -> Result<InsertOutcome>;

    /// Upserts one summary keyed by (`org_id`, `year_month`).
    async fn upsert(&self, summary: &SkillSummary) -> Result<()>;

    /// Reads the report back newest month first, without `_id`, for round-trip checks.
    async fn list_all(&self) -> Result<Vec<Document>>;
}

pub struct SkillSummaryRepositoryImpl {
    collection: Collection<Document>,
}

impl SkillSummaryRepositoryImpl {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait::async_trait]
impl SkillSummaryRepository for SkillSummaryRepositoryImpl {
    async fn delete_all(&self) -> Result<u64> {
        let result = self.collection.delete_many(doc! {}, None).await?;
        Ok(result.deleted_count)
    }

    async fn delete_for_org(&self, org_id: Uuid) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "org_id": uuid_binary(org_id) }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn insert_unordered(&self, documents: Vec<Document>) -> Result<InsertOutcome> {
        let attempted = documents.len();
        let options = InsertManyOptions::builder().ordered(false).build();

        match self.collection.insert_many(documents, options).await {
            Ok(result) => Ok(InsertOutcome {
                inserted: result.inserted_ids.len(),
                errors: Vec::new(),
            }),
            Err(err) => match err.kind.as_ref() {
                ErrorKind::BulkWrite(failure) => {
                    if let Some(concern) = &failure.write_concern_error {
                        tracing::warn!(
                            "Write concern not satisfied on {}: {}",
                            self.collection.name(),
                            concern.message
                        );
                    }
                    let errors = failure
                        .write_errors
                        .iter()
                        .flatten()
                        .map(|e| RowWriteError {
                            index: e.index,
                            message: e.message.clone(),
                        })
                        .collect::<Vec<_>>();
                    Ok(InsertOutcome {
                        inserted: attempted.saturating_sub(errors.len()),
                        errors,
                    })
                }
                _ => Err(err.into()),
            },
        }
    }

    async fn upsert(&self, summary: &SkillSummary) -> Result<()> {
        let filter = doc! {
            "org_id": uuid_binary(summary.org_id),
            "year_month": summary.year_month.clone(),
        };
        let update = doc! { "$set": summary.to_document() };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection.update_one(filter, update, options).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Document>> {
        let options = FindOptions::builder()
            .sort(doc! { "year_month": -1 })
            .projection(doc! { "_id": 0 })
            .build();
        let cursor = self.collection.find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }
}

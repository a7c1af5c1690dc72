use crate::domain::uuid_binary;
use crate::error::Result;
use bson::{doc, Document};
use futures::TryStreamExt;
#[cfg(test)]
use mockall::automock;
use mongodb::{Collection, Database};
use uuid::Uuid;

/// Skills created per (organization, month) for a single organization.
///
/// Skills whose organization has no matching `organizations` document are
/// dropped by the `$unwind`. Rows come back newest month first.
pub fn created_by_month_pipeline(org_id: Uuid, organizations_collection: &str) -> Vec<Document> {
    vec![
        doc! {
            "$match": {
                "org_id": uuid_binary(org_id),
                "created_at": { "$exists": true, "$ne": null },
            }
        },
        doc! {
            "$project": {
                "org_id": 1,
                "created_at": 1,
                "year_month": {
                    "$dateToString": {
                        "format": "%Y-%m",
                        "date": "$created_at",
                        "timezone": "UTC",
                    }
                },
            }
        },
        doc! {
            "$lookup": {
                "from": organizations_collection,
                "localField": "org_id",
                "foreignField": "id",
                "as": "org_info",
            }
        },
        doc! { "$unwind": "$org_info" },
        doc! {
            "$group": {
                "_id": {
                    "org_id": "$org_id",
                    "org_name": "$org_info.name",
                    "year_month": "$year_month",
                },
                "created_skills": { "$sum": 1 },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "org_id": "$_id.org_id",
                "org_name": "$_id.org_name",
                "year_month": "$_id.year_month",
                "created_skills": 1,
            }
        },
        doc! { "$sort": { "year_month": -1 } },
    ]
}

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SkillSourceRepository: Send + Sync {
    /// Runs the monthly aggregation and materializes every row.
    async fn created_by_month(&self, org_id: Uuid) -> Result<Vec<Document>>;
}

pub struct SkillSourceRepositoryImpl {
    skills: Collection<Document>,
    organizations_collection: String,
}

impl SkillSourceRepositoryImpl {
    pub fn new(db: &Database, skills_collection: &str, organizations_collection: &str) -> Self {
        Self {
            skills: db.collection(skills_collection),
            organizations_collection: organizations_collection.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl SkillSourceRepository for SkillSourceRepositoryImpl {
    async fn created_by_month(&self, org_id: Uuid) -> Result<Vec<Document>> {
        let pipeline = created_by_month_pipeline(org_id, &self.organizations_collection);
        let cursor = self.skills.aggregate(pipeline, None).await?;
        let rows: Vec<Document> = cursor.try_collect().await?;
        tracing::debug!(
            "Aggregation over {} returned {} rows",
            self.skills.name(),
            rows.len()
        );
        Ok(rows)
    }
}

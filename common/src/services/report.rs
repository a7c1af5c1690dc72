use super::writer::{ReportWriter, WriteReport};
use crate::domain::{parse_org_id, summaries_from_rows, SkillSummary};
use crate::error::Result;
use crate::repositories::SkillSourceRepository;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub org_id: Uuid,
    pub summaries: Vec<SkillSummary>,
    pub write: WriteReport,
}

#[async_trait]
pub trait SkillsReportService: Send + Sync {
    /// Query, validate and load the monthly report for one organization.
    async fn run_for(&self, org_id: Uuid) -> Result<RunReport>;

    /// Parses `org_id` first; a malformed one never reaches the store.
    async fn run(&self, org_id: &str) -> Result<RunReport> {
        self.run_for(parse_org_id(org_id)?).await
    }
}

pub struct SkillsReportServiceImpl {
    source: Arc<dyn SkillSourceRepository>,
    writer: ReportWriter,
}

impl SkillsReportServiceImpl {
    pub fn new(source: Arc<dyn SkillSourceRepository>, writer: ReportWriter) -> Self {
        Self { source, writer }
    }
}

#[async_trait]
impl SkillsReportService for SkillsReportServiceImpl {
    async fn run_for(&self, org_id: Uuid) -> Result<RunReport> {
        tracing::info!("Computing skills created by month for {}", org_id);
        let rows = self.source.created_by_month(org_id).await?;
        let summaries = summaries_from_rows(&rows)?;
        tracing::info!("Computed {} monthly summaries", summaries.len());

        let write = self.writer.write(org_id, &summaries).await?;

        Ok(RunReport {
            org_id,
            summaries,
            write,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::uuid_binary;
    use crate::error::ReportError;
    use crate::repositories::skills::MockSkillSourceRepository;
    use crate::repositories::summaries::{InsertOutcome, MockSkillSummaryRepository};
    use crate::settings::WriteMode;
    use bson::{doc, Document};
    use mockall::predicate::eq;

    const ORG_A: &str = "006de98a-131c-4847-92a9-3150033d6a35";

    fn org_a() -> Uuid {
        Uuid::parse_str(ORG_A).unwrap()
    }

    fn row(year_month: &str, created_skills: i32) -> Document {
        doc! {
            "org_id": uuid_binary(org_a()),
            "org_name": "Org A",
            "year_month": year_month,
            "created_skills": created_skills,
        }
    }

    fn service(
        source: MockSkillSourceRepository,
        summaries: MockSkillSummaryRepository,
    ) -> SkillsReportServiceImpl {
        SkillsReportServiceImpl::new(
            Arc::new(source),
            ReportWriter::new(Arc::new(summaries), WriteMode::ReplaceAll),
        )
    }

    #[tokio::test]
    async fn malformed_identifier_fails_before_any_store_access() {
        let mut source = MockSkillSourceRepository::new();
        source.expect_created_by_month().times(0);
        let mut summaries = MockSkillSummaryRepository::new();
        summaries.expect_delete_all().times(0);
        summaries.expect_insert_unordered().times(0);

        let err = service(source, summaries)
            .run("not-a-uuid")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidIdentifier { .. }));
    }

    #[tokio::test]
    async fn monthly_rows_become_summaries_newest_first() {
        let mut source = MockSkillSourceRepository::new();
        source
            .expect_created_by_month()
            .with(eq(org_a()))
            .times(1)
            .returning(|_| Ok(vec![row("2024-02", 2), row("2024-01", 3)]));

        let mut summaries = MockSkillSummaryRepository::new();
        summaries.expect_delete_all().times(1).returning(|| Ok(0));
        summaries
            .expect_insert_unordered()
            .times(1)
            .returning(|docs| {
                Ok(InsertOutcome {
                    inserted: docs.len(),
                    errors: Vec::new(),
                })
            });

        let report = service(source, summaries).run(ORG_A).await.unwrap();

        let got: Vec<_> = report
            .summaries
            .iter()
            .map(|s| {
                (
                    s.org_id,
                    s.org_name.as_str(),
                    s.year_month.as_str(),
                    s.created_skills,
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                (org_a(), "Org A", "2024-02", 2),
                (org_a(), "Org A", "2024-01", 3),
            ]
        );
        assert_eq!(report.write.inserted, 2);
    }

    #[tokio::test]
    async fn parsed_identifier_is_queried_as_given() {
        let org = Uuid::new_v4();
        let mut source = MockSkillSourceRepository::new();
        source
            .expect_created_by_month()
            .with(eq(org))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let report = service(source, MockSkillSummaryRepository::new())
            .run_for(org)
            .await
            .unwrap();
        assert_eq!(report.org_id, org);
    }

    #[tokio::test]
    async fn malformed_row_fails_whole_batch_without_writing() {
        let mut bad = row("2024-01", 3);
        bad.remove("org_name");

        let mut source = MockSkillSourceRepository::new();
        source
            .expect_created_by_month()
            .returning(move |_| Ok(vec![row("2024-02", 2), bad.clone()]));

        let mut summaries = MockSkillSummaryRepository::new();
        summaries.expect_delete_all().times(0);
        summaries.expect_insert_unordered().times(0);

        let err = service(source, summaries).run(ORG_A).await.unwrap_err();
        assert!(matches!(err, ReportError::Validation { index: 1, .. }));
    }

    #[tokio::test]
    async fn organization_without_skills_leaves_report_untouched() {
        let mut source = MockSkillSourceRepository::new();
        source.expect_created_by_month().returning(|_| Ok(Vec::new()));

        let mut summaries = MockSkillSummaryRepository::new();
        summaries.expect_delete_all().times(0);
        summaries.expect_insert_unordered().times(0);

        let report = service(source, summaries).run(ORG_A).await.unwrap();
        assert!(report.summaries.is_empty());
        assert_eq!(report.write, WriteReport::default());
    }
}

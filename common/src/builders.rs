use crate::repositories::{
    skills::SkillSourceRepositoryImpl, summaries::SkillSummaryRepositoryImpl,
    SkillSourceRepository, SkillSummaryRepository,
};
use crate::services::{ReportWriter, SkillsReportService, SkillsReportServiceImpl};
use crate::settings::Settings;
use mongodb::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repositories {
    pub skill_source_repo: Arc<dyn SkillSourceRepository>,
    pub summary_repo: Arc<dyn SkillSummaryRepository>,
}

#[derive(Clone)]
pub struct Services {
    pub report_service: Arc<dyn SkillsReportService>,
}

pub fn build_repositories(client: &Client, settings: &Settings) -> Repositories {
    let source_db = client.database(&settings.mongodb.source_database);
    let report_db = client.database(&settings.mongodb.report_database);

    Repositories {
        skill_source_repo: Arc::new(SkillSourceRepositoryImpl::new(
            &source_db,
            &settings.source.skills_collection,
            &settings.source.organizations_collection,
        )),
        summary_repo: Arc::new(SkillSummaryRepositoryImpl::new(
            &report_db,
            &settings.report.collection,
        )),
    }
}

pub fn build_services(repos: &Repositories, settings: &Settings) -> Services {
    let writer = ReportWriter::new(repos.summary_repo.clone(), settings.report.write_mode);
    let report_service = Arc::new(SkillsReportServiceImpl::new(
        repos.skill_source_repo.clone(),
        writer,
    ));

    Services { report_service }
}

pub fn build_all(client: &Client, settings: &Settings) -> (Repositories, Services) {
    let repos = build_repositories(client, settings);
    let services = build_services(&repos, settings);
    (repos, services)
}

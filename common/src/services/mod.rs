pub mod report;
pub mod writer;

pub use report::{RunReport, SkillsReportService, SkillsReportServiceImpl};
pub use writer::{ReportWriter, WriteFailure, WriteReport};

pub mod skills;
pub mod summaries;

pub use skills::{SkillSourceRepository, SkillSourceRepositoryImpl};
pub use summaries::{
    InsertOutcome, RowWriteError, SkillSummaryRepository, SkillSummaryRepositoryImpl,
};

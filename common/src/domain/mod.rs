pub mod org;
pub mod summary;

pub use org::{parse_org_id, uuid_binary, uuid_from_bson};
pub use summary::{is_year_month, summaries_from_rows, SkillSummary};

use super::org::{uuid_binary, uuid_from_bson};
use crate::error::{ReportError, Result};
use bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Skills created by one organization in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillSummary {
    pub org_id: Uuid,
    pub org_name: String,
    pub year_month: String,
    pub created_skills: u64,
}

impl SkillSummary {
    /// Validates one aggregation row. `index` is only used to name the row in errors.
    pub fn from_document(index: usize, row: &Document) -> Result<Self> {
        let org_id = match row.get("org_id") {
            None => return Err(ReportError::validation(index, "missing field org_id")),
            Some(value) => uuid_from_bson(value).ok_or_else(|| {
                ReportError::validation(
                    index,
                    format!(
                        "org_id must be a UUID binary, got {:?}",
                        value.element_type()
                    ),
                )
            })?,
        };

        let org_name = match row.get("org_name") {
            None => return Err(ReportError::validation(index, "missing field org_name")),
            Some(Bson::String(name)) if !name.is_empty() => name.clone(),
            Some(Bson::String(_)) => {
                return Err(ReportError::validation(index, "org_name must not be empty"))
            }
            Some(other) => {
                return Err(ReportError::validation(
                    index,
                    format!("org_name must be a string, got {:?}", other.element_type()),
                ))
            }
        };

        let year_month = match row.get("year_month") {
            None => return Err(ReportError::validation(index, "missing field year_month")),
            Some(Bson::String(value)) if is_year_month(value) => value.clone(),
            Some(Bson::String(value)) => {
                return Err(ReportError::validation(
                    index,
                    format!("year_month must look like YYYY-MM, got {:?}", value),
                ))
            }
            Some(other) => {
                return Err(ReportError::validation(
                    index,
                    format!(
                        "year_month must be a string, got {:?}",
                        other.element_type()
                    ),
                ))
            }
        };

        let created_skills = match row.get("created_skills") {
            None => {
                return Err(ReportError::validation(
                    index,
                    "missing field created_skills",
                ))
            }
            Some(Bson::Int32(n)) => u64::try_from(*n).ok(),
            Some(Bson::Int64(n)) => u64::try_from(*n).ok(),
            Some(other) => {
                return Err(ReportError::validation(
                    index,
                    format!(
                        "created_skills must be an integer, got {:?}",
                        other.element_type()
                    ),
                ))
            }
        }
        .ok_or_else(|| ReportError::validation(index, "created_skills must not be negative"))?;

        Ok(Self {
            org_id,
            org_name,
            year_month,
            created_skills,
        })
    }

    /// Destination document. `org_id` goes back out as a standard UUID binary.
    pub fn to_document(&self) -> Document {
        doc! {
            "org_id": uuid_binary(self.org_id),
            "org_name": self.org_name.clone(),
            "year_month": self.year_month.clone(),
            "created_skills": i64::try_from(self.created_skills).unwrap_or(i64::MAX),
        }
    }
}

/// Converts a whole aggregation result. The first malformed row fails the batch.
pub fn summaries_from_rows(rows: &[Document]) -> Result<Vec<SkillSummary>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| SkillSummary::from_document(index, row))
        .collect()
}

pub fn is_year_month(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
        return false;
    }
    matches!(value[5..].parse::<u32>(), Ok(1..=12))
}

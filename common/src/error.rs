use thiserror::Error;

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The organization identifier is not a well-formed UUID.
    #[error("invalid organization identifier {input:?}: {source}")]
    InvalidIdentifier {
        input: String,
        #[source]
        source: uuid::Error,
    },

    /// A row returned by the aggregation does not have the summary shape.
    #[error("summary row {index} is malformed: {reason}")]
    Validation { index: usize, reason: String },

    #[error("store error: {0}")]
    Store(#[from] mongodb::error::Error),
}

impl ReportError {
    pub fn validation(index: usize, reason: impl Into<String>) -> Self {
        Self::Validation {
            index,
            reason: reason.into(),
        }
    }
}

//! Error types for lineage grouping and document import.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::LineageDefect;

/// Failure raised by [`crate::grouper::try_group_lineages`] for the first
/// lineage whose chain could not be built in full.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    #[error("lineage {lineage_id} has no document flagged as the current version")]
    MissingCurrentVersion { lineage_id: String },

    #[error(
        "lineage {lineage_id}: document {document_id} references unknown previous document {previous_id}"
    )]
    DanglingReference {
        lineage_id: String,
        document_id: String,
        previous_id: String,
    },

    #[error("lineage {lineage_id}: {count} document(s) are not reachable from the current version")]
    Detached { lineage_id: String, count: usize },
}

impl LineageError {
    pub(crate) fn from_defect(lineage_id: &str, defect: &LineageDefect) -> Self {
        let lineage_id = lineage_id.to_owned();
        match defect {
            LineageDefect::MissingCurrentVersion => Self::MissingCurrentVersion { lineage_id },
            LineageDefect::DanglingReference {
                document_id,
                previous_id,
            } => Self::DanglingReference {
                lineage_id,
                document_id: document_id.clone(),
                previous_id: previous_id.clone(),
            },
            LineageDefect::Detached { count } => Self::Detached {
                lineage_id,
                count: *count,
            },
        }
    }

    /// The lineage the failure belongs to.
    pub fn lineage_id(&self) -> &str {
        match self {
            Self::MissingCurrentVersion { lineage_id }
            | Self::DanglingReference { lineage_id, .. }
            | Self::Detached { lineage_id, .. } => lineage_id,
        }
    }
}

/// Failure while reading a document-list payload.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document at index {index} is invalid: {reason}")]
    Invalid { index: usize, reason: &'static str },
}

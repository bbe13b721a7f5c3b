//! Reads document-list payloads as served by the document listing endpoint.
//!
//! Two shapes are accepted: a bare JSON array of documents, and a paged
//! envelope `{ "items": [...], ... }` where any other envelope keys are ignored.

use std::path::Path;

use serde::Deserialize;

use crate::error::ImportError;
use crate::types::LineageDocument;

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Bare(Vec<LineageDocument>),
    Paged { items: Vec<LineageDocument> },
}

/// Parses a JSON document list.
///
/// # Errors
///
/// Returns `ImportError::Json` if the payload is not valid JSON of either
/// accepted shape, and `ImportError::Invalid` if any document has an empty
/// `id` or `lineageId`.
pub fn parse_documents(json: &str) -> Result<Vec<LineageDocument>, ImportError> {
    let documents = match serde_json::from_str::<Payload>(json)? {
        Payload::Bare(items) | Payload::Paged { items } => items,
    };

    for (index, doc) in documents.iter().enumerate() {
        if doc.id.trim().is_empty() {
            return Err(ImportError::Invalid { index, reason: "empty id" });
        }
        if doc.lineage_id.trim().is_empty() {
            return Err(ImportError::Invalid { index, reason: "empty lineageId" });
        }
    }

    tracing::debug!(count = documents.len(), "parsed document list");
    Ok(documents)
}

/// Reads and parses the document list stored at `path`.
///
/// # Errors
///
/// Returns `ImportError::Io` if the file cannot be read, otherwise the same
/// errors as [`parse_documents`].
pub fn read_documents(path: &Path) -> Result<Vec<LineageDocument>, ImportError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_documents(&raw)
}

//! Rebuilds ordered version chains from an unordered document list.
//!
//! Documents are bucketed by `lineage_id`. Each bucket is indexed by `id`
//! once, then walked backwards from the current version by following
//! `previous_id` until the bucket is exhausted or a lookup misses. Every
//! successful step consumes one document, so the walk always terminates,
//! including on cyclic input.

use std::collections::HashMap;

use crate::error::LineageError;
use crate::types::{LineageDefect, LineageDocument, LineageGroup};

/// Groups `documents` into lineage chains, recording defects instead of failing.
///
/// Groups are returned in order of first appearance of their `lineage_id`.
/// Within a group, `documents[0]` is the oldest revision and the last element
/// is the current version. A lineage that cannot be fully linked is still
/// returned: the partial chain is kept, leftovers go to `unplaced`, and
/// `defect` says what went wrong.
///
/// The input is never mutated; documents are cloned into the output.
pub fn group_lineages(documents: &[LineageDocument]) -> Vec<LineageGroup> {
    partition(documents)
        .into_iter()
        .map(|(lineage_id, bucket)| build_chain(lineage_id, bucket))
        .collect()
}

/// Strict variant of [`group_lineages`].
///
/// # Errors
///
/// Returns the [`LineageError`] matching the first group (in output order)
/// whose chain has a defect.
pub fn try_group_lineages(
    documents: &[LineageDocument],
) -> Result<Vec<LineageGroup>, LineageError> {
    let groups = group_lineages(documents);
    for group in &groups {
        if let Some(defect) = &group.defect {
            return Err(LineageError::from_defect(&group.lineage_id, defect));
        }
    }
    Ok(groups)
}

/// Stable partition by `lineage_id`, buckets ordered by first appearance.
fn partition(documents: &[LineageDocument]) -> Vec<(&str, Vec<&LineageDocument>)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<(&str, Vec<&LineageDocument>)> = Vec::new();

    for doc in documents {
        let slot = *slots.entry(doc.lineage_id.as_str()).or_insert_with(|| {
            buckets.push((doc.lineage_id.as_str(), Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(doc);
    }

    buckets
}

fn build_chain(lineage_id: &str, bucket: Vec<&LineageDocument>) -> LineageGroup {
    let mut remaining: Vec<Option<&LineageDocument>> = bucket.into_iter().map(Some).collect();

    // First occurrence wins for duplicate ids; later copies stay unplaced.
    let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(remaining.len());
    for (idx, doc) in remaining.iter().enumerate() {
        if let Some(doc) = *doc {
            by_id.entry(doc.id.as_str()).or_insert(idx);
        }
    }

    let Some(seed) = remaining
        .iter()
        .position(|d| d.is_some_and(|d| d.is_current_version))
    else {
        tracing::warn!(lineage_id, "lineage has no current version");
        return LineageGroup {
            lineage_id: lineage_id.to_owned(),
            documents: Vec::new(),
            unplaced: remaining.into_iter().flatten().cloned().collect(),
            defect: Some(LineageDefect::MissingCurrentVersion),
            collapsed: false,
        };
    };

    let mut chain: Vec<&LineageDocument> = Vec::with_capacity(remaining.len());
    let mut left = remaining.len();
    if let Some(doc) = remaining[seed].take() {
        by_id.retain(|_, idx| *idx != seed);
        chain.push(doc);
        left -= 1;
    }

    let mut defect = None;
    while left > 0 {
        let Some(&head) = chain.last() else { break };
        let Some(previous_id) = head.previous_id.as_deref() else {
            defect = Some(LineageDefect::Detached { count: left });
            break;
        };
        let Some(doc) = by_id
            .remove(previous_id)
            .and_then(|idx| remaining[idx].take())
        else {
            defect = Some(LineageDefect::DanglingReference {
                document_id: head.id.clone(),
                previous_id: previous_id.to_owned(),
            });
            break;
        };
        chain.push(doc);
        left -= 1;
    }

    // A fully consumed bucket can still end on a head whose predecessor was
    // never supplied; that chain is truncated, not complete.
    if defect.is_none() {
        if let Some(&head) = chain.last() {
            if let Some(previous_id) = head.previous_id.as_deref() {
                defect = Some(LineageDefect::DanglingReference {
                    document_id: head.id.clone(),
                    previous_id: previous_id.to_owned(),
                });
            }
        }
    }

    if let Some(defect) = &defect {
        tracing::warn!(
            lineage_id,
            ?defect,
            placed = chain.len(),
            unplaced = left,
            "partial lineage chain"
        );
    }

    chain.reverse();
    LineageGroup {
        lineage_id: lineage_id.to_owned(),
        documents: chain.into_iter().cloned().collect(),
        unplaced: remaining.into_iter().flatten().cloned().collect(),
        defect,
        collapsed: false,
    }
}

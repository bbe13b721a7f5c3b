//! lineage-core: document lineage model, grouping, import, and review store.
//!
//! Shared by the `lineage` terminal browser. Grouping is a pure function over
//! [`types::LineageDocument`] lists; the SQLite store keeps per-site document
//! snapshots and per-session review flags.

pub mod db;
pub mod error;
pub mod grouper;
pub mod import;
pub mod schema;
pub mod types;

pub use error::{ImportError, LineageError};
pub use grouper::{group_lineages, try_group_lineages};
pub use types::{LineageDefect, LineageDocument, LineageGroup, ReviewSession};

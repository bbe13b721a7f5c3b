use serde::{Deserialize, Serialize};

/// One collected revision of a document.
///
/// Revisions sharing a `lineage_id` form a version chain linked backwards
/// through `previous_id`. Field names follow the camelCase document-list
/// payload (`lineageId`, `previousId`, `isCurrentVersion`).
///
/// Only the first four fields take part in grouping; the rest are descriptive
/// metadata shown by the compare and detail panels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageDocument {
    pub id: String,
    pub lineage_id: String,
    #[serde(default)]
    pub previous_id: Option<String>,
    #[serde(default)]
    pub is_current_version: bool,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub first_collected_at: Option<i64>, // Unix timestamp seconds
    #[serde(default)]
    pub last_collected_at: Option<i64>,  // Unix timestamp seconds
    #[serde(default)]
    pub text: Option<String>,
}

impl LineageDocument {
    /// Builds a document carrying only the fields that drive grouping.
    pub fn new(
        id: impl Into<String>,
        lineage_id: impl Into<String>,
        previous_id: Option<&str>,
        is_current_version: bool,
    ) -> Self {
        Self {
            id: id.into(),
            lineage_id: lineage_id.into(),
            previous_id: previous_id.map(str::to_owned),
            is_current_version,
            ..Self::default()
        }
    }

    /// Name to show in lists: the document name, falling back to its id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Why a group's chain could not be built in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageDefect {
    /// No document in the lineage is flagged as the current version.
    MissingCurrentVersion,
    /// `document_id` points at `previous_id`, which is not among the
    /// remaining documents of the lineage.
    DanglingReference {
        document_id: String,
        previous_id: String,
    },
    /// The chain reached its root while `count` documents were still unplaced.
    Detached { count: usize },
}

impl LineageDefect {
    /// Short label for badges and status lines.
    pub fn label(&self) -> &'static str {
        match self {
            LineageDefect::MissingCurrentVersion => "no current",
            LineageDefect::DanglingReference { .. } => "dangling",
            LineageDefect::Detached { .. } => "detached",
        }
    }
}

impl std::fmt::Display for LineageDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineageDefect::MissingCurrentVersion => f.write_str("no current version"),
            LineageDefect::DanglingReference {
                document_id,
                previous_id,
            } => write!(f, "{document_id} points at missing {previous_id}"),
            LineageDefect::Detached { count } => {
                write!(f, "{count} document(s) detached from the chain")
            }
        }
    }
}

/// A version chain for one `lineage_id`, ordered oldest → current.
///
/// `unplaced` holds documents of the lineage that could not be linked into
/// `documents`; together the two always account for every input document of
/// the lineage. `collapsed` is view state only and starts out `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageGroup {
    pub lineage_id: String,
    pub documents: Vec<LineageDocument>,
    pub unplaced: Vec<LineageDocument>,
    pub defect: Option<LineageDefect>,
    pub collapsed: bool,
}

impl LineageGroup {
    /// Number of documents on the chain (unplaced documents excluded).
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// `true` when the chain was built without any defect.
    pub fn is_complete(&self) -> bool {
        self.defect.is_none()
    }

    /// Oldest revision on the chain.
    pub fn root(&self) -> Option<&LineageDocument> {
        self.documents.first()
    }

    /// The revision flagged current, which always sits at the end of the chain.
    pub fn current(&self) -> Option<&LineageDocument> {
        self.documents.last()
    }

    /// Revision immediately preceding the one at `index`, if any.
    pub fn predecessor_of(&self, index: usize) -> Option<&LineageDocument> {
        index.checked_sub(1).and_then(|i| self.documents.get(i))
    }
}

/// A review session for one site.
///
/// Sessions are keyed by UUID v4 text. Opening the browser for a site resumes
/// the most recently updated session for that site, or creates one.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    pub id: String,           // UUID v4 text
    pub site_id: String,
    pub created_at: i64,      // Unix timestamp seconds
    pub updated_at: i64,      // Unix timestamp seconds
}

/// Per-document reviewed state within a session.
///
/// `reviewed_at` is set when `reviewed` transitions to `true`, cleared on untoggle.
#[derive(Debug, Clone)]
pub struct DocumentReviewState {
    pub session_id: String,
    pub document_id: String,
    pub reviewed: bool,
    pub reviewed_at: Option<i64>,
}

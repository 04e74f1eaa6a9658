//! Core types for performer matching
//!
//! Three sources describe performers:
//! - **Culture Extractor** (local catalog): [`LocalPerformer`], the identity
//!   space being reconciled
//! - **Stashapp** (media server): [`StashappPerformer`], per scene or as the
//!   global roster
//! - **StashDB** (external database): [`StashdbPerformer`], per scene
//!
//! Records arrive already fetched and parsed; nothing here performs I/O.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stashapp id reported when no media-server performer could be resolved
pub const UNMATCHED_STASHAPP_ID: i64 = -1;

// ============================================================================
// Input Records
// ============================================================================

/// Performer as recorded by the local catalog for one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPerformer {
    /// Opaque catalog identifier (UUID)
    #[serde(alias = "local_id", alias = "uuid")]
    pub id: String,
    /// Display name
    #[serde(alias = "local_name")]
    pub name: String,
}

impl LocalPerformer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Cross-reference from a Stashapp performer to another database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashId {
    /// Endpoint URL or short key (e.g. `https://stashdb.org/graphql`)
    pub endpoint: String,
    /// Identifier on that endpoint
    #[serde(alias = "id")]
    pub stash_id: String,
}

/// Stashapp performer, either credited on one scene or part of the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StashappPerformer {
    #[serde(alias = "stashapp_id")]
    pub id: i64,
    pub name: String,
    #[serde(default, alias = "alias_list")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub stash_ids: Vec<StashId>,
}

impl StashappPerformer {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            aliases: Vec::new(),
            gender: None,
            favorite: false,
            stash_ids: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stash_id(mut self, endpoint: impl Into<String>, stash_id: impl Into<String>) -> Self {
        self.stash_ids.push(StashId {
            endpoint: endpoint.into(),
            stash_id: stash_id.into(),
        });
        self
    }
}

/// StashDB performer credited on one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StashdbPerformer {
    pub id: String,
    /// Canonical StashDB name
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Scene-specific "credited as" name, if the credit differs
    #[serde(default, alias = "as")]
    pub credited_as: Option<String>,
}

impl StashdbPerformer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            gender: None,
            credited_as: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_credited_as(mut self, name: impl Into<String>) -> Self {
        self.credited_as = Some(name.into());
        self
    }
}

/// All performer data known for one scene
///
/// Keeping the three casts in one record makes positional misalignment
/// between sources impossible once the batch is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneInput {
    #[serde(default)]
    pub scene_id: Option<String>,
    /// Local catalog cast
    #[serde(default)]
    pub local: Vec<LocalPerformer>,
    /// Performers linked to the scene in Stashapp
    #[serde(default)]
    pub stashapp: Vec<StashappPerformer>,
    /// Performers credited on the scene in StashDB
    #[serde(default)]
    pub stashdb: Vec<StashdbPerformer>,
}

// ============================================================================
// Match Output
// ============================================================================

/// Reconciliation round that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Stashapp performers linked to the same scene
    SceneMediaServer,
    /// StashDB performers credited on the same scene
    SceneExternalDb,
    /// Entire Stashapp roster, no scene corroboration
    GlobalMediaServer,
}

impl MatchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SceneMediaServer => "scene_media_server",
            Self::SceneExternalDb => "scene_external_db",
            Self::GlobalMediaServer => "global_media_server",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One local performer bound to one source candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub local_id: String,
    pub local_name: String,
    /// [`UNMATCHED_STASHAPP_ID`] when no Stashapp performer is known
    pub stashapp_id: i64,
    pub stashapp_name: String,
    /// Empty when no StashDB performer is known
    pub stashdb_id: String,
    pub stashdb_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    /// Human-readable explanation for review queues
    pub reason: String,
    pub source: MatchSource,
}

/// Local performer that no round could match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedPerformer {
    pub local_id: String,
    pub local_name: String,
    pub stashapp_id: Option<i64>,
    pub stashdb_id: Option<String>,
    pub confidence: f64,
}

impl From<&LocalPerformer> for UnmatchedPerformer {
    fn from(local: &LocalPerformer) -> Self {
        Self {
            local_id: local.id.clone(),
            local_name: local.name.clone(),
            stashapp_id: None,
            stashdb_id: None,
            confidence: 0.0,
        }
    }
}

/// Match found by the second-chance sweep over the global roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedMatch {
    pub local_id: String,
    pub local_name: String,
    pub stashapp_id: i64,
    pub stashapp_name: String,
    pub confidence: f64,
    pub reason: String,
}

/// Per-source counters for one reconciliation batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub scenes: usize,
    /// Distinct local identifiers seen across the batch
    pub local_performers: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub scene_media_server: usize,
    pub scene_external_db: usize,
    pub global_media_server: usize,
    /// Lower-confidence results discarded by deduplication
    pub duplicates_dropped: usize,
}

impl ReconcileStats {
    pub(crate) fn count_source(&mut self, source: MatchSource) {
        match source {
            MatchSource::SceneMediaServer => self.scene_media_server += 1,
            MatchSource::SceneExternalDb => self.scene_external_db += 1,
            MatchSource::GlobalMediaServer => self.global_media_server += 1,
        }
    }
}

/// Output of a reconciliation batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// One result per matched local identifier, highest confidence kept
    pub matches: Vec<MatchResult>,
    /// Local identifiers no round could match
    pub unmatched: Vec<UnmatchedPerformer>,
    pub stats: ReconcileStats,
}

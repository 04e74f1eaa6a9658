//! ce-match library interface
//!
//! Performer identity matching between the Culture Extractor catalog,
//! Stashapp and StashDB, plus catalog-to-Stashapp tag analysis.
//!
//! The matching core is synchronous and performs no I/O: callers fetch
//! scene casts and the Stashapp roster, hand them over as plain records,
//! and persist the returned matches themselves.

pub mod candidates;
pub mod io;
pub mod reconciler;
pub mod scene_matcher;
pub mod similarity;
pub mod tags;
pub mod types;
pub mod unmatched;
pub mod working_set;

pub use candidates::{CandidateSource, GlobalRosterSource, Roster, SceneScopedSource};
pub use ce_common::MatchThresholds;
pub use reconciler::{deduplicate, zip_scenes, CrossSourceReconciler};
pub use scene_matcher::{PassThresholds, ScenePerformerMatcher};
pub use similarity::{alias_score, similarity};
pub use tags::{TagAnalysis, TagAnalyzer};
pub use types::{
    LocalPerformer, MatchResult, MatchSource, ReconcileReport, ReconcileStats, SceneInput,
    StashappPerformer, StashdbPerformer, UnmatchedMatch, UnmatchedPerformer, UNMATCHED_STASHAPP_ID,
};
pub use unmatched::UnmatchedReconciler;

//! Test Helper Utilities
//!
//! Shared fixtures for ce-match integration tests

#![allow(dead_code)]

use ce_match::{
    CrossSourceReconciler, LocalPerformer, MatchThresholds, Roster, SceneInput,
    StashappPerformer, StashdbPerformer,
};
use std::path::PathBuf;

pub const STASHDB_ENDPOINT: &str = "https://stashdb.org/graphql";

/// Path to a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn local(id: &str, name: &str) -> LocalPerformer {
    LocalPerformer::new(id, name)
}

pub fn scene(
    id: &str,
    local: Vec<LocalPerformer>,
    stashapp: Vec<StashappPerformer>,
    stashdb: Vec<StashdbPerformer>,
) -> SceneInput {
    SceneInput {
        scene_id: Some(id.to_string()),
        local,
        stashapp,
        stashdb,
    }
}

/// Small Stashapp roster with one StashDB-linked performer
pub fn sample_roster() -> Roster {
    Roster::new(
        vec![
            StashappPerformer::new(1, "Jill Kassidy").with_stash_id(STASHDB_ENDPOINT, "c853e0a4"),
            StashappPerformer::new(2, "Sybil").with_stash_id(STASHDB_ENDPOINT, "5b2d7f0e"),
            StashappPerformer::new(3, "Silvie Deluxe").with_aliases(["Simona", "Silvia"]),
        ],
        "stashdb",
    )
}

pub fn reconciler(roster: Roster) -> CrossSourceReconciler {
    CrossSourceReconciler::new(roster, MatchThresholds::default())
}

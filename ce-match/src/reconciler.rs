//! Cross-Source Reconciler
//!
//! Runs the scene matcher over a batch of scenes, trying sources in a fixed
//! priority order per scene:
//! 1. Stashapp performers linked to the scene
//! 2. StashDB performers credited on the scene
//! 3. The global Stashapp roster, at the stricter global threshold
//!
//! Performers matched in one round are not offered to later rounds. Results
//! from every round and scene are then deduplicated per local identifier,
//! keeping the highest confidence. The retained result's source tag reflects
//! confidence only, not round priority.
//!
//! Global roster entries are not consumed across scenes or rounds; only
//! scene-scoped pools are.

use crate::candidates::{GlobalRosterSource, Roster, SceneScopedSource};
use crate::scene_matcher::{PassThresholds, ScenePerformerMatcher};
use crate::types::{
    LocalPerformer, MatchResult, ReconcileReport, ReconcileStats, SceneInput, StashappPerformer,
    StashdbPerformer, UnmatchedPerformer,
};
use crate::working_set::WorkingSet;
use ce_common::{Error, MatchThresholds, Result};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Batch reconciler across Stashapp scene casts, StashDB credits and the
/// global roster
pub struct CrossSourceReconciler {
    roster: Roster,
    thresholds: MatchThresholds,
}

impl CrossSourceReconciler {
    /// Create a reconciler
    ///
    /// An empty roster disables the global round; StashDB matches then carry
    /// the unmatched Stashapp sentinel.
    pub fn new(roster: Roster, thresholds: MatchThresholds) -> Self {
        Self { roster, thresholds }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Reconcile a batch of scenes
    ///
    /// Pure function of its inputs: repeated calls return the same report.
    pub fn reconcile(&self, scenes: &[SceneInput]) -> ReconcileReport {
        let global = GlobalRosterSource::new(&self.roster);
        let results: Vec<MatchResult> = scenes
            .iter()
            .flat_map(|scene| self.reconcile_scene_with(scene, &global))
            .collect();

        self.build_report(scenes, results)
    }

    /// Reconcile a batch with scenes sharded across the rayon pool
    ///
    /// Produces the same report as [`reconcile`](Self::reconcile).
    #[cfg(feature = "parallel")]
    pub fn reconcile_parallel(&self, scenes: &[SceneInput]) -> ReconcileReport {
        use rayon::prelude::*;

        let global = GlobalRosterSource::new(&self.roster);
        let per_scene: Vec<Vec<MatchResult>> = scenes
            .par_iter()
            .map(|scene| self.reconcile_scene_with(scene, &global))
            .collect();

        self.build_report(scenes, per_scene.into_iter().flatten().collect())
    }

    /// Run all three rounds for one scene, without deduplication
    pub fn reconcile_scene(&self, scene: &SceneInput) -> Vec<MatchResult> {
        let global = GlobalRosterSource::new(&self.roster);
        self.reconcile_scene_with(scene, &global)
    }

    fn reconcile_scene_with(&self, scene: &SceneInput, global: &GlobalRosterSource<'_>) -> Vec<MatchResult> {
        let matcher = ScenePerformerMatcher::new(&self.thresholds);
        let scene_pass = PassThresholds::scene(&self.thresholds);
        let mut pending = WorkingSet::new(&scene.local);
        let mut results = Vec::new();

        // Round 1: Stashapp scene cast
        if !pending.is_empty() && !scene.stashapp.is_empty() {
            let source = SceneScopedSource::stashapp(&scene.stashapp, &self.roster);
            results.extend(matcher.match_scene(&mut pending, &source, scene_pass));
        }

        // Round 2: StashDB scene credits
        if !pending.is_empty() && !scene.stashdb.is_empty() {
            let source = SceneScopedSource::stashdb(&scene.stashdb, &self.roster);
            results.extend(matcher.match_scene(&mut pending, &source, scene_pass));
        }

        // Round 3: global roster, no scene corroboration
        if !pending.is_empty() && !self.roster.is_empty() {
            let global_pass = PassThresholds::global(&self.thresholds);
            results.extend(matcher.match_scene(&mut pending, global, global_pass));
        }

        debug!(
            scene = scene.scene_id.as_deref().unwrap_or("-"),
            local = scene.local.len(),
            matched = results.len(),
            pending = pending.len(),
            "Scene reconciled"
        );

        results
    }

    fn build_report(&self, scenes: &[SceneInput], results: Vec<MatchResult>) -> ReconcileReport {
        let produced = results.len();
        let matches = deduplicate(results);

        let matched_ids: HashSet<&str> = matches.iter().map(|m| m.local_id.as_str()).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut unmatched = Vec::new();
        for local in scenes.iter().flat_map(|s| s.local.iter()) {
            if seen.insert(local.id.as_str()) && !matched_ids.contains(local.id.as_str()) {
                unmatched.push(UnmatchedPerformer::from(local));
            }
        }

        let mut stats = ReconcileStats {
            scenes: scenes.len(),
            local_performers: seen.len(),
            matched: matches.len(),
            unmatched: unmatched.len(),
            duplicates_dropped: produced - matches.len(),
            ..Default::default()
        };
        for m in &matches {
            stats.count_source(m.source);
        }

        info!(
            scenes = stats.scenes,
            matched = stats.matched,
            unmatched = stats.unmatched,
            scene_media_server = stats.scene_media_server,
            scene_external_db = stats.scene_external_db,
            global_media_server = stats.global_media_server,
            duplicates_dropped = stats.duplicates_dropped,
            "Reconciliation complete"
        );

        ReconcileReport {
            matches,
            unmatched,
            stats,
        }
    }
}

/// Keep one result per local identifier, the one with the highest confidence
///
/// Output follows the order in which each identifier first appeared. Equal
/// confidences keep the earlier result.
pub fn deduplicate(results: Vec<MatchResult>) -> Vec<MatchResult> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<MatchResult> = Vec::new();

    for result in results {
        match position.get(&result.local_id) {
            Some(&idx) => {
                if result.confidence > kept[idx].confidence {
                    debug!(
                        local = %result.local_name,
                        dropped = kept[idx].confidence,
                        kept = result.confidence,
                        "Replaced lower-confidence duplicate"
                    );
                    kept[idx] = result;
                }
            }
            None => {
                position.insert(result.local_id.clone(), kept.len());
                kept.push(result);
            }
        }
    }

    kept
}

/// Build scene records from three positionally aligned collections
///
/// The Nth entry of each collection must describe the same scene. Only a
/// length mismatch is detectable; a mis-ordered zip is the caller's bug.
///
/// # Errors
/// `InvalidInput` when the collections differ in length
pub fn zip_scenes(
    local: Vec<Vec<LocalPerformer>>,
    stashapp: Vec<Vec<StashappPerformer>>,
    stashdb: Vec<Vec<StashdbPerformer>>,
) -> Result<Vec<SceneInput>> {
    if local.len() != stashapp.len() || local.len() != stashdb.len() {
        return Err(Error::InvalidInput(format!(
            "Scene collections are misaligned: {} local, {} stashapp, {} stashdb",
            local.len(),
            stashapp.len(),
            stashdb.len()
        )));
    }

    Ok(local
        .into_iter()
        .zip(stashapp)
        .zip(stashdb)
        .map(|((local, stashapp), stashdb)| SceneInput {
            scene_id: None,
            local,
            stashapp,
            stashdb,
        })
        .collect())
}

//! Unmatched Reconciler
//!
//! Second-chance sweep for local performers that no reconciliation round
//! ever claimed. Only the global Stashapp roster is consulted, in a single
//! pass with a low floor: these performers have no scene match to
//! contaminate.
//!
//! The roster is not consumed, so two local performers may be offered the
//! same Stashapp performer in one call. Results are suggestions for review.

use crate::candidates::{CandidateSource, GlobalRosterSource, Roster};
use crate::scene_matcher::best_candidate;
use crate::types::{LocalPerformer, UnmatchedMatch};
use ce_common::MatchThresholds;
use tracing::{debug, info};

pub struct UnmatchedReconciler {
    roster: Roster,
    thresholds: MatchThresholds,
}

impl UnmatchedReconciler {
    pub fn new(roster: Roster, thresholds: MatchThresholds) -> Self {
        Self { roster, thresholds }
    }

    /// Suggest Stashapp performers for previously unmatched local performers
    ///
    /// A suggestion is emitted only when the best score strictly exceeds
    /// `unmatched_min_confidence` (0.5 by default).
    pub fn reconcile(&self, unmatched: &[LocalPerformer]) -> Vec<UnmatchedMatch> {
        let source = GlobalRosterSource::new(&self.roster);
        let candidates = source.candidates();
        let floor = self.thresholds.unmatched_min_confidence;

        let mut suggestions = Vec::new();
        for local in unmatched {
            let Some((idx, scored)) =
                best_candidate(&local.name, candidates.iter().enumerate(), &self.thresholds)
            else {
                continue;
            };
            if scored.score <= floor {
                debug!(
                    local = %local.name,
                    best = scored.score,
                    "No roster entry above floor"
                );
                continue;
            }

            let candidate = &candidates[idx];
            let resolved = source.resolve(candidate);
            suggestions.push(UnmatchedMatch {
                local_id: local.id.clone(),
                local_name: local.name.clone(),
                stashapp_id: resolved.stashapp_id,
                stashapp_name: resolved.stashapp_name,
                confidence: scored.score,
                reason: scored.describe(),
            });
        }

        info!(
            requested = unmatched.len(),
            suggested = suggestions.len(),
            "Unmatched sweep complete"
        );

        suggestions
    }
}

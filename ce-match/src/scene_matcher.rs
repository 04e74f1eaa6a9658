//! Scene Performer Matcher
//!
//! Matches one scene's pending local performers against one candidate pool.
//!
//! # Passes
//! 1. **Direct:** each pending performer takes its best unconsumed candidate
//!    when the score reaches the direct threshold. Winners are consumed
//!    immediately, so no candidate is awarded twice.
//! 2. **Context boost:** only when the direct pass matched someone. Remaining
//!    performers are re-scored against the remaining pool with a flat bonus
//!    (capped at 1.0): confident matches for part of a cast make marginal
//!    matches for the rest of it more plausible.
//!
//! Performers left unmatched stay pending in the caller's working set for the
//! next source.

use crate::candidates::{Candidate, CandidateSource};
use crate::similarity::{best_alias, similarity_with};
use crate::types::{LocalPerformer, MatchResult};
use crate::working_set::WorkingSet;
use ce_common::MatchThresholds;
use tracing::debug;

/// Acceptance thresholds for one invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassThresholds {
    /// Minimum raw score in the direct pass
    pub direct: f64,
    /// Minimum boosted score in the context pass
    pub boosted: f64,
}

impl PassThresholds {
    /// Scene-scoped rounds: 0.9 direct, 0.65 boosted by default
    pub fn scene(thresholds: &MatchThresholds) -> Self {
        Self {
            direct: thresholds.high_confidence,
            boosted: thresholds.boost_min_confidence,
        }
    }

    /// Global roster round: both passes need very high confidence since
    /// there is no scene-level corroboration
    pub fn global(thresholds: &MatchThresholds) -> Self {
        Self {
            direct: thresholds.high_confidence.max(thresholds.global_min_confidence),
            boosted: thresholds.global_min_confidence,
        }
    }
}

/// What the winning score was computed from
#[derive(Debug, Clone, PartialEq)]
pub enum MatchBasis {
    /// Primary name similarity
    Name,
    /// Best alias, with its unweighted similarity
    Alias { alias: String, similarity: f64 },
}

/// Best score of a local name against one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub score: f64,
    pub basis: MatchBasis,
}

impl CandidateScore {
    /// Reason text for review queues
    pub fn describe(&self) -> String {
        match &self.basis {
            MatchBasis::Name if self.score >= 1.0 => "Exact name match".to_string(),
            MatchBasis::Name => format!("Name similarity {:.2}", self.score),
            MatchBasis::Alias { alias, similarity } => {
                format!("Matched via alias '{}' (similarity {:.2})", alias, similarity)
            }
        }
    }
}

/// Score a local name against a candidate's primary name and aliases
///
/// Alias-derived scores are scaled by `alias_weight`, so a perfect alias hit
/// ranks below a perfect primary-name hit.
pub fn score_candidate(
    name: &str,
    candidate: &Candidate<'_>,
    thresholds: &MatchThresholds,
) -> CandidateScore {
    let name_score = similarity_with(name, candidate.name, thresholds.short_name_max_len);

    if let Some((idx, alias_similarity)) =
        best_alias(name, &candidate.aliases, thresholds.short_name_max_len)
    {
        let alias_score = alias_similarity * thresholds.alias_weight;
        if alias_score > name_score {
            return CandidateScore {
                score: alias_score,
                basis: MatchBasis::Alias {
                    alias: candidate.aliases[idx].to_string(),
                    similarity: alias_similarity,
                },
            };
        }
    }

    CandidateScore {
        score: name_score,
        basis: MatchBasis::Name,
    }
}

/// Best candidate among those still pending
///
/// Ties keep the first candidate in input order.
pub fn best_candidate<'c, 'a: 'c, I>(
    name: &str,
    candidates: I,
    thresholds: &MatchThresholds,
) -> Option<(usize, CandidateScore)>
where
    I: IntoIterator<Item = (usize, &'c Candidate<'a>)>,
{
    let mut best: Option<(usize, CandidateScore)> = None;
    for (idx, candidate) in candidates {
        let scored = score_candidate(name, candidate, thresholds);
        let better = match &best {
            Some((_, current)) => scored.score > current.score,
            None => true,
        };
        if better {
            best = Some((idx, scored));
        }
    }
    best
}

/// Two-pass matcher for one scene and one source
pub struct ScenePerformerMatcher<'t> {
    thresholds: &'t MatchThresholds,
}

impl<'t> ScenePerformerMatcher<'t> {
    pub fn new(thresholds: &'t MatchThresholds) -> Self {
        Self { thresholds }
    }

    /// Match pending performers against a source's candidates
    ///
    /// # Arguments
    /// * `pending` - Local performers still unmatched; winners are removed
    /// * `source` - Candidate pool for this round (consumption is scoped to
    ///   this call)
    /// * `pass` - Acceptance thresholds for both passes
    ///
    /// # Returns
    /// Accepted matches, direct-pass matches first
    pub fn match_scene<S>(
        &self,
        pending: &mut WorkingSet<'_, LocalPerformer>,
        source: &S,
        pass: PassThresholds,
    ) -> Vec<MatchResult>
    where
        S: CandidateSource + ?Sized,
    {
        let candidates = source.candidates();
        let mut pool = WorkingSet::new(candidates);
        let mut results = Vec::new();

        if pending.is_empty() || pool.is_empty() {
            return results;
        }

        // Pass 1: direct matches
        let mut anchors: Vec<&str> = Vec::new();
        for local_idx in pending.indices() {
            let Some(local) = pending.get(local_idx) else {
                continue;
            };
            let Some((cand_idx, scored)) = best_candidate(&local.name, pool.iter(), self.thresholds)
            else {
                break;
            };
            if scored.score < pass.direct {
                continue;
            }

            pool.remove(cand_idx);
            pending.remove(local_idx);
            anchors.push(&local.name);

            let candidate = &candidates[cand_idx];
            debug!(
                source = %source.source(),
                local = %local.name,
                candidate = %candidate.name,
                score = scored.score,
                "Direct match"
            );
            results.push(self.build_result(local, candidate, source, scored.score, scored.describe()));
        }

        if anchors.is_empty() {
            return results;
        }

        // Pass 2: context-boosted matches for the rest of the cast
        let boost = self.thresholds.context_boost;
        for local_idx in pending.indices() {
            let Some(local) = pending.get(local_idx) else {
                continue;
            };
            let Some((cand_idx, scored)) = best_candidate(&local.name, pool.iter(), self.thresholds)
            else {
                break;
            };
            let boosted = (scored.score + boost).min(1.0);
            if boosted < pass.boosted {
                continue;
            }

            pool.remove(cand_idx);
            pending.remove(local_idx);

            let candidate = &candidates[cand_idx];
            let reason = format!(
                "{} + context boost {:.2} (matched in scene: {})",
                scored.describe(),
                boost,
                anchors.join(", ")
            );
            debug!(
                source = %source.source(),
                local = %local.name,
                candidate = %candidate.name,
                raw_score = scored.score,
                boosted,
                "Context-boosted match"
            );
            results.push(self.build_result(local, candidate, source, boosted, reason));
        }

        results
    }

    /// Match a whole cast in one call
    ///
    /// Convenience wrapper for callers that do not chain sources.
    pub fn match_all<S>(
        &self,
        locals: &[LocalPerformer],
        source: &S,
        pass: PassThresholds,
    ) -> Vec<MatchResult>
    where
        S: CandidateSource + ?Sized,
    {
        let mut pending = WorkingSet::new(locals);
        self.match_scene(&mut pending, source, pass)
    }

    fn build_result<S>(
        &self,
        local: &LocalPerformer,
        candidate: &Candidate<'_>,
        source: &S,
        confidence: f64,
        reason: String,
    ) -> MatchResult
    where
        S: CandidateSource + ?Sized,
    {
        let resolved = source.resolve(candidate);
        MatchResult {
            local_id: local.id.clone(),
            local_name: local.name.clone(),
            stashapp_id: resolved.stashapp_id,
            stashapp_name: resolved.stashapp_name,
            stashdb_id: resolved.stashdb_id,
            stashdb_name: resolved.stashdb_name,
            confidence: confidence.clamp(0.0, 1.0),
            reason,
            source: source.source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{Roster, SceneScopedSource};
    use crate::types::{MatchSource, StashappPerformer, StashdbPerformer};
    use std::collections::HashSet;

    fn locals(names: &[(&str, &str)]) -> Vec<LocalPerformer> {
        names.iter().map(|(id, name)| LocalPerformer::new(*id, *name)).collect()
    }

    #[test]
    fn test_direct_then_boosted_pass() {
        let thresholds = MatchThresholds::default();
        let roster = Roster::empty("stashdb");
        let cast = vec![
            StashappPerformer::new(10, "Sybil"),
            StashappPerformer::new(11, "Charlie Dean"),
        ];
        let source = SceneScopedSource::stashapp(&cast, &roster);
        let locals = locals(&[("u1", "Sybil"), ("u2", "Charlie D")]);

        let results = ScenePerformerMatcher::new(&thresholds).match_all(
            &locals,
            &source,
            PassThresholds::scene(&thresholds),
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].local_id, "u1");
        assert_eq!(results[0].stashapp_id, 10);
        assert_eq!(results[0].reason, "Exact name match");

        assert_eq!(results[1].local_id, "u2");
        assert_eq!(results[1].stashapp_id, 11);
        assert!(results[1].confidence >= 0.75 && results[1].confidence <= 1.0);
        assert!(results[1].reason.contains("Sybil"), "reason: {}", results[1].reason);
        assert!(results.iter().all(|r| r.source == MatchSource::SceneMediaServer));
    }

    #[test]
    fn test_no_boost_without_direct_match() {
        let thresholds = MatchThresholds::default();
        let roster = Roster::empty("stashdb");
        let cast = vec![StashappPerformer::new(11, "Charlie Dean")];
        let source = SceneScopedSource::stashapp(&cast, &roster);
        let locals = locals(&[("u2", "Charlie D")]);

        let results = ScenePerformerMatcher::new(&thresholds).match_all(
            &locals,
            &source,
            PassThresholds::scene(&thresholds),
        );
        assert!(results.is_empty());
    }

    #[test]
    fn test_candidate_never_awarded_twice() {
        let thresholds = MatchThresholds::default();
        let roster = Roster::empty("stashdb");
        let cast = vec![StashappPerformer::new(1, "Riley Reid")];
        let source = SceneScopedSource::stashapp(&cast, &roster);
        let locals = locals(&[("u1", "Riley Reid"), ("u2", "riley reid"), ("u3", "Riley Ried")]);

        let mut pending = WorkingSet::new(&locals);
        let results = ScenePerformerMatcher::new(&thresholds).match_scene(
            &mut pending,
            &source,
            PassThresholds::scene(&thresholds),
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].local_id, "u1");
        assert_eq!(pending.indices(), vec![1, 2]);

        let awarded: HashSet<i64> = results.iter().map(|r| r.stashapp_id).collect();
        assert_eq!(awarded.len(), results.len());
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let thresholds = MatchThresholds::default();
        let roster = Roster::empty("stashdb");
        let cast = vec![
            StashappPerformer::new(7, "Abella Danger"),
            StashappPerformer::new(8, "Abella Danger"),
        ];
        let source = SceneScopedSource::stashapp(&cast, &roster);
        let locals = locals(&[("u1", "Abella Danger")]);

        for _ in 0..3 {
            let results = ScenePerformerMatcher::new(&thresholds).match_all(
                &locals,
                &source,
                PassThresholds::scene(&thresholds),
            );
            assert_eq!(results[0].stashapp_id, 7);
        }
    }

    #[test]
    fn test_alias_match_is_weighted() {
        let thresholds = MatchThresholds::default();
        let roster = Roster::empty("stashdb");
        let credits = vec![StashdbPerformer::new("97695d2a", "Silvie Deluxe").with_aliases(["Simona"])];
        let source = SceneScopedSource::stashdb(&credits, &roster);

        let scored = score_candidate("Simona", &source.candidates()[0], &thresholds);
        assert!((scored.score - 0.95).abs() < 1e-9);
        assert!(scored.describe().contains("alias"));
    }

    #[test]
    fn test_global_pass_requires_high_boost_score() {
        let thresholds = MatchThresholds::default();
        let pass = PassThresholds::global(&thresholds);
        assert_eq!(pass.direct, 0.9);
        assert_eq!(pass.boosted, 0.9);

        let scene = PassThresholds::scene(&thresholds);
        assert_eq!(scene.boosted, 0.65);
    }

    #[test]
    fn test_short_names_do_not_fuzzy_match() {
        let thresholds = MatchThresholds::default();
        let roster = Roster::empty("stashdb");
        let cast = vec![
            StashappPerformer::new(1, "Jill Kassidy"),
            StashappPerformer::new(2, "Lolita Rose"),
        ];
        let source = SceneScopedSource::stashapp(&cast, &roster);
        let locals = locals(&[("u1", "Jill Kassidy"), ("u2", "Lola")]);

        let results = ScenePerformerMatcher::new(&thresholds).match_all(
            &locals,
            &source,
            PassThresholds::scene(&thresholds),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].local_id, "u1");
    }
}

//! Second-chance sweep over reconciliation leftovers

mod helpers;

use ce_match::{LocalPerformer, MatchThresholds, UnmatchedReconciler};
use helpers::{local, reconciler, sample_roster, scene};

#[test]
fn test_report_leftovers_feed_unmatched_sweep() {
    let batch = vec![scene(
        "s1",
        vec![local("u1", "Jill Kassandra"), local("u2", "Zzyzx Quorum")],
        vec![],
        vec![],
    )];

    // "Jill Kassandra" scores below the global threshold but above the sweep floor
    let report = reconciler(sample_roster()).reconcile(&batch);
    assert!(report.matches.is_empty());
    assert_eq!(report.unmatched.len(), 2);

    // Unmatched entries serialize with the field names the sweep accepts
    let json = serde_json::to_string(&report.unmatched).unwrap();
    let leftovers: Vec<LocalPerformer> = serde_json::from_str(&json).unwrap();

    let sweep = UnmatchedReconciler::new(sample_roster(), MatchThresholds::default());
    let suggestions = sweep.reconcile(&leftovers);

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].local_id, "u1");
    assert_eq!(suggestions[0].stashapp_id, 1);
    assert!(suggestions[0].confidence > 0.5 && suggestions[0].confidence < 0.9);
}

#[test]
fn test_custom_floor_rejects_weak_suggestions() {
    let thresholds = MatchThresholds {
        unmatched_min_confidence: 0.99,
        ..MatchThresholds::default()
    };
    let sweep = UnmatchedReconciler::new(sample_roster(), thresholds);

    let suggestions = sweep.reconcile(&[local("u1", "Jill Kasidy"), local("u2", "Jill Kassidy")]);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].local_id, "u2");
    assert_eq!(suggestions[0].stashapp_id, 1);
}

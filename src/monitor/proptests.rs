//! Property-based tests for the monitoring store
//!
//! These verify the bounded-history and alert-generation invariants hold
//! across all possible inputs.

use super::store::MonitoringStore;
use super::types::{
    EmotionalState, MonitoringSettings, RetentionLimits, RiskAssessment, RiskLevel,
};
use chrono::Utc;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_risk_level() -> impl Strategy<Value = RiskLevel> {
    prop_oneof![
        Just(RiskLevel::None),
        Just(RiskLevel::Low),
        Just(RiskLevel::Moderate),
        Just(RiskLevel::High),
        Just(RiskLevel::Critical),
    ]
}

fn arb_assessment() -> impl Strategy<Value = RiskAssessment> {
    (
        arb_risk_level(),
        0.0f64..=1.0,
        proptest::collection::vec("[a-z]{1,10}", 0..4),
    )
        .prop_map(|(risk_level, risk_score, risk_factors)| RiskAssessment {
            timestamp: Utc::now(),
            risk_level,
            risk_score,
            risk_factors,
        })
}

fn arb_emotional_state(tag: usize) -> EmotionalState {
    EmotionalState {
        timestamp: Utc::now(),
        primary_emotion: format!("emotion-{tag}"),
        intensity: 0.5,
        confidence: 0.5,
        indicators: vec![],
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// After appending N > L items, the history holds exactly the L
    /// most-recent items in append order.
    #[test]
    fn bounded_history_keeps_most_recent_in_order(limit in 1usize..20, appends in 1usize..60) {
        let mut store = MonitoringStore::with_settings(MonitoringSettings {
            retention: RetentionLimits {
                emotional_states: limit,
                ..RetentionLimits::default()
            },
            ..MonitoringSettings::default()
        });

        for i in 0..appends {
            store.ingest_emotional_state(arb_emotional_state(i));
        }

        let expected_len = appends.min(limit);
        prop_assert_eq!(store.emotional_state_history().len(), expected_len);

        let first_kept = appends - expected_len;
        for (offset, state) in store.emotional_state_history().iter().enumerate() {
            let expected = format!("emotion-{}", first_kept + offset);
            prop_assert_eq!(&state.primary_emotion, &expected);
        }
    }

    /// Ingesting an assessment appends exactly one alert iff the level is
    /// High or Critical, with the kind and action flag fixed by the level.
    #[test]
    fn alert_generation_is_deterministic(assessments in proptest::collection::vec(arb_assessment(), 0..30)) {
        let mut store = MonitoringStore::new();
        let mut expected_alerts = 0usize;

        for assessment in assessments {
            let level = assessment.risk_level;
            store.ingest_risk_assessment(assessment);
            if level >= RiskLevel::High {
                expected_alerts += 1;
                let alert = store.alerts().last().unwrap();
                prop_assert_eq!(
                    alert.action_required,
                    level == RiskLevel::Critical
                );
            }
            prop_assert_eq!(store.alerts().len(), expected_alerts);
        }
    }

    /// Stopping the session never touches histories or alerts.
    #[test]
    fn stop_session_preserves_history(assessments in proptest::collection::vec(arb_assessment(), 1..20)) {
        let mut store = MonitoringStore::new();
        store.start_session(super::types::MonitoringSession::new("s1", "u1"));
        for assessment in assessments {
            store.ingest_risk_assessment(assessment);
        }
        let history_before: Vec<_> = store.risk_assessment_history().iter().cloned().collect();
        let alerts_before = store.alerts().len();

        store.stop_session();

        let history_after: Vec<_> = store.risk_assessment_history().iter().cloned().collect();
        prop_assert_eq!(history_before, history_after);
        prop_assert_eq!(store.alerts().len(), alerts_before);
        prop_assert!(store.current_risk_assessment().is_none());
    }
}

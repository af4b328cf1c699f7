//! Property tests for the fraud sanitizer and the router

use proptest::prelude::*;
use serde_json::json;

use domain_claims::agents::fraud::sanitize;
use domain_claims::aggregate::{ClaimAggregate, FraudDecision};
use domain_claims::validation::ValidationResult;
use domain_claims::{next_stage, RouterConfig};

proptest! {
    // Whatever number the model emits, the sanitized score stays in [0, 1].
    #[test]
    fn sanitized_score_stays_in_unit_interval(score in any::<f64>()) {
        let verdict = sanitize(json!({"fraud_score": score}));
        prop_assert!((0.0..=1.0).contains(&verdict.score));
    }

    // Arbitrary strings in both fields never escape the invariants: the
    // score defaults or clamps, and the decision is Suspect only on the
    // exact word.
    #[test]
    fn sanitizer_handles_arbitrary_strings(raw in ".*") {
        let verdict = sanitize(json!({"fraud_score": raw.clone(), "fraud_decision": raw.clone()}));
        prop_assert!((0.0..=1.0).contains(&verdict.score));
        let expect_suspect = raw.trim().eq_ignore_ascii_case("suspect");
        prop_assert_eq!(
            verdict.decision == FraudDecision::Suspect,
            expect_suspect
        );
    }

    // The router is a pure function of the snapshot: any flag combination
    // yields the same stage on repeated evaluation.
    #[test]
    fn router_is_deterministic_over_flag_space(
        registered: bool,
        has_validation: bool,
        docs_ok: bool,
        fraud_checked: bool,
        decision_made: bool,
        score in 0.0f64..=1.0,
    ) {
        let aggregate = ClaimAggregate {
            registered,
            validation: has_validation.then(|| ValidationResult {
                docs_ok,
                ..Default::default()
            }),
            fraud_checked,
            fraud_score: fraud_checked.then_some(score),
            decision_made,
            ..Default::default()
        };
        let config = RouterConfig::default();
        let first = next_stage(&aggregate, &config);
        prop_assert_eq!(next_stage(&aggregate, &config), first);
    }
}

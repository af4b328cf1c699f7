//! Property tests for tolerant JSON extraction

use core_kernel::json_extract::{extract_json, parse_or};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    // Encoding a value, fencing it, and surrounding it with arbitrary prose
    // must decode back to the original value.
    #[test]
    fn fenced_roundtrip(
        score in 0.0f64..=1.0,
        decision in "[A-Z]{3,8}",
        prose in "[a-zA-Z0-9 .,!?]{0,80}",
    ) {
        let value = json!({"fraud_score": score, "fraud_decision": decision});
        let raw = format!("{prose}\n```json\n{value}\n```\n{prose}");
        let extracted = extract_json(&raw).expect("fenced value must decode");
        prop_assert_eq!(extracted, value);
    }

    // parse_or must never panic, whatever the input looks like.
    #[test]
    fn parse_or_total(raw in ".*") {
        let _: serde_json::Value = parse_or(&raw, json!({}));
    }

    // Prose containing stray braces before the payload must not confuse the
    // balanced-object scanner when the payload itself is fenced.
    #[test]
    fn fence_wins_over_prose(flag: bool, prose in "[a-zA-Z ]{0,40}") {
        let raw = format!("{prose}\n```\n{{\"docs_ok\": {flag}}}\n```");
        let extracted = extract_json(&raw).expect("must decode");
        prop_assert_eq!(extracted, json!({"docs_ok": flag}));
    }
}

#[test]
fn unfenced_value_with_trailing_prose() {
    let raw = "Sure! {\"validation_passed\": false, \"errors\": [\"amount mismatch\"]} Hope that helps.";
    let extracted = extract_json(raw).unwrap();
    assert_eq!(
        extracted,
        json!({"validation_passed": false, "errors": ["amount mismatch"]})
    );
}

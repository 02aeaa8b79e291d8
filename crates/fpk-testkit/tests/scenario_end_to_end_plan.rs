use fpk_reconcile::{build_instructions, diff, validate_snapshot, PatchSession};
use fpk_schemas::{Clause, FlagState};
use fpk_testkit::{boolean_flag, group, target, weight};

/// Full pipeline over a mixed edit: validate, diff, build, accumulate,
/// flush. Covers the interleaving of state, group, rollout and individual
/// target changes in one save action.
#[test]
fn scenario_mixed_edit_produces_one_ordered_payload() {
    let initial = boolean_flag()
        .variation_rule(
            "true",
            vec![target("t-keep", "Keep"), target("t-old", "Old")],
            vec![group("g-keep", "Keep", "r-keep"), group("g-old", "Old", "r-old")],
        )
        .rollout(
            "ro-1",
            "identifier",
            Clause::new("attr", "plan", vec!["pro".to_string()]),
            vec![weight("true", 40), weight("false", 60)],
        )
        .build();

    let submitted = boolean_flag()
        .state(FlagState::On)
        .variation_rule(
            "true",
            vec![target("t-keep", "Keep"), target("t-new", "New")],
            vec![group("g-keep", "Keep", "r-keep"), group("g-new", "New", "")],
        )
        .rollout(
            "ro-1",
            "identifier",
            Clause::new("attr", "plan", vec!["pro".to_string()]),
            vec![weight("true", 55), weight("false", 45)],
        )
        .build();

    assert!(validate_snapshot(&submitted).is_clean());

    let instructions = build_instructions(&diff(&initial, &submitted));
    let mut session = PatchSession::new();
    session.add_all_instructions(instructions);

    let payload = session
        .on_patch_available(|p| p)
        .expect("non-empty queue must flush");

    let kinds: Vec<&str> = payload.instructions.iter().map(|i| i.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "setFeatureFlagState",
            "removeRule",                        // g-old
            "updateRule",                        // ro-1 distribution
            "updateClause",                      // ro-1 clause
            "removeTargetsToVariationTargetMap", // t-old
            "addRule",                           // g-new
            "addTargetsToVariationTargetMap",    // t-new
        ]
    );

    // Wire shape: every entry is { kind, parameters }.
    let json = serde_json::to_value(&payload).expect("payload serializes");
    for entry in json["instructions"].as_array().expect("array") {
        assert!(entry.get("kind").is_some());
        assert!(entry.get("parameters").is_some());
    }
}

/// Diffing any snapshot against itself never queues anything, so the flush
/// callback must not fire.
#[test]
fn scenario_no_change_never_flushes() {
    let snap = boolean_flag()
        .variation_rule("true", vec![target("t1", "T1")], vec![])
        .build();

    let mut session = PatchSession::new();
    session.add_all_instructions(build_instructions(&diff(&snap, &snap)));

    assert!(session.is_empty());
    assert_eq!(session.on_patch_available(|p| p.len()), None);
}

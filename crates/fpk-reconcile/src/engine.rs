use std::collections::{BTreeMap, BTreeSet};

use fpk_schemas::{PercentageRolloutRule, TargetGroupRef, TargetRef, TargetingSnapshot};

use crate::{Delta, RolloutDelta, VariationDelta};

/// Targets and target groups served to one variation, aggregated across that
/// variation's active rules in array order.
#[derive(Default)]
struct VariationMembers {
    targets: Vec<TargetRef>,
    target_groups: Vec<TargetGroupRef>,
}

fn collect_members(snap: &TargetingSnapshot) -> BTreeMap<String, VariationMembers> {
    let mut by_variation: BTreeMap<String, VariationMembers> = BTreeMap::new();
    for rule in snap.variation_rules() {
        let entry = by_variation.entry(rule.variation_id.clone()).or_default();
        entry.targets.extend(rule.targets.iter().cloned());
        entry
            .target_groups
            .extend(rule.target_groups.iter().cloned());
    }
    by_variation
}

fn target_ids(members: &VariationMembers) -> BTreeSet<&str> {
    members.targets.iter().map(|t| t.id.as_str()).collect()
}

fn group_ids(members: &VariationMembers) -> BTreeSet<&str> {
    members.target_groups.iter().map(|g| g.id.as_str()).collect()
}

fn diff_variation(
    variation_id: &str,
    initial: &VariationMembers,
    submitted: &VariationMembers,
) -> VariationDelta {
    let initial_targets = target_ids(initial);
    let submitted_targets = target_ids(submitted);
    let initial_groups = group_ids(initial);
    let submitted_groups = group_ids(submitted);

    let mut delta = VariationDelta::empty(variation_id);

    // Added entries keep submitted order; removed entries keep initial order.
    for g in &submitted.target_groups {
        if !initial_groups.contains(g.id.as_str()) {
            delta.added_target_groups.push(g.clone());
        }
    }
    for g in &initial.target_groups {
        if !submitted_groups.contains(g.id.as_str()) {
            delta.removed_target_groups.push(g.clone());
        }
    }
    for t in &submitted.targets {
        if !initial_targets.contains(t.id.as_str()) {
            delta.added_targets.push(t.clone());
        }
    }
    for t in &initial.targets {
        if !submitted_targets.contains(t.id.as_str()) {
            delta.removed_targets.push(t.clone());
        }
    }

    delta
}

fn diff_rollouts(initial: &TargetingSnapshot, submitted: &TargetingSnapshot) -> RolloutDelta {
    let initial_rollouts: Vec<&PercentageRolloutRule> = initial.rollout_rules().collect();
    let submitted_rollouts: Vec<&PercentageRolloutRule> = submitted.rollout_rules().collect();

    let initial_ids: BTreeSet<&str> = initial_rollouts.iter().map(|r| r.rule_id.as_str()).collect();
    let submitted_ids: BTreeSet<&str> = submitted_rollouts
        .iter()
        .map(|r| r.rule_id.as_str())
        .collect();

    let mut delta = RolloutDelta::default();

    for r in &submitted_rollouts {
        if !initial_ids.contains(r.rule_id.as_str()) {
            delta.added.push((*r).clone());
        }
    }
    for r in &initial_rollouts {
        if !submitted_ids.contains(r.rule_id.as_str()) {
            delta.removed.push((*r).clone());
        }
    }
    // Present on both sides: an update only when the content differs.
    for r in &submitted_rollouts {
        if let Some(orig) = initial_rollouts
            .iter()
            .find(|o| o.rule_id == r.rule_id)
        {
            if !orig.same_content(r) {
                delta.updated.push((*r).clone());
            }
        }
    }

    delta
}

/// Compare an initial and a submitted targeting snapshot.
///
/// Pure function over two immutable snapshots; no side effects, never fails.
/// Items marked deleted are treated as absent on their side of the diff.
/// Output ordering is deterministic: per-variation deltas are sorted by
/// variation id, entries within a delta follow source array order.
pub fn diff(initial: &TargetingSnapshot, submitted: &TargetingSnapshot) -> Delta {
    let initial_members = collect_members(initial);
    let submitted_members = collect_members(submitted);

    let empty = VariationMembers::default();

    // Union of variation ids across both snapshots, sorted.
    let mut variation_ids: BTreeSet<&str> =
        initial_members.keys().map(String::as_str).collect();
    variation_ids.extend(submitted_members.keys().map(String::as_str));

    let mut variations = Vec::new();
    for vid in variation_ids {
        let before = initial_members.get(vid).unwrap_or(&empty);
        let after = submitted_members.get(vid).unwrap_or(&empty);
        let vd = diff_variation(vid, before, after);
        if !vd.is_empty() {
            variations.push(vd);
        }
    }

    Delta {
        flag_state_changed: initial.state != submitted.state,
        default_on_variation_changed: initial.on_variation != submitted.on_variation,
        default_off_variation_changed: initial.off_variation != submitted.off_variation,
        submitted_state: submitted.state,
        submitted_on_variation: submitted.on_variation.clone(),
        submitted_off_variation: submitted.off_variation.clone(),
        variations,
        rollouts: diff_rollouts(initial, submitted),
        insertion_base_priority: initial.max_active_priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpk_schemas::{
        Clause, FlagState, ItemStatus, TargetingItem, VariationRule, VariationWeight,
    };

    fn snap() -> TargetingSnapshot {
        TargetingSnapshot::new(FlagState::Off, "true", "false")
    }

    fn variation_rule(
        variation_id: &str,
        priority: u32,
        groups: Vec<TargetGroupRef>,
    ) -> TargetingItem {
        TargetingItem::Variation(VariationRule {
            priority,
            variation_id: variation_id.to_string(),
            targets: vec![],
            target_groups: groups,
            status: ItemStatus::Loaded,
        })
    }

    #[test]
    fn self_diff_is_empty() {
        let mut s = snap();
        s.items.push(variation_rule(
            "true",
            1,
            vec![TargetGroupRef::new("g1", "group one", "r1")],
        ));
        assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn state_change_is_independent_of_rule_diff() {
        let initial = snap();
        let mut submitted = snap();
        submitted.state = FlagState::On;

        let d = diff(&initial, &submitted);
        assert!(d.flag_state_changed);
        assert!(!d.default_on_variation_changed);
        assert!(d.variations.is_empty());
        assert!(d.rollouts.is_empty());
        assert!(!d.is_empty());
    }

    #[test]
    fn group_membership_diff_is_keyed_by_id_not_position() {
        let mut initial = snap();
        initial.items.push(variation_rule(
            "true",
            1,
            vec![
                TargetGroupRef::new("a", "A", "r-a"),
                TargetGroupRef::new("b", "B", "r-b"),
            ],
        ));

        // Same membership, reversed order: no diff.
        let mut submitted = snap();
        submitted.items.push(variation_rule(
            "true",
            1,
            vec![
                TargetGroupRef::new("b", "B", "r-b"),
                TargetGroupRef::new("a", "A", "r-a"),
            ],
        ));

        assert!(diff(&initial, &submitted).is_empty());
    }

    #[test]
    fn deleted_items_are_absent_from_their_side() {
        let mut initial = snap();
        initial.items.push(variation_rule(
            "true",
            1,
            vec![TargetGroupRef::new("a", "A", "r-a")],
        ));

        // Submitted carries the same rule but marked deleted: counts as removal.
        let mut submitted = snap();
        submitted.items.push(TargetingItem::Variation(VariationRule {
            priority: 1,
            variation_id: "true".to_string(),
            targets: vec![],
            target_groups: vec![TargetGroupRef::new("a", "A", "r-a")],
            status: ItemStatus::Deleted,
        }));

        let d = diff(&initial, &submitted);
        assert_eq!(d.variations.len(), 1);
        assert_eq!(d.variations[0].removed_target_groups.len(), 1);
        assert_eq!(d.variations[0].removed_target_groups[0].rule_id, "r-a");
        assert!(d.variations[0].added_target_groups.is_empty());
    }

    #[test]
    fn rollout_content_change_is_an_update() {
        let rollout = |weight: u32| {
            TargetingItem::PercentageRollout(PercentageRolloutRule {
                priority: 2,
                rule_id: "ro-1".to_string(),
                bucket_by: "identifier".to_string(),
                clause: Clause::new("attr", "plan", vec!["pro".to_string()]),
                variation_weights: vec![
                    VariationWeight::new("true", weight),
                    VariationWeight::new("false", 100 - weight),
                ],
                status: ItemStatus::Loaded,
            })
        };

        let mut initial = snap();
        initial.items.push(rollout(40));
        let mut submitted = snap();
        submitted.items.push(rollout(60));

        let d = diff(&initial, &submitted);
        assert!(d.rollouts.added.is_empty());
        assert!(d.rollouts.removed.is_empty());
        assert_eq!(d.rollouts.updated.len(), 1);
        assert_eq!(d.rollouts.updated[0].variation_weights[0].weight, 60);
    }

    #[test]
    fn insertion_base_comes_from_initial_active_max() {
        let mut initial = snap();
        initial.items.push(variation_rule("true", 5, vec![]));
        let submitted = snap();

        let d = diff(&initial, &submitted);
        assert_eq!(d.insertion_base_priority, 5);
    }
}

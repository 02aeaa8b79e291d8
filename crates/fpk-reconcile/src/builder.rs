use fpk_schemas::{Clause, Instruction, Serve};
use uuid::Uuid;

use crate::Delta;

/// Build the ordered instruction list for a delta, using `Uuid::new_v4` for
/// new rule ids. See [`build_instructions_with`] for the ordering contract.
pub fn build_instructions(delta: &Delta) -> Vec<Instruction> {
    build_instructions_with(delta, Uuid::new_v4)
}

/// Build the ordered instruction list for a delta with an injected rule-id
/// source (deterministic ids in tests; `Uuid::new_v4` in production).
///
/// Pure data transform, never fails; an empty delta yields an empty list.
///
/// Phase order is fixed to respect backend ordering guarantees — a state
/// change must precede variation/rule changes, and removals must precede
/// additions so no transient state violates the one-active-rule-per-target
/// invariant:
///
/// 1. `setFeatureFlagState`
/// 2. `updateDefaultServe` / `updateOffVariation`
/// 3. `removeRule` (removed target groups, removed rollouts) and the
///    `updateRule` + `updateClause` pair for updated rollouts
/// 4. `removeTargetsToVariationTargetMap`
/// 5. `addRule` (added target groups, then added rollouts)
/// 6. `addTargetsToVariationTargetMap`
///
/// Update strategy is deliberately asymmetric per rule kind: a changed
/// target-group membership surfaces as remove+add of whole rules (the diff
/// layer already decomposed it), while a changed rollout is updated in place
/// via `updateRule` + `updateClause`. Both strategies are valid backend
/// vocabularies; this crate fixes one per kind rather than mixing them.
pub fn build_instructions_with(
    delta: &Delta,
    mut new_rule_id: impl FnMut() -> Uuid,
) -> Vec<Instruction> {
    let mut out: Vec<Instruction> = Vec::new();

    // Phase 1: flag state.
    if delta.flag_state_changed {
        out.push(Instruction::SetFeatureFlagState {
            state: delta.submitted_state,
        });
    }

    // Phase 2: default serves.
    if delta.default_on_variation_changed {
        out.push(Instruction::UpdateDefaultServe {
            variation: delta.submitted_on_variation.clone(),
        });
    }
    if delta.default_off_variation_changed {
        out.push(Instruction::UpdateOffVariation {
            variation: delta.submitted_off_variation.clone(),
        });
    }

    // Phase 3: rule removals and in-place rollout updates.
    for vd in &delta.variations {
        for group in &vd.removed_target_groups {
            out.push(Instruction::RemoveRule {
                rule_id: group.rule_id.clone(),
            });
        }
    }
    for rollout in &delta.rollouts.removed {
        out.push(Instruction::RemoveRule {
            rule_id: rollout.rule_id.clone(),
        });
    }
    for rollout in &delta.rollouts.updated {
        out.push(Instruction::UpdateRule {
            rule_id: rollout.rule_id.clone(),
            bucket_by: rollout.bucket_by.clone(),
            variations: rollout.variation_weights.clone(),
        });
        out.push(Instruction::UpdateClause {
            rule_id: rollout.rule_id.clone(),
            clause_id: rollout.clause.id.clone().unwrap_or_default(),
            op: rollout.clause.op.clone(),
            attribute: rollout.clause.attribute.clone(),
            values: rollout.clause.values.clone(),
        });
    }

    // Phase 4: individual target removals.
    for vd in &delta.variations {
        if !vd.removed_targets.is_empty() {
            out.push(Instruction::RemoveTargetsToVariationTargetMap {
                variation: vd.variation_id.clone(),
                targets: vd.removed_targets.iter().map(|t| t.id.clone()).collect(),
            });
        }
    }

    // Phase 5: rule additions. One running index across all added target
    // groups so priorities are strictly increasing above the insertion base.
    let mut added_index: u32 = 0;
    for vd in &delta.variations {
        for group in &vd.added_target_groups {
            out.push(Instruction::AddRule {
                uuid: new_rule_id(),
                priority: delta.insertion_base_priority + added_index + 1,
                serve: Serve::variation(vd.variation_id.clone()),
                clauses: vec![Clause::segment_match(group.id.clone())],
            });
            added_index += 1;
        }
    }
    for rollout in &delta.rollouts.added {
        out.push(Instruction::AddRule {
            uuid: new_rule_id(),
            priority: rollout.priority,
            serve: Serve::distribution(
                rollout.bucket_by.clone(),
                rollout.variation_weights.clone(),
            ),
            clauses: vec![rollout.clause.clone()],
        });
    }

    // Phase 6: individual target additions.
    for vd in &delta.variations {
        if !vd.added_targets.is_empty() {
            out.push(Instruction::AddTargetsToVariationTargetMap {
                variation: vd.variation_id.clone(),
                targets: vd.added_targets.iter().map(|t| t.id.clone()).collect(),
            });
        }
    }

    out
}

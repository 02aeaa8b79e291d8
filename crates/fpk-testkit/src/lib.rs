//! fpk-testkit
//!
//! Snapshot fixture builders shared by scenario tests across the workspace.
//! Priorities are auto-assigned (`max(existing) + 1`) unless set explicitly,
//! matching the insert invariant of the live form.

use fpk_schemas::{
    Clause, FlagState, ItemStatus, PercentageRolloutRule, TargetGroupRef, TargetRef,
    TargetingItem, TargetingSnapshot, VariationRule, VariationWeight,
};

pub fn target(id: &str, name: &str) -> TargetRef {
    TargetRef::new(id, name)
}

pub fn group(id: &str, name: &str, rule_id: &str) -> TargetGroupRef {
    TargetGroupRef::new(id, name, rule_id)
}

pub fn weight(variation_id: &str, weight: u32) -> VariationWeight {
    VariationWeight::new(variation_id, weight)
}

/// Fluent snapshot builder for tests.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    snap: TargetingSnapshot,
}

impl SnapshotBuilder {
    pub fn new(state: FlagState, on_variation: &str, off_variation: &str) -> Self {
        Self {
            snap: TargetingSnapshot::new(state, on_variation, off_variation),
        }
    }

    pub fn state(mut self, state: FlagState) -> Self {
        self.snap.state = state;
        self
    }

    pub fn on_variation(mut self, variation: &str) -> Self {
        self.snap.on_variation = variation.to_string();
        self
    }

    pub fn off_variation(mut self, variation: &str) -> Self {
        self.snap.off_variation = variation.to_string();
        self
    }

    /// Add a variation rule with auto-assigned priority.
    pub fn variation_rule(
        self,
        variation_id: &str,
        targets: Vec<TargetRef>,
        target_groups: Vec<TargetGroupRef>,
    ) -> Self {
        let priority = self.snap.next_priority();
        self.variation_rule_at(priority, variation_id, targets, target_groups)
    }

    pub fn variation_rule_at(
        mut self,
        priority: u32,
        variation_id: &str,
        targets: Vec<TargetRef>,
        target_groups: Vec<TargetGroupRef>,
    ) -> Self {
        self.snap.items.push(TargetingItem::Variation(VariationRule {
            priority,
            variation_id: variation_id.to_string(),
            targets,
            target_groups,
            status: ItemStatus::Loaded,
        }));
        self
    }

    /// Add a percentage rollout with auto-assigned priority.
    pub fn rollout(
        mut self,
        rule_id: &str,
        bucket_by: &str,
        clause: Clause,
        variation_weights: Vec<VariationWeight>,
    ) -> Self {
        let priority = self.snap.next_priority();
        self.snap
            .items
            .push(TargetingItem::PercentageRollout(PercentageRolloutRule {
                priority,
                rule_id: rule_id.to_string(),
                bucket_by: bucket_by.to_string(),
                clause,
                variation_weights,
                status: ItemStatus::Loaded,
            }));
        self
    }

    /// Mark the last added item deleted (form-delete in the current session).
    pub fn last_item_deleted(mut self) -> Self {
        if let Some(item) = self.snap.items.last_mut() {
            match item {
                TargetingItem::Variation(r) => r.status = ItemStatus::Deleted,
                TargetingItem::PercentageRollout(r) => r.status = ItemStatus::Deleted,
            }
        }
        self
    }

    pub fn build(self) -> TargetingSnapshot {
        self.snap
    }
}

/// A boolean flag in its freshly-created shape: off, serving `true` when on
/// and `false` when off, with no targeting items.
pub fn boolean_flag() -> SnapshotBuilder {
    SnapshotBuilder::new(FlagState::Off, "true", "false")
}

use fpk_schemas::{FlagState, PercentageRolloutRule, TargetGroupRef, TargetRef};

/// Membership changes for one variation: target groups and individual
/// targets, keyed by stable id (never array position).
///
/// Removed entries keep the initial snapshot's order; added entries keep the
/// submitted snapshot's order. The builder relies on this for deterministic
/// instruction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariationDelta {
    pub variation_id: String,
    pub added_target_groups: Vec<TargetGroupRef>,
    pub removed_target_groups: Vec<TargetGroupRef>,
    pub added_targets: Vec<TargetRef>,
    pub removed_targets: Vec<TargetRef>,
}

impl VariationDelta {
    pub fn empty(variation_id: impl Into<String>) -> Self {
        Self {
            variation_id: variation_id.into(),
            added_target_groups: Vec::new(),
            removed_target_groups: Vec::new(),
            added_targets: Vec::new(),
            removed_targets: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_target_groups.is_empty()
            && self.removed_target_groups.is_empty()
            && self.added_targets.is_empty()
            && self.removed_targets.is_empty()
    }
}

/// Percentage-rollout changes, matched by `rule_id`.
///
/// `updated` holds the submitted side of rollouts present in both snapshots
/// whose content differs (distribution or clause; form status is ignored).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RolloutDelta {
    pub added: Vec<PercentageRolloutRule>,
    pub removed: Vec<PercentageRolloutRule>,
    pub updated: Vec<PercentageRolloutRule>,
}

impl RolloutDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Full difference between two targeting snapshots.
///
/// State and default-variation changes are independent booleans computed by
/// strict inequality; they do not interact with the rule diff. The submitted
/// values are carried so the builder can emit them without re-reading the
/// snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta {
    pub flag_state_changed: bool,
    pub default_on_variation_changed: bool,
    pub default_off_variation_changed: bool,

    pub submitted_state: FlagState,
    pub submitted_on_variation: String,
    pub submitted_off_variation: String,

    /// Non-empty per-variation membership deltas, sorted by variation id.
    pub variations: Vec<VariationDelta>,
    pub rollouts: RolloutDelta,

    /// Max priority among the initial snapshot's active items (0 when none).
    /// New target-group rules are inserted above this base.
    pub insertion_base_priority: u32,
}

impl Delta {
    /// True when no instruction would be emitted for this delta.
    /// Callers use this to skip the patch network call entirely.
    pub fn is_empty(&self) -> bool {
        !self.flag_state_changed
            && !self.default_on_variation_changed
            && !self.default_off_variation_changed
            && self.variations.iter().all(VariationDelta::is_empty)
            && self.rollouts.is_empty()
    }
}

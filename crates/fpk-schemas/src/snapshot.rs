use serde::{Deserialize, Serialize};

/// Clause operator used for target-group membership rules.
pub const SEGMENT_MATCH_OP: &str = "segmentMatch";

/// Flag kill-switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagState {
    On,
    Off,
}

impl FlagState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagState::On => "on",
            FlagState::Off => "off",
        }
    }
}

/// Form lifecycle status of a targeting item.
///
/// `Loaded` came from the backend, `Added` was created in the current edit
/// session, `Deleted` is marked for removal. Items with status `Deleted` are
/// not **active** and are excluded from diffing and invariant checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Loaded,
    Added,
    Deleted,
}

/// An individual target (e.g. a user or account) referenced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub id: String,
    pub name: String,
}

impl TargetRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A target group (segment) referenced by a rule.
///
/// `rule_id` is the backend rule id serving this group; empty for groups
/// added in the current session (the backend assigns it on create).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroupRef {
    pub id: String,
    pub name: String,
    pub rule_id: String,
}

impl TargetGroupRef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule_id: rule_id.into(),
        }
    }
}

/// Weight assigned to one variation in a percentage rollout.
/// Weights across a rollout must sum to 100 (validated before submit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationWeight {
    pub variation_id: String,
    pub weight: u32,
}

impl VariationWeight {
    pub fn new(variation_id: impl Into<String>, weight: u32) -> Self {
        Self {
            variation_id: variation_id.into(),
            weight,
        }
    }
}

/// A matching clause on a rule.
///
/// `id` is backend-assigned; `None` for clauses built locally (e.g. the
/// segmentMatch clause of a freshly added target-group rule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub op: String,
    pub attribute: String,
    pub values: Vec<String>,
}

impl Clause {
    pub fn new(op: impl Into<String>, attribute: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: None,
            op: op.into(),
            attribute: attribute.into(),
            values,
        }
    }

    /// Membership clause for a single target group.
    pub fn segment_match(group_id: impl Into<String>) -> Self {
        Self::new(SEGMENT_MATCH_OP, "", vec![group_id.into()])
    }
}

/// Rule serving a fixed variation to explicit targets and target groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationRule {
    pub priority: u32,
    pub variation_id: String,
    pub targets: Vec<TargetRef>,
    pub target_groups: Vec<TargetGroupRef>,
    pub status: ItemStatus,
}

/// Rule distributing traffic across variations by weighted buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageRolloutRule {
    pub priority: u32,
    pub rule_id: String,
    pub bucket_by: String,
    pub clause: Clause,
    pub variation_weights: Vec<VariationWeight>,
    pub status: ItemStatus,
}

impl PercentageRolloutRule {
    /// Content equality for diffing: compares the served distribution and
    /// clause, ignoring priority and form status.
    pub fn same_content(&self, other: &PercentageRolloutRule) -> bool {
        self.bucket_by == other.bucket_by
            && self.clause == other.clause
            && self.variation_weights == other.variation_weights
    }
}

/// One targeting item: either an explicit variation rule or a percentage
/// rollout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TargetingItem {
    Variation(VariationRule),
    PercentageRollout(PercentageRolloutRule),
}

impl TargetingItem {
    pub fn priority(&self) -> u32 {
        match self {
            TargetingItem::Variation(r) => r.priority,
            TargetingItem::PercentageRollout(r) => r.priority,
        }
    }

    pub fn status(&self) -> ItemStatus {
        match self {
            TargetingItem::Variation(r) => r.status,
            TargetingItem::PercentageRollout(r) => r.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() != ItemStatus::Deleted
    }
}

/// Immutable point-in-time representation of flag targeting configuration.
///
/// Built once per form load (`initial`) and once per submit (`submitted`);
/// the reconciler reads both and mutates neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingSnapshot {
    pub state: FlagState,
    pub on_variation: String,
    pub off_variation: String,
    pub items: Vec<TargetingItem>,
}

impl TargetingSnapshot {
    pub fn new(
        state: FlagState,
        on_variation: impl Into<String>,
        off_variation: impl Into<String>,
    ) -> Self {
        Self {
            state,
            on_variation: on_variation.into(),
            off_variation: off_variation.into(),
            items: Vec::new(),
        }
    }

    /// Items not marked deleted.
    pub fn active_items(&self) -> impl Iterator<Item = &TargetingItem> {
        self.items.iter().filter(|i| i.is_active())
    }

    pub fn variation_rules(&self) -> impl Iterator<Item = &VariationRule> {
        self.active_items().filter_map(|i| match i {
            TargetingItem::Variation(r) => Some(r),
            _ => None,
        })
    }

    pub fn rollout_rules(&self) -> impl Iterator<Item = &PercentageRolloutRule> {
        self.active_items().filter_map(|i| match i {
            TargetingItem::PercentageRollout(r) => Some(r),
            _ => None,
        })
    }

    /// Max priority among active items; 0 when the snapshot has none.
    pub fn max_active_priority(&self) -> u32 {
        self.active_items().map(|i| i.priority()).max().unwrap_or(0)
    }

    /// Priority for the next inserted item: `max(existing) + 1`.
    pub fn next_priority(&self) -> u32 {
        self.max_active_priority() + 1
    }
}

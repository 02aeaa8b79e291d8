use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fpk_schemas::TargetingSnapshot;

/// One invariant violation found in a submitted snapshot.
///
/// Issues are data; rendering is the caller's job (CLI text, UI form error).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum ValidationIssue {
    /// Rollout weights must sum to exactly 100.
    #[serde(rename_all = "camelCase")]
    RolloutWeightSum { rule_id: String, sum: u32 },

    /// A variation rule with neither targets nor target groups selected.
    #[serde(rename_all = "camelCase")]
    EmptyVariationRule { variation_id: String },

    /// A target referenced by more than one active rule.
    #[serde(rename_all = "camelCase")]
    DuplicateTarget { target_id: String },

    /// A target group referenced by more than one active rule.
    #[serde(rename_all = "camelCase")]
    DuplicateTargetGroup { group_id: String },

    /// Two active items share a priority.
    #[serde(rename_all = "camelCase")]
    DuplicatePriority { priority: u32 },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::RolloutWeightSum { rule_id, sum } => write!(
                f,
                "rollout rule {rule_id}: variation weights sum to {sum}, expected 100"
            ),
            ValidationIssue::EmptyVariationRule { variation_id } => write!(
                f,
                "variation rule for {variation_id}: no targets or target groups selected"
            ),
            ValidationIssue::DuplicateTarget { target_id } => {
                write!(f, "target {target_id} appears in more than one active rule")
            }
            ValidationIssue::DuplicateTargetGroup { group_id } => write!(
                f,
                "target group {group_id} appears in more than one active rule"
            ),
            ValidationIssue::DuplicatePriority { priority } => {
                write!(f, "priority {priority} is assigned to more than one active item")
            }
        }
    }
}

/// Result of validating one snapshot. Any issue blocks submission entirely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn clean() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check the submitted snapshot against the targeting invariants:
/// rollout weights sum to 100, no empty variation rules, each target and
/// target group in at most one active rule, unique priorities among active
/// items. Deterministic output ordering (issues grouped by check, then by
/// source order / id).
pub fn validate_snapshot(snap: &TargetingSnapshot) -> ValidationReport {
    let mut issues: Vec<ValidationIssue> = Vec::new();

    for rollout in snap.rollout_rules() {
        let sum: u32 = rollout.variation_weights.iter().map(|w| w.weight).sum();
        if sum != 100 {
            issues.push(ValidationIssue::RolloutWeightSum {
                rule_id: rollout.rule_id.clone(),
                sum,
            });
        }
    }

    for rule in snap.variation_rules() {
        if rule.targets.is_empty() && rule.target_groups.is_empty() {
            issues.push(ValidationIssue::EmptyVariationRule {
                variation_id: rule.variation_id.clone(),
            });
        }
    }

    let mut target_counts: BTreeMap<&str, u32> = BTreeMap::new();
    let mut group_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for rule in snap.variation_rules() {
        for t in &rule.targets {
            *target_counts.entry(t.id.as_str()).or_default() += 1;
        }
        for g in &rule.target_groups {
            *group_counts.entry(g.id.as_str()).or_default() += 1;
        }
    }
    for (id, n) in &target_counts {
        if *n > 1 {
            issues.push(ValidationIssue::DuplicateTarget {
                target_id: (*id).to_string(),
            });
        }
    }
    for (id, n) in &group_counts {
        if *n > 1 {
            issues.push(ValidationIssue::DuplicateTargetGroup {
                group_id: (*id).to_string(),
            });
        }
    }

    let mut priority_counts: BTreeMap<u32, u32> = BTreeMap::new();
    for item in snap.active_items() {
        *priority_counts.entry(item.priority()).or_default() += 1;
    }
    for (priority, n) in &priority_counts {
        if *n > 1 {
            issues.push(ValidationIssue::DuplicatePriority {
                priority: *priority,
            });
        }
    }

    ValidationReport { issues }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Clause, FlagState, VariationWeight};

/// What a new rule serves: either a fixed variation or a weighted
/// distribution. Exactly one side is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Serve {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

impl Serve {
    pub fn variation(id: impl Into<String>) -> Self {
        Self {
            variation: Some(id.into()),
            distribution: None,
        }
    }

    pub fn distribution(bucket_by: impl Into<String>, variations: Vec<VariationWeight>) -> Self {
        Self {
            variation: None,
            distribution: Some(Distribution {
                bucket_by: bucket_by.into(),
                variations,
            }),
        }
    }
}

/// Weighted rollout distribution carried by a `Serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub bucket_by: String,
    pub variations: Vec<VariationWeight>,
}

/// A single atomic mutation directive for the backend patch endpoint.
///
/// Wire shape is `{ "kind": "...", "parameters": { ... } }` with the fixed
/// kind vocabulary the backend accepts. Ordering of instructions within one
/// payload is significant and owned by the builder, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "camelCase")]
pub enum Instruction {
    #[serde(rename_all = "camelCase")]
    SetFeatureFlagState { state: FlagState },

    #[serde(rename_all = "camelCase")]
    UpdateDefaultServe { variation: String },

    #[serde(rename_all = "camelCase")]
    UpdateOffVariation { variation: String },

    /// Create a rule. `uuid` is freshly generated per instruction so the
    /// backend can address the rule before it has a persistent id.
    #[serde(rename_all = "camelCase")]
    AddRule {
        uuid: Uuid,
        priority: u32,
        serve: Serve,
        clauses: Vec<Clause>,
    },

    #[serde(rename_all = "camelCase")]
    RemoveRule { rule_id: String },

    /// In-place update of a rollout rule's distribution.
    #[serde(rename_all = "camelCase")]
    UpdateRule {
        rule_id: String,
        bucket_by: String,
        variations: Vec<VariationWeight>,
    },

    /// In-place update of a rollout rule's matching clause.
    #[serde(rename_all = "camelCase")]
    UpdateClause {
        rule_id: String,
        clause_id: String,
        op: String,
        attribute: String,
        values: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    AddTargetsToVariationTargetMap {
        variation: String,
        targets: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    RemoveTargetsToVariationTargetMap {
        variation: String,
        targets: Vec<String>,
    },
}

impl Instruction {
    /// Wire kind string, for logging and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::SetFeatureFlagState { .. } => "setFeatureFlagState",
            Instruction::UpdateDefaultServe { .. } => "updateDefaultServe",
            Instruction::UpdateOffVariation { .. } => "updateOffVariation",
            Instruction::AddRule { .. } => "addRule",
            Instruction::RemoveRule { .. } => "removeRule",
            Instruction::UpdateRule { .. } => "updateRule",
            Instruction::UpdateClause { .. } => "updateClause",
            Instruction::AddTargetsToVariationTargetMap { .. } => {
                "addTargetsToVariationTargetMap"
            }
            Instruction::RemoveTargetsToVariationTargetMap { .. } => {
                "removeTargetsToVariationTargetMap"
            }
        }
    }
}

/// Request body for the patch endpoint.
///
/// Callers must not send an empty payload; emptiness is how the submit path
/// decides to skip the network call entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchPayload {
    pub instructions: Vec<Instruction>,
}

impl PatchPayload {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }
}

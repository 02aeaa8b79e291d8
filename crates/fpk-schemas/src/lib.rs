//! fpk-schemas
//!
//! Wire-level data model for feature-flag targeting patches:
//! - Targeting snapshots (flag state, default variations, targeting items)
//! - Patch instructions (`kind` + `parameters` wire shape)
//! - The patch payload envelope sent to the backend
//!
//! Pure serde types. No IO. No diffing logic — that lives in fpk-reconcile.

mod instruction;
mod snapshot;

pub use instruction::*;
pub use snapshot::*;

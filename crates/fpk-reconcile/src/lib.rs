//! fpk-reconcile
//!
//! Targeting rule patch reconciler:
//! - Differencer: compare an initial and a submitted targeting snapshot
//! - Instruction builder: turn the delta into an ordered instruction list
//! - Validation: pre-submit invariant checks that block building entirely
//! - Patch session: per-submit instruction accumulator
//!
//! Deterministic, pure logic. No IO. No network calls.

mod builder;
mod engine;
mod session;
mod types;
mod validate;

pub use builder::{build_instructions, build_instructions_with};
pub use engine::diff;
pub use session::PatchSession;
pub use types::*;
pub use validate::{validate_snapshot, ValidationIssue, ValidationReport};

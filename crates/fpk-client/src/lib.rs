//! fpk-client
//!
//! Async submission adapter for the feature-flag patch endpoint:
//! - [`FlagPatchClient`]: HTTP PATCH of an accumulated instruction payload
//! - [`PatchSubmitError`]: backend vs. governance vs. transport error kinds
//! - [`CancelToken`]: explicit cancellation for abandoned submissions
//! - [`PatchSubmission`]: validate → diff → build → accumulate → submit
//!
//! The engine stays pure; every network and config concern lives here.

mod cancel;
mod client;
mod config;
mod error;
mod submission;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use client::FlagPatchClient;
pub use config::ClientConfig;
pub use error::{GovernanceRejection, PatchSubmitError};
pub use submission::{PatchSubmission, SubmitReceipt};

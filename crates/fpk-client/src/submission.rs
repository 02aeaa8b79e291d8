use chrono::{DateTime, Utc};
use fpk_reconcile::{build_instructions, diff, validate_snapshot, PatchSession, ValidationReport};
use fpk_schemas::{Instruction, PatchPayload, TargetingSnapshot};
use tracing::info;

use crate::{CancelToken, FlagPatchClient, PatchSubmitError};

/// Proof of a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub instruction_count: usize,
    pub submitted_at: DateTime<Utc>,
}

/// One save action: validate → diff → build → accumulate → submit.
///
/// Owns its [`PatchSession`], so nothing leaks across edit sessions.
/// Queue-reset policy: the queue is cleared on **success only**. A failed
/// submission leaves the queue intact so the caller can retry with the
/// identical payload; call [`abandon`][PatchSubmission::abandon] to discard
/// instead.
#[derive(Debug)]
pub struct PatchSubmission {
    session: PatchSession,
}

impl PatchSubmission {
    /// Prepare a submission from the form's initial and submitted snapshots.
    ///
    /// - `Err(report)` — the submitted snapshot violates a targeting
    ///   invariant; submission is blocked entirely, nothing was built.
    /// - `Ok(None)` — no difference; callers skip the network call.
    /// - `Ok(Some(submission))` — instructions queued, ready to submit.
    pub fn prepare(
        initial: &TargetingSnapshot,
        submitted: &TargetingSnapshot,
    ) -> Result<Option<Self>, ValidationReport> {
        let report = validate_snapshot(submitted);
        if !report.is_clean() {
            return Err(report);
        }

        let instructions = build_instructions(&diff(initial, submitted));
        if instructions.is_empty() {
            return Ok(None);
        }

        let mut session = PatchSession::new();
        session.add_all_instructions(instructions);
        Ok(Some(Self { session }))
    }

    pub fn instruction_count(&self) -> usize {
        self.session.len()
    }

    pub fn instructions(&self) -> &[Instruction] {
        self.session.instructions()
    }

    /// Submit the queued instructions for `flag`.
    ///
    /// On success the queue is reset and a receipt is returned. On any error
    /// the queue is left untouched (retry keeps the identical payload).
    pub async fn submit(
        &mut self,
        client: &FlagPatchClient,
        flag: &str,
        cancel: &CancelToken,
    ) -> Result<SubmitReceipt, PatchSubmitError> {
        let payload: PatchPayload = self
            .session
            .on_patch_available(|p| p)
            .ok_or(PatchSubmitError::NothingQueued)?;

        client.submit_patch(flag, &payload, cancel).await?;

        self.session.reset();
        let receipt = SubmitReceipt {
            instruction_count: payload.len(),
            submitted_at: Utc::now(),
        };
        info!(
            flag,
            instructions = receipt.instruction_count,
            "patch session flushed"
        );
        Ok(receipt)
    }

    /// Discard the queued instructions without submitting.
    pub fn abandon(&mut self) {
        self.session.reset();
    }
}

use fpk_schemas::{Instruction, PatchPayload};

/// Per-submit instruction accumulator.
///
/// One session is created per save action and owned by the submitting caller;
/// there is no process-wide accumulator, so nothing can leak between edit
/// sessions. Single-writer: the diff → build → accumulate sequence runs
/// synchronously before any network await, so no interior locking is needed.
///
/// The queue survives a failed submission so the caller can retry with the
/// identical payload; call [`reset`][PatchSession::reset] to abandon it.
#[derive(Debug, Default)]
pub struct PatchSession {
    queue: Vec<Instruction>,
}

impl PatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_instruction(&mut self, instr: Instruction) {
        self.queue.push(instr);
    }

    pub fn add_all_instructions(&mut self, instrs: impl IntoIterator<Item = Instruction>) {
        self.queue.extend(instrs);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Accumulated instructions in insertion order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.queue
    }

    /// Invoke `f` with the accumulated payload, only if the queue is
    /// non-empty. A no-op returning `None` otherwise — callers rely on this
    /// to skip empty-payload network calls. The queue is not consumed.
    pub fn on_patch_available<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(PatchPayload) -> R,
    {
        if self.queue.is_empty() {
            return None;
        }
        Some(f(PatchPayload::new(self.queue.clone())))
    }

    /// Clear the queue. Must be called after a successful submit so the next
    /// edit session starts empty.
    pub fn reset(&mut self) {
        self.queue.clear();
    }
}

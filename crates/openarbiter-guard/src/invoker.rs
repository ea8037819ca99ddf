//! The cross-program invocation seam.
//!
//! The guard validates; the host platform performs the actual call. The
//! platform side implements [`ProgramInvoker`], and
//! `CpiGuard::validate_and_invoke` is the only path that reaches it —
//! settlement, refund, and payout callers never hold an invoker directly.

use openarbiter_types::{ProgramId, Result};

/// Performs a validated cross-program call.
pub trait ProgramInvoker {
    /// Invokes `target` with the opaque instruction payload.
    ///
    /// # Errors
    /// Implementation-defined. The guard propagates the error unchanged;
    /// by then the acceptance is already audited.
    fn invoke(&mut self, target: ProgramId, instruction: &[u8]) -> Result<()>;
}

/// In-memory invoker that records every call it performs.
/// **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    /// Every invocation performed, in order.
    pub calls: Vec<(ProgramId, Vec<u8>)>,
    /// When set, the next invocation fails and the flag clears.
    pub fail_next: bool,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingInvoker {
    /// Creates an invoker that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The target most recently invoked.
    #[must_use]
    pub fn last_target(&self) -> Option<ProgramId> {
        self.calls.last().map(|(target, _)| *target)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl ProgramInvoker for RecordingInvoker {
    fn invoke(&mut self, target: ProgramId, instruction: &[u8]) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(openarbiter_types::ArbiterError::Io(
                "downstream program unavailable".into(),
            ));
        }
        self.calls.push((target, instruction.to_vec()));
        Ok(())
    }
}

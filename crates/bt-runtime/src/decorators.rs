use crate::node::BtNode;
use crate::{BtStatus, TickContext};

/// Re-runs a failing child on subsequent ticks, up to `max_attempts` failures in total.
///
/// Intermediate failures are reported as `Running` so the parent keeps this branch active;
/// the child is re-initialised on the next tick because its last status was `Failure`.
/// The remaining-attempts counter is only restored by a child success or by exhaustion.
pub struct Retry {
    child: Box<BtNode>,
    max_attempts: u32,
    remaining: u32,
}

impl Retry {
    pub fn new(max_attempts: u32, child: BtNode) -> Self {
        let max_attempts = max_attempts.max(1);
        Self {
            child: Box::new(child),
            max_attempts,
            remaining: max_attempts,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn child(&self) -> &BtNode {
        &self.child
    }

    pub(crate) fn child_mut(&mut self) -> &mut BtNode {
        &mut self.child
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        match self.child.tick(ctx) {
            BtStatus::Running => BtStatus::Running,
            BtStatus::Success => {
                self.remaining = self.max_attempts;
                BtStatus::Success
            }
            BtStatus::Failure => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.remaining = self.max_attempts;
                    BtStatus::Failure
                } else {
                    tracing::debug!(
                        node = %self.child.name(),
                        remaining = self.remaining,
                        "child failed, retrying on next tick"
                    );
                    BtStatus::Running
                }
            }
            BtStatus::Invalid => unreachable!("child update never yields Invalid"),
        }
    }

    pub(crate) fn terminate(&mut self, ctx: &mut TickContext<'_>) {
        self.child.halt(ctx);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvertMode {
    /// `Success` becomes `Failure`; `Failure` stays `Failure`.
    SuccessIsFailure,
    /// `Failure` becomes `Success`; `Success` stays `Success`.
    FailureIsSuccess,
    /// Swap `Success` and `Failure`.
    Inverter,
}

/// Rewrites the resolved status of its child. `Running` always passes through.
pub struct Invert {
    child: Box<BtNode>,
    mode: InvertMode,
}

impl Invert {
    pub fn new(mode: InvertMode, child: BtNode) -> Self {
        Self {
            child: Box::new(child),
            mode,
        }
    }

    pub fn mode(&self) -> InvertMode {
        self.mode
    }

    pub fn child(&self) -> &BtNode {
        &self.child
    }

    pub(crate) fn child_mut(&mut self) -> &mut BtNode {
        &mut self.child
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        let status = self.child.tick(ctx);
        match (self.mode, status) {
            (_, BtStatus::Running) => BtStatus::Running,
            (_, BtStatus::Invalid) => unreachable!("child update never yields Invalid"),
            (InvertMode::SuccessIsFailure, _) => BtStatus::Failure,
            (InvertMode::FailureIsSuccess, _) => BtStatus::Success,
            (InvertMode::Inverter, BtStatus::Success) => BtStatus::Failure,
            (InvertMode::Inverter, BtStatus::Failure) => BtStatus::Success,
        }
    }

    pub(crate) fn terminate(&mut self, ctx: &mut TickContext<'_>) {
        self.child.halt(ctx);
    }
}

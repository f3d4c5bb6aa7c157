use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bt_core::Blackboard;
use bt_tools::{NullTraceSink, TraceEvent, TraceSink};

use crate::error::BtError;
use crate::node::BtNode;
use crate::{BtStatus, TickContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Number of root failures tolerated before the run is reported as failed (minimum 1).
    pub max_attempts: u32,

    /// Pause between ticks while the root is `Running`.
    pub tick_interval: Duration,

    /// Optional hard cap on the number of ticks. When reached, the tree is halted and the
    /// run reported as failed.
    pub max_ticks: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            tick_interval: Duration::from_millis(100),
            max_ticks: None,
        }
    }
}

impl RunnerConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

impl RunOutcome {
    pub fn is_success(self) -> bool {
        self == RunOutcome::Succeeded
    }
}

/// External interrupt for a run. Cheap to clone and safe to trip from another thread; the
/// runner only looks at it between ticks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives a tree to completion.
///
/// A failed root is re-ticked as-is: nodes and everything they act on keep their state
/// between attempts. The blackboard and trace sink live exactly as long as the runner.
pub struct BtRunner<'a> {
    root: &'a mut BtNode,
    config: RunnerConfig,
    blackboard: Blackboard,
    sink: Box<dyn TraceSink + 'a>,
    cancel: CancelToken,
    tick: u64,
    attempts_left: u32,
    set_up: bool,
}

impl<'a> BtRunner<'a> {
    pub fn new(root: &'a mut BtNode, config: RunnerConfig) -> Self {
        let attempts_left = config.max_attempts.max(1);
        Self {
            root,
            config,
            blackboard: Blackboard::new(),
            sink: Box::new(NullTraceSink),
            cancel: CancelToken::new(),
            tick: 0,
            attempts_left,
            set_up: false,
        }
    }

    pub fn with_sink(mut self, sink: impl TraceSink + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Start the run with pre-populated blackboard entries.
    pub fn with_blackboard(mut self, blackboard: Blackboard) -> Self {
        self.blackboard = blackboard;
        self
    }

    pub fn root(&self) -> &BtNode {
        &*self.root
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Number of ticks performed so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    pub fn setup(&mut self) -> Result<(), BtError> {
        if !self.set_up {
            self.root.setup()?;
            self.set_up = true;
        }
        Ok(())
    }

    /// Tick the root exactly once, without applying the attempt policy.
    pub fn tick_once(&mut self) -> BtStatus {
        let mut ctx = TickContext::new(self.tick, &mut self.blackboard, &mut *self.sink);
        let status = self.root.tick(&mut ctx);
        self.tick += 1;
        status
    }

    /// Interrupt the tree: every running node is terminated and left `Invalid`.
    pub fn halt(&mut self) {
        let mut ctx = TickContext::new(self.tick, &mut self.blackboard, &mut *self.sink);
        self.root.halt(&mut ctx);
    }

    pub fn run(&mut self) -> Result<RunOutcome, BtError> {
        self.setup()?;

        loop {
            if self.cancel.is_cancelled() {
                tracing::warn!(tick = self.tick, "run cancelled, halting tree");
                self.halt();
                self.emit("bt.runner.cancelled");
                return Ok(RunOutcome::Cancelled);
            }

            if let Some(max_ticks) = self.config.max_ticks {
                if self.tick >= max_ticks {
                    tracing::warn!(max_ticks, "tick budget exhausted, halting tree");
                    self.halt();
                    self.emit("bt.runner.tick_budget_exhausted");
                    return Ok(RunOutcome::Failed);
                }
            }

            match self.tick_once() {
                BtStatus::Success => {
                    tracing::info!(ticks = self.tick, "tree succeeded");
                    self.emit("bt.runner.succeeded");
                    return Ok(RunOutcome::Succeeded);
                }
                BtStatus::Failure => {
                    self.attempts_left = self.attempts_left.saturating_sub(1);
                    self.emit("bt.runner.attempt_failed");
                    if self.attempts_left == 0 {
                        tracing::info!(ticks = self.tick, "tree failed, no attempts left");
                        self.emit("bt.runner.failed");
                        return Ok(RunOutcome::Failed);
                    }
                    tracing::info!(
                        attempts_left = self.attempts_left,
                        "tree failed, ticking again without reset"
                    );
                }
                BtStatus::Running => {
                    if !self.config.tick_interval.is_zero() {
                        std::thread::sleep(self.config.tick_interval);
                    }
                }
                BtStatus::Invalid => unreachable!("root update never yields Invalid"),
            }
        }
    }

    fn emit(&mut self, tag: &'static str) {
        let tick = self.tick.saturating_sub(1);
        self.sink.emit(TraceEvent::new(tick, tag).with_node(self.root.name().to_string()));
    }
}

use crate::node::{halt_running, BtNode};
use crate::{BtStatus, TickContext};

/// Ticks children in order until one fails or is still running.
///
/// Without memory every tick starts again at the first child; with memory a running child
/// is resumed directly and the children before it are not re-evaluated.
pub struct Sequence {
    children: Vec<BtNode>,
    memory: bool,
    current: usize,
}

impl Sequence {
    pub fn new(children: Vec<BtNode>) -> Self {
        Self {
            children,
            memory: false,
            current: 0,
        }
    }

    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    pub fn has_memory(&self) -> bool {
        self.memory
    }

    /// Index of the child the next tick starts from.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn children(&self) -> &[BtNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [BtNode] {
        &mut self.children
    }

    pub(crate) fn initialise(&mut self) {
        self.current = 0;
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        let start = if self.memory { self.current } else { 0 };

        for index in start..self.children.len() {
            match self.children[index].tick(ctx) {
                BtStatus::Success => continue,
                BtStatus::Running => {
                    // An earlier child took over from one that was running further right.
                    halt_running(&mut self.children[index + 1..], ctx);
                    self.current = index;
                    return BtStatus::Running;
                }
                BtStatus::Failure => return BtStatus::Failure,
                BtStatus::Invalid => unreachable!("child update never yields Invalid"),
            }
        }

        BtStatus::Success
    }

    pub(crate) fn terminate(&mut self, ctx: &mut TickContext<'_>) {
        halt_running(&mut self.children, ctx);
        self.current = 0;
    }
}

/// Fallback: ticks children in order until one succeeds or is still running.
pub struct Selector {
    children: Vec<BtNode>,
    memory: bool,
    current: usize,
}

impl Selector {
    pub fn new(children: Vec<BtNode>) -> Self {
        Self {
            children,
            memory: false,
            current: 0,
        }
    }

    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    pub fn has_memory(&self) -> bool {
        self.memory
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn children(&self) -> &[BtNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [BtNode] {
        &mut self.children
    }

    pub(crate) fn initialise(&mut self) {
        self.current = 0;
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        let start = if self.memory { self.current } else { 0 };

        for index in start..self.children.len() {
            match self.children[index].tick(ctx) {
                BtStatus::Failure => continue,
                BtStatus::Running => {
                    // Higher priority child pre-empts a lower priority running one.
                    halt_running(&mut self.children[index + 1..], ctx);
                    self.current = index;
                    return BtStatus::Running;
                }
                BtStatus::Success => return BtStatus::Success,
                BtStatus::Invalid => unreachable!("child update never yields Invalid"),
            }
        }

        BtStatus::Failure
    }

    pub(crate) fn terminate(&mut self, ctx: &mut TickContext<'_>) {
        halt_running(&mut self.children, ctx);
        self.current = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// Succeed once every child has succeeded.
    ///
    /// With `synchronise`, a child that already succeeded in the current activation is not
    /// ticked again until its siblings have caught up.
    SuccessOnAll { synchronise: bool },
    /// Succeed as soon as one child succeeds; the still-running siblings are halted.
    SuccessOnOne,
}

impl ParallelPolicy {
    fn synchronise(self) -> bool {
        matches!(self, ParallelPolicy::SuccessOnAll { synchronise: true })
    }
}

/// Ticks every child once per tick, in order, and aggregates their statuses.
///
/// Any child failure fails the parallel and halts the siblings that are still running.
pub struct Parallel {
    children: Vec<BtNode>,
    policy: ParallelPolicy,
    succeeded: Vec<bool>,
}

impl Parallel {
    pub fn new(policy: ParallelPolicy, children: Vec<BtNode>) -> Self {
        let succeeded = vec![false; children.len()];
        Self {
            children,
            policy,
            succeeded,
        }
    }

    pub fn policy(&self) -> ParallelPolicy {
        self.policy
    }

    pub fn children(&self) -> &[BtNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [BtNode] {
        &mut self.children
    }

    pub(crate) fn initialise(&mut self) {
        self.succeeded.iter_mut().for_each(|s| *s = false);
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        let synchronise = self.policy.synchronise();
        let mut any_failure = false;
        let mut any_running = false;

        for (child, succeeded) in self.children.iter_mut().zip(self.succeeded.iter_mut()) {
            if synchronise && *succeeded {
                continue;
            }
            match child.tick(ctx) {
                BtStatus::Success => *succeeded = true,
                BtStatus::Failure => {
                    *succeeded = false;
                    any_failure = true;
                }
                BtStatus::Running => {
                    *succeeded = false;
                    any_running = true;
                }
                BtStatus::Invalid => unreachable!("child update never yields Invalid"),
            }
        }

        if any_failure {
            return BtStatus::Failure;
        }

        match self.policy {
            ParallelPolicy::SuccessOnAll { .. } if !any_running => BtStatus::Success,
            ParallelPolicy::SuccessOnOne
                if self.children.is_empty() || self.succeeded.iter().any(|s| *s) =>
            {
                BtStatus::Success
            }
            _ => BtStatus::Running,
        }
    }

    pub(crate) fn terminate(&mut self, ctx: &mut TickContext<'_>) {
        halt_running(&mut self.children, ctx);
        self.succeeded.iter_mut().for_each(|s| *s = false);
    }
}

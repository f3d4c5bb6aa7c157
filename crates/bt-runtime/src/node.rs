use std::borrow::Cow;
use std::fmt;

use bt_core::Blackboard;
use bt_tools::TraceEvent;

use crate::composites::{Parallel, ParallelPolicy, Selector, Sequence};
use crate::decorators::{Invert, InvertMode, Retry};
use crate::error::{BtError, SetupError};
use crate::leaves::Condition;
use crate::{BtStatus, TickContext};

/// Leaf capability: the hooks a task or condition provides to the runtime.
///
/// Only `update` is mandatory. `initialise` runs whenever the leaf becomes active again
/// (first tick, or a tick after it resolved), and `terminate` runs when it resolves or is
/// interrupted (with [`BtStatus::Invalid`]).
pub trait Behaviour: 'static {
    fn setup(&mut self) -> Result<(), SetupError> {
        Ok(())
    }

    fn initialise(&mut self, _ctx: &mut TickContext<'_>) {}

    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus;

    fn terminate(&mut self, _new_status: BtStatus) {}
}

pub enum NodeKind {
    Sequence(Sequence),
    Selector(Selector),
    Parallel(Parallel),
    Retry(Retry),
    Invert(Invert),
    Leaf(Box<dyn Behaviour>),
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Sequence(s) if s.has_memory() => "Sequence(memory)",
            NodeKind::Sequence(_) => "Sequence",
            NodeKind::Selector(s) if s.has_memory() => "Selector(memory)",
            NodeKind::Selector(_) => "Selector",
            NodeKind::Parallel(_) => "Parallel",
            NodeKind::Retry(_) => "Retry",
            NodeKind::Invert(_) => "Invert",
            NodeKind::Leaf(_) => "Leaf",
        }
    }

    fn initialise(&mut self, ctx: &mut TickContext<'_>) {
        match self {
            NodeKind::Sequence(s) => s.initialise(),
            NodeKind::Selector(s) => s.initialise(),
            NodeKind::Parallel(p) => p.initialise(),
            NodeKind::Retry(_) | NodeKind::Invert(_) => {}
            NodeKind::Leaf(b) => b.initialise(ctx),
        }
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        match self {
            NodeKind::Sequence(s) => s.update(ctx),
            NodeKind::Selector(s) => s.update(ctx),
            NodeKind::Parallel(p) => p.update(ctx),
            NodeKind::Retry(r) => r.update(ctx),
            NodeKind::Invert(i) => i.update(ctx),
            NodeKind::Leaf(b) => b.update(ctx),
        }
    }

    fn terminate(&mut self, new_status: BtStatus, ctx: &mut TickContext<'_>) {
        match self {
            NodeKind::Sequence(s) => s.terminate(ctx),
            NodeKind::Selector(s) => s.terminate(ctx),
            NodeKind::Parallel(p) => p.terminate(ctx),
            NodeKind::Retry(r) => r.terminate(ctx),
            NodeKind::Invert(i) => i.terminate(ctx),
            NodeKind::Leaf(b) => b.terminate(new_status),
        }
    }

    fn children(&self) -> &[BtNode] {
        match self {
            NodeKind::Sequence(s) => s.children(),
            NodeKind::Selector(s) => s.children(),
            NodeKind::Parallel(p) => p.children(),
            NodeKind::Retry(r) => std::slice::from_ref(r.child()),
            NodeKind::Invert(i) => std::slice::from_ref(i.child()),
            NodeKind::Leaf(_) => &[],
        }
    }

    fn children_mut(&mut self) -> &mut [BtNode] {
        match self {
            NodeKind::Sequence(s) => s.children_mut(),
            NodeKind::Selector(s) => s.children_mut(),
            NodeKind::Parallel(p) => p.children_mut(),
            NodeKind::Retry(r) => std::slice::from_mut(r.child_mut()),
            NodeKind::Invert(i) => std::slice::from_mut(i.child_mut()),
            NodeKind::Leaf(_) => &mut [],
        }
    }
}

/// A named node of the tree together with its last status.
///
/// Trees are built once and then only ticked; nothing in the runtime rebuilds nodes between
/// ticks or between runner attempts, so cursors and counters persist.
pub struct BtNode {
    name: Cow<'static, str>,
    status: BtStatus,
    kind: NodeKind,
}

impl fmt::Debug for BtNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BtNode")
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("status", &self.status)
            .field("children", &self.kind.children())
            .finish()
    }
}

impl BtNode {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            status: BtStatus::Invalid,
            kind,
        }
    }

    pub fn leaf(name: impl Into<Cow<'static, str>>, behaviour: impl Behaviour) -> Self {
        Self::new(name, NodeKind::Leaf(Box::new(behaviour)))
    }

    pub fn condition<F>(name: impl Into<Cow<'static, str>>, cond: F) -> Self
    where
        F: FnMut(&Blackboard) -> bool + 'static,
    {
        Self::leaf(name, Condition::new(cond))
    }

    /// Sequence that restarts from its first child every tick.
    pub fn sequence(name: impl Into<Cow<'static, str>>, children: Vec<BtNode>) -> Self {
        Self::new(name, NodeKind::Sequence(Sequence::new(children)))
    }

    /// Sequence that resumes at the child that was running on the previous tick.
    pub fn mem_sequence(name: impl Into<Cow<'static, str>>, children: Vec<BtNode>) -> Self {
        Self::new(
            name,
            NodeKind::Sequence(Sequence::new(children).with_memory(true)),
        )
    }

    pub fn selector(name: impl Into<Cow<'static, str>>, children: Vec<BtNode>) -> Self {
        Self::new(name, NodeKind::Selector(Selector::new(children)))
    }

    pub fn mem_selector(name: impl Into<Cow<'static, str>>, children: Vec<BtNode>) -> Self {
        Self::new(
            name,
            NodeKind::Selector(Selector::new(children).with_memory(true)),
        )
    }

    pub fn parallel(
        name: impl Into<Cow<'static, str>>,
        policy: ParallelPolicy,
        children: Vec<BtNode>,
    ) -> Self {
        Self::new(name, NodeKind::Parallel(Parallel::new(policy, children)))
    }

    pub fn retry(name: impl Into<Cow<'static, str>>, max_attempts: u32, child: BtNode) -> Self {
        Self::new(name, NodeKind::Retry(Retry::new(max_attempts, child)))
    }

    pub fn invert(name: impl Into<Cow<'static, str>>, mode: InvertMode, child: BtNode) -> Self {
        Self::new(name, NodeKind::Invert(Invert::new(mode, child)))
    }

    pub fn success_is_failure(name: impl Into<Cow<'static, str>>, child: BtNode) -> Self {
        Self::invert(name, InvertMode::SuccessIsFailure, child)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> BtStatus {
        self.status
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[BtNode] {
        self.kind.children()
    }

    /// Depth-first, pre-order search by name.
    pub fn find(&self, name: &str) -> Option<&BtNode> {
        if self.name == name {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(name))
    }

    /// Visit every node depth-first, pre-order, with its depth below `self`.
    pub fn visit(&self, f: &mut impl FnMut(&BtNode, usize)) {
        self.visit_at(0, f);
    }

    fn visit_at(&self, depth: usize, f: &mut impl FnMut(&BtNode, usize)) {
        f(self, depth);
        for child in self.children() {
            child.visit_at(depth + 1, f);
        }
    }

    /// Run every leaf's one-off setup hook, children before parents.
    pub fn setup(&mut self) -> Result<(), BtError> {
        for child in self.kind.children_mut() {
            child.setup()?;
        }
        if let NodeKind::Leaf(behaviour) = &mut self.kind {
            behaviour.setup().map_err(|source| BtError::Setup {
                node: self.name.to_string(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        if self.status != BtStatus::Running {
            self.kind.initialise(ctx);
        }

        let status = self.kind.update(ctx);
        assert_ne!(
            status,
            BtStatus::Invalid,
            "node `{}` returned Invalid from update()",
            self.name
        );

        if status != BtStatus::Running {
            self.kind.terminate(status, ctx);
        }
        self.status = status;

        tracing::trace!(node = %self.name, %status, tick = ctx.tick, "ticked");
        ctx.emit(
            TraceEvent::new(ctx.tick, "bt.node.update")
                .with_node(self.name.clone())
                .with_status(status.as_str()),
        );
        status
    }

    /// Interrupt a running node: terminate it, then its running descendants, leaving every
    /// one of them `Invalid`. Nodes that are not running are left as they are.
    pub fn halt(&mut self, ctx: &mut TickContext<'_>) {
        if self.status != BtStatus::Running {
            return;
        }

        ctx.emit(TraceEvent::new(ctx.tick, "bt.node.halt").with_node(self.name.clone()));
        tracing::trace!(node = %self.name, tick = ctx.tick, "halted");
        self.kind.terminate(BtStatus::Invalid, ctx);
        self.status = BtStatus::Invalid;
    }
}

/// Halt every running node in `nodes`.
pub(crate) fn halt_running(nodes: &mut [BtNode], ctx: &mut TickContext<'_>) {
    for node in nodes.iter_mut() {
        node.halt(ctx);
    }
}

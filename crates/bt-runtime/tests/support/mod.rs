#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use bt_core::Blackboard;
use bt_runtime::{Behaviour, BtNode, BtStatus, SetupError, TickContext};
use bt_tools::NullTraceSink;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Leaf that replays a fixed list of statuses and records every hook call.
pub struct Scripted {
    name: &'static str,
    script: VecDeque<BtStatus>,
    fallback: BtStatus,
    fail_setup: bool,
    log: Log,
}

impl Behaviour for Scripted {
    fn setup(&mut self) -> Result<(), SetupError> {
        self.log.borrow_mut().push(format!("{}:setup", self.name));
        if self.fail_setup {
            return Err(SetupError("device offline".to_string()));
        }
        Ok(())
    }

    fn initialise(&mut self, _ctx: &mut TickContext<'_>) {
        self.log.borrow_mut().push(format!("{}:init", self.name));
    }

    fn update(&mut self, _ctx: &mut TickContext<'_>) -> BtStatus {
        self.log.borrow_mut().push(format!("{}:update", self.name));
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn terminate(&mut self, new_status: BtStatus) {
        self.log
            .borrow_mut()
            .push(format!("{}:terminate:{}", self.name, new_status));
    }
}

/// Leaf returning `statuses` in order, then repeating the last one forever.
pub fn scripted(name: &'static str, statuses: &[BtStatus], log: &Log) -> BtNode {
    let fallback = statuses.last().copied().unwrap_or(BtStatus::Success);
    BtNode::leaf(
        name,
        Scripted {
            name,
            script: statuses.iter().copied().collect(),
            fallback,
            fail_setup: false,
            log: log.clone(),
        },
    )
}

pub fn always(name: &'static str, status: BtStatus, log: &Log) -> BtNode {
    scripted(name, &[status], log)
}

pub fn failing_setup(name: &'static str, log: &Log) -> BtNode {
    BtNode::leaf(
        name,
        Scripted {
            name,
            script: VecDeque::new(),
            fallback: BtStatus::Success,
            fail_setup: true,
            log: log.clone(),
        },
    )
}

pub fn tick(node: &mut BtNode, tick: u64, blackboard: &mut Blackboard) -> BtStatus {
    let mut sink = NullTraceSink;
    let mut ctx = TickContext::new(tick, blackboard, &mut sink);
    node.tick(&mut ctx)
}

pub fn halt(node: &mut BtNode, blackboard: &mut Blackboard) {
    let mut sink = NullTraceSink;
    let mut ctx = TickContext::new(0, blackboard, &mut sink);
    node.halt(&mut ctx);
}

/// Names of the leaves whose `update` ran, in order.
pub fn updated(log: &Log) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|e| e.strip_suffix(":update").map(str::to_string))
        .collect()
}

pub fn clear(log: &Log) {
    log.borrow_mut().clear();
}

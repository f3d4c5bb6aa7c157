use bt_core::Blackboard;

use crate::node::Behaviour;
use crate::{BtStatus, TickContext};

/// Leaf that resolves within the tick from a predicate over the blackboard.
pub struct Condition<F> {
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(cond: F) -> Self {
        Self { cond }
    }
}

impl<F> Behaviour for Condition<F>
where
    F: FnMut(&Blackboard) -> bool + 'static,
{
    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        if (self.cond)(&*ctx.blackboard) {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }
}

use bt_core::Blackboard;
use bt_tools::{TraceEvent, TraceSink};

/// Everything a node may touch during one tick.
///
/// Built by the runner for each tick; the blackboard and sink outlive it and belong to the
/// run.
pub struct TickContext<'a> {
    pub tick: u64,
    pub blackboard: &'a mut Blackboard,
    sink: &'a mut dyn TraceSink,
}

impl<'a> TickContext<'a> {
    pub fn new(tick: u64, blackboard: &'a mut Blackboard, sink: &'a mut dyn TraceSink) -> Self {
        Self {
            tick,
            blackboard,
            sink,
        }
    }

    pub fn emit(&mut self, event: TraceEvent) {
        self.sink.emit(event);
    }
}

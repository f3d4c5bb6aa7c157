mod support;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use bt_core::{BbKey, Blackboard};
use bt_runtime::{
    Behaviour, BtError, BtNode, BtRunner, BtStatus, CancelToken, RunOutcome, RunnerConfig,
    TickContext,
};
use bt_tools::VecTraceSink;
use support::{always, failing_setup, new_log, scripted};

use BtStatus::{Failure, Invalid, Running, Success};

fn fast(max_attempts: u32) -> RunnerConfig {
    RunnerConfig::default()
        .with_max_attempts(max_attempts)
        .with_tick_interval(Duration::ZERO)
}

#[test]
fn success_ends_the_run() {
    let log = new_log();
    let mut root = always("task", Success, &log);

    let mut runner = BtRunner::new(&mut root, fast(3));
    assert_eq!(runner.run().unwrap(), RunOutcome::Succeeded);
    assert_eq!(runner.ticks(), 1);
}

#[test]
fn running_is_re_ticked_until_resolved() {
    let log = new_log();
    let mut root = scripted("task", &[Running, Running, Success], &log);

    let mut runner = BtRunner::new(&mut root, fast(1));
    assert_eq!(runner.run().unwrap(), RunOutcome::Succeeded);
    assert_eq!(runner.ticks(), 3);
    assert_eq!(runner.attempts_left(), 1);
}

#[test]
fn failures_consume_attempts_until_exhausted() {
    let log = new_log();
    let mut root = always("task", Failure, &log);

    let mut sink = VecTraceSink::default();
    let outcome = BtRunner::new(&mut root, fast(4))
        .with_sink(&mut sink)
        .run()
        .unwrap();

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(sink.tagged("bt.runner.attempt_failed").count(), 4);
    assert_eq!(sink.tagged("bt.runner.failed").count(), 1);
}

#[test]
fn zero_attempts_still_ticks_once() {
    let log = new_log();
    let mut root = always("task", Failure, &log);

    let mut runner = BtRunner::new(&mut root, fast(0));
    assert_eq!(runner.run().unwrap(), RunOutcome::Failed);
    assert_eq!(runner.ticks(), 1);
}

/// Counts its own ticks across the whole run; fails until the configured tick.
struct FlakyUntil {
    ticks: Rc<Cell<u32>>,
    succeed_on: u32,
}

impl Behaviour for FlakyUntil {
    fn update(&mut self, _ctx: &mut TickContext<'_>) -> BtStatus {
        self.ticks.set(self.ticks.get() + 1);
        if self.ticks.get() >= self.succeed_on {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }
}

#[test]
fn attempts_reuse_node_state_instead_of_rebuilding() {
    let ticks = Rc::new(Cell::new(0));
    let mut root = BtNode::leaf(
        "flaky",
        FlakyUntil {
            ticks: ticks.clone(),
            succeed_on: 3,
        },
    );

    let outcome = BtRunner::new(&mut root, fast(3)).run().unwrap();
    assert_eq!(outcome, RunOutcome::Succeeded);
    assert_eq!(ticks.get(), 3);
}

#[test]
fn retry_counters_persist_across_attempts() {
    let log = new_log();
    // The inner retry budget (2) is exhausted on tick 1, failing the root; the second
    // attempt starts with a restored budget and the child succeeds on its third update.
    let mut root = BtNode::retry(
        "retry",
        2,
        scripted("grasp", &[Failure, Failure, Success], &log),
    );

    let mut runner = BtRunner::new(&mut root, fast(2));
    assert_eq!(runner.run().unwrap(), RunOutcome::Succeeded);
    assert_eq!(runner.ticks(), 3);
    assert_eq!(runner.attempts_left(), 1);
}

#[test]
fn cancellation_halts_the_active_chain() {
    let log = new_log();
    let mut root = BtNode::mem_sequence(
        "root",
        vec![
            always("done", Success, &log),
            BtNode::retry("retry", 5, always("busy", Running, &log)),
        ],
    );

    let cancel = CancelToken::new();
    {
        let mut runner = BtRunner::new(&mut root, fast(1)).with_cancel_token(cancel.clone());
        assert_eq!(runner.tick_once(), Running);
        cancel.cancel();
        assert_eq!(runner.run().unwrap(), RunOutcome::Cancelled);
        assert_eq!(runner.ticks(), 1);
    }

    assert_eq!(root.status(), Invalid);
    assert_eq!(root.find("retry").map(BtNode::status), Some(Invalid));
    assert_eq!(root.find("busy").map(BtNode::status), Some(Invalid));
    assert_eq!(root.find("done").map(BtNode::status), Some(Success));
    assert_eq!(log.borrow().last().map(String::as_str), Some("busy:terminate:INVALID"));
}

#[test]
fn cancellation_before_the_first_tick_never_ticks() {
    let log = new_log();
    let mut root = always("task", Success, &log);
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut runner = BtRunner::new(&mut root, fast(1)).with_cancel_token(cancel);
    assert_eq!(runner.run().unwrap(), RunOutcome::Cancelled);
    assert_eq!(runner.ticks(), 0);
}

#[test]
fn tick_budget_stops_a_tree_that_never_resolves() {
    let log = new_log();
    let mut root = always("forever", Running, &log);

    let mut sink = VecTraceSink::default();
    let outcome = BtRunner::new(&mut root, fast(1).with_max_ticks(5))
        .with_sink(&mut sink)
        .run()
        .unwrap();

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(sink.tagged("bt.runner.tick_budget_exhausted").count(), 1);
    assert_eq!(sink.tagged("bt.node.halt").count(), 1);
    assert_eq!(root.status(), Invalid);
}

#[test]
fn setup_errors_abort_before_ticking() {
    let log = new_log();
    let mut root = BtNode::sequence("root", vec![failing_setup("arm", &log)]);

    let mut runner = BtRunner::new(&mut root, fast(1));
    assert!(matches!(runner.run(), Err(BtError::Setup { .. })));
    assert_eq!(runner.ticks(), 0);
}

#[test]
fn seeded_blackboard_is_visible_to_the_tree() {
    const GO: BbKey<bool> = BbKey::new(1, "go");

    let mut root = BtNode::condition("go?", |bb: &Blackboard| bb.get(GO).copied().unwrap_or(false));
    let mut bb = Blackboard::new();
    bb.set(GO, true);

    let mut runner = BtRunner::new(&mut root, fast(1)).with_blackboard(bb);
    assert!(runner.run().unwrap().is_success());
    assert_eq!(runner.blackboard().get(GO).copied(), Some(true));
}

#[test]
fn node_updates_are_traced_per_tick() {
    let log = new_log();
    let mut root = BtNode::sequence(
        "root",
        vec![always("a", Success, &log), always("b", Success, &log)],
    );

    let mut sink = VecTraceSink::default();
    BtRunner::new(&mut root, fast(1))
        .with_sink(&mut sink)
        .run()
        .unwrap();

    let updates: Vec<(Option<&str>, Option<&str>)> = sink
        .tagged("bt.node.update")
        .map(|e| (e.node.as_deref(), e.status.as_deref()))
        .collect();
    assert_eq!(
        updates,
        vec![
            (Some("a"), Some("SUCCESS")),
            (Some("b"), Some("SUCCESS")),
            (Some("root"), Some("SUCCESS")),
        ]
    );
}

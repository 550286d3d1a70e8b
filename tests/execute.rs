// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{cell::RefCell, time::Duration};

use cukegen::{
    execute, parse_specification, Context, Generator, Harness, Program,
    Registry, StepError,
};
use futures::future::{self, LocalBoxFuture};

thread_local! {
    /// Trace of every handler call: the world's contents after the call.
    static TRACE: RefCell<Vec<Vec<String>>> = RefCell::new(Vec::new());
}

/// World accumulating the bodies of the steps it has seen.
type World = Vec<String>;

struct MockHarness {
    entered: Vec<String>,
    timeout: Duration,
}

impl MockHarness {
    fn new(timeout: Duration) -> Self {
        Self { entered: Vec::new(), timeout }
    }
}

impl Harness for MockHarness {
    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn delay(&mut self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn describe(&mut self, name: &str) {
        self.entered.push(format!("describe:{name}"));
    }

    fn test(&mut self, name: &str) {
        self.entered.push(format!("test:{name}"));
    }
}

fn record(world: &mut World, ctx: Context) -> LocalBoxFuture<'_, ()> {
    Box::pin(async move {
        world.push(ctx.step.tokens[1..].join(" "));
        TRACE.with(|t| t.borrow_mut().push(world.clone()));
    })
}

fn hang(_: &mut World, _: Context) -> LocalBoxFuture<'_, ()> {
    Box::pin(future::pending())
}

fn compile(src: &str) -> Program {
    let spec = parse_specification("exec.feature", src).unwrap();
    Generator::default().generate(&spec).unwrap()
}

#[tokio::test]
async fn scenarios_run_in_order_with_scenario_scoped_worlds() {
    let program = compile(
        "Feature: F
  Scenario: S
    Given a
    When b
    Then c
  Scenario: T
    Given x
",
    );

    let mut registry = Registry::<World>::default();
    registry.define("Given a", record).unwrap();
    registry.define("When b", record).unwrap();
    registry.define("Then c", record).unwrap();
    registry.define("Given x", record).unwrap();

    let mut harness = MockHarness::new(Duration::from_secs(1));
    TRACE.with(|t| t.borrow_mut().clear());

    let failures =
        execute(&program, &registry, &mut harness, &Vec::new()).await;
    assert!(failures.is_empty(), "{failures:?}");

    assert_eq!(
        harness.entered,
        ["describe:F", "test:S", "test:T"],
    );

    // The world accumulates within a scenario and starts fresh in the
    // next: steps of one scenario see the same object, no leaks across.
    let trace = TRACE.with(|t| t.borrow().clone());
    assert_eq!(
        trace,
        [
            vec!["a".to_owned()],
            vec!["a".to_owned(), "b".to_owned()],
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            vec!["x".to_owned()],
        ],
    );
}

#[tokio::test]
async fn seed_values_reach_every_scenario() {
    let program = compile(
        "Feature: F
  Scenario: S
    Given a
  Scenario: T
    Given a
",
    );

    let mut registry = Registry::<World>::default();
    registry.define("Given a", record).unwrap();

    let mut harness = MockHarness::new(Duration::from_secs(1));
    TRACE.with(|t| t.borrow_mut().clear());

    let seed = vec!["seeded".to_owned()];
    let failures = execute(&program, &registry, &mut harness, &seed).await;
    assert!(failures.is_empty());

    let trace = TRACE.with(|t| t.borrow().clone());
    assert_eq!(
        trace,
        [
            vec!["seeded".to_owned(), "a".to_owned()],
            vec!["seeded".to_owned(), "a".to_owned()],
        ],
    );
}

#[tokio::test]
async fn lookup_failure_fails_the_scenario_but_not_the_run() {
    let program = compile(
        "Feature: F
  Scenario: Broken
    Given a missing step
  Scenario: Fine
    Given a
",
    );

    let mut registry = Registry::<World>::default();
    registry.define("Given a", record).unwrap();

    let mut harness = MockHarness::new(Duration::from_secs(1));
    TRACE.with(|t| t.borrow_mut().clear());

    let failures =
        execute(&program, &registry, &mut harness, &Vec::new()).await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].scenario, "Broken");
    assert!(matches!(failures[0].error, StepError::Lookup(_)));
    assert!(failures[0]
        .error
        .to_string()
        .contains("Given a missing step"));

    // The healthy scenario still ran.
    let trace = TRACE.with(|t| t.borrow().clone());
    assert_eq!(trace, [vec!["a".to_owned()]]);
}

#[tokio::test(start_paused = true)]
async fn unsettled_handler_times_out_at_the_deadline() {
    let program = compile(
        "Feature: F
  Scenario: S
    Given a
    When b
    Then c
",
    );

    let mut registry = Registry::<World>::default();
    registry.define("Given a", record).unwrap();
    registry.define("When b", hang).unwrap();
    registry.define("Then c", record).unwrap();

    let timeout = Duration::from_millis(10);
    let mut harness = MockHarness::new(timeout);
    TRACE.with(|t| t.borrow_mut().clear());

    let started = tokio::time::Instant::now();
    let failures =
        execute(&program, &registry, &mut harness, &Vec::new()).await;
    let elapsed = started.elapsed();

    assert_eq!(failures.len(), 1);
    let StepError::Timeout(ref e) = failures[0].error else {
        panic!("expected a timeout, got {:?}", failures[0].error);
    };
    assert_eq!(e.step, "When b");
    assert_eq!(e.allotted, timeout * 3);

    // The race resolves at `timeout × stepCount` of reaching the step,
    // not later.
    assert!(elapsed >= timeout * 3);
    assert!(elapsed < timeout * 3 + Duration::from_millis(5));

    // The step after the timed-out one never ran.
    let trace = TRACE.with(|t| t.borrow().clone());
    assert_eq!(trace, [vec!["a".to_owned()]]);
}

#[tokio::test]
async fn settled_handler_beats_a_simultaneous_deadline() {
    let program = compile(
        "Feature: F
  Scenario: S
    Given a
",
    );

    let mut registry = Registry::<World>::default();
    registry.define("Given a", record).unwrap();

    // Zero timeout: the deadline is due immediately, but the handler is
    // polled first and settles on the first poll.
    let mut harness = MockHarness::new(Duration::ZERO);
    TRACE.with(|t| t.borrow_mut().clear());

    let failures =
        execute(&program, &registry, &mut harness, &Vec::new()).await;
    assert!(failures.is_empty(), "{failures:?}");
}

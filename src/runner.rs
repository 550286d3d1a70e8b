// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Native executor walking a compiled [`Program`] against a [`Registry`].
//!
//! The emitted JavaScript program and [`execute()`] walk the same blocks
//! with the same semantics: steps run strictly in document order, each step
//! races its handler against the scenario's allotted deadline, and the
//! world lives exactly as long as its scenario.

use std::time::Duration;

use derive_more::{Display, Error, From};
use futures::future::{Either, LocalBoxFuture};

use crate::{
    codegen::Program,
    future::select_with_biased_first,
    step::{Context, FindError, Match, Registry},
};

/// Surface the hosting runner exposes to an executed [`Program`].
pub trait Harness {
    /// Configured per-test timeout. A scenario's steps are each allotted
    /// this duration multiplied by the scenario's step count.
    fn timeout(&self) -> Duration;

    /// Deferred-callback primitive: a future settling after `duration`.
    fn delay(&mut self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Called when a feature block is entered.
    fn describe(&mut self, name: &str);

    /// Called when a scenario block is entered.
    fn test(&mut self, name: &str);
}

/// Error of a step handler not settling within its allotted deadline.
///
/// Losing the race only stops awaiting the handler; in the native executor
/// dropping the future cancels it as well.
#[derive(Clone, Debug, Display, Error)]
#[display(
    fmt = "Step timed out after {}: {}",
    "humantime::format_duration(*allotted)",
    step
)]
pub struct StepTimeoutError {
    /// Text of the timed-out step.
    pub step: String,

    /// Deadline the handler missed.
    pub allotted: Duration,
}

/// Error failing one step, and with it the step's scenario.
#[derive(Clone, Debug, Display, Error, From)]
pub enum StepError {
    /// Step resolved to zero or multiple handlers.
    Lookup(FindError),

    /// Handler didn't settle within the allotted deadline.
    Timeout(StepTimeoutError),
}

/// Report of one failed scenario.
#[derive(Clone, Debug, Display, Error)]
#[display(fmt = "{}: {}: {}", feature, scenario, error)]
pub struct ScenarioFailure {
    /// Name of the failed scenario's feature.
    pub feature: String,

    /// Name of the failed scenario.
    pub scenario: String,

    /// Error that failed the scenario.
    pub error: StepError,
}

/// Executes the given [`Program`] against the `registry`.
///
/// Every scenario gets a fresh world cloned from `seed`, threaded through
/// its steps in document order and dropped at scenario end. A failed step
/// ends its scenario; remaining scenarios still run. The returned failures
/// are empty when every scenario passed.
pub async fn execute<World, H>(
    program: &Program,
    registry: &Registry<World>,
    harness: &mut H,
    seed: &World,
) -> Vec<ScenarioFailure>
where
    World: Clone,
    H: Harness + ?Sized,
{
    let mut failures = Vec::new();

    for feature in &program.features {
        harness.describe(&feature.title);

        for scenario in &feature.scenarios {
            harness.test(&scenario.title);

            let mut world = seed.clone();
            let steps = u32::try_from(scenario.steps.len()).unwrap_or(u32::MAX);
            let allotted = harness.timeout() * steps;

            for step in &scenario.steps {
                let found: Match<'_, World> = match registry.find(step) {
                    Ok(found) => found,
                    Err(e) => {
                        failures.push(ScenarioFailure {
                            feature: feature.name.clone(),
                            scenario: scenario.name.clone(),
                            error: e.into(),
                        });
                        break;
                    }
                };

                let deadline = harness.delay(allotted);
                let context = Context::new(step.clone(), found.parameters);
                let handler = (found.handler)(&mut world, context);

                // Handler first, so a settled handler beats a simultaneous
                // deadline firing.
                match select_with_biased_first(handler, deadline).await {
                    Either::Left(((), _)) => {}
                    Either::Right(((), _)) => {
                        failures.push(ScenarioFailure {
                            feature: feature.name.clone(),
                            scenario: scenario.name.clone(),
                            error: StepTimeoutError {
                                step: step.text.clone(),
                                allotted,
                            }
                            .into(),
                        });
                        break;
                    }
                }
            }
        }
    }

    failures
}

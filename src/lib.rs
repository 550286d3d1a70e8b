// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compiles [Gherkin] feature files into executable test programs, and
//! resolves step text to registered handlers through dialect-aware token
//! matching.
//!
//! The pipeline: raw feature text is parsed into a normalized
//! [`Specification`] (scenario outlines expanded, background steps inlined,
//! conjunction keywords resolved), which [`Generator::generate()`] compiles
//! into a [`Program`] carrying the rendered test file, a typed block
//! structure and a [`CodeMap`] back to the source. At run time the program
//! resolves each step against a [`Registry`] of tokenized step templates,
//! where `{}` tokens capture parameters and `a/b` tokens match any of their
//! alternatives. [`execute()`] drives a [`Program`] natively against a
//! [`Harness`].
//!
//! ```rust
//! use cukegen::{Context, Generator, Registry, parse_specification};
//! use futures::future::LocalBoxFuture;
//!
//! fn store(world: &mut Vec<String>, ctx: Context) -> LocalBoxFuture<'_, ()> {
//!     Box::pin(async move {
//!         world.push(ctx.parameters[0].clone());
//!     })
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = parse_specification(
//!     "greet.feature",
//!     "Feature: Greeting\n  Scenario: Hello\n    Given a \"greeting\"\n",
//! )?;
//! let program = Generator::default().generate(&spec)?;
//! assert!(program.text.contains("test.describe"));
//!
//! let mut registry = Registry::<Vec<String>>::default();
//! registry.define("Given a {}", store)?;
//!
//! let found = registry.find(&spec.features[0].scenarios[0].steps[0])?;
//! assert_eq!(found.parameters, ["greeting"]);
//! # Ok(())
//! # }
//! ```
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod cli;
pub mod codegen;
pub mod codemap;
pub mod declaration;
pub mod dialect;
pub mod feature;
mod future;
pub mod runner;
pub mod spec;
pub mod step;
pub mod table;
mod token;

pub use gherkin;

pub use self::{
    codegen::{FeatureBlock, Generator, GenerateError, Program, ScenarioBlock},
    codemap::{CodeMap, SourceMap},
    declaration::declaration,
    dialect::{Dialect, DialectError, StepKind},
    runner::{execute, Harness, ScenarioFailure, StepError, StepTimeoutError},
    spec::{
        parse_specification, parse_specification_with, Feature, Location,
        ParseError, Scenario, Specification, Step,
    },
    step::{
        AmbiguousStepError, Context, DefineError, DuplicateStepError,
        FindError, InvalidStepError, Match, Pattern, Registry, Resolution,
        StepFn, StepNotFoundError,
    },
    table::Table,
    token::tokenize,
};

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step pattern matching: the [`Registry`] mapping tokenized templates to
//! handler functions, and everything it is built from.

pub mod context;
pub mod error;
pub mod pattern;
pub mod registry;

use futures::future::LocalBoxFuture;

pub use self::{
    context::Context,
    error::{
        AmbiguousStepError, DefineError, DuplicateStepError, FindError,
        InvalidStepError, StepNotFoundError,
    },
    pattern::Pattern,
    registry::{Match, Registry, Resolution},
};

/// Alias for a step handler function, invoked with a scenario's world and
/// the [`Context`] of the matched step.
pub type StepFn<World> =
    for<'a> fn(&'a mut World, Context) -> LocalBoxFuture<'a, ()>;

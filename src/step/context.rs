// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Context passed to a step handler invocation.

use crate::{spec::Step, table::Table};

/// Context of a single step handler invocation.
#[derive(Clone, Debug)]
pub struct Context {
    /// Normalized [`Step`] being executed.
    pub step: Step,

    /// Values captured by the matched pattern's wildcard positions, in
    /// position order.
    pub parameters: Vec<String>,

    /// [`Table`] built from the step's data-table argument, if it has one.
    pub table: Option<Table>,
}

impl Context {
    /// Creates a new [`Context`] for the given [`Step`] and the `parameters`
    /// its matched pattern captured.
    #[must_use]
    pub fn new(step: Step, parameters: Vec<String>) -> Self {
        let table = step.table.clone().map(Table::from);
        Self { step, parameters, table }
    }

    /// Doc string attached to the executed [`Step`], if any.
    #[must_use]
    pub fn doc_string(&self) -> Option<&str> {
        self.step.doc_string.as_deref()
    }
}

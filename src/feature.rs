// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`gherkin::Feature`] extension.

use std::{iter, mem, path::PathBuf};

use derive_more::{Display, Error};
use lazy_regex::regex;
use once_cell::sync::Lazy;
use regex::Regex;
use sealed::sealed;

/// Helper methods to operate on [`gherkin::Feature`]s.
#[sealed]
pub trait Ext: Sized {
    /// Expands [`Scenario Outline`][1] [`Examples`][2] into concrete
    /// scenarios, one per example row.
    ///
    /// `<placeholder>`s in the scenario name, step bodies, doc strings and
    /// table cells are substituted with the row's values. Each produced
    /// scenario carries the example block's tags in addition to its own, and
    /// is positioned at its example row, so that every row keeps a distinct
    /// source line.
    ///
    /// # Errors
    ///
    /// [`ExpandExamplesError`], if a `<placeholder>` names no column of the
    /// examples table.
    ///
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    /// [2]: https://cucumber.io/docs/gherkin/reference#examples
    fn expand_examples(self) -> Result<Self, ExpandExamplesError>;
}

#[sealed]
impl Ext for gherkin::Feature {
    fn expand_examples(mut self) -> Result<Self, ExpandExamplesError> {
        let path = self.path.clone();

        for r in &mut self.rules {
            r.scenarios = mem::take(&mut r.scenarios)
                .into_iter()
                .flat_map(|s| expand_scenario(s, path.as_ref()))
                .collect::<Result<_, _>>()?;
        }
        self.scenarios = mem::take(&mut self.scenarios)
            .into_iter()
            .flat_map(|s| expand_scenario(s, path.as_ref()))
            .collect::<Result<_, _>>()?;

        Ok(self)
    }
}

/// Expands a single [`gherkin::Scenario`]'s examples, if it has any.
fn expand_scenario(
    scenario: gherkin::Scenario,
    path: Option<&PathBuf>,
) -> Vec<Result<gherkin::Scenario, ExpandExamplesError>> {
    /// [`Regex`] matching `<placeholder>`s to be substituted.
    static TEMPLATE_REGEX: &Lazy<Regex> = regex!(r"<([^>\s]+)>");

    if scenario.examples.is_empty() {
        return vec![Ok(scenario)];
    }

    scenario
        .examples
        .iter()
        .filter_map(|ex| {
            ex.table
                .as_ref()?
                .rows
                .split_first()
                .map(|(header, rows)| (header, rows, ex))
        })
        .flat_map(|(header, rows, ex)| {
            rows.iter()
                .enumerate()
                .zip(iter::repeat((header, ex)))
                .map(|((id, row), (header, ex))| {
                    let lookup = |name: &str| {
                        header
                            .iter()
                            .position(|h| h == name)
                            .and_then(|i| row.get(i))
                            .map(String::as_str)
                    };

                    let substitute = |text: &str, pos| {
                        let mut unknown = None;
                        let replaced = TEMPLATE_REGEX
                            .replace_all(text, |cap: &regex::Captures<'_>| {
                                // PANIC: `TEMPLATE_REGEX` contains this
                                //        capture group.
                                #[allow(clippy::unwrap_used)]
                                let name = cap.get(1).unwrap().as_str();

                                lookup(name).unwrap_or_else(|| {
                                    unknown = Some(ExpandExamplesError {
                                        pos,
                                        name: name.to_owned(),
                                        path: path.cloned(),
                                    });
                                    ""
                                })
                            })
                            .into_owned();
                        unknown.map_or(Ok(replaced), Err)
                    };

                    let mut expanded = scenario.clone();

                    // Header row sits right below the `Examples:` line, so
                    // row `id` lives two lines further down.
                    expanded.position = ex.position;
                    expanded.position.line += id + 2;

                    expanded.tags.extend(ex.tags.iter().cloned());

                    expanded.name =
                        substitute(&expanded.name, expanded.position)?;
                    for step in &mut expanded.steps {
                        for value in iter::once(&mut step.value)
                            .chain(step.docstring.iter_mut())
                            .chain(step.table.iter_mut().flat_map(|t| {
                                t.rows.iter_mut().flat_map(|r| r.iter_mut())
                            }))
                        {
                            *value = substitute(value, step.position)?;
                        }
                    }

                    Ok(expanded)
                })
        })
        .collect()
}

/// Error of a [`Scenario Outline`][1] expansion encountering an unknown
/// `<placeholder>`.
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[derive(Clone, Debug, Display, Error)]
#[display(
    fmt = "Failed to resolve <{}> at {}:{}:{}",
    name,
    "path.as_deref().map(|p| p.display().to_string()).unwrap_or_default()",
    "pos.line",
    "pos.col"
)]
pub struct ExpandExamplesError {
    /// Position of the unknown `<placeholder>`.
    pub pos: gherkin::LineCol,

    /// Name of the unknown `<placeholder>`.
    pub name: String,

    /// Path of the `.feature` file, if known.
    pub path: Option<PathBuf>,
}

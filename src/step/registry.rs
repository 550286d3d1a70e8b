// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Registry`] of step pattern → handler bindings.

use std::fmt::{self, Debug, Formatter};

use itertools::Itertools as _;
use linked_hash_map::LinkedHashMap;

use crate::{
    dialect::{self, Dialect, StepKind},
    spec,
};

use super::{
    error::{
        AmbiguousStepError, DefineError, DuplicateStepError, FindError,
        InvalidStepError, StepNotFoundError,
    },
    pattern::Pattern,
    StepFn,
};

/// Successful resolution of a step to its defined handler.
#[derive(Debug)]
pub struct Match<'r, World> {
    /// Handler the step resolved to.
    pub handler: StepFn<World>,

    /// [`Pattern`] the step matched.
    pub pattern: &'r Pattern,

    /// Values captured by the pattern's wildcard positions, in position
    /// order.
    pub parameters: Vec<String>,
}

/// Outcome of resolving a step against a [`Registry`], as a plain variant
/// rather than an error, letting callers branch without unwinding.
pub enum Resolution<'r, World> {
    /// Exactly one binding matched.
    Matched(Match<'r, World>),

    /// More than one binding matched.
    Ambiguous(Vec<&'r Pattern>),

    /// No binding matched.
    NotFound,
}

/// Collection of [`Pattern`] → handler bindings for some `World`.
///
/// Bindings are kept in definition order. A [`Registry`] is not safe for
/// interleaved mutation and lookup from multiple threads: definition is
/// expected to complete before lookups begin.
pub struct Registry<World> {
    /// Defined bindings, in definition order.
    bindings: LinkedHashMap<Pattern, StepFn<World>>,

    /// [`Dialect`] templates are classified with.
    dialect: &'static Dialect,
}

impl<World> Debug for Registry<World> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("dialect", &self.dialect.code)
            .field(
                "bindings",
                &self
                    .bindings
                    .iter()
                    .map(|(pat, step)| (pat.to_string(), format!("{step:p}")))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<World> Default for Registry<World> {
    fn default() -> Self {
        Self::new(&dialect::EN)
    }
}

impl<World> Registry<World> {
    /// Creates an empty [`Registry`] classifying templates with the given
    /// [`Dialect`].
    #[must_use]
    pub fn new(dialect: &'static Dialect) -> Self {
        Self { bindings: LinkedHashMap::new(), dialect }
    }

    /// [`Dialect`] this [`Registry`] classifies templates with.
    #[must_use]
    pub fn dialect(&self) -> &'static Dialect {
        self.dialect
    }

    /// Number of defined bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Indicates whether no bindings are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Defines the `handler` for steps matching the given `template`.
    ///
    /// The `template` goes through the same classify + tokenize pipeline as
    /// step text, so its keyword may be any concrete keyword of the
    /// [`Dialect`]. Body tokens spelled `{}` become wildcard positions and
    /// `a/b` tokens remain alternation literals.
    ///
    /// # Errors
    ///
    /// - [`DefineError::Parse`], if the `template` starts with no keyword of
    ///   the [`Dialect`].
    /// - [`DefineError::Invalid`], if the `template` classifies as a
    ///   conjunction.
    /// - [`DefineError::Duplicate`], if some input could match both the new
    ///   pattern and an already defined one. The check is symmetric, so
    ///   neither literal-first nor wildcard-first definition order can
    ///   smuggle in an ambiguity.
    pub fn define(
        &mut self,
        template: &str,
        handler: StepFn<World>,
    ) -> Result<(), DefineError> {
        let classified = self.dialect.classify(template)?;
        if let StepKind::Conjunction = classified.kind {
            return Err(InvalidStepError(template.to_owned()).into());
        }

        let keyword = self.dialect.keyword(classified.kind);
        let pattern = Pattern::new(keyword, classified.remainder.trim());

        if let Some(existing) =
            self.bindings.keys().find(|p| p.overlaps(&pattern))
        {
            return Err(DuplicateStepError {
                template: template.to_owned(),
                existing: existing.to_string(),
            }
            .into());
        }

        drop(self.bindings.insert(pattern, handler));
        Ok(())
    }

    /// Resolves the given `tokens` against the defined bindings.
    ///
    /// Prefer [`Registry::find()`] when an error is wanted for anything but
    /// an unambiguous single match.
    #[must_use]
    pub fn resolve(&self, tokens: &[String]) -> Resolution<'_, World> {
        let mut matched = self
            .bindings
            .iter()
            .filter_map(|(pattern, handler)| {
                pattern
                    .matches(tokens)
                    .map(|parameters| (pattern, handler, parameters))
            })
            .collect::<Vec<_>>();

        match matched.len() {
            0 => Resolution::NotFound,
            // Instead of `.unwrap()` to avoid documenting `# Panics`.
            1 => matched.pop().map_or(
                Resolution::NotFound,
                |(pattern, handler, parameters)| {
                    Resolution::Matched(Match {
                        handler: *handler,
                        pattern,
                        parameters,
                    })
                },
            ),
            _ => Resolution::Ambiguous(
                matched.into_iter().map(|(pattern, ..)| pattern).collect(),
            ),
        }
    }

    /// Resolves the given normalized [`Step`] to exactly one handler.
    ///
    /// # Errors
    ///
    /// - [`FindError::NotFound`], if no binding matches, naming the step's
    ///   text.
    /// - [`FindError::Ambiguous`], if more than one binding matches, naming
    ///   the step's text and every matching pattern.
    ///
    /// [`Step`]: spec::Step
    pub fn find(
        &self,
        step: &spec::Step,
    ) -> Result<Match<'_, World>, FindError> {
        match self.resolve(&step.tokens) {
            Resolution::Matched(m) => Ok(m),
            Resolution::Ambiguous(patterns) => Err(AmbiguousStepError {
                text: step.text.clone(),
                possible_matches: patterns
                    .into_iter()
                    .map(ToString::to_string)
                    .sorted()
                    .collect(),
            }
            .into()),
            Resolution::NotFound => {
                Err(StepNotFoundError(step.text.clone()).into())
            }
        }
    }
}

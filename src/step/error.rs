// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of defining and looking up steps in a [`Registry`].
//!
//! [`Registry`]: super::Registry

use std::fmt;

use derive_more::{Display, Error, From};
use itertools::Itertools as _;

use crate::spec::ParseError;

/// Error of defining a step with a conjunction keyword.
///
/// A definition must declare a concrete kind, as there is no preceding step
/// for a conjunction to resolve against.
#[derive(Clone, Debug, Display, Error)]
#[display(fmt = "Cannot define a step with a conjunction keyword: {}", _0)]
pub struct InvalidStepError(#[error(not(source))] pub String);

/// Error of defining a step whose pattern collides with an already defined
/// one.
///
/// Collision is checked symmetrically: it doesn't matter whether the literal
/// or the wildcard side was defined first.
#[derive(Clone, Debug, Display, Error)]
#[display(
    fmt = "Step already defined: {} (collides with `{}`)",
    template,
    existing
)]
pub struct DuplicateStepError {
    /// Template the rejected definition was attempted with.
    pub template: String,

    /// Rendered pattern of the existing binding it collides with.
    pub existing: String,
}

/// Error of a step matching more than one defined pattern.
#[derive(Clone, Debug, Error)]
pub struct AmbiguousStepError {
    /// Text of the unresolved step.
    pub text: String,

    /// Rendered patterns the step matches, sorted for deterministic output.
    pub possible_matches: Vec<String>,
}

impl fmt::Display for AmbiguousStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ambiguous step: {}\nPossible matches:\n{}",
            self.text,
            self.possible_matches.iter().map(|m| format!("  {m}")).join("\n"),
        )
    }
}

/// Error of a step matching no defined pattern.
#[derive(Clone, Debug, Display, Error)]
#[display(fmt = "Unable to find step: {}", _0)]
pub struct StepNotFoundError(#[error(not(source))] pub String);

/// Error of a [`Registry::define()`] call.
///
/// [`Registry::define()`]: super::Registry::define
#[derive(Clone, Debug, Display, Error, From)]
pub enum DefineError {
    /// Template starts with no keyword of the configured [`Dialect`].
    ///
    /// [`Dialect`]: crate::Dialect
    Parse(ParseError),

    /// Template classifies as a conjunction.
    Invalid(InvalidStepError),

    /// Template collides with an existing binding.
    Duplicate(DuplicateStepError),
}

/// Error of a [`Registry::find()`] call.
///
/// [`Registry::find()`]: super::Registry::find
#[derive(Clone, Debug, Display, Error, From)]
pub enum FindError {
    /// Step matches more than one defined pattern.
    Ambiguous(AmbiguousStepError),

    /// Step matches no defined pattern.
    NotFound(StepNotFoundError),
}

#[cfg(test)]
mod tests {
    use super::{AmbiguousStepError, DuplicateStepError, StepNotFoundError};

    #[test]
    fn messages_name_the_step_text_verbatim() {
        let err = StepNotFoundError("Given a missing step".to_owned());
        assert_eq!(err.to_string(), "Unable to find step: Given a missing step");

        let err = DuplicateStepError {
            template: "Given a step".to_owned(),
            existing: "Given a {}".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Step already defined: Given a step (collides with `Given a {}`)",
        );
    }

    #[test]
    fn ambiguity_lists_every_possible_match() {
        let err = AmbiguousStepError {
            text: "Given a step".to_owned(),
            possible_matches: vec![
                "Given a {}".to_owned(),
                "Given {} step".to_owned(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous step: Given a step\n\
             Possible matches:\n  Given a {}\n  Given {} step",
        );
    }
}

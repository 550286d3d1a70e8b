// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Dialect keyword tables and step keyword classification.

use derive_more::{Display, Error};
use serde::Serialize;

use crate::spec::ParseError;

/// Kind of a step statement, as resolved by keyword classification.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum StepKind {
    /// Precondition step (`Given`-alike keywords).
    Context,

    /// Action step (`When`-alike keywords).
    Action,

    /// Assertion step (`Then`-alike keywords).
    Outcome,

    /// Continuation step (`And`-alike keywords), taking the kind of the
    /// nearest preceding concrete step.
    Conjunction,

    /// Step whose kind could not be established.
    Unknown,
}

/// Keyword lists of one specification language.
///
/// Each kind's list is ordered: classification tries entries first to last,
/// and the first non-`"* "` entry (trimmed) is the canonical keyword of that
/// kind. The data is static configuration mirroring the official [Gherkin]
/// keyword tables.
///
/// [Gherkin]: https://cucumber.io/docs/gherkin/languages
#[derive(Clone, Copy, Debug)]
pub struct Dialect {
    /// Language code this [`Dialect`] is looked up by.
    pub code: &'static str,

    /// English name of the language.
    pub name: &'static str,

    context: &'static [&'static str],
    action: &'static [&'static str],
    outcome: &'static [&'static str],
    conjunction: &'static [&'static str],
    unknown: &'static [&'static str],
}

/// Result of classifying one step statement against a [`Dialect`].
#[derive(Clone, Copy, Debug)]
pub struct Classified<'t> {
    /// Resolved [`StepKind`].
    pub kind: StepKind,

    /// Matched keyword, verbatim from the keyword list (usually carrying a
    /// trailing space).
    pub keyword: &'static str,

    /// Rest of the statement after the matched keyword.
    pub remainder: &'t str,
}

/// Error of looking up a [`Dialect`] by an unsupported language code.
#[derive(Clone, Debug, Display, Error)]
#[display(fmt = "Invalid dialect: {}", _0)]
pub struct DialectError(#[error(not(source))] pub String);

impl Dialect {
    /// Looks up the [`Dialect`] of the given language `code`.
    ///
    /// # Errors
    ///
    /// If no keyword table is configured for the `code`.
    pub fn get(code: &str) -> Result<&'static Self, DialectError> {
        DIALECTS
            .iter()
            .find(|d| d.code == code)
            .copied()
            .ok_or_else(|| DialectError(code.to_owned()))
    }

    /// Classifies the given step `text` by its leading keyword.
    ///
    /// Keyword lists are tried in fixed priority order: conjunction, then
    /// context, action and outcome. Within a list the first matching entry
    /// wins, in list order.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnknownKeyword`], if no keyword of this [`Dialect`]
    /// prefixes the `text`.
    pub fn classify<'t>(
        &self,
        text: &'t str,
    ) -> Result<Classified<'t>, ParseError> {
        [
            (StepKind::Conjunction, self.conjunction),
            (StepKind::Context, self.context),
            (StepKind::Action, self.action),
            (StepKind::Outcome, self.outcome),
        ]
        .into_iter()
        .find_map(|(kind, keywords)| {
            keywords.iter().find(|k| text.starts_with(**k)).map(|k| {
                Classified { kind, keyword: k, remainder: &text[k.len()..] }
            })
        })
        .ok_or_else(|| ParseError::UnknownKeyword(text.to_owned()))
    }

    /// Returns the canonical keyword of the given [`StepKind`]: the first
    /// non-`"* "` entry of its list, trimmed.
    #[must_use]
    pub fn keyword(&self, kind: StepKind) -> &'static str {
        let list = match kind {
            StepKind::Context => self.context,
            StepKind::Action => self.action,
            StepKind::Outcome => self.outcome,
            StepKind::Conjunction => self.conjunction,
            StepKind::Unknown => self.unknown,
        };
        list.iter()
            .map(|k| k.trim_end())
            .find(|k| *k != "*")
            .unwrap_or("*")
    }
}

/// All the configured [`Dialect`]s.
static DIALECTS: &[&Dialect] = &[&EN, &DE, &FR, &ES];

/// English [`Dialect`], the default when no language is specified.
pub static EN: Dialect = Dialect {
    code: "en",
    name: "English",
    context: &["* ", "Given "],
    action: &["* ", "When "],
    outcome: &["* ", "Then "],
    conjunction: &["* ", "And ", "But "],
    unknown: &["* "],
};

static DE: Dialect = Dialect {
    code: "de",
    name: "German",
    context: &["* ", "Angenommen ", "Gegeben sei ", "Gegeben seien "],
    action: &["* ", "Wenn "],
    outcome: &["* ", "Dann "],
    conjunction: &["* ", "Und ", "Aber "],
    unknown: &["* "],
};

static FR: Dialect = Dialect {
    code: "fr",
    name: "French",
    context: &[
        "* ",
        "Soit ",
        "Sachant que ",
        "Sachant qu'",
        "Sachant ",
        "Etant donné que ",
        "Etant donné qu'",
        "Etant donné ",
        "Etant donnée ",
        "Etant donnés ",
        "Etant données ",
        "Étant donné que ",
        "Étant donné qu'",
        "Étant donné ",
        "Étant donnée ",
        "Étant donnés ",
        "Étant données ",
    ],
    action: &["* ", "Quand ", "Lorsque ", "Lorsqu'"],
    outcome: &["* ", "Alors ", "Donc "],
    conjunction: &["* ", "Et que ", "Et qu'", "Et ", "Mais que ", "Mais qu'", "Mais "],
    unknown: &["* "],
};

static ES: Dialect = Dialect {
    code: "es",
    name: "Spanish",
    context: &["* ", "Dado ", "Dada ", "Dados ", "Dadas "],
    action: &["* ", "Cuando "],
    outcome: &["* ", "Entonces "],
    conjunction: &["* ", "Y ", "E ", "Pero "],
    unknown: &["* "],
};

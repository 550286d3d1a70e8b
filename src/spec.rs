// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsing feature documents into normalized [`Specification`]s.
//!
//! The grammar itself is handled by the [`gherkin`] crate; on top of its
//! syntax tree this module expands [`Scenario Outline`]s, inlines
//! [`Background`] steps, resolves conjunction keywords and tokenizes every
//! step, producing the flat pickle list the code generator and the
//! [`Registry`] operate on.
//!
//! [`Background`]: https://cucumber.io/docs/gherkin/reference#background
//! [`Registry`]: crate::Registry
//! [`Scenario Outline`]: https://cucumber.io/docs/gherkin/reference#scenario-outline

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use lazy_regex::regex;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{
    dialect::{self, Dialect, DialectError, StepKind},
    feature::{ExpandExamplesError, Ext as _},
    token::tokenize,
};

/// Fully parsed representation of one feature document.
#[derive(Clone, Debug, Serialize)]
pub struct Specification {
    /// Source identifier of the document, typically its path.
    pub uri: String,

    /// Raw source text of the document.
    pub content: String,

    /// Language code the document is written in.
    pub language: String,

    /// `#`-comment lines of the document, in source order.
    pub comments: Vec<String>,

    /// Parsed [`Feature`]s. Zero for an empty or comment-only document,
    /// one otherwise.
    pub features: Vec<Feature>,
}

/// Normalized feature with its scenarios flattened into pickles.
#[derive(Clone, Debug, Serialize)]
pub struct Feature {
    /// Keyword the feature was declared with (localized).
    pub keyword: String,

    /// Name of the feature.
    pub name: String,

    /// Language code of the document.
    pub language: String,

    /// Tags of the feature, without the `@` sigil.
    pub tags: Vec<String>,

    /// Free-text description following the feature declaration.
    pub description: String,

    /// Position of the feature declaration in the source.
    pub location: Location,

    /// Concrete [`Scenario`]s, in document order, with outlines expanded
    /// and rule blocks flattened in.
    pub scenarios: Vec<Scenario>,
}

/// Concrete scenario instance (pickle) after outline expansion.
#[derive(Clone, Debug, Serialize)]
pub struct Scenario {
    /// Name of the scenario, suffixed with `" (Example k)"` when the same
    /// name repeats within one feature.
    pub name: String,

    /// Effective tags: feature (and rule) tags followed by the scenario's
    /// own, without deduplication.
    pub tags: Vec<String>,

    /// Position of the scenario (for expanded outlines, of its example
    /// row) in the source.
    pub location: Location,

    /// Normalized [`Step`]s, with [`Background`] steps inlined up front.
    ///
    /// [`Background`]: https://cucumber.io/docs/gherkin/reference#background
    pub steps: Vec<Step>,
}

/// Normalized step of a [`Scenario`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Position of the step in the source.
    pub location: Location,

    /// Resolved [`StepKind`], never [`StepKind::Conjunction`].
    pub kind: StepKind,

    /// Canonical keyword of the resolved kind.
    pub keyword: String,

    /// Keyword the step was written with.
    pub original_keyword: String,

    /// Resolved text: canonical keyword and step body.
    pub text: String,

    /// Text as written: original keyword and step body.
    pub original_text: String,

    /// [`tokenize`]d form of the resolved text. `tokens[0]` is always the
    /// canonical keyword.
    pub tokens: Vec<String>,

    /// Row-major data table attached to the step, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<Vec<String>>>,

    /// Doc string attached to the step, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_string: Option<String>,
}

/// Source position of a node inside the original document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,

    /// 1-based column number, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl From<gherkin::LineCol> for Location {
    fn from(pos: gherkin::LineCol) -> Self {
        Self { line: pos.line, column: Some(pos.col) }
    }
}

/// Error of parsing a feature document.
#[derive(Clone, Debug, Display, Error, From)]
pub enum ParseError {
    /// Step text starting with no keyword of the [`Dialect`].
    #[display(fmt = "Unable to parse: {}", _0)]
    #[from(ignore)]
    UnknownKeyword(#[error(not(source))] String),

    /// Scenario whose first step is a conjunction keyword, leaving it no
    /// concrete kind to resolve to.
    #[display(
        fmt = "Scenario cannot start with a conjunction: {} at {}:{}",
        text,
        "pos.line",
        "pos.col"
    )]
    #[from(ignore)]
    LeadingConjunction {
        /// Text of the offending step.
        text: String,

        /// Position of the offending step.
        pos: gherkin::LineCol,
    },

    /// Malformed document grammar.
    #[display(fmt = "Failed to parse feature: {}", _0)]
    Grammar(Arc<gherkin::ParseError>),

    /// Failed to expand [`Examples`] of a [`Scenario Outline`].
    ///
    /// [`Examples`]: https://cucumber.io/docs/gherkin/reference#examples
    /// [`Scenario Outline`]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    #[display(fmt = "Failed to expand examples: {}", _0)]
    ExampleExpansion(ExpandExamplesError),

    /// Language the document asks for has no keyword table.
    #[display(fmt = "{}", _0)]
    Dialect(DialectError),
}

/// Parses the given feature document `text` into a [`Specification`],
/// defaulting to the English [`Dialect`] for documents without a
/// `# language:` header.
///
/// # Errors
///
/// [`ParseError`], if the document is malformed, uses unsupported keywords,
/// starts a scenario with a conjunction, or references unknown outline
/// placeholders.
pub fn parse_specification(
    uri: impl Into<String>,
    text: impl Into<String>,
) -> Result<Specification, ParseError> {
    parse_specification_with(uri, text, &dialect::EN)
}

/// Parses the given feature document `text` into a [`Specification`],
/// classifying with the `fallback` [`Dialect`] unless the document carries
/// its own `# language:` header.
///
/// # Errors
///
/// [`ParseError`], if the document is malformed, uses unsupported keywords,
/// starts a scenario with a conjunction, or references unknown outline
/// placeholders.
pub fn parse_specification_with(
    uri: impl Into<String>,
    text: impl Into<String>,
    fallback: &Dialect,
) -> Result<Specification, ParseError> {
    let uri = uri.into();
    let content = text.into();

    let comments = scan_comments(&content);
    let language = scan_language(&content)
        .unwrap_or(fallback.code)
        .to_owned();

    if is_featureless(&content) {
        return Ok(Specification {
            uri,
            content,
            language,
            comments,
            features: Vec::new(),
        });
    }

    let dialect = Dialect::get(&language)?;

    let env = gherkin::GherkinEnv::new(&language).unwrap_or_default();
    let mut feature = gherkin::Feature::parse(&content, env)
        .map_err(|e| ParseError::Grammar(Arc::new(e)))?;
    feature.path = Some(PathBuf::from(&uri));

    let feature =
        normalize_feature(feature.expand_examples()?, &language, dialect)?;

    Ok(Specification { uri, content, language, comments, features: vec![feature] })
}

/// Checks whether the document contains nothing but blank lines and
/// comments.
fn is_featureless(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|l| l.is_empty() || l.starts_with('#'))
}

/// Extracts the language code of a leading `# language:` comment header.
fn scan_language(text: &str) -> Option<&str> {
    /// [`Regex`] matching a `# language: <code>` comment.
    static LANGUAGE_REGEX: &Lazy<Regex> = regex!(r"^#\s*language\s*:\s*([\w-]+)");

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with('#') {
            break;
        }
        if let Some(code) = LANGUAGE_REGEX
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
        {
            return Some(code);
        }
    }
    None
}

/// Collects the `#`-comment lines of the document, skipping doc string
/// contents.
fn scan_comments(text: &str) -> Vec<String> {
    let mut comments = Vec::new();
    let mut fence = None;

    for line in text.lines() {
        let trimmed = line.trim();
        match fence {
            Some(f) => {
                if trimmed == f {
                    fence = None;
                }
            }
            None => {
                if let Some(f) =
                    ["\"\"\"", "```"].into_iter().find(|f| trimmed.starts_with(f))
                {
                    fence = Some(f);
                } else if trimmed.starts_with('#') {
                    comments.push(line.trim_end().to_owned());
                }
            }
        }
    }

    comments
}

/// Normalizes an example-expanded [`gherkin::Feature`] into a [`Feature`].
fn normalize_feature(
    feature: gherkin::Feature,
    language: &str,
    dialect: &Dialect,
) -> Result<Feature, ParseError> {
    let mut scenarios = Vec::new();

    for scenario in &feature.scenarios {
        scenarios.push(normalize_scenario(
            scenario,
            feature.background.iter().flat_map(|bg| &bg.steps),
            feature.tags.iter(),
            dialect,
        )?);
    }
    for rule in &feature.rules {
        for scenario in &rule.scenarios {
            scenarios.push(normalize_scenario(
                scenario,
                feature
                    .background
                    .iter()
                    .chain(rule.background.iter())
                    .flat_map(|bg| &bg.steps),
                feature.tags.iter().chain(&rule.tags),
                dialect,
            )?);
        }
    }

    number_repeated_names(&mut scenarios);

    Ok(Feature {
        keyword: feature.keyword,
        name: feature.name,
        language: language.to_owned(),
        tags: feature.tags,
        description: feature.description.unwrap_or_default(),
        location: feature.position.into(),
        scenarios,
    })
}

/// Normalizes one [`gherkin::Scenario`], inlining the given `background`
/// steps ahead of its own and prepending the inherited `tags`.
fn normalize_scenario<'s>(
    scenario: &'s gherkin::Scenario,
    background: impl Iterator<Item = &'s gherkin::Step>,
    tags: impl Iterator<Item = &'s String>,
    dialect: &Dialect,
) -> Result<Scenario, ParseError> {
    let mut last_kind = None;

    let steps = background
        .chain(&scenario.steps)
        .map(|step| normalize_step(step, dialect, &mut last_kind))
        .collect::<Result<_, _>>()?;

    Ok(Scenario {
        name: scenario.name.clone(),
        tags: tags.chain(&scenario.tags).cloned().collect(),
        location: scenario.position.into(),
        steps,
    })
}

/// Normalizes one [`gherkin::Step`], resolving conjunction keywords to the
/// nearest preceding concrete kind tracked in `last_kind`.
fn normalize_step(
    step: &gherkin::Step,
    dialect: &Dialect,
    last_kind: &mut Option<StepKind>,
) -> Result<Step, ParseError> {
    let original = format!("{} {}", step.keyword, step.value);
    let classified = dialect.classify(&original)?;
    let body = classified.remainder.trim();

    let kind = if let StepKind::Conjunction = classified.kind {
        last_kind.ok_or_else(|| ParseError::LeadingConjunction {
            text: original.clone(),
            pos: step.position,
        })?
    } else {
        *last_kind = Some(classified.kind);
        classified.kind
    };

    let keyword = dialect.keyword(kind).to_owned();
    let text = format!("{} {}", keyword, body);
    let tokens = tokenize(&text);

    Ok(Step {
        location: step.position.into(),
        kind,
        keyword,
        original_keyword: step.keyword.clone(),
        text,
        original_text: original,
        tokens,
        table: step.table.as_ref().map(|t| t.rows.clone()),
        doc_string: step.docstring.clone(),
    })
}

/// Suffixes repeated scenario names with their 1-based occurrence index, so
/// every pickle of an expanded outline stays addressable by name.
fn number_repeated_names(scenarios: &mut [Scenario]) {
    let repeated: HashMap<String, usize> =
        scenarios.iter().map(|s| s.name.clone()).counts();
    let mut occurrence = HashMap::new();

    for s in scenarios {
        if repeated.get(&s.name).map_or(false, |n| *n > 1) {
            let k = occurrence
                .entry(s.name.clone())
                .and_modify(|k| *k += 1)
                .or_insert(1_usize);
            s.name = format!("{} (Example {})", s.name, k);
        }
    }
}

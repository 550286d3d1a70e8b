// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tokenized step templates with wildcard and alternation positions.

use std::{fmt, iter};

use itertools::Itertools as _;

use crate::token::{tokenize, unquote};

/// Tokenized step template, stored as a [`Registry`] key.
///
/// Created once at definition time and immutable afterwards. Two
/// [`Pattern`]s of the same length [`overlap`] when some input could match
/// both, which is what makes colliding definitions rejectable eagerly.
///
/// [`Registry`]: super::Registry
/// [`overlap`]: Pattern::overlaps
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Pattern(Vec<Token>);

/// Single position of a [`Pattern`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Token {
    /// Position matching any single input token and capturing its value as
    /// a parameter.
    Wildcard,

    /// Position matching a literal, or any one of its `/`-separated
    /// alternatives.
    Literal(String),
}

impl Pattern {
    /// Builds a [`Pattern`] from a resolved `keyword` and a template `body`.
    ///
    /// Body tokens spelled `{}` become wildcard positions; everything else
    /// stays a literal, with `/`-separated alternatives intact.
    pub(crate) fn new(keyword: &str, body: &str) -> Self {
        Self(
            iter::once(Token::Literal(keyword.to_owned()))
                .chain(tokenize(body).into_iter().map(|t| {
                    if t == "{}" {
                        Token::Wildcard
                    } else {
                        Token::Literal(t)
                    }
                }))
                .collect(),
        )
    }

    /// Number of token positions of this [`Pattern`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether this [`Pattern`] has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Matches this [`Pattern`] against the given input `tokens`.
    ///
    /// Returns the values captured by wildcard positions, in position
    /// order, with one layer of surrounding double quotes stripped. `None`
    /// if some position rejects its token.
    #[must_use]
    pub fn matches(&self, tokens: &[String]) -> Option<Vec<String>> {
        if self.0.len() != tokens.len() {
            return None;
        }

        let mut parameters = Vec::new();
        for (token, input) in self.0.iter().zip(tokens) {
            match token {
                Token::Wildcard => {
                    parameters.push(unquote(input).to_owned());
                }
                Token::Literal(lit) => {
                    if !lit.split('/').any(|alt| alt == input) {
                        return None;
                    }
                }
            }
        }
        Some(parameters)
    }

    /// Checks whether some input could match both this and the `other`
    /// [`Pattern`].
    ///
    /// The test is symmetric: equal lengths, and at every position either
    /// side is a wildcard, or the literals share an alternative.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| match (a, b) {
                (Token::Wildcard, _) | (_, Token::Wildcard) => true,
                (Token::Literal(a), Token::Literal(b)) => {
                    a.split('/').any(|x| b.split('/').any(|y| x == y))
                }
            })
    }

    /// Renders the positions of this [`Pattern`], with wildcards spelled
    /// `{}`.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(" "))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("{}"),
            Self::Literal(lit) => f.write_str(lit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pattern;

    fn tokens(text: &str) -> Vec<String> {
        crate::token::tokenize(text)
    }

    #[test]
    fn literals_must_equal() {
        let pattern = Pattern::new("Given", "a step");

        assert_eq!(pattern.matches(&tokens("Given a step")), Some(vec![]));
        assert_eq!(pattern.matches(&tokens("Given a leap")), None);
        assert_eq!(pattern.matches(&tokens("Given a")), None);
        assert_eq!(pattern.matches(&tokens("Given a step more")), None);
    }

    #[test]
    fn wildcards_capture_in_position_order() {
        let pattern = Pattern::new("Given", "{} and {}");

        assert_eq!(
            pattern.matches(&tokens("Given one and two")),
            Some(vec!["one".to_owned(), "two".to_owned()]),
        );
    }

    #[test]
    fn wildcard_captures_drop_one_quote_layer() {
        let pattern = Pattern::new("Given", "a {}");

        // Tokenization of `'"net"'` keeps the inner double quotes.
        let input = vec![
            "Given".to_owned(),
            "a".to_owned(),
            "\"net\"".to_owned(),
        ];
        assert_eq!(pattern.matches(&input), Some(vec!["net".to_owned()]));
    }

    #[test]
    fn alternation_matches_any_member() {
        let pattern = Pattern::new("Given", "{} step/steps");

        assert_eq!(
            pattern.matches(&tokens("Given one step")),
            Some(vec!["one".to_owned()]),
        );
        assert_eq!(
            pattern.matches(&tokens("Given two steps")),
            Some(vec!["two".to_owned()]),
        );
        assert_eq!(pattern.matches(&tokens("Given two stepz")), None);
    }

    #[test]
    fn overlap_is_symmetric() {
        let literal = Pattern::new("Given", "a step");
        let wildcard = Pattern::new("Given", "a {}");

        assert!(literal.overlaps(&wildcard));
        assert!(wildcard.overlaps(&literal));
        assert!(literal.overlaps(&literal));
    }

    #[test]
    fn overlap_needs_equal_lengths() {
        let short = Pattern::new("Given", "{}");
        let long = Pattern::new("Given", "{} {}");

        assert!(!short.overlaps(&long));
    }

    #[test]
    fn alternations_overlap_on_shared_members() {
        let ab = Pattern::new("Given", "a/b");
        let bc = Pattern::new("Given", "b/c");
        let cd = Pattern::new("Given", "c/d");

        assert!(ab.overlaps(&bc));
        assert!(!ab.overlaps(&cd));
    }

    #[test]
    fn renders_wildcards_back() {
        let pattern = Pattern::new("Given", "a {} of milk/water");

        assert_eq!(pattern.to_string(), "Given a {} of milk/water");
        assert_eq!(pattern.tokens(), ["Given", "a", "{}", "of", "milk/water"]);
    }
}

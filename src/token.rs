// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Splitting step text into tokens.

use std::mem;

/// Splits the given `text` into whitespace-separated tokens.
///
/// A double- or single-quoted run, including any interior whitespace, forms
/// exactly one token with its quotes stripped. Quotes are matched, not
/// nested: a `'` inside a `"`-quoted run is an ordinary character. An
/// unterminated quote runs to the end of the input.
///
/// ```rust
/// # use cukegen::tokenize;
/// assert_eq!(tokenize(r#"a "b c" d"#), ["a", "b c", "d"]);
/// assert_eq!(tokenize(""), Vec::<String>::new());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote = None;

    for ch in text.chars() {
        match quote {
            Some(q) if ch == q => {
                tokens.push(mem::take(&mut current));
                quote = None;
            }
            Some(_) => current.push(ch),
            None => match ch {
                '"' | '\'' => {
                    if !current.is_empty() {
                        tokens.push(mem::take(&mut current));
                    }
                    quote = Some(ch);
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(mem::take(&mut current));
                    }
                }
                c => current.push(c),
            },
        }
    }
    if !current.is_empty() || quote.is_some() {
        tokens.push(current);
    }

    tokens
}

/// Strips one layer of surrounding double quotes off the given `token`, if
/// both are present.
#[must_use]
pub(crate) fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::{tokenize, unquote};

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tokenize("Given a step"), ["Given", "a", "step"]);
        assert_eq!(tokenize("  padded   out  "), ["padded", "out"]);
    }

    #[test]
    fn quoted_run_is_one_token() {
        assert_eq!(tokenize(r#"a "b c" d"#), ["a", "b c", "d"]);
        assert_eq!(tokenize("you are 'very happy'"), ["you", "are", "very happy"]);
    }

    #[test]
    fn adjacent_quoted_runs_stay_separate() {
        assert_eq!(tokenize(r#""a""b""#), ["a", "b"]);
    }

    #[test]
    fn quotes_are_not_nested() {
        assert_eq!(tokenize(r#""it's fine""#), ["it's fine"]);
    }

    #[test]
    fn unterminated_quote_runs_to_the_end() {
        assert_eq!(tokenize(r#"say "never done"#), ["say", "never done"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("   "), Vec::<String>::new());
    }

    #[test]
    fn unquote_strips_one_layer() {
        assert_eq!(unquote(r#""one""#), "one");
        assert_eq!(unquote(r#"""one"""#), r#""one""#);
        assert_eq!(unquote("one"), "one");
        assert_eq!(unquote(r#""half"#), r#""half"#);
    }
}

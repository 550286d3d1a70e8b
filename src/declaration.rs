// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Declaration sidecar listing every step of a [`Specification`] for
//! authoring-time static checkers.

use serde::Serialize as _;

use crate::spec::Specification;

/// Renders the declaration sidecar of the given [`Specification`].
///
/// The sidecar exports a `Steps` type carrying every normalized step of
/// every scenario, and binds the specification's `uri` to it through a
/// module augmentation of the steps module, so a type-level checker can tie
/// authored step modules to the feature files they serve.
///
/// # Errors
///
/// [`serde_json::Error`], if a step fails to serialize.
pub fn declaration(spec: &Specification) -> Result<String, serde_json::Error> {
    let steps: Vec<_> = spec
        .features
        .iter()
        .flat_map(|f| &f.scenarios)
        .flat_map(|s| &s.steps)
        .collect();

    let mut json = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut json,
        serde_json::ser::PrettyFormatter::with_indent(b"    "),
    );
    steps.serialize(&mut serializer)?;
    let steps = String::from_utf8_lossy(&json).into_owned();

    let uri = serde_json::to_string(&spec.uri)?;
    Ok(format!(
        "export type Steps = {steps};\n\
         declare module './steps' {{\n\
         \x20   export interface FeatureSteps {{\n\
         \x20       {uri}: Steps;\n\
         \x20   }}\n\
         }}\n",
    ))
}

#[cfg(test)]
mod tests {
    use super::declaration;
    use crate::parse_specification;

    #[test]
    fn lists_every_normalized_step() {
        let src = "Feature: F
  Scenario: One
    Given a
  Scenario: Two
    When b
    Then c
";
        let spec = parse_specification("f.feature", src).unwrap();
        let decl = declaration(&spec).unwrap();

        assert!(decl.starts_with("export type Steps = ["));
        assert!(decl.contains("\"text\": \"Given a\""));
        assert!(decl.contains("\"text\": \"When b\""));
        assert!(decl.contains("\"text\": \"Then c\""));
        assert!(decl.contains("declare module './steps' {"));
        assert!(decl.contains("\"f.feature\": Steps;"));
    }

    #[test]
    fn featureless_specification_declares_no_steps() {
        let spec = parse_specification("empty.feature", "").unwrap();
        let decl = declaration(&spec).unwrap();
        assert!(decl.starts_with("export type Steps = [];"));
    }
}

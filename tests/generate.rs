// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use cukegen::{declaration, parse_specification, Generator};

const FEATURE: &str = "@suite
Feature: Ordering
  Background:
    Given a base

  Scenario: First
    When acting
    Then passing

  Scenario Outline: Outline
    Given there are <start> cucumbers

    Examples:
      | start |
      |    12 |
      |    20 |
";

#[test]
fn program_structure_follows_the_specification() {
    let spec = parse_specification("ordering.feature", FEATURE).unwrap();
    let program = Generator::default().generate(&spec).unwrap();

    let describes: Vec<_> = program
        .text
        .lines()
        .filter(|l| l.contains("test.describe("))
        .collect();
    assert_eq!(describes, ["test.describe(\"Ordering @suite\", async () => {"]);

    let tests: Vec<_> = program
        .text
        .lines()
        .filter(|l| l.trim_start().starts_with("test("))
        .collect();
    assert_eq!(tests.len(), 3);
    assert!(tests[0].contains("\"First @suite\""));
    assert!(tests[1].contains("\"Outline (Example 1) @suite\""));
    assert!(tests[2].contains("\"Outline (Example 2) @suite\""));

    // One world per scenario, minted before its steps.
    let worlds = program
        .text
        .lines()
        .filter(|l| l.contains("const world = steps.world();"))
        .count();
    assert_eq!(worlds, 3);
}

#[test]
fn every_step_races_against_its_scenario_deadline() {
    let spec = parse_specification("ordering.feature", FEATURE).unwrap();
    let program = Generator::default().generate(&spec).unwrap();

    // Background inlining gives the first scenario three steps, the
    // expanded outline pickles two each.
    assert!(program
        .text
        .contains("deadline(3 * info.timeout, \"When acting\"),"));
    assert!(program.text.contains(
        "deadline(2 * info.timeout, \"Given there are 12 cucumbers\"),",
    ));
    assert!(program.text.contains(
        "deadline(2 * info.timeout, \"Given there are 20 cucumbers\"),",
    ));
}

#[test]
fn position_map_points_each_unit_at_its_source_line() {
    let spec = parse_specification("ordering.feature", FEATURE).unwrap();
    let program = Generator::default().generate(&spec).unwrap();

    let labelled = |label: &str| {
        program
            .map
            .entries()
            .iter()
            .find(|e| e.label == label)
            .unwrap_or_else(|| panic!("no entry labelled {label}"))
    };

    assert_eq!(labelled("Ordering @suite").location.line, 2);
    assert_eq!(labelled("First @suite").location.line, 6);
    // Inlined background step keeps its own line in every scenario.
    assert_eq!(labelled("Given a base").location.line, 4);
    assert_eq!(labelled("When acting").location.line, 7);
    // Expanded pickles point at their example rows.
    assert_ne!(
        labelled("Given there are 12 cucumbers").location.line,
        labelled("Given there are 20 cucumbers").location.line,
    );

    // Generated lines are mapped in emission order.
    let lines: Vec<_> =
        program.map.entries().iter().map(|e| e.generated_line).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted);
}

#[test]
fn source_map_comment_trails_the_program() {
    let spec = parse_specification("ordering.feature", FEATURE).unwrap();
    let program = Generator::default().generate(&spec).unwrap();

    let last = program.text.lines().last().unwrap();
    assert!(last
        .starts_with("//# sourceMappingURL=data:application/json;base64,"));
}

#[test]
fn declaration_sidecar_lists_every_step() {
    let spec = parse_specification("ordering.feature", FEATURE).unwrap();
    let decl = declaration(&spec).unwrap();

    // 3 steps + 2 per expanded pickle (background included).
    assert_eq!(decl.matches("\"kind\":").count(), 7);
    assert!(decl.contains("\"text\": \"Given there are 12 cucumbers\""));
    assert!(decl.contains("\"ordering.feature\": Steps;"));
}

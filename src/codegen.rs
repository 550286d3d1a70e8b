// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compiling a [`Specification`] into an executable test program.
//!
//! The output of [`Generator::generate()`] is a [`Program`]: the rendered
//! JavaScript test file, the typed feature/scenario block structure the
//! native [`execute()`] walks, and the [`CodeMap`] tying every emitted line
//! back to the specification source.
//!
//! [`execute()`]: crate::runner::execute

use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use serde::Serialize;
use smart_default::SmartDefault;

use crate::{
    codemap::CodeMap,
    spec::{Location, Scenario, Specification, Step},
};

/// Fixture names the emitted program threads from the host into every
/// handler call.
const FIXTURES: &str = "page, browser, context, request";

/// Configuration of the generated program.
#[derive(Clone, Debug, SmartDefault)]
pub struct Generator {
    /// Number of spaces per indentation level.
    #[default = 4]
    pub indent: usize,

    /// Module the host `test` function is imported from.
    #[default = "@playwright/test"]
    pub test_module: String,

    /// Module the runtime `Table` and `StepTimeoutError` are imported from.
    #[default = "cukegen"]
    pub runtime_module: String,

    /// Module the step registry is imported from.
    #[default = "./steps.js"]
    pub steps_module: String,

    /// Whether to append the base64 source-map comment to the program text.
    #[default = true]
    pub source_map: bool,
}

/// Compiled form of one [`Specification`].
#[derive(Clone, Debug)]
pub struct Program {
    /// Source identifier of the compiled [`Specification`].
    pub uri: String,

    /// Typed block structure, one [`FeatureBlock`] per feature.
    pub features: Vec<FeatureBlock>,

    /// Rendered program text.
    pub text: String,

    /// Map from rendered lines back to specification source positions.
    pub map: CodeMap,
}

/// Compiled block of one feature.
#[derive(Clone, Debug)]
pub struct FeatureBlock {
    /// Name of the feature.
    pub name: String,

    /// Name decorated with the feature's tags, as emitted.
    pub title: String,

    /// Position of the feature in the source.
    pub location: Location,

    /// Compiled scenarios, in document order.
    pub scenarios: Vec<ScenarioBlock>,
}

/// Compiled block of one scenario.
#[derive(Clone, Debug)]
pub struct ScenarioBlock {
    /// Name of the scenario.
    pub name: String,

    /// Name decorated with the scenario's effective tags, as emitted.
    pub title: String,

    /// Position of the scenario in the source.
    pub location: Location,

    /// Normalized steps, in document order.
    pub steps: Vec<Step>,
}

/// Error of serializing a [`Step`] into the emitted program.
#[derive(Debug, Display, Error, From)]
#[display(fmt = "Failed to serialize generated code: {}", _0)]
pub struct GenerateError(serde_json::Error);

impl Generator {
    /// Compiles the given [`Specification`] into a [`Program`].
    ///
    /// # Errors
    ///
    /// [`GenerateError`], if a step or the source map fails to serialize.
    pub fn generate(
        &self,
        spec: &Specification,
    ) -> Result<Program, GenerateError> {
        let mut emitter = Emitter::new(self.indent);

        emitter.line(
            0,
            "/* DO NOT EDIT! THIS FILE WAS GENERATED BY 'cukegen'. */",
        );
        emitter.line(0, format!("import {{test}} from '{}';", self.test_module));
        emitter.line(
            0,
            format!(
                "import {{Table, StepTimeoutError}} from '{}';",
                self.runtime_module,
            ),
        );
        emitter
            .line(0, format!("import {{steps}} from '{}';", self.steps_module));
        emitter.line(0, "");
        emitter.line(0, "const deadline = (ms, step) => new Promise(");
        emitter.line(
            1,
            "(_, reject) => setTimeout(() => reject(new StepTimeoutError(step, ms)), ms));",
        );

        let features = spec
            .features
            .iter()
            .map(|feature| {
                let title = decorate(&feature.name, &feature.tags);
                emitter.mark(feature.location, &title);
                emitter.line(0, "");
                emitter.line(
                    0,
                    format!("test.describe({}, async () => {{", js_str(&title)?),
                );

                let scenarios = feature
                    .scenarios
                    .iter()
                    .map(|scenario| self.scenario(&mut emitter, scenario))
                    .collect::<Result<_, _>>()?;

                emitter.line(0, "});");

                Ok(FeatureBlock {
                    name: feature.name.clone(),
                    title,
                    location: feature.location,
                    scenarios,
                })
            })
            .collect::<Result<_, GenerateError>>()?;

        let mut text = emitter.lines.iter().join("\n");
        text.push('\n');
        if self.source_map {
            let comment = emitter
                .map
                .to_comment(
                    &format!("{}.js", spec.uri),
                    &spec.uri,
                    &spec.content,
                )
                .map_err(GenerateError)?;
            text.push_str(&comment);
            text.push('\n');
        }

        Ok(Program {
            uri: spec.uri.clone(),
            features,
            text,
            map: emitter.map,
        })
    }

    /// Emits one scenario's `test(...)` block.
    fn scenario(
        &self,
        emitter: &mut Emitter,
        scenario: &Scenario,
    ) -> Result<ScenarioBlock, GenerateError> {
        let title = decorate(&scenario.name, &scenario.tags);
        let count = scenario.steps.len();

        emitter.mark(scenario.location, &title);
        emitter.line(
            1,
            format!(
                "test({}, async ({{{FIXTURES}}}, info) => {{",
                js_str(&title)?,
            ),
        );
        emitter.line(2, "const world = steps.world();");

        for step in &scenario.steps {
            emitter.mark(step.location, &step.text);
            emitter.line(2, "{");
            emitter.line(
                3,
                format!("const found = steps.find({});", js_str_value(step)?),
            );
            emitter.line(3, "await Promise.race([");
            emitter.line(
                4,
                format!(
                    "found.handler({{{FIXTURES}, world, table: new Table({}), \
                     docString: {}, parameters: found.parameters, \
                     tokens: found.tokens}}, info),",
                    js_str_value(&step.table)?,
                    js_str_value(&step.doc_string)?,
                ),
            );
            emitter.line(
                4,
                format!(
                    "deadline({count} * info.timeout, {}),",
                    js_str(&step.text)?,
                ),
            );
            emitter.line(3, "]);");
            emitter.line(2, "}");
        }

        emitter.line(1, "});");

        Ok(ScenarioBlock {
            name: scenario.name.clone(),
            title,
            location: scenario.location,
            steps: scenario.steps.clone(),
        })
    }
}

/// Decorates a feature or scenario `name` with its `tags`, the way the
/// emitted block titles carry them.
fn decorate(name: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        name.to_owned()
    } else {
        format!("{name} {}", tags.iter().map(|t| format!("@{t}")).join(" "))
            .trim()
            .to_owned()
    }
}

/// Serializes a string as a JavaScript string literal.
fn js_str(s: &str) -> Result<String, GenerateError> {
    serde_json::to_string(s).map_err(Into::into)
}

/// Serializes any value as a JavaScript literal (`null` for `None`).
fn js_str_value<T: Serialize>(value: &T) -> Result<String, GenerateError> {
    serde_json::to_string(value).map_err(Into::into)
}

/// Line-by-line program emitter carrying the provenance marker.
struct Emitter {
    /// Spaces per indentation level.
    indent: usize,

    /// Emitted lines, unterminated.
    lines: Vec<String>,

    /// Position map built alongside the lines.
    map: CodeMap,

    /// Most recently pushed provenance marker. Markers don't consume a
    /// line; every emitted line maps to the current one.
    marker: Option<(Location, String)>,
}

impl Emitter {
    /// Creates an empty [`Emitter`] indenting by `indent` spaces per level.
    fn new(indent: usize) -> Self {
        Self { indent, lines: Vec::new(), map: CodeMap::default(), marker: None }
    }

    /// Pushes the provenance marker every following line maps to.
    fn mark(&mut self, location: Location, label: &str) {
        self.marker = Some((location, label.to_owned()));
    }

    /// Emits one line at the given nesting `depth`.
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if let Some((location, label)) = &self.marker {
            self.map.push(self.lines.len() + 1, *location, label.clone());
        }
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{text}", " ".repeat(depth * self.indent)));
        }
    }
}

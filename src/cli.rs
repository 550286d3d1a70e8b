// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI compiling feature files into test programs.
//!
//! The core stays a pure in-memory transformation; everything filesystem
//! shaped (glob discovery, reading sources, writing the `.js` program and
//! the `.d.ts` sidecar) lives here.

use std::{env, fs, path::Path, time::Duration, time::Instant};

use anyhow::Context as _;
use clap::Parser;
use console::style;

use crate::{
    codegen::Generator,
    declaration::declaration,
    dialect::{self, Dialect},
    spec::parse_specification_with,
};

/// Name of the environment variable overriding the fallback [`Dialect`] for
/// feature files without a `# language:` header.
const DIALECT_VAR: &str = "CUKEGEN_DIALECT";

/// Compiles Gherkin feature files into executable test programs.
#[derive(Clone, Debug, Parser)]
#[command(name = "cukegen", version, about)]
pub struct Opts {
    /// Glob of feature files to compile.
    #[arg(value_name = "GLOB", default_value = "**/*.feature")]
    pub glob: String,

    /// Write a `.d.ts` declaration sidecar next to each generated program.
    #[arg(long)]
    pub declarations: bool,

    /// Suppress per-file reporting.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Runs the CLI over the current directory.
///
/// # Errors
///
/// If the glob is malformed, the dialect override names no configured
/// [`Dialect`], or any discovered file fails to read, parse, generate or
/// write.
pub fn run(opts: &Opts) -> anyhow::Result<()> {
    run_in(Path::new("."), opts)
}

/// Runs the CLI over the given `base` directory.
///
/// # Errors
///
/// As [`run()`].
pub fn run_in(base: &Path, opts: &Opts) -> anyhow::Result<()> {
    let started = Instant::now();
    let fallback = fallback_dialect()?;
    let generator = Generator::default();

    let walker = globwalk::GlobWalkerBuilder::new(base, &opts.glob)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("invalid glob: {}", opts.glob))?;

    let mut compiled = 0_usize;
    let mut failed = 0_usize;
    for entry in walker.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match compile(path, fallback, &generator, opts.declarations) {
            Ok(()) => {
                compiled += 1;
                if !opts.quiet {
                    println!(
                        "{} {}",
                        style("generated").green().bold(),
                        path.display(),
                    );
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!(
                    "{} {}: {e:#}",
                    style("error").red().bold(),
                    path.display(),
                );
            }
        }
    }

    if !opts.quiet {
        let elapsed = Duration::from_millis(
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        println!(
            "{} {compiled} feature file(s) in {}",
            style("compiled").bold(),
            humantime::format_duration(elapsed),
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} feature file(s) failed to compile");
    }
    Ok(())
}

/// Compiles one feature file, writing the program and, optionally, the
/// declaration sidecar next to it.
fn compile(
    path: &Path,
    fallback: &'static Dialect,
    generator: &Generator,
    declarations: bool,
) -> anyhow::Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let uri = path.display().to_string();
    let spec = parse_specification_with(uri, text, fallback)?;
    let program = generator.generate(&spec)?;

    let out = format!("{}.js", path.display());
    fs::write(&out, &program.text)
        .with_context(|| format!("failed to write {out}"))?;

    if declarations {
        let sidecar = format!("{}.d.ts", path.display());
        fs::write(&sidecar, declaration(&spec)?)
            .with_context(|| format!("failed to write {sidecar}"))?;
    }

    Ok(())
}

/// Resolves the fallback [`Dialect`] from the [`DIALECT_VAR`] environment
/// variable, defaulting to English.
fn fallback_dialect() -> anyhow::Result<&'static Dialect> {
    env::var(DIALECT_VAR).ok().map_or(Ok(&dialect::EN), |code| {
        Dialect::get(&code)
            .with_context(|| format!("invalid {DIALECT_VAR} override"))
    })
}

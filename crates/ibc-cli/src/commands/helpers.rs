//! Parsing and output helpers shared by the subcommands.

use std::path::Path;

use ibc_engine::config::{IbcConfig, IbcProblem};
use ibc_engine::pipeline::{SearchOptions, SolverChoice};
use ibc_engine::render::{render_svg, write_svg};
use ibc_engine::systems::BuiltinSystem;
use ibc_engine::template::NumericChain;
use miette::IntoDiagnostic;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

pub(crate) fn parse_solver_choice(raw: &str) -> miette::Result<SolverChoice> {
    match raw {
        "z3" => Ok(SolverChoice::Z3),
        "cvc5" => Ok(SolverChoice::Cvc5),
        "z3-process" => Ok(SolverChoice::Z3Process),
        other => miette::bail!("Unknown solver: {other}. Use 'z3', 'cvc5' or 'z3-process'."),
    }
}

pub(crate) fn solver_name(solver: SolverChoice) -> &'static str {
    match solver {
        SolverChoice::Z3 => "z3",
        SolverChoice::Cvc5 => "cvc5",
        SolverChoice::Z3Process => "z3-process",
    }
}

pub(crate) fn parse_output_format(raw: &str) -> miette::Result<OutputFormat> {
    match raw {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => miette::bail!("Unknown format: {other}. Use 'text' or 'json'."),
    }
}

pub(crate) fn parse_system(raw: &str) -> miette::Result<BuiltinSystem> {
    raw.parse::<BuiltinSystem>().map_err(|e| miette::miette!("{e}"))
}

pub(crate) fn search_options_from_cli(cli: &Cli) -> miette::Result<SearchOptions> {
    Ok(SearchOptions {
        solver: parse_solver_choice(&cli.solver)?,
        attempt_timeout_secs: cli.timeout_secs,
        overall_timeout_secs: cli.overall_timeout_secs,
        sanity_samples: cli.samples,
    })
}

/// The selected system under either its default regions or `--config`.
pub(crate) fn load_problem(system: BuiltinSystem, config: Option<&Path>) -> miette::Result<IbcProblem> {
    let config = match config {
        Some(path) => IbcConfig::from_path(path).map_err(|e| miette::miette!("{e}"))?,
        None => system.default_config(),
    };
    system
        .problem_with(&config)
        .map_err(|e| miette::miette!("{e}"))
}

pub(crate) fn print_report<T: Serialize + std::fmt::Display>(
    report: &T,
    format: OutputFormat,
) -> miette::Result<()> {
    match format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report).into_diagnostic()?),
    }
    Ok(())
}

/// Render `chain` to `path`. Failures are logged and otherwise ignored so
/// the verdict already computed stands.
pub(crate) fn write_plot<C: NumericChain>(
    problem: &IbcProblem,
    system: BuiltinSystem,
    chain: &C,
    samples: usize,
    path: &Path,
) {
    let result = render_svg(problem, chain, samples, system.var_labels())
        .and_then(|svg| write_svg(path, &svg));
    match result {
        Ok(()) => info!("plot written to {}", path.display()),
        Err(e) => {
            warn!("could not render plot: {e}");
            eprintln!("Warning: could not render plot to {}: {e}", path.display());
        }
    }
}

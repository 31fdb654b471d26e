use ibc_engine::pipeline::search;
use ibc_engine::result::SearchOutcome;
use tracing::info;

use super::helpers::{
    load_problem, parse_output_format, parse_system, print_report, search_options_from_cli,
    solver_name, write_plot,
};
use crate::cli::Cli;

pub(crate) fn run_search_command(cli: &Cli, k_max: Option<u32>) -> miette::Result<()> {
    let system = parse_system(&cli.system)?;
    let format = parse_output_format(&cli.format)?;
    let options = search_options_from_cli(cli)?;
    let mut problem = load_problem(system, cli.config.as_deref())?;
    if let Some(k_max) = k_max {
        problem = problem.with_k_max(k_max);
    }
    info!(
        system = system.name(),
        solver = solver_name(options.solver),
        k_max = problem.k_max(),
        "starting search"
    );

    let outcome = search(&problem, &options).map_err(|e| miette::miette!("{e}"))?;
    print_report(&outcome, format)?;

    if let (Some(path), SearchOutcome::Found(found)) = (&cli.out, &outcome) {
        match found.coefficients.chain(problem.basis()) {
            Ok(chain) => write_plot(&problem, system, &chain, cli.samples, path),
            Err(e) => eprintln!("Warning: could not plot chain: {e}"),
        }
    }
    Ok(())
}

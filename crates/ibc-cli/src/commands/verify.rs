use ibc_engine::pipeline::{diagnose_conditions, verify_chain};
use tracing::info;

use super::helpers::{
    load_problem, parse_output_format, parse_system, print_report, search_options_from_cli,
    solver_name, write_plot, OutputFormat,
};
use crate::cli::Cli;

pub(crate) fn run_verify_command(cli: &Cli, broken: bool, diagnose: bool) -> miette::Result<()> {
    let system = parse_system(&cli.system)?;
    let format = parse_output_format(&cli.format)?;
    let options = search_options_from_cli(cli)?;
    let problem = load_problem(system, cli.config.as_deref())?;
    let chain = if broken {
        system.broken_chain()
    } else {
        system.known_chain()
    };
    info!(
        system = system.name(),
        solver = solver_name(options.solver),
        broken,
        "verifying chain"
    );
    if format == OutputFormat::Text {
        print!("{chain}");
    }

    let mut report = verify_chain(&problem, &chain, &options).map_err(|e| miette::miette!("{e}"))?;
    if diagnose {
        report.conditions =
            diagnose_conditions(&problem, &chain, &options).map_err(|e| miette::miette!("{e}"))?;
    }
    print_report(&report, format)?;

    if let Some(path) = &cli.out {
        write_plot(&problem, system, &chain, cli.samples, path);
    }
    Ok(())
}

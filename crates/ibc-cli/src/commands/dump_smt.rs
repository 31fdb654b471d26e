use std::path::Path;

use ibc_engine::encoder::encode_synthesis;
use ibc_engine::pipeline::{dump_smt_to_file, encoding_to_smt2_script};
use miette::IntoDiagnostic;

use super::helpers::{load_problem, parse_system};
use crate::cli::Cli;

pub(crate) fn run_dump_smt_command(cli: &Cli, k: u32, output: Option<&Path>) -> miette::Result<()> {
    let system = parse_system(&cli.system)?;
    let problem = load_problem(system, cli.config.as_deref())?;
    let (encoding, _) = encode_synthesis(&problem, k);
    match output {
        Some(path) => dump_smt_to_file(&encoding, path).into_diagnostic()?,
        None => print!("{}", encoding_to_smt2_script(&encoding)),
    }
    Ok(())
}

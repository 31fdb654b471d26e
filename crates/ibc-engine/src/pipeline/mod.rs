//! Search and verification drivers on top of a solver backend.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

mod adapter;
mod search;
mod smt_dump;
mod timeout;
mod verify;

pub use adapter::{check_encoding, CheckOutcome};
pub use search::{search, search_with};
pub use smt_dump::{dump_smt_to_file, encoding_to_smt2_script};
pub use verify::{diagnose_conditions, diagnose_conditions_with, verify_chain, verify_chain_with};

#[derive(Debug, Error)]
pub enum IbcError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Solver error: {0}")]
    Solver(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which solver backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverChoice {
    /// In-process Z3.
    #[default]
    Z3,
    /// `cvc5` subprocess over SMT-LIB2.
    Cvc5,
    /// `z3 -in` subprocess over SMT-LIB2.
    Z3Process,
}

/// Options for search and verification runs.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub solver: SolverChoice,
    /// Per-check limit in seconds; 0 means none.
    pub attempt_timeout_secs: u64,
    /// Limit on the whole run in seconds; 0 means none.
    pub overall_timeout_secs: u64,
    /// Grid points per axis for the numeric re-check; 0 skips it.
    pub sanity_samples: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            solver: SolverChoice::Z3,
            attempt_timeout_secs: 0,
            overall_timeout_secs: 0,
            sanity_samples: 100,
        }
    }
}

/// Binds `$factory` to a `FnMut(u64) -> Result<S, S::Error>` building the
/// backend chosen by `$choice` with the given timeout, then evaluates `$body`.
macro_rules! with_solver_factory {
    ($choice:expr, $factory:ident => $body:expr) => {{
        use ibc_smt::backends::smtlib_process::{SmtLibProcessSolver, SolverDialect};
        use ibc_smt::backends::z3_backend::{Z3Error, Z3Solver};
        match $choice {
            $crate::pipeline::SolverChoice::Z3 => {
                let $factory = |secs: u64| -> Result<Z3Solver, Z3Error> {
                    Ok(Z3Solver::with_timeout_secs(secs))
                };
                $body
            }
            $crate::pipeline::SolverChoice::Cvc5 => {
                let $factory =
                    |secs: u64| SmtLibProcessSolver::with_timeout_secs(SolverDialect::Cvc5, secs);
                $body
            }
            $crate::pipeline::SolverChoice::Z3Process => {
                let $factory =
                    |secs: u64| SmtLibProcessSolver::with_timeout_secs(SolverDialect::Z3, secs);
                $body
            }
        }
    }};
}
pub(crate) use with_solver_factory;

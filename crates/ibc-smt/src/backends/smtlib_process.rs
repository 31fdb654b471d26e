use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::debug;

use crate::backends::smtlib_printer::{sort_to_smtlib, to_smtlib};
use crate::backends::smtlib_values::{
    parens_balanced, parse_get_value_response, parse_real_value, ValueParseError,
};
use crate::solver::{Model, ModelValue, SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Quantified nonlinear real arithmetic.
pub const LOGIC: &str = "NRA";

#[derive(Debug, Error)]
pub enum SmtLibProcessError {
    #[error("solver I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("solver not found: {0}")]
    NotFound(String),
    #[error("solver error: {0}")]
    SolverError(String),
    #[error("Failed to parse solver output: {0}")]
    ParseError(#[from] ValueParseError),
}

/// Which command line dialect to speak when launching the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverDialect {
    Cvc5,
    Z3,
}

/// Last non-empty line a solver wrote to stderr. A background thread keeps
/// the pipe empty so a solver printing warnings never blocks on it.
#[derive(Clone, Default)]
struct StderrTail(Arc<Mutex<String>>);

impl StderrTail {
    fn drain<R: Read + Send + 'static>(source: R) -> (Self, JoinHandle<()>) {
        let tail = Self::default();
        let sink = tail.clone();
        let handle = thread::spawn(move || {
            for line in BufReader::new(source).lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                if let Ok(mut last) = sink.0.lock() {
                    *last = line;
                }
            }
        });
        (tail, handle)
    }

    fn last_line(&self) -> String {
        self.0.lock().map(|s| s.trim().to_string()).unwrap_or_default()
    }
}

/// SMT-LIB2 solver driven over stdin/stdout.
pub struct SmtLibProcessSolver {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: StderrTail,
    dialect: SolverDialect,
    vars: HashMap<String, SmtSort>,
}

impl SmtLibProcessSolver {
    pub fn cvc5() -> Result<Self, SmtLibProcessError> {
        Self::with_command_and_timeout("cvc5", SolverDialect::Cvc5, None)
    }

    pub fn z3() -> Result<Self, SmtLibProcessError> {
        Self::with_command_and_timeout("z3", SolverDialect::Z3, None)
    }

    /// Zero means no limit.
    pub fn with_timeout_secs(
        dialect: SolverDialect,
        timeout_secs: u64,
    ) -> Result<Self, SmtLibProcessError> {
        let cmd = match dialect {
            SolverDialect::Cvc5 => "cvc5",
            SolverDialect::Z3 => "z3",
        };
        if timeout_secs == 0 {
            return Self::with_command_and_timeout(cmd, dialect, None);
        }
        let timeout_ms = timeout_secs.saturating_mul(1000);
        Self::with_command_and_timeout(cmd, dialect, Some(timeout_ms))
    }

    pub fn with_command_and_timeout(
        cmd: &str,
        dialect: SolverDialect,
        timeout_ms: Option<u64>,
    ) -> Result<Self, SmtLibProcessError> {
        let mut args: Vec<String> = match dialect {
            SolverDialect::Cvc5 => vec![
                "--lang".to_string(),
                "smt2".to_string(),
                "--incremental".to_string(),
                "--produce-models".to_string(),
            ],
            SolverDialect::Z3 => vec!["-in".to_string(), "-smt2".to_string()],
        };
        if let Some(ms) = timeout_ms {
            match dialect {
                SolverDialect::Cvc5 => args.push(format!("--tlimit-per={ms}")),
                SolverDialect::Z3 => args.push(format!("-t:{ms}")),
            }
        }

        let mut child = Command::new(cmd)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SmtLibProcessError::NotFound(format!("{cmd}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SmtLibProcessError::SolverError("failed to capture stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SmtLibProcessError::SolverError("failed to capture stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SmtLibProcessError::SolverError("failed to capture stderr".into()))?;

        let mut solver = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr: StderrTail::drain(stderr).0,
            dialect,
            vars: HashMap::new(),
        };

        solver.start_session()?;
        Ok(solver)
    }

    fn start_session(&mut self) -> Result<(), SmtLibProcessError> {
        if self.dialect == SolverDialect::Z3 {
            self.send_command_no_response("(set-option :produce-models true)")?;
        }
        self.send_command_no_response(&format!("(set-logic {LOGIC})"))
    }

    /// Send a command and read one complete s-expression (or atom) back.
    fn send_command(&mut self, cmd: &str) -> Result<String, SmtLibProcessError> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;

        let mut response = String::new();
        loop {
            let mut line = String::new();
            let read = self.stdout.read_line(&mut line)?;
            if read == 0 {
                return Err(SmtLibProcessError::SolverError(format!(
                    "No response from solver for command `{}`. stderr: {}",
                    truncate(cmd),
                    self.stderr.last_line()
                )));
            }
            response.push_str(&line);
            if parens_balanced(&response) && !response.trim().is_empty() {
                break;
            }
        }
        Ok(response.trim().to_string())
    }

    fn send_command_no_response(&mut self, cmd: &str) -> Result<(), SmtLibProcessError> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn parse_status(response: &str) -> Result<SatResult, SmtLibProcessError> {
        match response {
            "sat" => Ok(SatResult::Sat),
            "unsat" => Ok(SatResult::Unsat),
            "unknown" => Ok(SatResult::Unknown("solver returned unknown".into())),
            "timeout" => Ok(SatResult::Unknown("solver timed out".into())),
            other => Err(SmtLibProcessError::SolverError(other.to_string())),
        }
    }
}

fn truncate(cmd: &str) -> &str {
    match cmd.char_indices().nth(120) {
        Some((idx, _)) => &cmd[..idx],
        None => cmd,
    }
}

impl Drop for SmtLibProcessSolver {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "(exit)");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

impl SmtSolver for SmtLibProcessSolver {
    type Error = SmtLibProcessError;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), SmtLibProcessError> {
        let sort_str = sort_to_smtlib(sort);
        self.send_command_no_response(&format!("(declare-const {name} {sort_str})"))?;
        self.vars.insert(name.to_string(), sort.clone());
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), SmtLibProcessError> {
        let smt_str = to_smtlib(term);
        self.send_command_no_response(&format!("(assert {smt_str})"))?;
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, SmtLibProcessError> {
        let response = self.send_command("(check-sat)")?;
        Self::parse_status(&response)
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), SmtLibProcessError> {
        let result = self.check_sat()?;
        if result != SatResult::Sat {
            return Ok((result, None));
        }

        let mut values = HashMap::new();
        for &(name, sort) in var_names {
            if !self.vars.contains_key(name) {
                return Err(SmtLibProcessError::SolverError(format!(
                    "model variable `{name}` is not declared"
                )));
            }
            let response = self.send_command(&format!("(get-value ({name}))"))?;
            debug!(var = name, response = response.as_str(), "model value");
            for (returned, text) in parse_get_value_response(&response)? {
                if returned != name {
                    continue;
                }
                let value = match sort {
                    SmtSort::Real => ModelValue::Real(parse_real_value(&text)?),
                    SmtSort::Bool => match text.as_str() {
                        "true" => ModelValue::Bool(true),
                        "false" => ModelValue::Bool(false),
                        other => {
                            return Err(SmtLibProcessError::SolverError(format!(
                                "unexpected Bool value `{other}` for `{name}`"
                            )))
                        }
                    },
                };
                values.insert(name.to_string(), value);
            }
        }

        Ok((SatResult::Sat, Some(Model { values })))
    }

    fn reset(&mut self) -> Result<(), SmtLibProcessError> {
        self.send_command_no_response("(reset)")?;
        self.start_session()?;
        self.vars.clear();
        Ok(())
    }
}

use serde::Serialize;
use std::fmt;

use crate::encoder::ConditionKind;
use crate::extract::ReconstructedCoefficients;
use crate::sanity::SanityViolation;

/// How one chain length fared during search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptVerdict {
    Satisfiable,
    Unsatisfiable,
    /// The solver gave up, timed out, or the overall deadline had passed.
    Unknown { reason: String },
    /// The backend failed before answering, or its model could not be read.
    Failed { reason: String },
    /// The solver answered sat but the chain failed the numeric re-check.
    Rejected { violations: Vec<SanityViolation> },
}

impl fmt::Display for AttemptVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptVerdict::Satisfiable => write!(f, "sat"),
            AttemptVerdict::Unsatisfiable => write!(f, "unsat"),
            AttemptVerdict::Unknown { reason } => write!(f, "unknown ({reason})"),
            AttemptVerdict::Failed { reason } => write!(f, "failed ({reason})"),
            AttemptVerdict::Rejected { violations } => match violations.first() {
                Some(v) => write!(
                    f,
                    "rejected ({} sampled checks failed, first: {} of B_{} at {:?} = {})",
                    violations.len(),
                    v.condition,
                    v.certificate,
                    v.point,
                    v.value
                ),
                None => write!(f, "rejected"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub k: u32,
    pub verdict: AttemptVerdict,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoundCertificate {
    pub system: String,
    pub k: u32,
    pub coefficients: ReconstructedCoefficients,
    pub attempts: Vec<AttemptRecord>,
}

/// Result of an incremental search over chain lengths.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found(FoundCertificate),
    NotFound {
        system: String,
        k_max: u32,
        attempts: Vec<AttemptRecord>,
    },
}

impl SearchOutcome {
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            SearchOutcome::Found(found) => &found.attempts,
            SearchOutcome::NotFound { attempts, .. } => attempts,
        }
    }

    pub fn certificate(&self) -> Option<&FoundCertificate> {
        match self {
            SearchOutcome::Found(found) => Some(found),
            SearchOutcome::NotFound { .. } => None,
        }
    }
}

fn write_attempts(f: &mut fmt::Formatter<'_>, attempts: &[AttemptRecord]) -> fmt::Result {
    for attempt in attempts {
        writeln!(
            f,
            "  k = {}: {} in {} ms",
            attempt.k, attempt.verdict, attempt.elapsed_ms
        )?;
    }
    Ok(())
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Found(found) => {
                writeln!(f, "RESULT: IBC FOUND")?;
                writeln!(f, "System {}, chain length k = {}.", found.system, found.k)?;
                writeln!(f, "Attempts:")?;
                write_attempts(f, &found.attempts)?;
                write!(f, "Coefficients (highest degree first):")?;
                for (i, cert) in found.coefficients.certificates.iter().enumerate() {
                    write!(f, "\n  i={i}: {cert:?}")?;
                }
                Ok(())
            }
            SearchOutcome::NotFound {
                system,
                k_max,
                attempts,
            } => {
                writeln!(f, "RESULT: NO IBC FOUND")?;
                writeln!(f, "System {system}, searched k = 0..={k_max}.")?;
                writeln!(f, "Attempts:")?;
                write_attempts(f, attempts)
            }
        }
    }
}

/// Answer for a chain with fixed coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationVerdict {
    Holds,
    Violated,
    Unknown { reason: String },
}

impl fmt::Display for VerificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationVerdict::Holds => write!(f, "holds"),
            VerificationVerdict::Violated => write!(f, "violated"),
            VerificationVerdict::Unknown { reason } => write!(f, "unknown ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionReport {
    pub condition: ConditionKind,
    pub verdict: VerificationVerdict,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub system: String,
    pub k: u32,
    pub verdict: VerificationVerdict,
    pub elapsed_ms: u64,
    /// Per-condition answers, filled in only when diagnosis was requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionReport>,
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headline = match self.verdict {
            VerificationVerdict::Holds => "RESULT: CHAIN VERIFIED",
            VerificationVerdict::Violated => "RESULT: CHAIN REJECTED",
            VerificationVerdict::Unknown { .. } => "RESULT: UNKNOWN",
        };
        writeln!(f, "{headline}")?;
        write!(
            f,
            "System {}, k = {}: {} in {} ms",
            self.system, self.k, self.verdict, self.elapsed_ms
        )?;
        for cond in &self.conditions {
            write!(
                f,
                "\n  {}: {} in {} ms",
                cond.condition, cond.verdict, cond.elapsed_ms
            )?;
        }
        Ok(())
    }
}

//! Search and verification driver behavior against a scripted solver.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use ibc_engine::numeric::{linspace, polyval, ratio};
use ibc_engine::pipeline::{
    diagnose_conditions_with, search_with, verify_chain_with, IbcError, SearchOptions,
};
use ibc_engine::result::{AttemptVerdict, SearchOutcome, VerificationVerdict};
use ibc_engine::systems;
use ibc_engine::template::{CoeffKey, CoefficientTable};
use ibc_smt::solver::{Model, ModelValue, SatResult, SmtSolver};
use ibc_smt::sorts::SmtSort;
use ibc_smt::terms::SmtTerm;
use num::rational::BigRational;

/// Answers each check with the next scripted result. Every instance shares
/// the script and the call log with the test.
struct ScriptedSolver {
    script: Rc<RefCell<VecDeque<SatResult>>>,
    values: Rc<HashMap<String, BigRational>>,
    delay: Duration,
    declared: Vec<String>,
}

impl SmtSolver for ScriptedSolver {
    type Error = io::Error;

    fn declare_var(&mut self, name: &str, _sort: &SmtSort) -> Result<(), io::Error> {
        self.declared.push(name.to_string());
        Ok(())
    }

    fn assert(&mut self, _term: &SmtTerm) -> Result<(), io::Error> {
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, io::Error> {
        std::thread::sleep(self.delay);
        self.script
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "script exhausted"))
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), io::Error> {
        let result = self.check_sat()?;
        if result != SatResult::Sat {
            return Ok((result, None));
        }
        let mut model = Model::default();
        for (name, _) in var_names {
            if let Some(v) = self.values.get(*name) {
                model
                    .values
                    .insert(name.to_string(), ModelValue::Real(v.clone()));
            }
        }
        Ok((SatResult::Sat, Some(model)))
    }

    fn reset(&mut self) -> Result<(), io::Error> {
        self.declared.clear();
        Ok(())
    }
}

struct Harness {
    script: Rc<RefCell<VecDeque<SatResult>>>,
    values: Rc<HashMap<String, BigRational>>,
    delay: Duration,
    timeouts: Rc<RefCell<Vec<u64>>>,
    fail_on_call: Option<usize>,
}

impl Harness {
    fn new(script: Vec<SatResult>, values: HashMap<String, BigRational>) -> Self {
        Self {
            script: Rc::new(RefCell::new(script.into())),
            values: Rc::new(values),
            delay: Duration::ZERO,
            timeouts: Rc::new(RefCell::new(Vec::new())),
            fail_on_call: None,
        }
    }

    fn factory(&self) -> impl FnMut(u64) -> Result<ScriptedSolver, io::Error> + '_ {
        move |secs| {
            let call = self.timeouts.borrow().len();
            self.timeouts.borrow_mut().push(secs);
            if self.fail_on_call == Some(call) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such solver"));
            }
            Ok(ScriptedSolver {
                script: Rc::clone(&self.script),
                values: Rc::clone(&self.values),
                delay: self.delay,
                declared: Vec::new(),
            })
        }
    }

    fn calls(&self) -> usize {
        self.timeouts.borrow().len()
    }
}

/// Model values for `B_0 = 1.95 - x`, `B_1 = x - 1.55` at `k = 1`.
fn linear_k1_values() -> HashMap<String, BigRational> {
    let table = CoefficientTable::new(1, 2);
    let coeffs = [[ratio(39, 20), ratio(-1, 1)], [ratio(-31, 20), ratio(1, 1)]];
    let mut values = HashMap::new();
    for cert in 0..2 {
        for mono in 0..2 {
            let key = CoeffKey {
                certificate: cert,
                monomial: mono,
            };
            let name = table.name(key).expect("in range").to_string();
            values.insert(name, coeffs[cert][mono].clone());
        }
    }
    values
}

#[test]
fn search_stops_at_first_satisfiable_length() {
    let problem = systems::linear_1d().expect("built-in");
    let harness = Harness::new(vec![SatResult::Unsat, SatResult::Sat], linear_k1_values());
    let outcome =
        search_with(&problem, &SearchOptions::default(), harness.factory()).expect("search runs");

    assert_eq!(harness.calls(), 2, "no solver may be built past the first sat");
    let found = outcome.certificate().expect("chain found");
    assert_eq!(found.k, 1);
    assert_eq!(found.attempts.len(), 2);
    assert_eq!(found.attempts[0].verdict, AttemptVerdict::Unsatisfiable);
    assert_eq!(found.attempts[1].verdict, AttemptVerdict::Satisfiable);
    assert_eq!(
        found.coefficients.certificates,
        vec![vec![-1.0, 1.95], vec![1.0, -1.55]]
    );
}

#[test]
fn found_chain_satisfies_conditions_on_a_hundred_point_grid() {
    let problem = systems::linear_1d().expect("built-in");
    let harness = Harness::new(vec![SatResult::Unsat, SatResult::Sat], linear_k1_values());
    let outcome =
        search_with(&problem, &SearchOptions::default(), harness.factory()).expect("search runs");
    let found = outcome.certificate().expect("chain found");
    let b = &found.coefficients.certificates;
    let last = b.len() - 1;

    for x in linspace(0.0, 3.0, 100) {
        if (2.0..=2.3).contains(&x) {
            assert!(polyval(&b[0], x) <= 0.0, "initiation at {x}");
        }
        if (1.6..=1.9).contains(&x) {
            for cert in b {
                assert!(polyval(cert, x) > 0.0, "separation at {x}");
            }
        }
        for j in 0..=last {
            if polyval(&b[j], x) <= 0.0 {
                let target = if j < last { j + 1 } else { j };
                assert!(polyval(&b[target], x / 2.0) <= 0.0, "step from B_{j} at {x}");
            }
        }
    }
}

#[test]
fn exhausted_search_reports_every_attempt() {
    let problem = systems::linear_1d().expect("built-in");
    let harness = Harness::new(vec![SatResult::Unsat; 4], HashMap::new());
    let outcome =
        search_with(&problem, &SearchOptions::default(), harness.factory()).expect("search runs");
    assert_eq!(harness.calls(), 4);
    match outcome {
        SearchOutcome::NotFound { k_max, attempts, .. } => {
            assert_eq!(k_max, 3);
            let ks: Vec<u32> = attempts.iter().map(|a| a.k).collect();
            assert_eq!(ks, vec![0, 1, 2, 3]);
        }
        other => panic!("expected no chain, got {other}"),
    }
}

#[test]
fn unknown_and_backend_failures_move_on() {
    let problem = systems::linear_1d().expect("built-in");
    let mut harness = Harness::new(
        vec![SatResult::Unknown("timeout".into()), SatResult::Unsat],
        HashMap::new(),
    );
    harness.fail_on_call = Some(1);
    let outcome =
        search_with(&problem, &SearchOptions::default(), harness.factory()).expect("search runs");
    let verdicts: Vec<&AttemptVerdict> = outcome.attempts().iter().map(|a| &a.verdict).collect();
    assert!(matches!(verdicts[0], AttemptVerdict::Unknown { reason } if reason == "timeout"));
    assert!(matches!(verdicts[1], AttemptVerdict::Failed { reason } if reason.contains("no such solver")));
    assert_eq!(verdicts[2], &AttemptVerdict::Unsatisfiable);
    // script exhausted at k = 3
    assert!(matches!(verdicts[3], AttemptVerdict::Failed { .. }));
    assert!(outcome.certificate().is_none());
}

#[test]
fn per_attempt_timeout_reaches_every_solver() {
    let problem = systems::linear_1d().expect("built-in").with_k_max(1);
    let harness = Harness::new(vec![SatResult::Unsat; 2], HashMap::new());
    let options = SearchOptions {
        attempt_timeout_secs: 7,
        ..SearchOptions::default()
    };
    search_with(&problem, &options, harness.factory()).expect("search runs");
    assert_eq!(*harness.timeouts.borrow(), vec![7, 7]);
}

#[test]
fn expired_deadline_skips_remaining_lengths() {
    let problem = systems::linear_1d().expect("built-in");
    let mut harness = Harness::new(vec![SatResult::Unsat; 4], HashMap::new());
    harness.delay = Duration::from_millis(1100);
    let options = SearchOptions {
        overall_timeout_secs: 1,
        ..SearchOptions::default()
    };
    let outcome = search_with(&problem, &options, harness.factory()).expect("search runs");
    assert_eq!(harness.calls(), 1);
    let attempts = outcome.attempts();
    assert_eq!(attempts.len(), 4);
    for attempt in &attempts[1..] {
        assert_eq!(
            attempt.verdict,
            AttemptVerdict::Unknown {
                reason: format!("k = {} timed out before completion.", attempt.k)
            }
        );
    }
}

/// Every coefficient of the `k = 0` template set to one: `B_0 = x + 1`,
/// which is positive on the initial region.
fn all_ones_k0_values() -> HashMap<String, BigRational> {
    CoefficientTable::new(0, 2)
        .entries()
        .map(|(_, name)| (name.to_string(), ratio(1, 1)))
        .collect()
}

#[test]
fn chain_failing_the_numeric_recheck_is_rejected_and_search_continues() {
    let problem = systems::linear_1d().expect("built-in");
    let mut values = all_ones_k0_values();
    values.extend(linear_k1_values());
    let harness = Harness::new(vec![SatResult::Sat, SatResult::Sat], values);
    let outcome =
        search_with(&problem, &SearchOptions::default(), harness.factory()).expect("search runs");

    assert_eq!(harness.calls(), 2);
    let found = outcome.certificate().expect("k = 1 chain accepted");
    assert_eq!(found.k, 1);
    assert_eq!(
        found.coefficients.certificates,
        vec![vec![-1.0, 1.95], vec![1.0, -1.55]]
    );
    match &found.attempts[0].verdict {
        AttemptVerdict::Rejected { violations } => {
            assert!(!violations.is_empty());
            assert!(violations.iter().all(|v| v.certificate == 0));
        }
        other => panic!("expected k = 0 to be rejected, got {other}"),
    }
    assert_eq!(found.attempts[1].verdict, AttemptVerdict::Satisfiable);
}

#[test]
fn zero_samples_skip_the_numeric_recheck() {
    let problem = systems::linear_1d().expect("built-in");
    let harness = Harness::new(vec![SatResult::Sat], all_ones_k0_values());
    let options = SearchOptions {
        sanity_samples: 0,
        ..SearchOptions::default()
    };
    let outcome = search_with(&problem, &options, harness.factory()).expect("unchecked");
    assert_eq!(outcome.certificate().map(|c| c.k), Some(0));
}

#[test]
fn incomplete_model_is_recorded_and_search_continues() {
    let problem = systems::linear_1d().expect("built-in");
    let harness = Harness::new(
        vec![SatResult::Sat, SatResult::Unsat, SatResult::Unsat, SatResult::Unsat],
        HashMap::new(),
    );
    let outcome =
        search_with(&problem, &SearchOptions::default(), harness.factory()).expect("search runs");
    assert_eq!(harness.calls(), 4);
    assert!(outcome.certificate().is_none());
    let attempts = outcome.attempts();
    assert_eq!(attempts.len(), 4);
    assert!(matches!(
        &attempts[0].verdict,
        AttemptVerdict::Failed { reason } if reason.starts_with("coefficient extraction failed")
    ));
    assert!(attempts[1..]
        .iter()
        .all(|a| a.verdict == AttemptVerdict::Unsatisfiable));
}

#[test]
fn fixed_chain_verification_checks_once() {
    let problem = systems::linear_1d().expect("built-in");
    let harness = Harness::new(vec![SatResult::Sat], HashMap::new());
    let report = verify_chain_with(
        &problem,
        &systems::linear_1d_chain(),
        &SearchOptions::default(),
        harness.factory(),
    )
    .expect("verification runs");
    assert_eq!(harness.calls(), 1);
    assert_eq!(report.k, 1);
    assert_eq!(report.verdict, VerificationVerdict::Holds);
}

#[test]
fn diagnosis_uses_a_fresh_solver_per_condition() {
    let problem = systems::linear_1d().expect("built-in");
    let harness = Harness::new(
        vec![
            SatResult::Sat,
            SatResult::Unsat,
            SatResult::Sat,
            SatResult::Unknown("gave up".into()),
        ],
        HashMap::new(),
    );
    let reports = diagnose_conditions_with(
        &problem,
        &systems::linear_1d_chain(),
        &SearchOptions::default(),
        harness.factory(),
    )
    .expect("diagnosis runs");
    assert_eq!(harness.calls(), 4);
    let verdicts: Vec<VerificationVerdict> = reports.into_iter().map(|r| r.verdict).collect();
    assert_eq!(verdicts[0], VerificationVerdict::Holds);
    assert_eq!(verdicts[1], VerificationVerdict::Violated);
    assert_eq!(verdicts[2], VerificationVerdict::Holds);
    assert!(matches!(&verdicts[3], VerificationVerdict::Unknown { reason } if reason == "gave up"));
}

#[test]
fn verification_surfaces_backend_errors() {
    let problem = systems::linear_1d().expect("built-in");
    let mut harness = Harness::new(Vec::new(), HashMap::new());
    harness.fail_on_call = Some(0);
    let err = verify_chain_with(
        &problem,
        &systems::linear_1d_chain(),
        &SearchOptions::default(),
        harness.factory(),
    )
    .unwrap_err();
    assert!(matches!(err, IbcError::Solver(msg) if msg.contains("no such solver")));
}

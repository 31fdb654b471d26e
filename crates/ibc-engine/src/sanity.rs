//! Numeric re-check of a chain on sample grids.
//!
//! A solver answer is only as good as the coefficients read back from its
//! model. Evaluating the four conditions on grids of concrete points catches
//! a chain whose coefficients were misassigned or lost precision.

use serde::Serialize;

use crate::config::IbcProblem;
use crate::encoder::ConditionKind;
use crate::template::NumericChain;

/// Slack allowed when comparing against zero.
pub const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanityViolation {
    pub condition: ConditionKind,
    pub certificate: usize,
    pub point: Vec<f64>,
    pub value: f64,
}

/// Evaluate the conditions at `samples_per_axis` points along each axis of
/// the relevant box. An implication is only checked where its premise holds
/// with margin, so points on a sublevel boundary do not count.
pub fn check_chain<C: NumericChain>(
    problem: &IbcProblem,
    chain: &C,
    samples_per_axis: usize,
) -> Vec<SanityViolation> {
    let count = chain.certificate_count();
    if count == 0 {
        return Vec::new();
    }
    let last = count - 1;
    let mut violations = Vec::new();

    for point in problem.initial().grid(samples_per_axis) {
        let value = chain.eval(0, &point);
        if !nonpositive(value) {
            violations.push(SanityViolation {
                condition: ConditionKind::Initiation,
                certificate: 0,
                point,
                value,
            });
        }
    }

    for point in problem.unsafe_set().grid(samples_per_axis) {
        for i in 0..count {
            let value = chain.eval(i, &point);
            if !positive(value) {
                violations.push(SanityViolation {
                    condition: ConditionKind::Separation,
                    certificate: i,
                    point: point.clone(),
                    value,
                });
            }
        }
    }

    for point in problem.state_space().grid(samples_per_axis) {
        let next = problem.dynamics().apply(&point);
        for j in 0..count {
            if !strictly_nonpositive(chain.eval(j, &point)) {
                continue;
            }
            let (condition, target) = if j < last {
                (ConditionKind::Chained, j + 1)
            } else {
                (ConditionKind::Terminal, j)
            };
            let value = chain.eval(target, &next);
            if !nonpositive(value) {
                violations.push(SanityViolation {
                    condition,
                    certificate: target,
                    point: point.clone(),
                    value,
                });
            }
        }
    }

    violations
}

fn nonpositive(value: f64) -> bool {
    value <= TOLERANCE
}

fn positive(value: f64) -> bool {
    value > -TOLERANCE
}

fn strictly_nonpositive(value: f64) -> bool {
    value <= -TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::ratio;
    use crate::systems;
    use crate::template::FixedChain;

    fn linear_chain(b0_const: (i64, i64), b1_const: (i64, i64)) -> FixedChain {
        FixedChain::from_basis(
            &systems::BuiltinSystem::Linear1d.basis(),
            vec![
                vec![ratio(b0_const.0, b0_const.1), ratio(-1, 1)],
                vec![ratio(b1_const.0, b1_const.1), ratio(1, 1)],
            ],
        )
    }

    #[test]
    fn valid_linear_chain_passes() {
        let problem = systems::linear_1d().expect("built-in");
        let chain = linear_chain((39, 20), (-31, 20));
        assert!(check_chain(&problem, &chain, 100).is_empty());
    }

    #[test]
    fn shifted_initiation_is_caught() {
        let problem = systems::linear_1d().expect("built-in");
        // B_0 = 2.1 - x is positive on [2, 2.1)
        let chain = linear_chain((21, 10), (-31, 20));
        let violations = check_chain(&problem, &chain, 100);
        assert!(violations
            .iter()
            .any(|v| v.condition == ConditionKind::Initiation));
    }

    #[test]
    fn published_lotka_volterra_chain_passes() {
        let problem = systems::lotka_volterra().expect("built-in");
        let chain = systems::lotka_volterra_chain();
        assert!(check_chain(&problem, &chain, 41).is_empty());
    }

    #[test]
    fn broken_lotka_volterra_chain_fails_separation() {
        let problem = systems::lotka_volterra().expect("built-in");
        let chain = systems::lotka_volterra_broken_chain();
        let violations = check_chain(&problem, &chain, 41);
        assert!(violations
            .iter()
            .any(|v| v.condition == ConditionKind::Separation && v.certificate == 0));
    }

    #[test]
    fn nan_values_are_violations() {
        struct Nan;
        impl NumericChain for Nan {
            fn certificate_count(&self) -> usize {
                1
            }
            fn eval(&self, _: usize, _: &[f64]) -> f64 {
                f64::NAN
            }
        }
        let problem = systems::linear_1d().expect("built-in");
        let violations = check_chain(&problem, &Nan, 5);
        assert_eq!(violations.len(), 10);
    }
}

//! Built-in systems: dynamics, template bases, default regions, and known
//! chains for verification.

use std::fmt;
use std::str::FromStr;

use num::bigint::BigInt;
use num::rational::BigRational;

use crate::config::{ConfigError, IbcConfig, IbcProblem};
use crate::numeric::ratio;
use crate::polynomial::{Monomial, MonomialBasis, Polynomial, PolynomialMap};
use crate::template::FixedChain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinSystem {
    /// `x' = x / 2` on the real line.
    Linear1d,
    /// Sampled Lotka-Volterra predator/prey model, state `(v, p)`.
    LotkaVolterra,
}

impl BuiltinSystem {
    pub const ALL: [BuiltinSystem; 2] = [BuiltinSystem::Linear1d, BuiltinSystem::LotkaVolterra];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinSystem::Linear1d => "linear-1d",
            BuiltinSystem::LotkaVolterra => "lotka-volterra",
        }
    }

    /// Axis labels for display.
    pub fn var_labels(self) -> &'static [&'static str] {
        match self {
            BuiltinSystem::Linear1d => &["x"],
            BuiltinSystem::LotkaVolterra => &["v", "p"],
        }
    }

    pub fn dynamics(self) -> PolynomialMap {
        match self {
            BuiltinSystem::Linear1d => PolynomialMap::new(vec![Polynomial::new(
                1,
                vec![(ratio(1, 2), Monomial::new(vec![1]))],
            )]),
            BuiltinSystem::LotkaVolterra => lotka_volterra_dynamics(),
        }
    }

    pub fn basis(self) -> MonomialBasis {
        match self {
            BuiltinSystem::Linear1d => MonomialBasis::full(1, 1),
            BuiltinSystem::LotkaVolterra => MonomialBasis::full(2, 3),
        }
    }

    pub fn default_config(self) -> IbcConfig {
        match self {
            BuiltinSystem::Linear1d => IbcConfig {
                k_max: 3,
                initial_region: vec![2.0, 2.3],
                unsafe_region: vec![1.6, 1.9],
                state_space: vec![0.0, 3.0],
            },
            BuiltinSystem::LotkaVolterra => IbcConfig {
                k_max: 1,
                initial_region: vec![6.0, 7.0, 2.0, 3.0],
                unsafe_region: vec![3.0, 5.0, 0.0, 3.0],
                state_space: vec![0.0, 10.0, 0.0, 5.0],
            },
        }
    }

    pub fn problem(self) -> Result<IbcProblem, ConfigError> {
        self.problem_with(&self.default_config())
    }

    /// The system's dynamics and template under user-supplied regions.
    pub fn problem_with(self, config: &IbcConfig) -> Result<IbcProblem, ConfigError> {
        IbcProblem::new(self.name(), config, self.dynamics(), self.basis())
    }

    /// A chain known to satisfy all four conditions on the default regions.
    pub fn known_chain(self) -> FixedChain {
        match self {
            BuiltinSystem::Linear1d => linear_1d_chain(),
            BuiltinSystem::LotkaVolterra => lotka_volterra_chain(),
        }
    }

    /// [`Self::known_chain`] with the constant term of `B_0` negated.
    pub fn broken_chain(self) -> FixedChain {
        let dim = self.basis().dim();
        self.known_chain()
            .map_certificate(0, |b0| b0.with_negated_term(&Monomial::constant(dim)))
    }
}

impl fmt::Display for BuiltinSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinSystem::ALL
            .into_iter()
            .find(|sys| sys.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = BuiltinSystem::ALL.iter().map(|s| s.name()).collect();
                format!("unknown system `{s}` (expected one of: {})", known.join(", "))
            })
    }
}

pub fn linear_1d() -> Result<IbcProblem, ConfigError> {
    BuiltinSystem::Linear1d.problem()
}

pub fn lotka_volterra() -> Result<IbcProblem, ConfigError> {
    BuiltinSystem::LotkaVolterra.problem()
}

/// `B_0 = 1.95 - x`, `B_1 = x - 1.55`.
pub fn linear_1d_chain() -> FixedChain {
    FixedChain::from_basis(
        &BuiltinSystem::Linear1d.basis(),
        vec![
            vec![ratio(39, 20), ratio(-1, 1)],
            vec![ratio(-31, 20), ratio(1, 1)],
        ],
    )
}

/// `v' = v + T(a v (1 - v) - b v p)`, `p' = p + T(-g p + d v p)` with
/// `a = 1.1, b = 0.4, g = 0.4, d = 0.1, T = 0.1`, expanded.
fn lotka_volterra_dynamics() -> PolynomialMap {
    let v = Monomial::new(vec![1, 0]);
    let p = Monomial::new(vec![0, 1]);
    let vv = Monomial::new(vec![2, 0]);
    let vp = Monomial::new(vec![1, 1]);
    PolynomialMap::new(vec![
        Polynomial::new(
            2,
            vec![
                (ratio(111, 100), v),
                (ratio(-11, 100), vv),
                (ratio(-1, 25), vp.clone()),
            ],
        ),
        Polynomial::new(2, vec![(ratio(24, 25), p), (ratio(1, 100), vp)]),
    ])
}

fn five_places(scaled: i64) -> BigRational {
    BigRational::new(BigInt::from(scaled), BigInt::from(100_000))
}

/// Two-certificate cubic chain for the Lotka-Volterra model, in basis order
/// `1, v, p, v^2, vp, p^2, v^3, v^2p, vp^2, p^3`.
pub fn lotka_volterra_chain() -> FixedChain {
    let b0 = [
        534_744, 577_075, 322_429, -152_807, -355_885, 215_320, 13_305, 16_826, -11_002, 30_322,
    ];
    let b1 = [
        -1_269_347, -671_922, 158_361, 299_671, -13_358, -51_050, 24_199, 22_602, 14_704, 12_850,
    ];
    FixedChain::from_basis(
        &BuiltinSystem::LotkaVolterra.basis(),
        vec![
            b0.iter().map(|&c| five_places(c)).collect(),
            b1.iter().map(|&c| five_places(c)).collect(),
        ],
    )
}

pub fn lotka_volterra_broken_chain() -> FixedChain {
    BuiltinSystem::LotkaVolterra.broken_chain()
}

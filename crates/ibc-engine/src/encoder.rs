//! Builds the four quantified IBC conditions for one chain length.

use std::fmt;

use ibc_smt::sorts::SmtSort;
use ibc_smt::terms::SmtTerm;
use serde::Serialize;

use crate::config::IbcProblem;
use crate::numeric::ratio;
use crate::template::{BarrierChain, CoefficientTable, FixedChain, SymbolicChain};

/// State variable names `x0, x1, ...`, shared by every quantifier.
pub fn state_var_names(dim: usize) -> Vec<String> {
    (0..dim).map(|i| format!("x{i}")).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Initiation,
    Separation,
    Chained,
    Terminal,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 4] = [
        ConditionKind::Initiation,
        ConditionKind::Separation,
        ConditionKind::Chained,
        ConditionKind::Terminal,
    ];
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionKind::Initiation => write!(f, "initiation"),
            ConditionKind::Separation => write!(f, "separation"),
            ConditionKind::Chained => write!(f, "chained inductiveness"),
            ConditionKind::Terminal => write!(f, "terminal inductiveness"),
        }
    }
}

/// The four conditions of a chain, each already closed under `forall`.
#[derive(Debug, Clone)]
pub struct IbcConditions {
    pub initiation: SmtTerm,
    pub separation: SmtTerm,
    /// One implication per link `B_j -> B_{j+1}`; empty when `k = 0`.
    pub chained: Vec<SmtTerm>,
    pub terminal: SmtTerm,
}

impl IbcConditions {
    /// The chained links as one term; the empty conjunction is `true`.
    pub fn chained_term(&self) -> SmtTerm {
        if self.chained.is_empty() {
            SmtTerm::bool(true)
        } else {
            SmtTerm::and(self.chained.clone())
        }
    }

    pub fn get(&self, kind: ConditionKind) -> SmtTerm {
        match kind {
            ConditionKind::Initiation => self.initiation.clone(),
            ConditionKind::Separation => self.separation.clone(),
            ConditionKind::Chained => self.chained_term(),
            ConditionKind::Terminal => self.terminal.clone(),
        }
    }

    pub fn conjoined(&self) -> SmtTerm {
        SmtTerm::and(ConditionKind::ALL.iter().map(|&kind| self.get(kind)).collect())
    }
}

/// Everything a solver needs for one check.
#[derive(Debug, Clone)]
pub struct IbcEncoding {
    pub chain_len: usize,
    pub declarations: Vec<(String, SmtSort)>,
    pub conditions: IbcConditions,
    pub assertion: SmtTerm,
    pub model_vars: Vec<(String, SmtSort)>,
}

fn build_conditions<C: BarrierChain>(problem: &IbcProblem, chain: &C) -> IbcConditions {
    let names = state_var_names(problem.dim());
    let state: Vec<SmtTerm> = names.iter().map(|n| SmtTerm::var(n.clone())).collect();
    let next = problem.dynamics().apply(&state);
    let zero = || SmtTerm::real(ratio(0, 1));
    let last = chain.len().saturating_sub(1);

    let in_space = problem.state_space().membership(&state);

    let initiation = SmtTerm::forall_reals(
        &names,
        problem
            .initial()
            .membership(&state)
            .implies(chain.barrier(0, &state).le(zero())),
    );

    let positive_everywhere: Vec<SmtTerm> = (0..chain.len())
        .map(|i| chain.barrier(i, &state).gt(zero()))
        .collect();
    let separation = SmtTerm::forall_reals(
        &names,
        problem
            .unsafe_set()
            .membership(&state)
            .implies(SmtTerm::and(positive_everywhere)),
    );

    let chained = (0..last)
        .map(|j| {
            let premise = SmtTerm::and(vec![in_space.clone(), chain.barrier(j, &state).le(zero())]);
            SmtTerm::forall_reals(
                &names,
                premise.implies(chain.barrier(j + 1, &next).le(zero())),
            )
        })
        .collect();

    let terminal_premise = SmtTerm::and(vec![in_space, chain.barrier(last, &state).le(zero())]);
    let terminal = SmtTerm::forall_reals(
        &names,
        terminal_premise.implies(chain.barrier(last, &next).le(zero())),
    );

    IbcConditions {
        initiation,
        separation,
        chained,
        terminal,
    }
}

/// Encoding of "there is a chain of length `k + 1` over the problem's
/// basis", plus the fresh coefficient table its variables come from.
pub fn encode_synthesis(problem: &IbcProblem, k: u32) -> (IbcEncoding, CoefficientTable) {
    let table = CoefficientTable::new(k, problem.basis().len());
    let chain = SymbolicChain::new(problem.basis(), &table);
    let conditions = build_conditions(problem, &chain);
    let declarations = table.declarations();
    let encoding = IbcEncoding {
        chain_len: chain.len(),
        assertion: conditions.conjoined(),
        model_vars: declarations.clone(),
        declarations,
        conditions,
    };
    (encoding, table)
}

/// Encoding of "this fixed chain satisfies all four conditions". It has no
/// free variables.
pub fn encode_fixed(problem: &IbcProblem, chain: &FixedChain) -> IbcEncoding {
    let conditions = build_conditions(problem, chain);
    IbcEncoding {
        chain_len: chain.len(),
        assertion: conditions.conjoined(),
        declarations: Vec::new(),
        model_vars: Vec::new(),
        conditions,
    }
}

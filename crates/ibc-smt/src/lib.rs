#![doc = include_str!("../README.md")]

//! SMT encoding and solver integration for inductive barrier certificates.
//!
//! Terms are built over real-valued variables with exact rational literals.
//! Universally quantified nonlinear constraints are handed to a Z3 or
//! SMT-LIB2 subprocess backend through the [`solver::SmtSolver`] trait.

pub mod backends;
pub mod solver;
pub mod sorts;
pub mod terms;

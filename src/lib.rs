//! `esat` is a SAT Solver that can enumerate every solution of a formula.
//!
//! It implements DPLL search with two-watched-literal unit propagation and
//! chronological backtracking. Enumeration blocks each solution found with a
//! clause and resumes the search.
//!
//! ## An example
//!
//! ```rust
//! use esat::Solver;
//!
//! let mut solver = Solver::default();
//! // At least one of 1 and 2, not both
//! solver.submit_clauses(vec![vec![1, 2], vec![-1, -2]]).unwrap();
//! assert!(solver.solve().is_sat());
//!
//! let solutions: Vec<_> = solver.solutions().collect();
//! assert_eq!(solutions.len(), 2);
//! assert!(solutions.iter().all(|model| model[&1] != model[&2]));
//! ```
//!
//! Formulas can also be read in DIMACS format:
//!
//! ```rust
//! use esat::parser::parse_dimacs_from_buf_reader;
//! use esat::{Solver, SolverOptions};
//!
//! let input = "
//! c SAT instance
//! p cnf 3 4
//! 1 0
//! -1 -2 0
//! 2 -3 0
//! -3 0
//! ";
//! let dimacs = parse_dimacs_from_buf_reader(&mut input.as_bytes()).unwrap();
//! let mut solver = Solver::from_dimacs(dimacs, SolverOptions::default()).unwrap();
//! let model = solver.solve().model().unwrap();
//! assert_eq!(model.get(&1), Some(&true));
//! assert_eq!(model.get(&3), Some(&false));
//! ```

/// Common utils
pub mod common;

/// DIMACS parser.
pub mod parser;

/// dpll, the complete solver module
pub mod dpll;

pub use common::*;
pub use dpll::{
    BranchingHeuristic, Solutions, Solver, SolverOption, SolverOptions, Stats,
};

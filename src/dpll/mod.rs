mod clause_db;
mod solutions;
mod solver_options;
mod trail;
mod var_manager;

use crate::errors::*;
use crate::parser::Dimacs;
use crate::*;
use clause_db::{ClauseDb, ClauseIndex};
use error_chain::bail;
use log::{debug, info, trace};
use std::collections::{HashMap, VecDeque};
use trail::{Reason, Trail};
use var_manager::VarManager;

pub use solutions::Solutions;
pub use solver_options::{BranchingHeuristic, SolverOption, SolverOptions};

/// Counters accumulated over the lifetime of a solver.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Stats {
    /// Free choices made.
    pub decisions: u64,
    /// Literals forced by a clause.
    pub propagations: u64,
    /// Clauses found falsified.
    pub conflicts: u64,
    /// Decisions flipped after a conflict.
    pub backtracks: u64,
}

/// States of the search loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    Propagating,
    Deciding,
    Backtracking,
    Satisfied,
    Unsatisfiable,
}

/// Represents a DPLL solver session.
///
/// Variables are the positive integers used in submitted clauses; they are
/// registered the first time they appear. Every search starts from an empty
/// trail, so clauses may be added between calls to [`Solver::solve`].
pub struct Solver {
    trivially_unsat: bool,
    clause_db: ClauseDb,
    var_manager: VarManager,
    watches: Vec<Vec<ClauseIndex>>,
    prop_q: VecDeque<Lit>,
    trail: Trail,
    vars: HashMap<usize, Var>,
    n_submitted: usize,
    decision_budget: Option<u64>,
    default_polarity: bool,
    stats: Stats,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverOptions::default())
    }
}

impl Solver {
    /// Create a new DPLL solver.
    pub fn new(options: SolverOptions) -> Self {
        Solver {
            trivially_unsat: false,
            clause_db: ClauseDb::new(),
            var_manager: VarManager::new(options.branching_heuristic),
            watches: vec![],
            prop_q: VecDeque::new(),
            trail: Trail::new(),
            vars: HashMap::new(),
            n_submitted: 0,
            decision_budget: options.decision_budget,
            default_polarity: options.default_polarity,
            stats: Stats::default(),
        }
    }

    /// Create a solver holding the clauses of a DIMACS formula.
    ///
    /// Variables declared in the problem line but absent from every clause
    /// are not part of the solutions.
    pub fn from_dimacs(dimacs: Dimacs, options: SolverOptions) -> Result<Self> {
        let mut solver = Solver::new(options);
        solver.submit_clauses(dimacs.clauses)?;
        debug!(
            "Loaded {} clauses, {} of {} declared variables used",
            solver.n_submitted,
            solver.n_vars(),
            dimacs.n_vars
        );
        Ok(solver)
    }

    /// Returns the number of variables in the formula.
    pub fn n_vars(&self) -> usize {
        self.var_manager.n_vars()
    }

    /// Returns the number of assigned variables in the formula.
    fn n_assigns(&self) -> usize {
        self.trail.n_assigns()
    }

    /// Returns the number of stored original clauses. Tautologies and empty
    /// clauses are not stored.
    pub fn n_clauses(&self) -> usize {
        self.clause_db.original_len()
    }

    /// Returns the number of blocking clauses added by enumeration.
    pub fn n_blocking(&self) -> usize {
        self.clause_db.blocking_len()
    }

    /// Returns the statistics counters.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Returns the ids of all variables seen so far, in ascending order.
    pub fn variables(&self) -> Vec<usize> {
        self.var_manager.sorted_ids()
    }

    /// Returns the current decision level in the solver.
    fn decision_level(&self) -> i32 {
        self.trail.decision_level()
    }

    fn value_lit(&self, p: Lit) -> LBool {
        self.var_manager.value_lit(p)
    }

    fn var_for_id(&mut self, id: usize) -> Var {
        if let Some(&v) = self.vars.get(&id) {
            return v;
        }
        self.watches.push(vec![]);
        self.watches.push(vec![]);
        let v = self.var_manager.new_var(id);
        self.vars.insert(id, v);
        v
    }

    /// Add a clause of signed integer literals: `k` is variable `|k|`,
    /// negated when `k < 0`.
    ///
    /// Fails with `InvalidLiteral` if the clause contains `0`, leaving the
    /// solver untouched. An empty clause makes the formula unsatisfiable.
    pub fn add_clause(&mut self, lits: &[i32]) -> Result<()> {
        if lits.contains(&0) {
            bail!(ErrorKind::InvalidLiteral(self.n_submitted));
        }
        self.n_submitted += 1;

        let mut ps: Vec<Lit> = lits
            .iter()
            .map(|&l| Lit::new(self.var_for_id(l.unsigned_abs() as usize), l < 0))
            .collect();

        // Remove all dups from ps
        ps.sort();
        ps.dedup();

        // If both p and !p occurs in ps, the clause always holds
        if ps.windows(2).any(|w| w[0] == !w[1]) {
            trace!("Dropping tautology {:?}", lits);
            return Ok(());
        }

        match self
            .clause_db
            .add_original(Clause { lits: ps }, &mut self.watches)
        {
            Ok(_) => Ok(()),
            Err(e) => match e.kind() {
                ErrorKind::TrivialUnsat => {
                    debug!("Empty clause #{} submitted", self.n_submitted - 1);
                    self.trivially_unsat = true;
                    Ok(())
                }
                _ => Err(e),
            },
        }
    }

    /// Add every clause in order. Stops at the first invalid clause; the
    /// clauses before it remain added.
    pub fn submit_clauses<I, C>(&mut self, clauses: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[i32]>,
    {
        for clause in clauses {
            self.add_clause(clause.as_ref())?;
        }
        Ok(())
    }

    /// Check that `model` satisfies every submitted clause.
    pub fn verify(&self, model: &Assignment) -> bool {
        if self.trivially_unsat {
            return false;
        }
        self.clause_db.original().iter().all(|cl| {
            cl.lits.iter().any(|&lit| {
                let id = self.var_manager.id(lit.var());
                model.get(&id) == Some(&!lit.sign())
            })
        })
    }

    /// The submitted problem as a DIMACS formula.
    ///
    /// Clauses are the stored ones with their literals ordered by id, and an
    /// empty clause when one was submitted. A variable only seen in dropped
    /// tautologies is kept through the clause `v -v`, so the formula has the
    /// same solutions over the same variables.
    pub fn dimacs(&self) -> Dimacs {
        let to_int = |p: Lit| {
            let id = self.var_manager.id(p.var()) as i32;
            if p.sign() {
                -id
            } else {
                id
            }
        };
        let mut covered = vec![false; self.n_vars()];
        let mut clauses: Vec<Vec<i32>> = self
            .clause_db
            .original()
            .iter()
            .map(|cl| {
                let mut lits: Vec<i32> = cl
                    .lits
                    .iter()
                    .map(|&p| {
                        covered[p.var().index()] = true;
                        to_int(p)
                    })
                    .collect();
                lits.sort_by_key(|&l| (l.abs(), l < 0));
                lits
            })
            .collect();
        for id in self.variables() {
            let v = self.vars[&id];
            if !covered[v.index()] {
                let id = id as i32;
                clauses.push(vec![id, -id]);
            }
        }
        if self.trivially_unsat {
            clauses.push(vec![]);
        }
        Dimacs {
            n_vars: self.variables().last().copied().unwrap_or(0),
            clauses,
        }
    }

    /// The submitted problem as DIMACS text.
    pub fn to_dimacs(&self) -> String {
        self.dimacs().to_dimacs()
    }

    /// Assume p is true and simplify the clause
    fn clause_propagate(&mut self, ci: ClauseIndex, p: Lit) -> bool {
        let clause = self.clause_db.get_clause_mut_ref(ci);

        // Make sure false lit at cl.lits[1]
        if clause.lits[0] == !p {
            clause.lits[0] = clause.lits[1];
            clause.lits[1] = !p;
        }

        // If 0th watch is true, clause is already satisfied
        if self.var_manager.value_lit(clause.lits[0]) == LBool::True {
            // Re insert clause into watcher list
            self.watches[p.index()].push(ci);
            return true;
        }

        // Look for a new literal to watch
        for i in 2..clause.lits.len() {
            if self.var_manager.value_lit(clause.lits[i]) != LBool::False {
                clause.lits[1] = clause.lits[i];
                clause.lits[i] = !p;
                self.watches[(!clause.lits[1]).index()].push(ci);
                return true;
            }
        }

        // Clause is unit under assignment
        self.watches[p.index()].push(ci);
        let enqueue_lit = clause.lits[0];
        if self.value_lit(enqueue_lit) == LBool::Undef {
            self.stats.propagations += 1;
            trace!("{} implied by {:?}", enqueue_lit, ci);
        }
        self.enqueue(enqueue_lit, Reason::Implied(ci))
    }

    /// Propagate the literals in prop_q, stopping at the first falsified clause
    fn propagate(&mut self) -> Option<ClauseIndex> {
        while let Some(p) = self.prop_q.pop_front() {
            let tmp = std::mem::take(&mut self.watches[p.index()]);

            for i in 0..tmp.len() {
                if !self.clause_propagate(tmp[i], p) {
                    // Clause is falsified
                    self.watches[p.index()].extend_from_slice(&tmp[i + 1..]);
                    self.prop_q.clear();
                    return Some(tmp[i]);
                }
            }
        }
        None
    }

    fn enqueue(&mut self, p: Lit, reason: Reason) -> bool {
        match self.trail.assign(&mut self.var_manager, p, reason) {
            Ok(true) => {
                self.prop_q.push_back(p);
                true
            }
            Ok(false) => true,
            Err(_) => false,
        }
    }

    fn assume(&mut self, p: Lit) -> bool {
        self.trail.new_dl();
        self.enqueue(p, Reason::Decision)
    }

    fn cancel_until(&mut self, level: i32) {
        self.trail.undo_to(&mut self.var_manager, level);
    }

    /// Empty the trail, level 0 included.
    fn restart(&mut self) {
        self.trail.clear(&mut self.var_manager);
        self.prop_q.clear();
    }

    /// Run the search loop from an empty trail.
    ///
    /// `LBool::True` leaves the satisfying assignment on the trail,
    /// `LBool::Undef` means the decision budget ran out.
    fn search(&mut self) -> LBool {
        self.restart();
        if self.trivially_unsat {
            debug!("Formula contains an empty clause");
            return LBool::False;
        }

        for (ci, p) in self.clause_db.units() {
            if !self.enqueue(p, Reason::Implied(ci)) {
                debug!("Unit clause {:?} contradicts an earlier one", ci);
                return LBool::False;
            }
        }

        let mut decisions = 0u64;
        let mut state = State::Propagating;
        loop {
            state = match state {
                State::Propagating => match self.propagate() {
                    Some(confl) => {
                        self.stats.conflicts += 1;
                        trace!(
                            "Conflict in {:?} at level {}",
                            confl,
                            self.decision_level()
                        );
                        if self.decision_level() == 0 {
                            State::Unsatisfiable
                        } else {
                            State::Backtracking
                        }
                    }
                    None if self.n_assigns() == self.n_vars() => State::Satisfied,
                    None => State::Deciding,
                },
                State::Deciding => {
                    if let Some(budget) = self.decision_budget {
                        if decisions >= budget {
                            debug!("Decision budget of {} exhausted", budget);
                            return LBool::Undef;
                        }
                    }
                    match self.var_manager.select_var() {
                        Some(v) => {
                            decisions += 1;
                            self.stats.decisions += 1;
                            let p = Lit::new(v, !self.default_polarity);
                            debug!("Deciding {} at level {}", p, self.decision_level() + 1);
                            self.assume(p);
                            State::Propagating
                        }
                        None => State::Satisfied,
                    }
                }
                State::Backtracking => {
                    let level = self.decision_level();
                    match self.trail.decision(level) {
                        Some(p) => {
                            self.stats.backtracks += 1;
                            debug!("Backtracking from {} to {}, flipping {}", level, level - 1, p);
                            self.cancel_until(level - 1);
                            self.enqueue(!p, Reason::Flipped);
                            debug_assert_eq!(self.var_manager.get_level(p.var()), level - 1);
                            State::Propagating
                        }
                        None => State::Unsatisfiable,
                    }
                }
                State::Satisfied => return LBool::True,
                State::Unsatisfiable => return LBool::False,
            };
        }
    }

    /// Current assignment keyed by variable id.
    fn model(&self) -> Assignment {
        (0..self.n_vars())
            .map(Var::new)
            .map(|v| (self.var_manager.id(v), self.var_manager.value(v) == LBool::True))
            .collect()
    }

    /// Forbid the assignment currently on the trail and empty the trail.
    ///
    /// Every other literal on the trail is forced by a clause from the
    /// decisions and flipped decisions, so negating those suffices.
    fn block_model(&mut self) {
        let lits: Vec<Lit> = self
            .trail
            .lits()
            .iter()
            .filter(|p| {
                self.var_manager
                    .get_reason(p.var())
                    .map_or(false, Reason::is_decision_relevant)
            })
            .map(|&p| !p)
            .collect();
        self.restart();
        debug!("Blocking clause of {} literals", lits.len());
        if self
            .clause_db
            .add_blocking(Clause { lits }, &mut self.watches)
            .is_err()
        {
            // The model was forced outright, nothing else can follow
            self.trivially_unsat = true;
        }
    }

    /// Solve the SAT formula.
    pub fn solve(&mut self) -> Solution {
        info!(
            "Solving {} variables, {} clauses",
            self.n_vars(),
            self.n_clauses() + self.n_blocking()
        );
        let solution = match self.search() {
            LBool::True => Solution::Sat(self.model()),
            LBool::False => Solution::Unsat,
            LBool::Undef => Solution::Unknown,
        };
        self.restart();
        info!(
            "{} after {} decisions, {} conflicts",
            match solution {
                Solution::Sat(_) => "SAT",
                Solution::Unsat => "UNSAT",
                Solution::Unknown => "UNKNOWN",
            },
            self.stats.decisions,
            self.stats.conflicts
        );
        solution
    }

    /// Enumerate all solutions lazily.
    pub fn solutions(self) -> Solutions {
        Solutions::new(self)
    }
}

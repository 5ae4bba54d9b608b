use crate::LBool;

/// Branching heuristic used when propagation stalls.
pub enum BranchingHeuristic {
    /// Unassigned variable with the smallest id.
    Ordered,
    /// Uniformly random unassigned variable. Reproducible for a fixed seed.
    Random {
        /// Seed of the random number generator.
        seed: u64,
    },
    /// Custom heuristic. Receives the value of every variable, indexed in
    /// order of first appearance, and must return the index of an unassigned
    /// one.
    Custom(Box<dyn Fn(&[LBool]) -> usize>),
}

/// Solver options.
pub struct SolverOptions {
    /// Branching Heuristic
    pub branching_heuristic: BranchingHeuristic,
    /// Maximum number of decisions per search, unlimited when `None`.
    /// Running out of decisions yields `Solution::Unknown`.
    pub decision_budget: Option<u64>,
    /// Value tried first for a decision variable.
    pub default_polarity: bool,
}

/// Different Solver Options.
pub enum SolverOption {
    /// The branching heuristic.
    Heuristic(BranchingHeuristic),
    /// The decision budget of every search.
    DecisionBudget(u64),
    /// The value tried first on decisions.
    Polarity(bool),
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            branching_heuristic: BranchingHeuristic::Ordered,
            decision_budget: None,
            default_polarity: true,
        }
    }
}

impl SolverOptions {
    /// Add solver option.
    pub fn option(&mut self, option: SolverOption) {
        match option {
            SolverOption::Heuristic(bh) => self.branching_heuristic = bh,
            SolverOption::DecisionBudget(n) => self.decision_budget = Some(n),
            SolverOption::Polarity(p) => self.default_polarity = p,
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Not;

/// A variable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Var(usize);

impl Var {
    /// Create new var
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the actual value stored inside that can be used to index arrays.
    pub fn index(self) -> usize {
        self.0
    }

    /// Create positive literal from variable.
    pub fn pos(self) -> Lit {
        Lit::new(self, false)
    }

    /// Create negative literal from variable.
    pub fn neg(self) -> Lit {
        Lit::new(self, true)
    }
}

/// A literal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Lit(usize);

impl Lit {
    /// Returns true if literal is signed (i.e. a negated literal).
    pub fn sign(self) -> bool {
        self.0 & 1 == 1
    }

    /// Returns the var corresponding to the literal.
    pub fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    /// Returns the actual value stored inside that can be used to index arrays.
    pub(crate) fn index(self) -> usize {
        self.0
    }

    /// Create lit from var and sign
    pub fn new(var: Var, sign: bool) -> Lit {
        Lit(var.0 + var.0 + (sign as usize))
    }
}

impl Not for Lit {
    type Output = Self;

    /// Returns x for -x and -x for x.
    fn not(self) -> Self {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign() {
            write!(f, "-x{}", self.var().index())
        } else {
            write!(f, "x{}", self.var().index())
        }
    }
}

/// A Lifted boolean.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LBool {
    /// Represents True.
    True,
    /// Represents False.
    False,
    /// Represents neither True nor False, usually used when variable is unassigned.
    Undef,
}

impl Not for LBool {
    type Output = Self;

    /// Returns True for False and False for True.
    /// If the input is Undef, then Undef is returned.
    fn not(self) -> Self {
        match self {
            LBool::True => LBool::False,
            LBool::False => LBool::True,
            LBool::Undef => LBool::Undef,
        }
    }
}

impl From<bool> for LBool {
    /// Convert bool to LBool.
    fn from(b: bool) -> Self {
        if b {
            LBool::True
        } else {
            LBool::False
        }
    }
}

/// A Clause.
#[derive(Clone, Debug)]
pub struct Clause {
    /// A vector of literals forming the clause.
    pub lits: Vec<Lit>,
}

/// A total assignment, keyed by the variable ids used when submitting clauses.
///
/// Only variables that appeared in some submitted clause are present.
pub type Assignment = BTreeMap<usize, bool>;

/// Solution to the SAT Formula.
#[derive(Debug, PartialEq)]
pub enum Solution {
    /// The formula is unsatisfiable.
    Unsat,
    /// The formula is satisfiable, with a satisfying model.
    Sat(Assignment),
    /// The decision budget ran out before SAT or UNSAT was proven.
    Unknown,
}

impl Solution {
    /// Returns true for `Solution::Sat`.
    pub fn is_sat(&self) -> bool {
        matches!(self, Solution::Sat(_))
    }

    /// Returns the model if the formula was found satisfiable.
    pub fn model(self) -> Option<Assignment> {
        match self {
            Solution::Sat(model) => Some(model),
            _ => None,
        }
    }
}

/// Errors module.
#[allow(missing_docs)]
pub mod errors {
    error_chain::error_chain! {
        foreign_links {
            Io(std::io::Error);
            ParseIntError(std::num::ParseIntError);
        }

        errors {
            InvalidLiteral(clause: usize) {
                description("invalid literal")
                display("clause {} contains the literal 0", clause)
            }
            TrivialUnsat {
                description("empty clause")
                display("an empty clause was submitted")
            }
            MalformedDimacs(line: String) {
                description("malformed dimacs")
                display("malformed dimacs line: '{}'", line)
            }
            Unsatisfiable {
                description("unsatisfiable")
                display("the formula has no solution")
            }
            SearchExhausted {
                description("search exhausted")
                display("the decision budget ran out before every solution was found")
            }
            GroupSizeExcludesAll(max: usize) {
                description("group size excludes all solutions")
                display("no solution has at most {} true variables", max)
            }
            NoPartition {
                description("no partition")
                display("solutions could not be partitioned")
            }
        }
    }
}

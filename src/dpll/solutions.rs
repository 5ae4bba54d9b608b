use super::{Solver, Stats};
use crate::errors::*;
use crate::*;
use error_chain::bail;
use log::{debug, info};
use std::collections::{BTreeSet, HashSet};
use std::iter::FusedIterator;

/// Lazy sequence of all solutions of a formula.
///
/// Each step resumes the search after blocking the previous solution, so no
/// assignment is produced twice. The sequence ends once the blocked formula is
/// unsatisfiable, or early when the decision budget of a step runs out; see
/// [`Solutions::outcome`]. Restarting requires a fresh [`Solver`].
pub struct Solutions {
    solver: Solver,
    found: usize,
    outcome: Option<Solution>,
}

impl Solutions {
    pub(crate) fn new(solver: Solver) -> Self {
        Solutions {
            solver,
            found: 0,
            outcome: None,
        }
    }

    /// Why the sequence ended: `Solution::Unsat` when every solution was
    /// produced, `Solution::Unknown` when a search ran out of decisions.
    /// `None` while the sequence may continue.
    pub fn outcome(&self) -> Option<&Solution> {
        self.outcome.as_ref()
    }

    /// Number of solutions produced so far.
    pub fn found(&self) -> usize {
        self.found
    }

    /// Statistics of the underlying solver.
    pub fn stats(&self) -> Stats {
        self.solver.stats()
    }

    /// Solution with the fewest true variables, the first one found on ties.
    pub fn minimal(self) -> Option<Assignment> {
        let mut best: Option<(usize, Assignment)> = None;
        for model in self {
            let n_true = count_true(&model);
            if best.as_ref().map_or(true, |(n, _)| n_true < *n) {
                best = Some((n_true, model));
                // Nothing is smaller than an empty solution
                if n_true == 0 {
                    break;
                }
            }
        }
        best.map(|(_, model)| model)
    }

    /// Solution with the most true variables, the first one found on ties.
    pub fn maximal(self) -> Option<Assignment> {
        let mut best: Option<(usize, Assignment)> = None;
        for model in self {
            let n_true = count_true(&model);
            if best.as_ref().map_or(true, |(n, _)| n_true > *n) {
                let complete = n_true == model.len();
                best = Some((n_true, model));
                // Nothing is larger than a solution with everything
                if complete {
                    break;
                }
            }
        }
        best.map(|(_, model)| model)
    }

    /// Pairwise disjoint solutions that together make true every variable
    /// true in some solution.
    ///
    /// Solutions with more than `max_group_size` true variables are left
    /// out. Fails when the formula is unsatisfiable, when the budget stops
    /// the enumeration, when the size limit leaves no solution, or when no
    /// such partition exists.
    pub fn partition(mut self, max_group_size: Option<usize>) -> Result<Vec<Assignment>> {
        let mut models = vec![];
        let mut groups: Vec<BTreeSet<usize>> = vec![];
        for model in &mut self {
            let group: BTreeSet<usize> = model
                .iter()
                .filter(|(_, value)| **value)
                .map(|(id, _)| *id)
                .collect();
            if max_group_size.map_or(true, |max| group.len() <= max) {
                models.push(model);
                groups.push(group);
            }
        }
        match self.outcome {
            Some(Solution::Unknown) => bail!(ErrorKind::SearchExhausted),
            _ if self.found == 0 => bail!(ErrorKind::Unsatisfiable),
            _ => {}
        }
        if let Some(max) = max_group_size {
            if models.is_empty() {
                bail!(ErrorKind::GroupSizeExcludesAll(max));
            }
        }
        if models.len() == 1 {
            return Ok(models);
        }

        // Larger groups first, enumeration order on ties
        let mut order: Vec<usize> = (0..groups.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(groups[i].len()));
        let target = groups.iter().flatten().collect::<BTreeSet<_>>().len();
        debug!(
            "Partitioning {} true variables among {} solutions",
            target,
            groups.len()
        );

        // Depth first over sets of disjoint groups, each set visited once
        let mut visited = HashSet::new();
        for &start in &order {
            let mut stack = vec![vec![start]];
            while let Some(path) = stack.pop() {
                let pool: BTreeSet<usize> = path
                    .iter()
                    .flat_map(|&i| &groups[i])
                    .copied()
                    .collect();
                if pool.len() == target {
                    return Ok(path.into_iter().map(|i| models[i].clone()).collect());
                }
                let mut members = path.clone();
                members.sort_unstable();
                if !visited.insert(members) {
                    continue;
                }
                let room = target - pool.len();
                let mut edges = vec![];
                for &i in &order {
                    let group = &groups[i];
                    if group.is_empty()
                        || group.len() > room
                        || path.contains(&i)
                        || !group.is_disjoint(&pool)
                    {
                        continue;
                    }
                    let mut next = path.clone();
                    next.push(i);
                    edges.push(next);
                }
                // Most desirable edge on top
                edges.reverse();
                stack.extend(edges);
            }
        }
        bail!(ErrorKind::NoPartition)
    }
}

fn count_true(model: &Assignment) -> usize {
    model.values().filter(|&&v| v).count()
}

impl Iterator for Solutions {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.outcome.is_some() {
            return None;
        }
        match self.solver.search() {
            LBool::True => {
                let model = self.solver.model();
                self.found += 1;
                info!("Solution #{} found", self.found);
                self.solver.block_model();
                Some(model)
            }
            LBool::False => {
                info!("Enumeration complete, {} solutions", self.found);
                self.outcome = Some(Solution::Unsat);
                None
            }
            LBool::Undef => {
                info!("Enumeration stopped after {} solutions", self.found);
                self.outcome = Some(Solution::Unknown);
                None
            }
        }
    }
}

impl FusedIterator for Solutions {}

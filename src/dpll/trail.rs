use super::clause_db::ClauseIndex;
use super::var_manager::VarManager;
use crate::*;

/// Why a literal sits on the trail.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reason {
    /// A free choice opening a new decision level.
    Decision,
    /// Forced by the clause, which is satisfied by this literal alone.
    Implied(ClauseIndex),
    /// The negation of a refuted decision, asserted one level below it.
    Flipped,
}

impl Reason {
    /// Literals not forced by any clause. Together they determine every other
    /// literal on the trail.
    pub fn is_decision_relevant(self) -> bool {
        match self {
            Reason::Decision | Reason::Flipped => true,
            Reason::Implied(_) => false,
        }
    }
}

/// The variable already holds the opposite value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Conflict;

#[derive(Debug)]
pub struct Trail {
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
}

impl Trail {
    pub fn new() -> Self {
        Trail {
            trail: vec![],
            trail_lim: vec![],
        }
    }

    pub fn n_assigns(&self) -> usize {
        self.trail.len()
    }

    pub fn decision_level(&self) -> i32 {
        self.trail_lim.len() as i32
    }

    pub fn lits(&self) -> &[Lit] {
        &self.trail
    }

    pub fn new_dl(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    /// The decision that opened `level`, if that level exists.
    pub fn decision(&self, level: i32) -> Option<Lit> {
        if level <= 0 {
            return None;
        }
        self.trail_lim
            .get(level as usize - 1)
            .map(|&dl_index| self.trail[dl_index])
    }

    /// Make `p` true at the current decision level.
    ///
    /// Returns `Ok(false)` when `p` already holds, in which case nothing is
    /// recorded.
    pub fn assign(
        &mut self,
        var_manager: &mut VarManager,
        p: Lit,
        reason: Reason,
    ) -> std::result::Result<bool, Conflict> {
        match var_manager.value_lit(p) {
            LBool::True => Ok(false),
            LBool::False => Err(Conflict),
            LBool::Undef => {
                var_manager.update(
                    p.var(),
                    LBool::from(!p.sign()),
                    self.decision_level(),
                    Some(reason),
                );
                self.trail.push(p);
                Ok(true)
            }
        }
    }

    /// Pop every entry above `level`, leaving those variables unassigned.
    pub fn undo_to(&mut self, var_manager: &mut VarManager, level: i32) {
        assert!(
            level >= 0 && level <= self.decision_level(),
            "cannot undo from level {} to level {}",
            self.decision_level(),
            level
        );
        while self.decision_level() > level {
            let dl_index = self.trail_lim[self.trail_lim.len() - 1];
            while self.trail.len() != dl_index {
                if let Some(p) = self.trail.pop() {
                    var_manager.reset(p.var());
                }
            }
            self.trail_lim.pop();
        }
    }

    /// Undo everything, level 0 included.
    pub fn clear(&mut self, var_manager: &mut VarManager) {
        self.undo_to(var_manager, 0);
        for p in self.trail.drain(..) {
            var_manager.reset(p.var());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dpll::BranchingHeuristic;

    fn setup(n: usize) -> (Trail, VarManager, Vec<Var>) {
        let mut vm = VarManager::new(BranchingHeuristic::Ordered);
        let vars = (1..=n).map(|id| vm.new_var(id)).collect();
        (Trail::new(), vm, vars)
    }

    #[test]
    fn assign_reports_conflict_on_opposite_value() {
        let (mut trail, mut vm, x) = setup(1);
        assert_eq!(trail.assign(&mut vm, x[0].pos(), Reason::Decision), Ok(true));
        assert_eq!(trail.assign(&mut vm, x[0].pos(), Reason::Decision), Ok(false));
        assert_eq!(trail.assign(&mut vm, x[0].neg(), Reason::Flipped), Err(Conflict));
        assert_eq!(trail.n_assigns(), 1);
    }

    #[test]
    fn undo_to_keeps_lower_levels() {
        let (mut trail, mut vm, x) = setup(4);
        trail.assign(&mut vm, x[0].pos(), Reason::Flipped).unwrap();
        trail.new_dl();
        trail.assign(&mut vm, x[1].neg(), Reason::Decision).unwrap();
        trail.new_dl();
        trail.assign(&mut vm, x[2].pos(), Reason::Decision).unwrap();
        trail.assign(&mut vm, x[3].pos(), Reason::Flipped).unwrap();
        assert_eq!(trail.decision_level(), 2);
        assert_eq!(vm.get_level(x[3]), 2);
        assert_eq!(trail.decision(2), Some(x[2].pos()));
        assert_eq!(trail.decision(1), Some(x[1].neg()));
        assert_eq!(trail.decision(0), None);

        trail.undo_to(&mut vm, 1);
        assert_eq!(trail.decision_level(), 1);
        assert_eq!(vm.value(x[2]), LBool::Undef);
        assert_eq!(vm.value(x[3]), LBool::Undef);
        assert_eq!(vm.get_level(x[3]), -1);
        assert_eq!(vm.value(x[1]), LBool::False);
        assert_eq!(vm.get_level(x[1]), 1);
        assert_eq!(vm.value(x[0]), LBool::True);
        assert_eq!(trail.lits(), &[x[0].pos(), x[1].neg()]);

        // Undone variables can be assigned again, either way
        assert_eq!(trail.assign(&mut vm, x[3].neg(), Reason::Flipped), Ok(true));
        assert_eq!(vm.get_level(x[3]), 1);
    }

    #[test]
    fn clear_resets_level_zero() {
        let (mut trail, mut vm, x) = setup(2);
        trail.assign(&mut vm, x[0].pos(), Reason::Flipped).unwrap();
        trail.new_dl();
        trail.assign(&mut vm, x[1].pos(), Reason::Decision).unwrap();
        trail.clear(&mut vm);
        assert_eq!(trail.n_assigns(), 0);
        assert_eq!(trail.decision_level(), 0);
        assert!(x.iter().all(|&v| vm.value(v) == LBool::Undef));
    }

    #[test]
    #[should_panic]
    fn undo_above_current_level_is_a_bug() {
        let (mut trail, mut vm, _) = setup(1);
        trail.undo_to(&mut vm, 1);
    }

    #[test]
    fn decision_relevance() {
        assert!(Reason::Decision.is_decision_relevant());
        assert!(Reason::Flipped.is_decision_relevant());
        assert!(!Reason::Implied(ClauseIndex::Orig(0)).is_decision_relevant());
    }
}

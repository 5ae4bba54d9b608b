use super::solver_options::BranchingHeuristic;
use super::trail::Reason;
use crate::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

enum InternalBranchState {
    Ordered,
    Random(StdRng),
    Custom(Box<dyn Fn(&[LBool]) -> usize>),
}

pub struct VarManager {
    /// Caller id of each variable.
    ids: Vec<usize>,
    /// Variables sorted by caller id.
    by_id: Vec<Var>,
    assigns: Vec<LBool>,
    reason: Vec<Option<Reason>>,
    level: Vec<i32>,
    branching: InternalBranchState,
}

impl VarManager {
    pub fn new(bh: BranchingHeuristic) -> Self {
        VarManager {
            ids: vec![],
            by_id: vec![],
            assigns: vec![],
            reason: vec![],
            level: vec![],
            branching: match bh {
                BranchingHeuristic::Ordered => InternalBranchState::Ordered,
                BranchingHeuristic::Random { seed } => {
                    InternalBranchState::Random(StdRng::seed_from_u64(seed))
                }
                BranchingHeuristic::Custom(f) => InternalBranchState::Custom(f),
            },
        }
    }

    pub fn n_vars(&self) -> usize {
        self.assigns.len()
    }

    /// Register the variable the caller names `id`. Ids must be distinct.
    pub fn new_var(&mut self, id: usize) -> Var {
        let v = Var::new(self.n_vars());
        let ids = &self.ids;
        let pos = self
            .by_id
            .binary_search_by_key(&id, |w| ids[w.index()])
            .unwrap_or_else(|pos| pos);
        self.by_id.insert(pos, v);
        self.ids.push(id);
        self.reason.push(None);
        self.assigns.push(LBool::Undef);
        self.level.push(-1);
        v
    }

    pub fn id(&self, x: Var) -> usize {
        self.ids[x.index()]
    }

    /// Caller ids in ascending order.
    pub fn sorted_ids(&self) -> Vec<usize> {
        self.by_id.iter().map(|&v| self.id(v)).collect()
    }

    pub fn value(&self, x: Var) -> LBool {
        self.assigns[x.index()]
    }

    pub fn value_lit(&self, p: Lit) -> LBool {
        if p.sign() {
            !self.assigns[p.var().index()]
        } else {
            self.assigns[p.var().index()]
        }
    }

    /// Pick an unassigned variable to branch on, `None` once everything is assigned.
    pub fn select_var(&mut self) -> Option<Var> {
        let assigns = &self.assigns;
        let selected = match &mut self.branching {
            InternalBranchState::Ordered => self
                .by_id
                .iter()
                .map(|v| v.index())
                .find(|&v| assigns[v] == LBool::Undef),
            InternalBranchState::Random(rng) => {
                let free: Vec<usize> = (0..assigns.len())
                    .filter(|&v| assigns[v] == LBool::Undef)
                    .collect();
                free.choose(rng).copied()
            }
            InternalBranchState::Custom(f) => {
                if assigns.iter().all(|&x| x != LBool::Undef) {
                    None
                } else {
                    let v = f(assigns);
                    assert!(
                        assigns.get(v) == Some(&LBool::Undef),
                        "branching heuristic picked variable {} which is not free",
                        v
                    );
                    Some(v)
                }
            }
        };
        selected.map(Var::new)
    }

    pub fn get_reason(&self, var: Var) -> Option<Reason> {
        self.reason[var.index()]
    }

    pub fn get_level(&self, var: Var) -> i32 {
        self.level[var.index()]
    }

    pub fn update(&mut self, var: Var, value: LBool, level: i32, reason: Option<Reason>) {
        self.assigns[var.index()] = value;
        self.level[var.index()] = level;
        self.reason[var.index()] = reason;
    }

    pub fn reset(&mut self, var: Var) {
        self.update(var, LBool::Undef, -1, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_vars(bh: BranchingHeuristic, n: usize) -> VarManager {
        let mut vm = VarManager::new(bh);
        for id in 1..=n {
            vm.new_var(id);
        }
        vm
    }

    #[test]
    fn ordered_picks_lowest_free_index() {
        let mut vm = with_vars(BranchingHeuristic::Ordered, 3);
        assert_eq!(vm.select_var(), Some(Var::new(0)));
        vm.update(Var::new(0), LBool::False, 0, Some(Reason::Decision));
        assert_eq!(vm.select_var(), Some(Var::new(1)));
        vm.update(Var::new(1), LBool::True, 0, Some(Reason::Decision));
        vm.update(Var::new(2), LBool::True, 0, Some(Reason::Decision));
        assert_eq!(vm.select_var(), None);
    }

    #[test]
    fn ordered_follows_caller_ids() {
        let mut vm = VarManager::new(BranchingHeuristic::Ordered);
        let (x9, x2, x5) = (vm.new_var(9), vm.new_var(2), vm.new_var(5));
        assert_eq!(vm.sorted_ids(), vec![2, 5, 9]);
        assert_eq!(vm.id(x9), 9);
        assert_eq!(vm.select_var(), Some(x2));
        vm.update(x2, LBool::True, 0, Some(Reason::Decision));
        assert_eq!(vm.select_var(), Some(x5));
        vm.update(x5, LBool::True, 0, Some(Reason::Decision));
        assert_eq!(vm.select_var(), Some(x9));
    }

    #[test]
    fn random_is_reproducible_for_a_seed() {
        let picks = |seed| {
            let mut vm = with_vars(BranchingHeuristic::Random { seed }, 8);
            let mut picks = vec![];
            while let Some(v) = vm.select_var() {
                assert_eq!(vm.value(v), LBool::Undef);
                vm.update(v, LBool::True, 0, Some(Reason::Decision));
                picks.push(v.index());
            }
            picks
        };
        let first = picks(7);
        assert_eq!(first, picks(7));
        assert_eq!(first.len(), 8);
    }

    #[test]
    fn custom_heuristic_sees_current_values() {
        let last_free = Box::new(|assigns: &[LBool]| {
            assigns.iter().rposition(|&x| x == LBool::Undef).unwrap()
        });
        let mut vm = with_vars(BranchingHeuristic::Custom(last_free), 3);
        assert_eq!(vm.select_var(), Some(Var::new(2)));
        vm.update(Var::new(2), LBool::True, 0, Some(Reason::Decision));
        assert_eq!(vm.select_var(), Some(Var::new(1)));
    }

    #[test]
    fn reset_forgets_level_and_reason() {
        let mut vm = with_vars(BranchingHeuristic::Ordered, 1);
        let x = Var::new(0);
        vm.update(x, LBool::True, 3, Some(Reason::Flipped));
        assert_eq!(vm.value_lit(x.neg()), LBool::False);
        vm.reset(x);
        assert_eq!(vm.value(x), LBool::Undef);
        assert_eq!(vm.get_level(x), -1);
        assert_eq!(vm.get_reason(x), None);
    }
}

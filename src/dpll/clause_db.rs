use crate::errors::*;
use crate::*;
use error_chain::bail;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClauseIndex {
    Orig(usize),
    Block(usize),
}

/// Owns every clause of a session. Watch lists live with the solver and only
/// hold `ClauseIndex`es into this store.
pub struct ClauseDb {
    original: Vec<Clause>,
    blocking: Vec<Clause>,
    units: Vec<ClauseIndex>,
}

impl ClauseDb {
    pub fn new() -> Self {
        ClauseDb {
            original: vec![],
            blocking: vec![],
            units: vec![],
        }
    }

    pub fn original_len(&self) -> usize {
        self.original.len()
    }

    pub fn blocking_len(&self) -> usize {
        self.blocking.len()
    }

    pub fn add_original(
        &mut self,
        cl: Clause,
        watches: &mut Vec<Vec<ClauseIndex>>,
    ) -> Result<ClauseIndex> {
        let ci = ClauseIndex::Orig(self.original.len());
        Self::watch(&cl, ci, &mut self.units, watches)?;
        self.original.push(cl);
        Ok(ci)
    }

    /// Append a clause forbidding a found solution. Only valid while no
    /// literal of `cl` is assigned.
    pub fn add_blocking(
        &mut self,
        cl: Clause,
        watches: &mut Vec<Vec<ClauseIndex>>,
    ) -> Result<ClauseIndex> {
        let ci = ClauseIndex::Block(self.blocking.len());
        Self::watch(&cl, ci, &mut self.units, watches)?;
        self.blocking.push(cl);
        Ok(ci)
    }

    /// Unit clauses bypass the watch scheme and seed propagation instead.
    fn watch(
        cl: &Clause,
        ci: ClauseIndex,
        units: &mut Vec<ClauseIndex>,
        watches: &mut Vec<Vec<ClauseIndex>>,
    ) -> Result<()> {
        match cl.lits.len() {
            0 => bail!(ErrorKind::TrivialUnsat),
            1 => units.push(ci),
            _ => {
                watches[(!cl.lits[0]).index()].push(ci);
                watches[(!cl.lits[1]).index()].push(ci);
            }
        }
        Ok(())
    }

    /// Unit clauses with their only literal, in insertion order.
    pub fn units(&self) -> Vec<(ClauseIndex, Lit)> {
        self.units
            .iter()
            .map(|&ci| (ci, self.get_clause_ref(ci).lits[0]))
            .collect()
    }

    pub fn original(&self) -> &[Clause] {
        &self.original
    }

    #[cfg(test)]
    pub fn indices(&self) -> impl Iterator<Item = ClauseIndex> {
        (0..self.original.len())
            .map(ClauseIndex::Orig)
            .chain((0..self.blocking.len()).map(ClauseIndex::Block))
    }

    pub fn get_clause_ref(&self, ci: ClauseIndex) -> &Clause {
        match ci {
            ClauseIndex::Orig(ci) => &self.original[ci],
            ClauseIndex::Block(ci) => &self.blocking[ci],
        }
    }

    pub fn get_clause_mut_ref(&mut self, ci: ClauseIndex) -> &mut Clause {
        match ci {
            ClauseIndex::Orig(ci) => &mut self.original[ci],
            ClauseIndex::Block(ci) => &mut self.blocking[ci],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(vs: &[(usize, bool)]) -> Clause {
        Clause {
            lits: vs.iter().map(|&(v, sign)| Lit::new(Var::new(v), sign)).collect(),
        }
    }

    #[test]
    fn watches_first_two_literals() {
        let mut db = ClauseDb::new();
        let mut watches = vec![vec![]; 6];
        let ci = db
            .add_original(lits(&[(0, false), (1, true), (2, false)]), &mut watches)
            .unwrap();
        assert_eq!(ci, ClauseIndex::Orig(0));
        assert_eq!(watches[Var::new(0).neg().index()], vec![ci]);
        assert_eq!(watches[Var::new(1).pos().index()], vec![ci]);
        assert_eq!(watches.iter().map(Vec::len).sum::<usize>(), 2);
        assert!(db.units().is_empty());
    }

    #[test]
    fn units_are_not_watched() {
        let mut db = ClauseDb::new();
        let mut watches = vec![vec![]; 4];
        db.add_original(lits(&[(0, false), (1, false)]), &mut watches)
            .unwrap();
        let unit = db.add_original(lits(&[(1, true)]), &mut watches).unwrap();
        let block = db.add_blocking(lits(&[(0, true)]), &mut watches).unwrap();
        assert_eq!(
            db.units(),
            vec![(unit, Var::new(1).neg()), (block, Var::new(0).neg())]
        );
        assert_eq!(watches.iter().map(Vec::len).sum::<usize>(), 2);
        assert_eq!(db.original_len(), 2);
        assert_eq!(db.blocking_len(), 1);
        assert_eq!(db.indices().count(), 3);
    }

    #[test]
    fn empty_clause_is_trivially_unsat() {
        let mut db = ClauseDb::new();
        let mut watches = vec![];
        let err = db.add_original(lits(&[]), &mut watches).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TrivialUnsat));
        assert_eq!(db.original_len(), 0);
        assert!(db.add_blocking(lits(&[]), &mut watches).is_err());
    }
}

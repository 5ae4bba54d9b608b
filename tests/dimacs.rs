use esat::parser::parse_dimacs_from_buf_reader;
use esat::{Solution, Solver, SolverOptions};
use std::collections::BTreeSet;

fn load(input: &str) -> Solver {
    let _ = env_logger::try_init();
    let dimacs = parse_dimacs_from_buf_reader(&mut input.as_bytes()).unwrap();
    Solver::from_dimacs(dimacs, SolverOptions::default()).unwrap()
}

#[test]
fn satlib_style_instance() {
    let mut solver = load(
        "c uf-style instance
p cnf 4 5
 1 -2 0
 2  3 0
-1 -3 0
-4 0
 3  4 0
%
0
",
    );
    assert_eq!(solver.n_clauses(), 5);
    let model = solver.solve().model().unwrap();
    assert!(solver.verify(&model));
    assert_eq!(model[&4], false);
    assert_eq!(model[&3], true);
}

#[test]
fn undeclared_usage_is_irrelevant() {
    // Variable 5 is declared but never used
    let solver = load("p cnf 5 2\n1 2 0\n-2 0\n");
    assert_eq!(solver.variables(), vec![1, 2]);
    let solutions: Vec<_> = solver.solutions().collect();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0].len(), 2);
}

#[test]
fn empty_clause_in_file() {
    let mut solver = load("p cnf 2 3\n1 2 0\n0\n-1 0\n");
    assert_eq!(solver.solve(), Solution::Unsat);
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn enumerates_parsed_formula() {
    // Exactly one of three
    let solver = load(
        "p cnf 3 4
1 2 3 0
-1 -2 0 -1 -3 0
-2 -3 0
",
    );
    let mut solutions = solver.solutions();
    let mut count = 0;
    for model in &mut solutions {
        assert_eq!(model.values().filter(|&&v| v).count(), 1);
        count += 1;
    }
    assert_eq!(count, 3);
    assert_eq!(solutions.outcome(), Some(&Solution::Unsat));
}

#[test]
fn written_formula_has_the_same_solutions() {
    let _ = env_logger::try_init();
    let mut solver = Solver::default();
    solver
        .submit_clauses(vec![vec![6, -2], vec![2, 6, 2], vec![4, -4], vec![-6, 2, 9]])
        .unwrap();
    let text = solver.to_dimacs();
    assert!(text.starts_with("p cnf 9 4\n"));

    let reloaded = load(&text);
    assert_eq!(reloaded.variables(), solver.variables());
    // 6 holds, 2 or 9 holds, 4 is free
    let before: BTreeSet<_> = solver.solutions().collect();
    let after: BTreeSet<_> = reloaded.solutions().collect();
    assert_eq!(before.len(), 6);
    assert_eq!(before, after);
}

#[test]
fn written_unsat_formula_stays_unsat() {
    let mut solver = load("p cnf 2 2\n1 2 0\n0\n");
    let text = solver.to_dimacs();
    assert_eq!(text, "p cnf 2 2\n1 2 0\n0\n");
    assert_eq!(load(&text).solve(), Solution::Unsat);
    assert_eq!(solver.solve(), Solution::Unsat);
}

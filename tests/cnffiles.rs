use mywalksolver::dimacs::{parse_dimacs, parse_dimacs_file, Dimacs};
use mywalksolver::{Cnf, Lit, Params, SolveResult, Walker};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn for_each_cnf_filename(mut f: impl FnMut(&str)) {
    use std::{fs, path};
    let mut d = path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    d.push("tests/cnfs");
    for direntry in fs::read_dir(d).unwrap() {
        let path = direntry.unwrap().path();
        let s = path.to_str().unwrap();
        println!("Test file: {:?}", s);

        f(s);
    }
}

fn formula(text: &str) -> Cnf {
    match parse_dimacs(text.as_bytes()) {
        Ok(Dimacs::Formula(cnf)) => cnf,
        Ok(Dimacs::EmptyClause) => panic!("unexpected empty clause"),
        Err(e) => panic!("parse failed: {}", e),
    }
}

fn verify_model(cnf: &Cnf, model: &[bool]) -> bool {
    for (i, c) in cnf.clauses().enumerate() {
        if !c.iter().any(|l| l.is_pos() == model[l.var().idx()]) {
            println!("  clause {} not sat: {:?}", i, c);
            return false;
        }
    }
    println!(
        "  ok -- sat model, checked {} clauses against {} variables",
        cnf.num_clauses(),
        cnf.num_vars()
    );
    true
}

fn params(seed: u64, max_flips: u64) -> Params {
    Params {
        seed,
        max_flips,
        ..Params::default()
    }
}

#[test]
fn correct_results_on_cnf_file_tests() {
    // Every file under tests/cnfs is satisfiable.
    for_each_cnf_filename(|filename| {
        match parse_dimacs_file(filename) {
            Ok(Dimacs::Formula(cnf)) => {
                let mut solver = Walker::new(cnf, params(7, 20_000_000));
                match solver.solve() {
                    SolveResult::Sat(model) => {
                        assert!(verify_model(&solver.cnf, &model));
                    }
                    other => panic!("{}: expected sat, got {:?}", filename, other),
                }
                println!("  solve finished after {} flips.", solver.stats.flips);
            }
            Ok(Dimacs::EmptyClause) => panic!("{}: unexpected empty clause", filename),
            Err(e) => panic!("{}: {}", filename, e),
        };
    });
}

#[test]
fn parser_agrees_with_the_dimacs_crate() {
    // Clause-by-clause comparison against an independent parser.
    for_each_cnf_filename(|filename| {
        let cnf = match parse_dimacs_file(filename) {
            Ok(Dimacs::Formula(cnf)) => cnf,
            _ => panic!("{}: expected a formula", filename),
        };
        let text = std::fs::read_to_string(filename).unwrap();
        match dimacs::parse_dimacs(&text).unwrap() {
            dimacs::Instance::Cnf { clauses, .. } => {
                assert_eq!(cnf.num_clauses(), clauses.len());
                for (c, reference) in clauses.iter().enumerate() {
                    let mine = cnf.clause(c as i32);
                    assert_eq!(mine.len(), reference.lits().len(), "clause {}", c);
                    for (a, b) in mine.iter().zip(reference.lits().iter()) {
                        let var = b.var().to_u64() as i32;
                        let expected = if b.sign() == dimacs::Sign::Neg { -var } else { var };
                        assert_eq!(a.0, expected, "clause {}", c);
                    }
                }
            }
            _ => panic!("{}: not a cnf instance", filename),
        }
    });
}

#[test]
fn single_positive_unit_clause() {
    let mut w = Walker::new(formula("p cnf 1 1\n1 0\n"), params(1, 0));
    match w.solve() {
        SolveResult::Sat(model) => assert!(model[1]),
        other => panic!("expected sat, got {:?}", other),
    }
}

#[test]
fn contradiction_is_never_reported_sat() {
    // x and not-x: no model exists and the solver cannot know it. A flip cap
    // stands in for a wall clock; the run must end in Unknown, never Sat.
    for seed in [1, 2, 3] {
        let mut w = Walker::new(formula("p cnf 1 2\n1 0\n-1 0\n"), params(seed, 100_000));
        assert_eq!(w.solve(), SolveResult::Unknown);
    }
}

#[test]
fn empty_clause_file_is_unsat_without_searching() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"c nothing to do\np cnf 0 1\n0\n").unwrap();
    let result = mywalksolver::solve_dimacs_file(file.path(), params(1, 0)).unwrap();
    assert_eq!(result, SolveResult::Unsat);
}

#[test]
fn three_clause_example() {
    let mut w = Walker::new(formula("p cnf 4 3\n1 2 0\n3 0\n-2 -3 4 0\n"), params(2, 0));
    match w.solve() {
        SolveResult::Sat(model) => assert!(verify_model(&w.cnf, &model)),
        other => panic!("expected sat, got {:?}", other),
    }
}

#[test]
fn forced_variable_example() {
    // Any model has variable 2 false and one of 1, 3 true; checking
    // clause-wise covers all of them.
    let mut w = Walker::new(
        formula("p cnf 3 3\n1 2 3 0\n-1 -2 0\n-2 -3 0\n"),
        params(3, 0),
    );
    match w.solve() {
        SolveResult::Sat(model) => {
            assert!(verify_model(&w.cnf, &model));
            assert!(!model[2]);
            assert!(model[1] || model[3]);
        }
        other => panic!("expected sat, got {:?}", other),
    }
}

/// Random 3-SAT at the given size with a planted model: clauses falsified by
/// the planted assignment get one literal flipped to satisfy it.
fn planted_3sat(num_vars: i32, num_clauses: usize, rng: &mut StdRng) -> Cnf {
    let planted: Vec<bool> = (0..=num_vars).map(|_| rng.gen()).collect();
    let mut clauses = Vec::with_capacity(num_clauses);
    for _ in 0..num_clauses {
        let mut vars: Vec<i32> = Vec::new();
        while vars.len() < 3 {
            let v = rng.gen_range(1..=num_vars);
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        let mut clause: Vec<Lit> = vars
            .into_iter()
            .map(|v| Lit(if rng.gen() { v } else { -v }))
            .collect();
        if !clause.iter().any(|l| l.is_pos() == planted[l.var().idx()]) {
            let i = rng.gen_range(0..clause.len());
            clause[i] = !clause[i];
        }
        clauses.push(clause);
    }
    Cnf::new(num_vars, clauses)
}

#[test]
fn solves_planted_random_3sat() {
    // 100 variables at clause/variable ratio 4.0.
    let mut gen = StdRng::seed_from_u64(424242);
    let cnf = planted_3sat(100, 400, &mut gen);
    let mut w = Walker::new(cnf, params(9, 50_000_000));
    match w.solve() {
        SolveResult::Sat(model) => assert!(verify_model(&w.cnf, &model)),
        other => panic!("expected sat, got {:?}", other),
    }
}

#[test]
fn fixed_seed_runs_are_identical() {
    let run = || {
        let mut gen = StdRng::seed_from_u64(31337);
        let cnf = planted_3sat(60, 240, &mut gen);
        let mut w = Walker::new(cnf, params(12345, 50_000_000));
        let result = w.solve();
        (result, w.stats.flips)
    };
    let (result_a, flips_a) = run();
    let (result_b, flips_b) = run();
    assert_eq!(result_a, result_b);
    assert_eq!(flips_a, flips_b);
    assert!(matches!(result_a, SolveResult::Sat(_)));
}

use flipsat::cnf::{Formula, FormulaSource, InstanceParams, UniformRandom};
use flipsat::error::{ConfigError, FlipsatError};
use flipsat::search::{PolicyKind, SearchParams, solve, solve_instance};

const POLICIES: [PolicyKind; 3] = [
    PolicyKind::Gsat,
    PolicyKind::WalkSat { noise: 0.5 },
    PolicyKind::NoisyGsat { noise: 0.2 },
];

fn params(max_tries: usize, max_flips: usize) -> SearchParams {
    SearchParams {
        max_flips,
        max_tries,
    }
}

#[test]
fn mixed_assignment_instance_always_solves() {
    let f = Formula::new(3, 2, 3, vec![vec![1, 2, 3], vec![-1, -2, -3]]).expect("formula");
    for policy in POLICIES {
        for seed in 0..200 {
            let out = solve(&f, &params(5, 10), policy, seed).expect("solve");
            assert!(out.success, "{} failed on seed {}", policy.name(), seed);
            assert!(out.flips_used <= 1);
            let model = out.assignment.expect("model");
            assert!(f.is_satisfied_by(&model));
        }
    }
}

#[test]
fn contradiction_exhausts_full_budget() {
    let f = Formula::new(2, 2, 1, vec![vec![1], vec![-1]]).expect("formula");
    for policy in POLICIES {
        for seed in 0..10 {
            let out = solve(&f, &params(4, 7), policy, seed).expect("solve");
            assert_eq!(out.summary(), (false, 4, 7));
            assert_eq!(out.total_flips, 28);
            assert!(out.assignment.is_none());
        }
    }
}

#[test]
fn zero_flip_budget_reports_boundary() {
    let f = Formula::new(2, 2, 1, vec![vec![1], vec![-1]]).expect("formula");
    let out = solve(&f, &params(1, 0), PolicyKind::Gsat, 3).expect("solve");
    assert_eq!(out.summary(), (false, 1, 0));
    assert_eq!(out.total_flips, 0);
}

#[test]
fn satisfied_draw_needs_no_flip() {
    let f = Formula::new(1, 1, 2, vec![vec![1, -1]]).expect("formula");
    for seed in 0..20 {
        let out = solve(&f, &params(3, 10), PolicyKind::Gsat, seed).expect("solve");
        assert_eq!(out.summary(), (true, 1, 0));
    }
}

#[test]
fn empty_formula_is_trivially_solved() {
    let f = Formula::new(4, 0, 3, Vec::new()).expect("formula");
    let out = solve(&f, &params(1, 0), PolicyKind::Gsat, 0).expect("solve");
    assert_eq!(out.summary(), (true, 1, 0));
}

#[test]
fn same_seed_same_outcome() {
    let instance = InstanceParams {
        num_vars: 50,
        num_clauses: 200,
        clause_len: 3,
        seed: 17,
    };
    for policy in POLICIES {
        let a = solve_instance(&UniformRandom, &instance, &params(5, 300), policy).expect("solve");
        let b = solve_instance(&UniformRandom, &instance, &params(5, 300), policy).expect("solve");
        assert_eq!(a, b);
    }
}

#[test]
fn reported_success_satisfies_formula() {
    let mut successes = 0usize;
    for seed in 0..30 {
        let instance = InstanceParams {
            num_vars: 30,
            num_clauses: 90,
            clause_len: 3,
            seed,
        };
        let formula = UniformRandom.generate(&instance).expect("gen");
        let out = solve(&formula, &params(10, 200), PolicyKind::Gsat, seed).expect("solve");
        if out.success {
            successes += 1;
            assert!(out.tries_used >= 1 && out.tries_used <= 10);
            assert!(out.flips_used <= 200);
            let model = out.assignment.expect("model");
            assert!(formula.is_satisfied_by(&model));
        }
    }
    assert!(successes > 0);
}

#[test]
fn bad_configuration_fails_before_search() {
    let instance = InstanceParams {
        num_vars: 10,
        num_clauses: 20,
        clause_len: 3,
        seed: 0,
    };
    let err = match solve_instance(&UniformRandom, &instance, &params(0, 10), PolicyKind::Gsat) {
        Ok(_) => panic!("expected config error"),
        Err(e) => e,
    };
    assert!(matches!(err, FlipsatError::Config(ConfigError::ZeroTries)));

    let no_vars = InstanceParams {
        num_vars: 0,
        ..instance
    };
    let err = match solve_instance(&UniformRandom, &no_vars, &params(1, 10), PolicyKind::Gsat) {
        Ok(_) => panic!("expected config error"),
        Err(e) => e,
    };
    assert!(matches!(err, FlipsatError::Config(ConfigError::NoVariables)));

    let zero_k = InstanceParams {
        clause_len: 0,
        ..instance
    };
    let err = match solve_instance(&UniformRandom, &zero_k, &params(1, 10), PolicyKind::Gsat) {
        Ok(_) => panic!("expected config error"),
        Err(e) => e,
    };
    assert!(matches!(err, FlipsatError::Config(ConfigError::ZeroClauseLength)));

    let huge = InstanceParams {
        num_vars: 3_000_000_000,
        num_clauses: 1,
        ..instance
    };
    let err = match solve_instance(&UniformRandom, &huge, &params(1, 10), PolicyKind::Gsat) {
        Ok(_) => panic!("expected config error"),
        Err(e) => e,
    };
    assert!(matches!(
        err,
        FlipsatError::Config(ConfigError::TooManyVariables(3_000_000_000))
    ));
}

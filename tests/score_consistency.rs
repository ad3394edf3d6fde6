use proptest::prelude::*;

use flipsat::cnf::Formula;
use flipsat::search::{ScoreIndex, evaluate_flip};

#[derive(Debug, Clone)]
struct Case {
    num_vars: u32,
    clause_len: usize,
    clauses: Vec<Vec<i32>>,
    assignment: Vec<bool>,
    flips: Vec<u32>,
}

fn case() -> impl Strategy<Value = Case> {
    (1u32..10, 1usize..5, 0usize..25).prop_flat_map(|(n, k, m)| {
        let lit = (1..=n as i32, any::<bool>()).prop_map(|(v, pos)| if pos { v } else { -v });
        (
            prop::collection::vec(prop::collection::vec(lit, k), m),
            prop::collection::vec(any::<bool>(), n as usize),
            prop::collection::vec(1..=n, 0..40),
        )
            .prop_map(move |(clauses, bits, flips)| {
                let mut assignment = vec![false];
                assignment.extend(bits);
                Case {
                    num_vars: n,
                    clause_len: k,
                    clauses,
                    assignment,
                    flips,
                }
            })
    })
}

fn build(c: &Case) -> Formula {
    Formula::new(c.num_vars, c.clauses.len(), c.clause_len, c.clauses.clone()).expect("formula")
}

proptest! {
    #[test]
    fn incremental_scores_match_recount(c in case()) {
        let formula = build(&c);
        let mut idx = ScoreIndex::new(&formula, c.assignment.clone());
        prop_assert_eq!(idx.recount(), (idx.scores().to_vec(), idx.total_satisfied()));

        for &var in &c.flips {
            let projected = evaluate_flip(&idx, var);
            let total = idx.apply_flip(var);
            prop_assert_eq!(projected.new_total, total);

            let fresh = ScoreIndex::new(&formula, idx.assignment().to_vec());
            prop_assert_eq!(fresh.scores(), idx.scores());
            prop_assert_eq!(fresh.total_satisfied(), total);
            prop_assert_eq!(formula.count_satisfied(idx.assignment()), total);

            let mut a = fresh.unsatisfied().to_vec();
            let mut b = idx.unsatisfied().to_vec();
            a.sort_unstable();
            b.sort_unstable();
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn totals_stay_in_bounds(c in case()) {
        let formula = build(&c);
        let mut idx = ScoreIndex::new(&formula, c.assignment.clone());
        for &var in &c.flips {
            let total = idx.apply_flip(var);
            prop_assert!(total <= formula.num_clauses());
            prop_assert!(idx.scores().iter().all(|&s| s as usize <= c.clause_len));
            prop_assert_eq!(idx.is_solved(), idx.unsatisfied().is_empty());
        }
    }

    #[test]
    fn evaluation_never_mutates(c in case()) {
        let formula = build(&c);
        let idx = ScoreIndex::new(&formula, c.assignment.clone());
        let scores = idx.scores().to_vec();
        let total = idx.total_satisfied();
        for var in 1..=c.num_vars {
            let _ = evaluate_flip(&idx, var);
        }
        prop_assert_eq!(idx.scores(), scores.as_slice());
        prop_assert_eq!(idx.total_satisfied(), total);
        prop_assert_eq!(idx.assignment(), c.assignment.as_slice());
    }
}

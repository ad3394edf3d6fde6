use crate::cnf::Formula;

const NOT_UNSAT: usize = usize::MAX;

/// Incrementally maintained clause scores for one try.
///
/// Each variable has two dense occurrence lists: clauses containing its
/// positive literal and clauses containing its negative literal, with one
/// entry per occurrence so duplicated literals count twice. The variable's
/// current value decides which list is the satisfying one, so a flip swaps
/// the roles of the two lists without touching them.
#[derive(Debug, Clone)]
pub struct ScoreIndex<'f> {
    formula: &'f Formula,
    assignment: Vec<bool>,
    pos_occ: Vec<Vec<u32>>,
    neg_occ: Vec<Vec<u32>>,
    scores: Vec<u32>,
    total: usize,
    unsat: Vec<u32>,
    unsat_pos: Vec<usize>,
    candidates: Vec<u32>,
}

impl<'f> ScoreIndex<'f> {
    /// Builds everything from scratch in one pass over the literals.
    pub fn new(formula: &'f Formula, assignment: Vec<bool>) -> Self {
        let num_vars = formula.num_vars() as usize;
        assert_eq!(
            assignment.len(),
            num_vars + 1,
            "assignment must cover variables 1..={}",
            num_vars
        );

        let num_clauses = formula.num_clauses();
        let mut pos_occ = vec![Vec::new(); num_vars + 1];
        let mut neg_occ = vec![Vec::new(); num_vars + 1];
        let mut scores = vec![0u32; num_clauses];

        for (c, clause) in formula.clauses().iter().enumerate() {
            for &lit in clause {
                let v = lit.var as usize;
                if lit.sign {
                    pos_occ[v].push(c as u32);
                } else {
                    neg_occ[v].push(c as u32);
                }
                if lit.is_true(&assignment) {
                    scores[c] += 1;
                }
            }
        }

        let mut unsat = Vec::new();
        let mut unsat_pos = vec![NOT_UNSAT; num_clauses];
        for (c, &s) in scores.iter().enumerate() {
            if s == 0 {
                mark_unsat(&mut unsat, &mut unsat_pos, c as u32);
            }
        }
        let total = num_clauses - unsat.len();

        let candidates = (1..=num_vars)
            .filter(|&v| !pos_occ[v].is_empty() || !neg_occ[v].is_empty())
            .map(|v| v as u32)
            .collect();

        Self {
            formula,
            assignment,
            pos_occ,
            neg_occ,
            scores,
            total,
            unsat,
            unsat_pos,
            candidates,
        }
    }

    pub fn formula(&self) -> &'f Formula {
        self.formula
    }

    pub fn assignment(&self) -> &[bool] {
        &self.assignment
    }

    pub fn into_assignment(self) -> Vec<bool> {
        self.assignment
    }

    pub fn clause_len(&self) -> usize {
        self.formula.clause_len()
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn score(&self, clause: u32) -> u32 {
        self.scores[clause as usize]
    }

    pub fn total_satisfied(&self) -> usize {
        self.total
    }

    pub fn is_solved(&self) -> bool {
        self.total == self.scores.len()
    }

    /// Clauses with score 0, in no particular order.
    pub fn unsatisfied(&self) -> &[u32] {
        &self.unsat
    }

    /// Variables occurring in at least one clause, ascending.
    pub fn candidates(&self) -> &[u32] {
        &self.candidates
    }

    /// Occurrences that are true under the current value of `var`.
    pub fn satisfying(&self, var: u32) -> &[u32] {
        let v = var as usize;
        if self.assignment[v] {
            &self.pos_occ[v]
        } else {
            &self.neg_occ[v]
        }
    }

    /// Occurrences that become true once `var` flips.
    pub fn falsifying(&self, var: u32) -> &[u32] {
        let v = var as usize;
        if self.assignment[v] {
            &self.neg_occ[v]
        } else {
            &self.pos_occ[v]
        }
    }

    /// Flips `var` and returns the new satisfied-clause total.
    pub fn apply_flip(&mut self, var: u32) -> usize {
        let v = var as usize;
        let clause_len = self.formula.clause_len();
        let Self {
            assignment,
            pos_occ,
            neg_occ,
            scores,
            total,
            unsat,
            unsat_pos,
            ..
        } = self;

        let (sat_side, false_side) = if assignment[v] {
            (&pos_occ[v], &neg_occ[v])
        } else {
            (&neg_occ[v], &pos_occ[v])
        };

        for &c in false_side {
            let old = scores[c as usize];
            let new = step_score(old, true, clause_len);
            if old == 0 {
                *total += 1;
                mark_sat(unsat, unsat_pos, c);
            }
            scores[c as usize] = new;
        }
        for &c in sat_side {
            let old = scores[c as usize];
            let new = step_score(old, false, clause_len);
            if new == 0 {
                *total -= 1;
                mark_unsat(unsat, unsat_pos, c);
            }
            scores[c as usize] = new;
        }

        assignment[v] = !assignment[v];
        *total
    }

    /// From-scratch scores and total for the current assignment.
    pub fn recount(&self) -> (Vec<u32>, usize) {
        let scores = (0..self.formula.num_clauses())
            .map(|c| self.formula.clause_score(c, &self.assignment))
            .collect::<Vec<_>>();
        let total = scores.iter().filter(|&&s| s > 0).count();
        (scores, total)
    }
}

/// Moves a clause score by one literal occurrence, within `[0, clause_len]`.
/// Leaving that range means the occurrence lists are out of sync with the
/// scores, which is a bug rather than a recoverable state.
pub(crate) fn step_score(old: u32, up: bool, clause_len: usize) -> u32 {
    if up {
        assert!(
            (old as usize) < clause_len,
            "clause score {} cannot grow past clause length {}",
            old,
            clause_len
        );
        old + 1
    } else {
        assert!(old > 0, "clause score cannot drop below zero");
        old - 1
    }
}

fn mark_unsat(unsat: &mut Vec<u32>, unsat_pos: &mut [usize], c: u32) {
    unsat_pos[c as usize] = unsat.len();
    unsat.push(c);
}

fn mark_sat(unsat: &mut Vec<u32>, unsat_pos: &mut [usize], c: u32) {
    let idx = unsat_pos[c as usize];
    unsat.swap_remove(idx);
    if idx < unsat.len() {
        unsat_pos[unsat[idx] as usize] = idx;
    }
    unsat_pos[c as usize] = NOT_UNSAT;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_swaps_satisfying_side() {
        let f = Formula::new(3, 2, 3, vec![vec![1, 2, 3], vec![-1, -2, -3]]).expect("formula");
        let mut idx = ScoreIndex::new(&f, vec![false, true, true, true]);
        assert_eq!(idx.total_satisfied(), 1);
        assert_eq!(idx.unsatisfied(), &[1]);
        assert_eq!(idx.satisfying(1), &[0]);
        assert_eq!(idx.falsifying(1), &[1]);

        assert_eq!(idx.apply_flip(1), 2);
        assert!(idx.is_solved());
        assert!(idx.unsatisfied().is_empty());
        assert_eq!(idx.scores(), &[2, 1]);
        assert_eq!(idx.satisfying(1), &[1]);
        assert_eq!(idx.falsifying(1), &[0]);
    }

    #[test]
    fn duplicate_literal_breaks_clause_in_one_flip() {
        let f = Formula::new(2, 1, 3, vec![vec![1, 1, 2]]).expect("formula");
        let mut idx = ScoreIndex::new(&f, vec![false, true, false]);
        assert_eq!(idx.scores(), &[2]);
        assert_eq!(idx.apply_flip(1), 0);
        assert_eq!(idx.scores(), &[0]);
        assert_eq!(idx.unsatisfied(), &[0]);
    }

    #[test]
    fn tautology_never_changes_total() {
        let f = Formula::new(2, 1, 3, vec![vec![1, -1, 2]]).expect("formula");
        let mut idx = ScoreIndex::new(&f, vec![false, true, false]);
        for _ in 0..4 {
            assert_eq!(idx.apply_flip(1), 1);
            assert_eq!(idx.scores(), &[1]);
        }
    }

    #[test]
    fn candidates_skip_unused_vars() {
        let f = Formula::new(4, 2, 1, vec![vec![3], vec![-1]]).expect("formula");
        let idx = ScoreIndex::new(&f, vec![false; 5]);
        assert_eq!(idx.candidates(), &[1, 3]);
    }
}

use indexmap::IndexMap;

use super::score::{ScoreIndex, step_score};

/// Projected effect of flipping one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipMove {
    pub var: u32,
    /// Post-flip scores of the affected clauses, in first-touch order.
    pub new_scores: IndexMap<u32, u32>,
    pub new_total: usize,
    /// Unsatisfied clauses that become satisfied.
    pub makes: usize,
    /// Satisfied clauses that become unsatisfied.
    pub breaks: usize,
}

impl FlipMove {
    pub fn gain(&self) -> isize {
        self.makes as isize - self.breaks as isize
    }
}

/// Same update rule as [`ScoreIndex::apply_flip`], run against a scratch copy
/// of the affected scores. The index is left untouched.
pub fn evaluate_flip(index: &ScoreIndex<'_>, var: u32) -> FlipMove {
    let clause_len = index.clause_len();
    let mut new_scores = IndexMap::<u32, u32>::new();
    let mut new_total = index.total_satisfied();
    let mut makes = 0usize;
    let mut breaks = 0usize;

    for &c in index.falsifying(var) {
        let old = new_scores.get(&c).copied().unwrap_or_else(|| index.score(c));
        let new = step_score(old, true, clause_len);
        if old == 0 {
            new_total += 1;
            makes += 1;
        }
        new_scores.insert(c, new);
    }
    for &c in index.satisfying(var) {
        let old = new_scores.get(&c).copied().unwrap_or_else(|| index.score(c));
        let new = step_score(old, false, clause_len);
        if new == 0 {
            new_total -= 1;
            breaks += 1;
        }
        new_scores.insert(c, new);
    }

    FlipMove {
        var,
        new_scores,
        new_total,
        makes,
        breaks,
    }
}

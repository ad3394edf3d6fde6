use crate::error::MalformedFormulaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    pub var: u32,
    pub sign: bool,
}

impl Lit {
    pub fn new(var: u32, sign: bool) -> Self {
        Self { var, sign }
    }

    /// Signed-integer form; `None` for the 0 terminator.
    pub fn from_dimacs(x: i32) -> Option<Self> {
        if x == 0 {
            return None;
        }
        Some(Self::new(x.unsigned_abs(), x > 0))
    }

    pub fn to_dimacs(self) -> i64 {
        let v = self.var as i64;
        if self.sign { v } else { -v }
    }

    /// `assignment` is indexed by variable id; slot 0 is unused.
    pub fn is_true(self, assignment: &[bool]) -> bool {
        assignment[self.var as usize] == self.sign
    }
}

/// Immutable CNF instance where every clause has exactly `clause_len` literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    num_vars: u32,
    clause_len: usize,
    clauses: Vec<Vec<Lit>>,
}

impl Formula {
    pub fn new(
        num_vars: u32,
        num_clauses: usize,
        clause_len: usize,
        clauses: Vec<Vec<i32>>,
    ) -> Result<Self, MalformedFormulaError> {
        if clauses.len() != num_clauses {
            return Err(MalformedFormulaError::ClauseCount {
                expected: num_clauses,
                found: clauses.len(),
            });
        }

        let mut out = Vec::with_capacity(clauses.len());
        for (idx, clause) in clauses.into_iter().enumerate() {
            if clause.is_empty() {
                return Err(MalformedFormulaError::EmptyClause { clause: idx });
            }
            if clause.len() != clause_len {
                return Err(MalformedFormulaError::ClauseLength {
                    clause: idx,
                    expected: clause_len,
                    found: clause.len(),
                });
            }
            let mut lits = Vec::with_capacity(clause.len());
            for x in clause {
                let lit =
                    Lit::from_dimacs(x).ok_or(MalformedFormulaError::ZeroLiteral { clause: idx })?;
                if lit.var > num_vars {
                    return Err(MalformedFormulaError::VarOutOfRange {
                        clause: idx,
                        var: lit.var,
                        num_vars,
                    });
                }
                lits.push(lit);
            }
            out.push(lits);
        }

        Ok(Self {
            num_vars,
            clause_len,
            clauses: out,
        })
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clause_len(&self) -> usize {
        self.clause_len
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    pub fn clause(&self, idx: usize) -> &[Lit] {
        &self.clauses[idx]
    }

    /// Number of true literal occurrences in clause `idx`.
    pub fn clause_score(&self, idx: usize, assignment: &[bool]) -> u32 {
        self.clauses[idx]
            .iter()
            .filter(|lit| lit.is_true(assignment))
            .count() as u32
    }

    pub fn count_satisfied(&self, assignment: &[bool]) -> usize {
        (0..self.clauses.len())
            .filter(|&i| self.clause_score(i, assignment) > 0)
            .count()
    }

    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|lit| lit.is_true(assignment)))
    }
}

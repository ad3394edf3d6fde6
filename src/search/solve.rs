use log::{debug, trace};
use rand_chacha::ChaCha8Rng;

use crate::cnf::{Formula, FormulaSource, InstanceParams};
use crate::error::{ConfigError, FlipsatError};
use crate::rng::{random_assignment, search_rng};

use super::policy::{MovePolicy, PolicyKind};
use super::score::ScoreIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Flips allowed per try.
    pub max_flips: usize,
    /// Tries (restarts from a fresh random assignment) allowed.
    pub max_tries: usize,
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tries == 0 {
            return Err(ConfigError::ZeroTries);
        }
        Ok(())
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_flips: 100,
            max_tries: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub success: bool,
    pub tries_used: usize,
    /// Flips performed in the final try (`max_flips` on failure).
    pub flips_used: usize,
    /// Flips performed across all tries.
    pub total_flips: usize,
    /// The satisfying assignment, indexed by variable id (slot 0 unused).
    pub assignment: Option<Vec<bool>>,
}

impl SolveOutcome {
    pub fn summary(&self) -> (bool, usize, usize) {
        (self.success, self.tries_used, self.flips_used)
    }
}

enum TryOutcome {
    Solved { flips: usize, assignment: Vec<bool> },
    Exhausted { flips: usize },
}

/// Generates the formula for `instance` and searches it with a generator
/// seeded from the same seed.
pub fn solve_instance<S: FormulaSource + ?Sized>(
    source: &S,
    instance: &InstanceParams,
    params: &SearchParams,
    policy: PolicyKind,
) -> Result<SolveOutcome, FlipsatError> {
    instance.validate()?;
    params.validate()?;
    let mut policy = policy.build()?;
    let formula = source.generate(instance)?;
    let mut rng = search_rng(instance.seed);
    Ok(solve_with(&formula, params, policy.as_mut(), &mut rng)?)
}

pub fn solve(
    formula: &Formula,
    params: &SearchParams,
    policy: PolicyKind,
    seed: u64,
) -> Result<SolveOutcome, ConfigError> {
    let mut policy = policy.build()?;
    let mut rng = search_rng(seed);
    solve_with(formula, params, policy.as_mut(), &mut rng)
}

/// Runs up to `max_tries` tries of up to `max_flips` flips each. Running out
/// of budget is a normal outcome, reported as `(false, max_tries, max_flips)`.
pub fn solve_with(
    formula: &Formula,
    params: &SearchParams,
    policy: &mut dyn MovePolicy,
    rng: &mut ChaCha8Rng,
) -> Result<SolveOutcome, ConfigError> {
    params.validate()?;
    if formula.num_vars() == 0 {
        return Err(ConfigError::NoVariables);
    }
    if formula.clause_len() == 0 {
        return Err(ConfigError::ZeroClauseLength);
    }

    let mut total_flips = 0usize;
    for attempt in 1..=params.max_tries {
        match run_try(formula, params.max_flips, policy, rng) {
            TryOutcome::Solved { flips, assignment } => {
                total_flips += flips;
                debug!(
                    "{}: solved on try {} after {} flips",
                    policy.name(),
                    attempt,
                    flips
                );
                return Ok(SolveOutcome {
                    success: true,
                    tries_used: attempt,
                    flips_used: flips,
                    total_flips,
                    assignment: Some(assignment),
                });
            }
            TryOutcome::Exhausted { flips } => {
                total_flips += flips;
                debug!("{}: try {} exhausted", policy.name(), attempt);
            }
        }
    }

    Ok(SolveOutcome {
        success: false,
        tries_used: params.max_tries,
        flips_used: params.max_flips,
        total_flips,
        assignment: None,
    })
}

fn run_try(
    formula: &Formula,
    max_flips: usize,
    policy: &mut dyn MovePolicy,
    rng: &mut ChaCha8Rng,
) -> TryOutcome {
    let mut index = ScoreIndex::new(formula, random_assignment(formula.num_vars(), rng));
    if index.is_solved() {
        return TryOutcome::Solved {
            flips: 0,
            assignment: index.into_assignment(),
        };
    }

    for flip in 1..=max_flips {
        let Some(var) = policy.select(&index, rng) else {
            return TryOutcome::Exhausted { flips: flip - 1 };
        };
        let total = index.apply_flip(var);
        debug_assert_eq!(index.recount().1, total, "incremental total drifted");
        trace!("flip {} var {} satisfied {}", flip, var, total);
        if total == formula.num_clauses() {
            return TryOutcome::Solved {
                flips: flip,
                assignment: index.into_assignment(),
            };
        }
    }
    TryOutcome::Exhausted { flips: max_flips }
}

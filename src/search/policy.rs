use std::str::FromStr;

use log::trace;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::ConfigError;

use super::eval::{FlipMove, evaluate_flip};
use super::score::ScoreIndex;

/// Picks the variable to flip at each step of a try.
pub trait MovePolicy {
    fn name(&self) -> &'static str;
    /// `None` only when no variable occurs in any clause.
    fn select(&mut self, index: &ScoreIndex<'_>, rng: &mut ChaCha8Rng) -> Option<u32>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyKind {
    Gsat,
    WalkSat { noise: f64 },
    NoisyGsat { noise: f64 },
}

/// Noise a policy parsed from its bare name starts with.
pub const DEFAULT_NOISE: f64 = 0.5;

impl PolicyKind {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            PolicyKind::Gsat => Ok(()),
            PolicyKind::WalkSat { noise } | PolicyKind::NoisyGsat { noise } => check_noise(noise),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Gsat => "gsat",
            PolicyKind::WalkSat { .. } => "walksat",
            PolicyKind::NoisyGsat { .. } => "noisy-gsat",
        }
    }

    pub fn noise(&self) -> Option<f64> {
        match *self {
            PolicyKind::Gsat => None,
            PolicyKind::WalkSat { noise } | PolicyKind::NoisyGsat { noise } => Some(noise),
        }
    }

    /// Same kind with `noise` swapped in; GSAT has none and is returned as is.
    pub fn with_noise(self, noise: f64) -> Self {
        match self {
            PolicyKind::Gsat => PolicyKind::Gsat,
            PolicyKind::WalkSat { .. } => PolicyKind::WalkSat { noise },
            PolicyKind::NoisyGsat { .. } => PolicyKind::NoisyGsat { noise },
        }
    }

    pub fn build(&self) -> Result<Box<dyn MovePolicy>, ConfigError> {
        Ok(match *self {
            PolicyKind::Gsat => Box::new(Greedy),
            PolicyKind::WalkSat { noise } => Box::new(WalkSat::new(noise)?),
            PolicyKind::NoisyGsat { noise } => Box::new(NoisyGreedy::new(noise)?),
        })
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gsat" => Ok(PolicyKind::Gsat),
            "walksat" => Ok(PolicyKind::WalkSat {
                noise: DEFAULT_NOISE,
            }),
            "noisy-gsat" => Ok(PolicyKind::NoisyGsat {
                noise: DEFAULT_NOISE,
            }),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

fn check_noise(noise: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&noise) {
        Ok(())
    } else {
        Err(ConfigError::Noise(noise))
    }
}

/// GSAT: flip the variable with the highest projected total.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl MovePolicy for Greedy {
    fn name(&self) -> &'static str {
        "gsat"
    }

    fn select(&mut self, index: &ScoreIndex<'_>, _rng: &mut ChaCha8Rng) -> Option<u32> {
        best_move(index).map(|mv| mv.var)
    }
}

/// Scans candidates in ascending id order and keeps the first strictly better
/// projection, so ties go to the lowest id. When nothing beats the current
/// total the least-bad move is still returned.
pub fn best_move(index: &ScoreIndex<'_>) -> Option<FlipMove> {
    let mut best: Option<FlipMove> = None;
    for &var in index.candidates() {
        let mv = evaluate_flip(index, var);
        match &best {
            Some(b) if mv.new_total <= b.new_total => {}
            _ => best = Some(mv),
        }
    }

    if let Some(b) = &best {
        if b.new_total <= index.total_satisfied() {
            trace!(
                "no improving flip, taking var {} ({} -> {})",
                b.var,
                index.total_satisfied(),
                b.new_total
            );
        }
    }
    best
}

/// WalkSAT (SKC): work on a random unsatisfied clause. A variable that breaks
/// nothing is flipped outright; otherwise with probability `noise` a random
/// variable of the clause, else the one with the fewest breaks.
#[derive(Debug, Clone, Copy)]
pub struct WalkSat {
    noise: f64,
}

impl WalkSat {
    pub fn new(noise: f64) -> Result<Self, ConfigError> {
        check_noise(noise)?;
        Ok(Self { noise })
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }
}

impl MovePolicy for WalkSat {
    fn name(&self) -> &'static str {
        "walksat"
    }

    fn select(&mut self, index: &ScoreIndex<'_>, rng: &mut ChaCha8Rng) -> Option<u32> {
        let clause = random_unsat_clause(index, rng)?;
        let lits = index.formula().clause(clause as usize);

        let (least_breaks, var) = lits
            .iter()
            .map(|lit| (evaluate_flip(index, lit.var).breaks, lit.var))
            .min()?;
        if least_breaks == 0 || !rng.random_bool(self.noise) {
            return Some(var);
        }
        Some(lits[rng.random_range(0..lits.len())].var)
    }
}

/// GSAT with random walk: with probability `noise` flip a random variable of a
/// random unsatisfied clause, otherwise take the greedy move.
#[derive(Debug, Clone, Copy)]
pub struct NoisyGreedy {
    noise: f64,
}

impl NoisyGreedy {
    pub fn new(noise: f64) -> Result<Self, ConfigError> {
        check_noise(noise)?;
        Ok(Self { noise })
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }
}

impl MovePolicy for NoisyGreedy {
    fn name(&self) -> &'static str {
        "noisy-gsat"
    }

    fn select(&mut self, index: &ScoreIndex<'_>, rng: &mut ChaCha8Rng) -> Option<u32> {
        if !index.unsatisfied().is_empty() && rng.random_bool(self.noise) {
            let clause = random_unsat_clause(index, rng)?;
            let lits = index.formula().clause(clause as usize);
            return Some(lits[rng.random_range(0..lits.len())].var);
        }
        best_move(index).map(|mv| mv.var)
    }
}

fn random_unsat_clause(index: &ScoreIndex<'_>, rng: &mut ChaCha8Rng) -> Option<u32> {
    let unsat = index.unsatisfied();
    if unsat.is_empty() {
        return None;
    }
    Some(unsat[rng.random_range(0..unsat.len())])
}

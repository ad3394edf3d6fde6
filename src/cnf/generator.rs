use std::path::PathBuf;
use std::process::Command;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{ConfigError, GeneratorError};

use super::formula::Formula;

/// Lines the generator prints before the first clause line.
pub const HEADER_LINES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceParams {
    pub num_vars: u32,
    pub num_clauses: usize,
    pub clause_len: usize,
    pub seed: u64,
}

impl InstanceParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_vars == 0 {
            return Err(ConfigError::NoVariables);
        }
        if i32::try_from(self.num_vars).is_err() {
            return Err(ConfigError::TooManyVariables(self.num_vars));
        }
        if self.clause_len == 0 {
            return Err(ConfigError::ZeroClauseLength);
        }
        Ok(())
    }
}

/// Anything that can produce the formula for one (parameters, seed) sample.
pub trait FormulaSource {
    fn generate(&self, params: &InstanceParams) -> Result<Formula, GeneratorError>;
    fn source_name(&self) -> &'static str;
}

/// Runs an external generator binary as `<program> -n N -m M -k K -s S`.
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    pub program: PathBuf,
}

impl ExternalGenerator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl FormulaSource for ExternalGenerator {
    fn generate(&self, params: &InstanceParams) -> Result<Formula, GeneratorError> {
        params.validate()?;
        debug!(
            "spawning {} n={} m={} k={} s={}",
            self.program.display(),
            params.num_vars,
            params.num_clauses,
            params.clause_len,
            params.seed
        );
        let output = Command::new(&self.program)
            .arg("-n")
            .arg(params.num_vars.to_string())
            .arg("-m")
            .arg(params.num_clauses.to_string())
            .arg("-k")
            .arg(params.clause_len.to_string())
            .arg("-s")
            .arg(params.seed.to_string())
            .output()
            .map_err(|source| GeneratorError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(GeneratorError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let text = String::from_utf8(output.stdout)?;
        parse_generator_output(&text, params)
    }

    fn source_name(&self) -> &'static str {
        "external"
    }
}

/// Uniform random k-SAT: every literal draws its variable and sign independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl FormulaSource for UniformRandom {
    fn generate(&self, params: &InstanceParams) -> Result<Formula, GeneratorError> {
        params.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let n = i32::try_from(params.num_vars)
            .map_err(|_| ConfigError::TooManyVariables(params.num_vars))?;
        let clauses = (0..params.num_clauses)
            .map(|_| {
                (0..params.clause_len)
                    .map(|_| {
                        let var = rng.random_range(1..=n);
                        if rng.random::<bool>() { var } else { -var }
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        Ok(Formula::new(
            params.num_vars,
            params.num_clauses,
            params.clause_len,
            clauses,
        )?)
    }

    fn source_name(&self) -> &'static str {
        "uniform"
    }
}

/// Skips the header, drops each line's trailing sentinel and expects exactly
/// `num_clauses` clause lines of `clause_len` literals.
pub fn parse_generator_output(
    text: &str,
    params: &InstanceParams,
) -> Result<Formula, GeneratorError> {
    let lines = text.lines().collect::<Vec<_>>();
    if lines.len() < HEADER_LINES {
        return Err(GeneratorError::ShortHeader { found: lines.len() });
    }

    let mut clauses = Vec::with_capacity(params.num_clauses);
    for (idx, line) in lines.iter().enumerate().skip(HEADER_LINES) {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let Some((_sentinel, lits)) = tokens.split_last() else {
            continue;
        };
        let clause = lits
            .iter()
            .map(|tok| {
                tok.parse::<i32>().map_err(|_| GeneratorError::Token {
                    line: idx + 1,
                    token: (*tok).to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        clauses.push(clause);
    }

    Ok(Formula::new(
        params.num_vars,
        params.num_clauses,
        params.clause_len,
        clauses,
    )?)
}

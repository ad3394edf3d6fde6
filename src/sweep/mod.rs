use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use log::{info, warn};

use crate::cnf::{FormulaSource, InstanceParams};
use crate::error::ConfigError;
use crate::oracle::is_satisfiable;
use crate::rng::sample_seed;
use crate::search::{PolicyKind, SearchParams, SolveOutcome, solve};

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub n_values: Vec<u32>,
    /// Clause-to-variable ratios (m/n).
    pub ratios: Vec<f64>,
    pub clause_len: usize,
    pub max_tries_values: Vec<usize>,
    pub max_flips: FlipBudget,
    /// Selects the policy kind; its own noise is replaced by each of `noise_values`.
    pub policy: PolicyKind,
    /// Noise axis for walksat and noisy-gsat. GSAT runs once per point regardless.
    pub noise_values: Vec<f64>,
    pub num_seeds: usize,
    pub base_seed: u64,
    pub workers: usize,
    pub oracle: bool,
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_values.is_empty() {
            return Err(ConfigError::EmptySweepAxis("n"));
        }
        if self.ratios.is_empty() {
            return Err(ConfigError::EmptySweepAxis("ratios"));
        }
        if self.max_tries_values.is_empty() {
            return Err(ConfigError::EmptySweepAxis("max_tries"));
        }
        if self.max_flips.is_empty() {
            return Err(ConfigError::EmptySweepAxis("max_flips"));
        }
        if self.num_seeds == 0 {
            return Err(ConfigError::NoSeeds);
        }
        if self.n_values.contains(&0) {
            return Err(ConfigError::NoVariables);
        }
        if let Some(&n) = self.n_values.iter().find(|n| i32::try_from(**n).is_err()) {
            return Err(ConfigError::TooManyVariables(n));
        }
        if self.clause_len == 0 {
            return Err(ConfigError::ZeroClauseLength);
        }
        if self.max_tries_values.contains(&0) {
            return Err(ConfigError::ZeroTries);
        }
        if let Some(&r) = self.ratios.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
            return Err(ConfigError::Ratio(r));
        }
        if self.policy.noise().is_some() && self.noise_values.is_empty() {
            return Err(ConfigError::EmptySweepAxis("noise"));
        }
        self.policies().iter().try_for_each(PolicyKind::validate)
    }

    /// One policy per noise value, or the bare policy when it takes no noise.
    pub fn policies(&self) -> Vec<PolicyKind> {
        match self.policy.noise() {
            None => vec![self.policy],
            Some(_) => self
                .noise_values
                .iter()
                .map(|&p| self.policy.with_noise(p))
                .collect(),
        }
    }

    /// Cartesian product, nested n -> max_tries -> max_flips -> noise -> ratio.
    pub fn configurations(&self) -> Vec<SweepPoint> {
        let policies = self.policies();
        let mut out = Vec::new();
        for &num_vars in &self.n_values {
            let flips = self.max_flips.values_for(num_vars);
            for &max_tries in &self.max_tries_values {
                for &max_flips in &flips {
                    for &policy in &policies {
                        for &ratio in &self.ratios {
                            out.push(SweepPoint {
                                num_vars,
                                ratio,
                                clause_len: self.clause_len,
                                params: SearchParams {
                                    max_flips,
                                    max_tries,
                                },
                                policy,
                            });
                        }
                    }
                }
            }
        }
        out
    }
}

/// Flip budgets per try, either absolute or as multiples of `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipBudget {
    Fixed(Vec<usize>),
    PerVariable(Vec<usize>),
}

impl FlipBudget {
    pub fn is_empty(&self) -> bool {
        match self {
            FlipBudget::Fixed(v) | FlipBudget::PerVariable(v) => v.is_empty(),
        }
    }

    pub fn values_for(&self, num_vars: u32) -> Vec<usize> {
        match self {
            FlipBudget::Fixed(v) => v.clone(),
            FlipBudget::PerVariable(coefs) => coefs
                .iter()
                .map(|c| c.saturating_mul(num_vars as usize))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub num_vars: u32,
    pub ratio: f64,
    pub clause_len: usize,
    pub params: SearchParams,
    pub policy: PolicyKind,
}

impl SweepPoint {
    /// `floor(ratio * n)`, nudged so 4.3 * 100 gives 430 rather than 429.
    pub fn num_clauses(&self) -> usize {
        (self.ratio * self.num_vars as f64 + 1e-9).floor() as usize
    }

    pub fn instance(&self, seed: u64) -> InstanceParams {
        InstanceParams {
            num_vars: self.num_vars,
            num_clauses: self.num_clauses(),
            clause_len: self.clause_len,
            seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub policy: String,
    pub noise: Option<f64>,
    pub n: u32,
    pub ratio: f64,
    pub m: usize,
    pub k: usize,
    pub max_tries: usize,
    pub max_flips: usize,
    pub samples: usize,
    pub successes: usize,
    pub success_rate: f64,
    /// Sum of `tries_used * flips_used` over samples.
    pub total_flips: usize,
    /// Flips actually performed, summed over every try of every sample.
    pub flips_performed: usize,
    pub satisfiable: Option<usize>,
    pub errors: usize,
    pub wall_ms: u128,
}

impl SweepRow {
    pub fn csv_header() -> &'static str {
        "policy,noise,n,m_over_n,m,k,max_tries,max_flips,samples,successes,success_rate,total_flips,flips_performed,satisfiable,errors,wall_ms"
    }

    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{:.1},{},{},{},{},{}",
            self.policy,
            opt_f64(self.noise),
            self.n,
            self.ratio,
            self.m,
            self.k,
            self.max_tries,
            self.max_flips,
            self.samples,
            self.successes,
            self.success_rate,
            self.total_flips,
            self.flips_performed,
            opt_usize(self.satisfiable),
            self.errors,
            self.wall_ms,
        )
    }
}

enum Sample {
    Ran {
        outcome: SolveOutcome,
        satisfiable: Option<bool>,
    },
    Failed,
}

/// Runs every configuration in order, handing each finished row to `on_row`.
pub fn run_sweep<S, F>(
    source: &S,
    cfg: &SweepConfig,
    mut on_row: F,
) -> Result<Vec<SweepRow>, ConfigError>
where
    S: FormulaSource + Sync + ?Sized,
    F: FnMut(&SweepRow),
{
    cfg.validate()?;
    let points = cfg.configurations();
    let mut rows = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        info!(
            "[{}/{}] {} p={} n={} m/n={} tries={} flips={}",
            i + 1,
            points.len(),
            point.policy.name(),
            opt_f64(point.policy.noise()),
            point.num_vars,
            point.ratio,
            point.params.max_tries,
            point.params.max_flips
        );
        let row = run_configuration(
            source,
            point,
            cfg.num_seeds,
            cfg.base_seed,
            cfg.workers,
            cfg.oracle,
        );
        on_row(&row);
        rows.push(row);
    }
    Ok(rows)
}

/// Solves `num_seeds` independent samples of one configuration on a pool of
/// scoped worker threads. Each sample owns its formula and generator.
pub fn run_configuration<S>(
    source: &S,
    point: &SweepPoint,
    num_seeds: usize,
    base_seed: u64,
    workers: usize,
    oracle: bool,
) -> SweepRow
where
    S: FormulaSource + Sync + ?Sized,
{
    let start = Instant::now();
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|scope| {
        for _ in 0..workers.clamp(1, num_seeds.max(1)) {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    if i >= num_seeds {
                        break;
                    }
                    let seed = sample_seed(base_seed, i);
                    let _ = tx.send(run_sample(source, point, seed, oracle));
                }
            });
        }
    });
    drop(tx);

    let mut row = SweepRow {
        policy: point.policy.name().to_string(),
        noise: point.policy.noise(),
        n: point.num_vars,
        ratio: point.ratio,
        m: point.num_clauses(),
        k: point.clause_len,
        max_tries: point.params.max_tries,
        max_flips: point.params.max_flips,
        samples: num_seeds,
        successes: 0,
        success_rate: 0.0,
        total_flips: 0,
        flips_performed: 0,
        satisfiable: if oracle { Some(0) } else { None },
        errors: 0,
        wall_ms: 0,
    };

    for sample in rx {
        match sample {
            Sample::Ran {
                outcome,
                satisfiable,
            } => {
                if outcome.success {
                    row.successes += 1;
                }
                row.total_flips += outcome.tries_used * outcome.flips_used;
                row.flips_performed += outcome.total_flips;
                if let (Some(count), Some(true)) = (row.satisfiable.as_mut(), satisfiable) {
                    *count += 1;
                }
            }
            Sample::Failed => row.errors += 1,
        }
    }

    row.success_rate = row.successes as f64 * 100.0 / num_seeds.max(1) as f64;
    row.wall_ms = start.elapsed().as_millis();
    row
}

fn run_sample<S>(source: &S, point: &SweepPoint, seed: u64, oracle: bool) -> Sample
where
    S: FormulaSource + ?Sized,
{
    let formula = match source.generate(&point.instance(seed)) {
        Ok(f) => f,
        Err(e) => {
            warn!("seed {}: formula generation failed: {}", seed, e);
            return Sample::Failed;
        }
    };
    let outcome = match solve(&formula, &point.params, point.policy, seed) {
        Ok(o) => o,
        Err(e) => {
            warn!("seed {}: {}", seed, e);
            return Sample::Failed;
        }
    };
    let satisfiable = if oracle {
        match is_satisfiable(&formula) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("seed {}: oracle failed: {}", seed, e);
                None
            }
        }
    } else {
        None
    };
    Sample::Ran {
        outcome,
        satisfiable,
    }
}

/// `start, start + step, ...` below `stop`, like numpy's `arange`. Values are
/// rounded to 6 decimals so accumulated float error does not leak into m.
pub fn ratio_range(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, ConfigError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(ConfigError::Ratio(step));
    }
    let mut out = Vec::new();
    let mut i = 0u32;
    loop {
        let x = ((start + step * i as f64) * 1e6).round() / 1e6;
        if x >= stop - 1e-9 {
            break;
        }
        out.push(x);
        i += 1;
    }
    Ok(out)
}

fn opt_usize(v: Option<usize>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn opt_f64(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SweepConfig {
        SweepConfig {
            n_values: vec![10, 20],
            ratios: vec![1.0, 2.0],
            clause_len: 3,
            max_tries_values: vec![1, 5],
            max_flips: FlipBudget::PerVariable(vec![2]),
            policy: PolicyKind::Gsat,
            noise_values: vec![0.5],
            num_seeds: 4,
            base_seed: 0,
            workers: 2,
            oracle: false,
        }
    }

    #[test]
    fn configurations_nest_ratio_innermost() {
        let points = config().configurations();
        assert_eq!(points.len(), 8);
        assert_eq!(points[0].num_vars, 10);
        assert_eq!(points[0].params.max_flips, 20);
        assert_eq!(points[1].ratio, 2.0);
        assert_eq!(points[2].params.max_tries, 5);
        assert_eq!(points[4].num_vars, 20);
        assert_eq!(points[4].params.max_flips, 40);
        assert!(points.iter().all(|p| p.policy == PolicyKind::Gsat));
    }

    #[test]
    fn noise_axis_nests_between_flips_and_ratio() {
        let mut cfg = config();
        cfg.policy = PolicyKind::WalkSat { noise: 0.9 };
        cfg.noise_values = vec![0.1, 0.3];
        let points = cfg.configurations();
        assert_eq!(points.len(), 16);
        assert_eq!(points[0].policy, PolicyKind::WalkSat { noise: 0.1 });
        assert_eq!(points[1].policy, PolicyKind::WalkSat { noise: 0.1 });
        assert_eq!(points[1].ratio, 2.0);
        assert_eq!(points[2].policy, PolicyKind::WalkSat { noise: 0.3 });
        assert_eq!(points[2].ratio, 1.0);
        assert_eq!(points[2].params.max_tries, 1);
        assert_eq!(points[4].params.max_tries, 5);
        assert_eq!(points[8].num_vars, 20);
        assert!(points.iter().all(|p| p.policy.noise() != Some(0.9)));
    }

    #[test]
    fn validate_checks_every_noise_value() {
        let mut cfg = config();
        cfg.policy = PolicyKind::NoisyGsat { noise: 0.5 };
        cfg.noise_values = vec![0.2, 1.2];
        assert_eq!(cfg.validate(), Err(ConfigError::Noise(1.2)));
        cfg.noise_values.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySweepAxis("noise")));
        cfg.policy = PolicyKind::Gsat;
        assert_eq!(cfg.validate(), Ok(()));
        cfg.n_values = vec![10, u32::MAX];
        assert_eq!(cfg.validate(), Err(ConfigError::TooManyVariables(u32::MAX)));
    }

    #[test]
    fn ratio_range_excludes_stop() {
        let r = ratio_range(1.0, 2.0, 0.1).expect("range");
        assert_eq!(r.len(), 10);
        assert_eq!(r[3], 1.3);
        assert_eq!(r[9], 1.9);
        assert!(ratio_range(1.0, 2.0, 0.0).is_err());
    }

    #[test]
    fn clause_count_uses_floor() {
        let mut p = config().configurations()[0];
        p.num_vars = 100;
        p.ratio = 4.3;
        assert_eq!(p.num_clauses(), 430);
        p.num_vars = 7;
        p.ratio = 1.5;
        assert_eq!(p.num_clauses(), 10);
    }

    #[test]
    fn validate_catches_empty_axes() {
        let mut cfg = config();
        cfg.ratios.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySweepAxis("ratios")));
        let mut cfg = config();
        cfg.max_flips = FlipBudget::Fixed(Vec::new());
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySweepAxis("max_flips")));
        let mut cfg = config();
        cfg.ratios = vec![-1.0];
        assert_eq!(cfg.validate(), Err(ConfigError::Ratio(-1.0)));
    }
}

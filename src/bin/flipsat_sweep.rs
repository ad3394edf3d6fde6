use anyhow::{Context, Result, bail};
use clap::Parser;

use flipsat::cnf::{ExternalGenerator, FormulaSource, UniformRandom};
use flipsat::search::PolicyKind;
use flipsat::sweep::{FlipBudget, SweepConfig, SweepRow, ratio_range, run_sweep};

#[derive(Debug, Parser)]
#[command(name = "flipsat_sweep")]
struct Cli {
    #[arg(long, value_delimiter = ',', default_values_t = [50, 100])]
    n: Vec<u32>,
    /// Either `start:stop:step` (stop excluded) or a comma list.
    #[arg(long, default_value = "1.0:5.0:0.1")]
    ratios: String,
    #[arg(long, default_value_t = 3)]
    k: usize,
    #[arg(long, value_delimiter = ',', default_values_t = [5])]
    max_tries: Vec<usize>,
    #[arg(long, value_delimiter = ',', default_values_t = [10, 100])]
    max_flips: Vec<usize>,
    /// Flip budgets as multiples of n; overrides --max-flips.
    #[arg(long, value_delimiter = ',')]
    max_flips_coef: Option<Vec<usize>>,
    /// gsat | walksat | noisy-gsat
    #[arg(long, default_value = "gsat")]
    policy: PolicyKind,
    /// Noise values swept for walksat and noisy-gsat; ignored by gsat.
    #[arg(long, value_delimiter = ',', default_values_t = [0.5])]
    noise: Vec<f64>,
    #[arg(long, default_value_t = 100)]
    seeds: usize,
    #[arg(long, default_value_t = 0)]
    base_seed: u64,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long)]
    generator: Option<String>,
    #[arg(long, default_value_t = false)]
    oracle: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run_from_args(&cli)
}

fn run_from_args(cli: &Cli) -> Result<()> {
    let ratios = parse_ratios(&cli.ratios)?;
    let max_flips = match &cli.max_flips_coef {
        Some(coefs) => FlipBudget::PerVariable(coefs.clone()),
        None => FlipBudget::Fixed(cli.max_flips.clone()),
    };
    let cfg = SweepConfig {
        n_values: cli.n.clone(),
        ratios,
        clause_len: cli.k,
        max_tries_values: cli.max_tries.clone(),
        max_flips,
        policy: cli.policy,
        noise_values: cli.noise.clone(),
        num_seeds: cli.seeds,
        base_seed: cli.base_seed,
        workers: cli.workers.unwrap_or_else(default_workers),
        oracle: cli.oracle,
    };

    let source: Box<dyn FormulaSource + Sync> = match &cli.generator {
        Some(path) => Box::new(ExternalGenerator::new(path)),
        None => Box::new(UniformRandom),
    };

    println!("{}", SweepRow::csv_header());
    let rows = run_sweep(source.as_ref(), &cfg, |row| println!("{}", row.to_csv_line()))
        .context("invalid sweep configuration")?;
    eprintln!("rows={}", rows.len());
    Ok(())
}

/// All cores but two, as the sweep leaves room for the rest of the machine.
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(2)
        .max(1)
}

fn parse_ratios(s: &str) -> Result<Vec<f64>> {
    let parts = s.split(':').collect::<Vec<_>>();
    if parts.len() == 3 {
        let nums = parts
            .iter()
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .with_context(|| format!("invalid ratio bound '{}'", p))
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(ratio_range(nums[0], nums[1], nums[2])?);
    }
    if parts.len() != 1 {
        bail!("ratios must be start:stop:step or a comma list, got '{}'", s);
    }
    s.split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid ratio '{}'", p))
        })
        .collect()
}

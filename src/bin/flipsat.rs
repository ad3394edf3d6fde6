use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use flipsat::cnf::dimacs::to_dimacs;
use flipsat::cnf::{ExternalGenerator, FormulaSource, InstanceParams, UniformRandom};
use flipsat::search::{PolicyKind, SearchParams, solve_instance};

#[derive(Debug, Parser)]
#[command(name = "flipsat")]
#[command(about = "GSAT-family local search over random k-SAT instances")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    Solve {
        #[arg(long)]
        n: u32,
        #[arg(long)]
        m: usize,
        #[arg(long, default_value_t = 3)]
        k: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 100)]
        max_flips: usize,
        #[arg(long, default_value_t = 5)]
        max_tries: usize,
        /// gsat | walksat | noisy-gsat
        #[arg(long, default_value = "gsat")]
        policy: PolicyKind,
        #[arg(long, default_value_t = 0.5)]
        noise: f64,
        /// External generator binary; the built-in uniform generator otherwise.
        #[arg(long)]
        generator: Option<String>,
        #[arg(long)]
        model: bool,
    },
    Gen {
        #[arg(long)]
        n: u32,
        #[arg(long)]
        m: usize,
        #[arg(long, default_value_t = 3)]
        k: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        generator: Option<String>,
        #[arg(long)]
        emit: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Cmd::Solve {
            n,
            m,
            k,
            seed,
            max_flips,
            max_tries,
            policy,
            noise,
            generator,
            model,
        } => {
            let instance = InstanceParams {
                num_vars: n,
                num_clauses: m,
                clause_len: k,
                seed,
            };
            let params = SearchParams {
                max_flips,
                max_tries,
            };
            let policy = policy.with_noise(noise);
            policy.validate()?;
            solve_cmd(generator.as_deref(), &instance, &params, policy, model)?
        }
        Cmd::Gen {
            n,
            m,
            k,
            seed,
            generator,
            emit,
        } => {
            let instance = InstanceParams {
                num_vars: n,
                num_clauses: m,
                clause_len: k,
                seed,
            };
            gen_cmd(generator.as_deref(), &instance, &emit)?
        }
    }
    Ok(())
}

fn solve_cmd(
    generator: Option<&str>,
    instance: &InstanceParams,
    params: &SearchParams,
    policy: PolicyKind,
    print_model: bool,
) -> Result<()> {
    let source = make_source(generator);
    let outcome = solve_instance(source.as_ref(), instance, params, policy)
        .with_context(|| format!("solve failed for seed {}", instance.seed))?;
    println!(
        "policy={} success={} tries={} flips={} total_flips={}",
        policy.name(),
        outcome.success,
        outcome.tries_used,
        outcome.flips_used,
        outcome.total_flips
    );
    if print_model {
        if let Some(assignment) = &outcome.assignment {
            let lits = (1..assignment.len())
                .map(|v| if assignment[v] { v as i64 } else { -(v as i64) })
                .map(|x| x.to_string())
                .collect::<Vec<_>>();
            println!("v {} 0", lits.join(" "));
        }
    }
    Ok(())
}

fn gen_cmd(generator: Option<&str>, instance: &InstanceParams, emit: &str) -> Result<()> {
    let source = make_source(generator);
    let formula = source
        .generate(instance)
        .with_context(|| format!("{} generator failed", source.source_name()))?;
    std::fs::write(emit, to_dimacs(&formula)).with_context(|| format!("failed to write {}", emit))?;
    println!(
        "vars={} clauses={} k={} source={}",
        formula.num_vars(),
        formula.num_clauses(),
        formula.clause_len(),
        source.source_name()
    );
    Ok(())
}

fn make_source(generator: Option<&str>) -> Box<dyn FormulaSource> {
    match generator {
        Some(path) => Box::new(ExternalGenerator::new(path)),
        None => Box::new(UniformRandom),
    }
}

use clap::Parser;
use log::debug;
use mywalksolver::{dimacs, Params, SolveResult};
use std::io::Write;
use std::process::exit;

/// WalkSAT solver for DIMACS CNF files. Prints a satisfying assignment if
/// one is found; without a flip cap it runs until it finds one.
#[derive(Parser)]
#[command(name = "mywalksolver", version)]
struct Args {
    /// Input file in DIMACS CNF format.
    input: std::path::PathBuf,

    /// Probability that true is selected for each variable during initial
    /// random assignment.
    #[arg(long, default_value_t = 0.1)]
    initial_bias: f64,

    /// Probability that the flip literal is chosen from all literals in a
    /// clause instead of from all minimum cost literals.
    #[arg(long, default_value_t = 0.65)]
    non_greedy_choice: f64,

    /// Seed for the pseudo-random generator; 0 seeds from the wall clock.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Give up and report unknown after this many flips; 0 means run forever.
    #[arg(long, default_value_t = 0)]
    max_flips: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    for (name, p) in [
        ("--initial-bias", args.initial_bias),
        ("--non-greedy-choice", args.non_greedy_choice),
    ] {
        if !(0.0..=1.0).contains(&p) {
            eprintln!("{} must be a probability, got {}", name, p);
            exit(1);
        }
    }

    let params = Params {
        initial_bias: args.initial_bias,
        non_greedy_choice: args.non_greedy_choice,
        seed: args.seed,
        max_flips: args.max_flips,
    };

    debug!("solving {:?}", args.input);
    match mywalksolver::solve_dimacs_file(&args.input, params) {
        Ok(SolveResult::Sat(model)) => {
            println!("s SATISFIABLE");
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if let Err(e) = dimacs::write_model(&mut out, &model) {
                eprintln!("failed to write assignment: {}", e);
                exit(1);
            }
            let _ = out.flush();
            exit(10);
        }
        Ok(SolveResult::Unsat) => {
            println!("s UNSATISFIABLE");
            exit(20);
        }
        Ok(SolveResult::Unknown) => {
            println!("s UNKNOWN");
            exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", args.input.display(), e);
            exit(1);
        }
    }
}

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use exact_simplex::command;

/// Maximizes a linear objective over equality constraints in exact rational
/// arithmetic.
#[derive(Parser)]
#[command(version)]
struct Opts {
    /// File with the objective on the first line and one constraint per line
    problem_file: PathBuf,
    /// Print the outcome as JSON instead of the iteration tables
    #[arg(long)]
    json: bool,
    /// Also enumerate the basic solutions of the constraints
    #[arg(long)]
    basic_solutions: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: &Opts) -> Result<(), Box<dyn std::error::Error>> {
    if opts.basic_solutions {
        for solution in command::compute_basic_solutions(&opts.problem_file)? {
            println!("{solution}");
        }
        println!();
    }

    let report = command::compute(&opts.problem_file)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report.outcome)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

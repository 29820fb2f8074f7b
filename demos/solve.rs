use std::path::PathBuf;

use clap::Parser;

use binpoly::config::SolverConfig;
use binpoly::parse::parse_equations;
use binpoly::symbols::SymbolTable;
use binpoly::system::System;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// File with one equation per line (`#` starts a comment).
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Treat the input as a saved solver state instead of an equation file.
    #[clap(long)]
    state: bool,

    /// Maximum number of solver rounds.
    #[clap(long, value_name = "INT", default_value = "250")]
    max_iter: usize,

    /// Give up after this many rounds without progress.
    #[clap(long, value_name = "INT", default_value = "4")]
    max_stuck: usize,

    /// Substitute solutions on all threads.
    #[clap(long)]
    parallel: bool,

    /// Record and print which rule produced every deduction.
    #[clap(long)]
    log_deductions: bool,

    /// Save the final state to this file.
    #[clap(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let mut system = if args.state {
        System::load(&args.input)?
    } else {
        let text = std::fs::read_to_string(&args.input)?;
        let mut symbols = SymbolTable::new();
        let equations = parse_equations(&text, &mut symbols)?;
        let config = SolverConfig {
            max_iter: args.max_iter,
            max_stuck: args.max_stuck,
            parallel: args.parallel,
            log_deductions: args.log_deductions,
            ..SolverConfig::default()
        };
        System::with_config(equations, symbols, config)
    };
    println!(
        "Loaded {} equations over {} variables",
        system.equations().len(),
        system.symbols().len()
    );

    match system.solve() {
        Ok(termination) => {
            println!("Stopped: {:?}", termination);
            print!("{}", system.summary()?);
        }
        Err(e) if e.is_contradiction() => {
            println!("No binary solution: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(path) = &args.save {
        system.save(path)?;
        println!("State saved to {}", path.display());
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use duty_cycle::{
    Chain, ChainConfig, Outcome, StateVisualization, WorkDay,
    observers::{DispatchLogger, TransitionLogger},
};

/// Requests fed to the chain when none are given on the command line
const DEFAULT_REQUESTS: [i64; 11] = [1, 3, 15, 18, 22, 25, 14, 2, 16, 27, 31];

/// Command-line arguments for the duty cycle demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose output with detailed transition logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// What to run
    #[command(subcommand)]
    command: Command,
}

/// Demo subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch requests along a responsibility chain
    Chain {
        /// JSON chain layout; the standard three-link chain when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the layout in use to this JSON file
        #[arg(long)]
        save_layout: Option<PathBuf>,

        /// Requests to dispatch, in order
        #[arg(allow_negative_numbers = true)]
        requests: Vec<i64>,
    },
    /// Work out what a day looks like at a given hour
    Day {
        /// Clock hour, 0 to 23
        #[arg(long, allow_negative_numbers = true)]
        hour: i32,

        /// Whether today's work is done
        #[arg(long)]
        finished: bool,

        /// Write the day report to this JSON file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Print a Graphviz DOT graph
    Dot {
        /// Which graph to draw
        #[arg(value_enum)]
        graph: Graph,

        /// JSON chain layout to draw; the standard chain when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the graph to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Graphs the `dot` subcommand can draw
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Graph {
    /// A responsibility chain
    Chain,
    /// The workday state machine
    States,
}

/// Set up the tracing subscriber; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default = if verbose { "duty_cycle=debug" } else { "duty_cycle=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Command::Chain { config, save_layout, requests } => {
            dispatch_demo(config, save_layout, requests)
        }
        Command::Day { hour, finished, save } => day_demo(hour, finished, save),
        Command::Dot { graph, config, output } => dot_demo(graph, config, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Build the chain from a layout file, or the standard chain without one
fn load_chain(config: Option<&Path>) -> anyhow::Result<Chain> {
    match config {
        Some(path) => ChainConfig::load_from_file(path)
            .and_then(|config| config.build())
            .with_context(|| format!("loading chain layout {}", path.display())),
        None => Ok(Chain::standard()),
    }
}

/// Run requests through a chain and print what happened to each
fn dispatch_demo(
    config: Option<PathBuf>,
    save_layout: Option<PathBuf>,
    requests: Vec<i64>,
) -> anyhow::Result<()> {
    let mut chain = load_chain(config.as_deref())?;
    chain.register_observer(Box::new(DispatchLogger));

    if let Some(path) = save_layout {
        ChainConfig::from_chain(&chain).save_to_file(&path)?;
        println!("Layout saved to {}", path.display());
    }

    let requests = if requests.is_empty() { DEFAULT_REQUESTS.to_vec() } else { requests };

    println!("{}", "Responsibility Chain".green().bold());
    println!("====================\n");

    let outcomes = chain.handle_all(requests);
    for outcome in &outcomes {
        match outcome {
            Outcome::Handled(_) => println!("  {}", outcome.to_string().green()),
            Outcome::Unhandled(_) => println!("  {}", outcome.to_string().yellow()),
        }
    }

    println!("\n{}", StateVisualization::dispatch_table(&outcomes));

    println!("{}", "Per handler:".bold());
    for (handler, count) in StateVisualization::dispatch_counts(&outcomes) {
        println!("  {}: {count}", handler.as_deref().unwrap_or("(unhandled)"));
    }
    Ok(())
}

/// Evaluate one day and print the path it took
fn day_demo(hour: i32, finished: bool, save: Option<PathBuf>) -> anyhow::Result<()> {
    let mut day = WorkDay::new(hour, finished);
    day.register_observer(Box::new(TransitionLogger));

    if !(0..24).contains(&hour) {
        warn!(hour, "hour is outside 0-23, following the thresholds anyway");
    }

    let activity = day.run()?;

    println!("{}", "Workday".green().bold());
    println!("=======\n");
    println!("{}", day.to_string().bold());
    println!("Settled in {:?} on {}\n", day.current_state(), activity.tag().cyan());
    println!("{}", StateVisualization::history_table(day.get_history()));

    if let (Some(path), Some(report)) = (save, day.report()) {
        report.save_to_file(&path)?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}

/// Print or save one of the DOT graphs
fn dot_demo(graph: Graph, config: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let dot = match graph {
        Graph::Chain => StateVisualization::chain_dot(&load_chain(config.as_deref())?),
        Graph::States => StateVisualization::state_machine_dot(&[]),
    };

    match output {
        Some(path) => StateVisualization::save_dot_to_file(&dot, &path)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{dot}"),
    }
    Ok(())
}

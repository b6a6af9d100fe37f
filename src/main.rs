//! Nodal - DC operating point solver
//!
//! Reads a netlist, runs DC analysis and prints the operating point.
//!
//! # Usage
//!
//! ```bash
//! nodal divider.net
//! nodal divider.net --json | jq .operating_point.node_voltages
//! RUST_LOG=debug nodal divider.net
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nodal_core::{
    analyze_dc,
    dsl,
    solver::{DcAnalysis, DEFAULT_MAX_ITERATIONS, DEFAULT_PIVOT_TOLERANCE},
    SolverOptions,
};

/// DC operating point solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "NETLIST")]
    netlist: PathBuf,

    /// Iteration limit, validated only. DC analysis is a single direct solve
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Pivots below this magnitude are treated as zero
    #[arg(long, default_value_t = DEFAULT_PIVOT_TOLERANCE)]
    pivot_tolerance: f64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let circuit = dsl::parse_file(&args.netlist)?;

    let options = SolverOptions::default()
        .with_max_iterations(args.max_iterations)
        .with_pivot_tolerance(args.pivot_tolerance);

    let result = analyze_dc(&circuit, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_table(&result);
    }
    Ok(())
}

fn print_table(result: &DcAnalysis) {
    let op = &result.operating_point;

    println!("Node voltages:");
    for (node, v) in &op.node_voltages {
        println!("  {:<12} {:>14.6} V", node, v);
    }

    println!("Components:");
    println!("  {:<12} {:>14} {:>14}", "id", "current (A)", "power (W)");
    for (id, i) in &op.branch_currents {
        let p = op.component_powers.get(id).copied().unwrap_or(0.0);
        println!("  {:<12} {:>14.6e} {:>14.6e}", id, i, p);
    }
}

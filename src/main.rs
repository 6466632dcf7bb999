//! Breadboard - DC circuit solver
//!
//! Reads a netlist, solves it and prints node voltages and currents.
//!
//! # Usage
//!
//! ```bash
//! breadboard circuit.bb
//! breadboard circuit.bb --ground V1:neg --json
//! RUST_LOG=debug breadboard circuit.bb
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::info;

use breadboard_core::{
    circuit::NodeId,
    dsl,
    error::Result,
    report,
    solver::{DcSolver, ReferenceNode, SolverConfig, DEFAULT_MAX_ITERATIONS, WIRE_RESISTANCE},
    CircuitModel,
};

/// DC circuit solver for breadboard circuits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Terminal to hold at 0 V, as NAME:SIDE (overrides `.ground`)
    #[arg(short, long, value_name = "NAME:SIDE", conflicts_with = "reference_node")]
    ground: Option<String>,

    /// Node index to hold at 0 V
    #[arg(long, value_name = "N")]
    reference_node: Option<usize>,

    /// Maximum LED passes
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Resistance of wires and closed switches, in ohms
    #[arg(long, default_value_t = WIRE_RESISTANCE)]
    wire_resistance: f64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Parse the netlist
    let ast = dsl::parse_file(&args.circuit_file)?;

    // Build the circuit
    let model = CircuitModel::from_ast(ast)?;
    info!(
        "loaded {} components and {} connections from {}",
        model.components().len(),
        model.connections().len(),
        args.circuit_file.display()
    );

    let reference = match (&args.ground, args.reference_node) {
        (Some(terminal), _) => ReferenceNode::Terminal(model.parse_terminal(terminal)?),
        (None, Some(node)) => ReferenceNode::Node(NodeId(node)),
        (None, None) => ReferenceNode::Auto,
    };

    let config = SolverConfig::new()
        .with_max_iterations(args.max_iterations)
        .with_wire_resistance(args.wire_resistance)
        .with_reference(reference);

    let result = DcSolver::with_config(config).solve(&model);

    report::print_report(&model, &result, args.json)?;

    Ok(())
}

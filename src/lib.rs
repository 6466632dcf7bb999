//! # Breadboard Core
//!
//! A DC circuit solver for breadboard-style teaching circuits.
//!
//! This library provides:
//! - An editable circuit model of batteries, resistors, LEDs, switches and wires
//! - A small netlist format for storing circuits as text
//! - Modified Nodal Analysis (MNA) based DC solving
//! - A piecewise-linear LED model resolved by fixed-point iteration
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the netlist format
//! - [`circuit`] - Circuit model, node discovery and validation
//! - [`components`] - Component models
//! - [`solver`] - MNA assembly, dense solving and the LED iteration
//! - `report` - Text and JSON reports (CLI only)
//!
//! ## Usage
//!
//! ### Library
//!
//! ```
//! use breadboard_core::{solve, CircuitModel};
//! use breadboard_core::circuit::Terminal;
//!
//! let mut model = CircuitModel::new();
//! let v = model.add_battery("V1", 9.0).unwrap();
//! let r = model.add_resistor("R1", 1000.0).unwrap();
//! model.connect(Terminal::a(v), Terminal::a(r)).unwrap();
//! model.connect(Terminal::b(r), Terminal::b(v)).unwrap();
//!
//! let result = solve(&model);
//! assert!(result.is_solved());
//! assert!((result.current("R1").unwrap() - 0.009).abs() < 1e-9);
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! breadboard circuit.bb --json
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmBreadboard } from 'breadboard_core';
//!
//! const board = new WasmBreadboard(netlist);
//! const result = JSON.parse(board.solve());
//! ```
//!
//! ## Solving Method
//!
//! Each solve is independent of every other:
//!
//! 1. Group connected terminals into nodes and pick a reference node
//! 2. Assemble the MNA matrix with every LED assumed off
//! 3. Solve, then switch each LED on or off according to its voltage drop
//! 4. Repeat step 3 until no LED changes or the pass limit is reached

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod solver;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use circuit::CircuitModel;
pub use error::{BreadboardError, Result};
pub use solver::{solve, solve_with_config, DcSolver, FailureReason, SolveResult, SolverConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmBreadboard;

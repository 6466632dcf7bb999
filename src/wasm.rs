//! WASM bindings for Breadboard Core.
//!
//! This module provides JavaScript-friendly bindings for an interactive
//! breadboard page: load a netlist once, then edit values and flip switches
//! and re-solve after each change.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmBreadboard } from 'breadboard_core';
//!
//! await init();
//!
//! const board = new WasmBreadboard(`
//!   V1 9
//!   R1 330
//!   SW1 open
//!   LED1 red
//!   .connect V1:a R1:a
//!   .connect R1:b SW1:a
//!   .connect SW1:b LED1:anode
//!   .connect LED1:cathode V1:b
//! `);
//!
//! board.toggle_switch("SW1");
//! const result = JSON.parse(board.solve());
//! console.log(result.led_states.LED1);
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::CircuitModel;
use crate::dsl;
use crate::solver::{DcSolver, SolveResult, SolverConfig};

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible breadboard circuit.
///
/// Wraps a [`CircuitModel`] and keeps the result of the most recent solve
/// so single values can be read back without parsing JSON.
#[wasm_bindgen]
pub struct WasmBreadboard {
    model: CircuitModel,
    solver: DcSolver,
    last: Option<SolveResult>,
}

#[wasm_bindgen]
impl WasmBreadboard {
    /// Create a circuit from a netlist string.
    ///
    /// # Example
    /// ```javascript
    /// const board = new WasmBreadboard(netlist);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(netlist: &str) -> Result<WasmBreadboard, JsValue> {
        Self::with_config(netlist, crate::solver::DEFAULT_MAX_ITERATIONS)
    }

    /// Create a circuit with a custom LED pass limit.
    #[wasm_bindgen]
    pub fn with_config(netlist: &str, max_iterations: usize) -> Result<WasmBreadboard, JsValue> {
        let ast = dsl::parse(netlist).map_err(js_error)?;
        let model = CircuitModel::from_ast(ast).map_err(js_error)?;
        let config = SolverConfig::new().with_max_iterations(max_iterations);

        Ok(WasmBreadboard {
            model,
            solver: DcSolver::with_config(config),
            last: None,
        })
    }

    /// Solve the circuit and return the result as a JSON string.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<String, JsValue> {
        let result = self.solver.solve(&self.model);
        let json = serde_json::to_string(&result).map_err(js_error)?;
        self.last = Some(result);
        Ok(json)
    }

    /// Change the main value of a component (resistance, EMF, LED forward
    /// voltage, or switch state).
    #[wasm_bindgen]
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.model.set_value(name, value).map_err(js_error)
    }

    /// Open or close a switch.
    #[wasm_bindgen]
    pub fn set_switch(&mut self, name: &str, closed: bool) -> Result<(), JsValue> {
        self.model.set_switch(name, closed).map_err(js_error)
    }

    /// Flip a switch, returning whether it is now closed.
    #[wasm_bindgen]
    pub fn toggle_switch(&mut self, name: &str) -> Result<bool, JsValue> {
        self.model.toggle_switch(name).map_err(js_error)
    }

    /// Current through a component from the last solve, or `undefined`.
    #[wasm_bindgen]
    pub fn current(&self, name: &str) -> Option<f64> {
        self.last.as_ref().and_then(|r| r.current(name))
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

//! DC operating point solver.

use log::debug;

use crate::circuit::{CircuitModel, NodeId, Terminal, Topology};
use crate::error::{BreadboardError, Result};

use super::iteration::LedIteration;
use super::mna::MnaLayout;
use super::result::{FailureReason, SolveResult};
use super::{DEFAULT_MAX_ITERATIONS, MIN_CONDUCTANCE, PIVOT_EPSILON, THRESHOLD_EPSILON, WIRE_RESISTANCE};

/// Which node is held at 0 V.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceNode {
    /// The model's declared ground terminal, else the last node
    #[default]
    Auto,
    /// The last node discovered
    Last,
    /// A node by index
    Node(NodeId),
    /// The node containing a terminal
    Terminal(Terminal),
}

/// Configuration for the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of LED passes (at least 1).
    pub max_iterations: usize,
    /// Resistance used for wires and closed switches (ohms).
    pub wire_resistance: f64,
    /// Conductance from every node to the reference.
    pub min_conductance: f64,
    /// Smallest pivot accepted by the elimination.
    pub pivot_epsilon: f64,
    /// Slack on the LED forward-voltage threshold (volts).
    pub threshold_epsilon: f64,
    /// Reference node choice.
    pub reference: ReferenceNode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            wire_resistance: WIRE_RESISTANCE,
            min_conductance: MIN_CONDUCTANCE,
            pivot_epsilon: PIVOT_EPSILON,
            threshold_epsilon: THRESHOLD_EPSILON,
            reference: ReferenceNode::Auto,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the LED iteration cap. Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Set the resistance of wires and closed switches.
    ///
    /// Non-positive or non-finite values are ignored.
    pub fn with_wire_resistance(mut self, ohms: f64) -> Self {
        if ohms.is_finite() && ohms > 0.0 {
            self.wire_resistance = ohms;
        }
        self
    }

    /// Set the conductance tying each node to the reference.
    pub fn with_min_conductance(mut self, g: f64) -> Self {
        if g.is_finite() && g >= 0.0 {
            self.min_conductance = g;
        }
        self
    }

    /// Set the smallest usable pivot.
    ///
    /// Only finite, strictly positive values are accepted.
    pub fn with_pivot_epsilon(mut self, epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            self.pivot_epsilon = epsilon;
        }
        self
    }

    /// Set the LED threshold slack.
    pub fn with_threshold_epsilon(mut self, epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon >= 0.0 {
            self.threshold_epsilon = epsilon;
        }
        self
    }

    /// Choose the reference node.
    pub fn with_reference(mut self, reference: ReferenceNode) -> Self {
        self.reference = reference;
        self
    }
}

/// DC solver for breadboard circuits.
///
/// Holds only configuration; every call to [`solve`](Self::solve) builds
/// its own topology and matrices.
#[derive(Debug, Clone, Default)]
pub struct DcSolver {
    config: SolverConfig,
}

impl DcSolver {
    /// Create a solver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with custom configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a circuit. Never panics; failures come back as an unsolved
    /// result with a [`FailureReason`].
    pub fn solve(&self, model: &CircuitModel) -> SolveResult {
        match self.try_solve(model) {
            Ok(result) => result,
            Err(err) => {
                debug!("solve failed: {}", err);
                SolveResult::unsolved(FailureReason::from_error(&err))
            }
        }
    }

    fn try_solve(&self, model: &CircuitModel) -> Result<SolveResult> {
        model.validate()?;

        let topology = Topology::build(model);
        if topology.is_empty() {
            return Err(BreadboardError::NoCompleteNetwork);
        }

        let reference = self.resolve_reference(model, &topology)?;
        let layout = MnaLayout::new(model, &topology, reference);
        debug!(
            "solving {} components: {} nodes, reference {}, {} unknowns",
            model.components().len(),
            topology.len(),
            reference,
            layout.size()
        );

        let outcome = LedIteration::new(&self.config).run(model, &topology, &layout)?;

        Ok(SolveResult::extract(model, &topology, &layout, outcome, &self.config))
    }

    fn resolve_reference(&self, model: &CircuitModel, topology: &Topology) -> Result<NodeId> {
        let last = topology.last().ok_or(BreadboardError::NoCompleteNetwork)?;
        match self.config.reference {
            ReferenceNode::Auto => Ok(model
                .ground()
                .and_then(|t| topology.node_of(t))
                .unwrap_or(last)),
            ReferenceNode::Last => Ok(last),
            ReferenceNode::Node(node) if node.0 < topology.len() => Ok(node),
            ReferenceNode::Node(node) => Err(BreadboardError::InvalidReference {
                message: format!("{} is not a node of this circuit ({} nodes)", node, topology.len()),
            }),
            ReferenceNode::Terminal(terminal) => {
                topology
                    .node_of(terminal)
                    .ok_or_else(|| BreadboardError::InvalidReference {
                        message: format!("terminal {} is not part of this circuit", terminal),
                    })
            }
        }
    }
}

/// Solve a circuit with the default configuration.
pub fn solve(model: &CircuitModel) -> SolveResult {
    DcSolver::new().solve(model)
}

/// Solve a circuit with a custom configuration.
pub fn solve_with_config(model: &CircuitModel, config: &SolverConfig) -> SolveResult {
    DcSolver::with_config(config.clone()).solve(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ComponentId;
    use crate::components::{LedParams, LedState};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn series(emf: f64, resistance: f64, led: Option<LedParams>) -> CircuitModel {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", emf).unwrap();
        let r = model.add_resistor("R1", resistance).unwrap();
        match led {
            Some(params) => {
                let d = model.add_led("LED1", params).unwrap();
                model.connect(Terminal::a(v), Terminal::a(r)).unwrap();
                model.connect(Terminal::b(r), Terminal::a(d)).unwrap();
                model.connect(Terminal::b(d), Terminal::b(v)).unwrap();
            }
            None => {
                model.connect(Terminal::a(v), Terminal::a(r)).unwrap();
                model.connect(Terminal::b(r), Terminal::b(v)).unwrap();
            }
        }
        model
    }

    fn ladder() -> CircuitModel {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 12.0).unwrap();
        let r1 = model.add_resistor("R1", 100.0).unwrap();
        let r2 = model.add_resistor("R2", 200.0).unwrap();
        let r3 = model.add_resistor("R3", 300.0).unwrap();
        model.connect(Terminal::a(v), Terminal::a(r1)).unwrap();
        model.connect(Terminal::b(r1), Terminal::a(r2)).unwrap();
        model.connect(Terminal::b(r1), Terminal::a(r3)).unwrap();
        model.connect(Terminal::b(r2), Terminal::b(v)).unwrap();
        model.connect(Terminal::b(r3), Terminal::b(v)).unwrap();
        model
    }

    #[test]
    fn test_single_resistor_ohms_law() {
        let result = solve(&series(9.0, 1000.0, None));
        assert!(result.is_solved());
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_relative_eq!(result.current("R1").unwrap(), 9.0 / 1000.0, max_relative = 1e-6);
        assert_relative_eq!(result.current("V1").unwrap(), 9.0 / 1000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_kcl_at_junction() {
        let result = solve(&ladder());
        let i1 = result.current("R1").unwrap();
        let i2 = result.current("R2").unwrap();
        let i3 = result.current("R3").unwrap();
        assert_abs_diff_eq!(i1, i2 + i3, epsilon = 1e-9);
        assert_abs_diff_eq!(result.current("V1").unwrap(), i1, epsilon = 1e-9);
        // 100 + (200 || 300) = 220 ohms
        assert_relative_eq!(i1, 12.0 / 220.0, max_relative = 1e-6);
    }

    #[test]
    fn test_reference_choice_is_invisible() {
        let model = ladder();
        let last = solve_with_config(&model, &SolverConfig::new().with_reference(ReferenceNode::Last));
        let first = solve_with_config(
            &model,
            &SolverConfig::new().with_reference(ReferenceNode::Node(NodeId(0))),
        );
        assert_eq!(last.reference, Some(NodeId(2)));
        assert_eq!(first.reference, Some(NodeId(0)));
        assert_abs_diff_eq!(first.voltage(NodeId(0)).unwrap(), 0.0);

        for (name, current) in &last.element_currents {
            assert_abs_diff_eq!(*current, first.current(name).unwrap(), epsilon = 1e-9);
        }
        let drop = |r: &SolveResult| r.voltage(NodeId(0)).unwrap() - r.voltage(NodeId(1)).unwrap();
        assert_abs_diff_eq!(drop(&last), drop(&first), epsilon = 1e-9);
    }

    #[test]
    fn test_declared_ground_is_used() {
        let mut model = series(9.0, 1000.0, None);
        model.set_ground(Some(Terminal::a(ComponentId(0)))).unwrap();
        let result = solve(&model);
        assert_eq!(result.reference, Some(NodeId(0)));
        assert_relative_eq!(result.voltage(NodeId(1)).unwrap(), -9.0, max_relative = 1e-9);
        assert_relative_eq!(result.current("R1").unwrap(), 9.0 / 1000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_invalid_reference() {
        let config = SolverConfig::new().with_reference(ReferenceNode::Node(NodeId(7)));
        let result = solve_with_config(&series(9.0, 1000.0, None), &config);
        assert!(!result.is_solved());
        assert_eq!(result.failure_reason, Some(FailureReason::InvalidReference));
        assert!(result.node_voltages.is_empty());
    }

    #[test]
    fn test_series_led_on() {
        let result = solve(&series(9.0, 330.0, Some(LedParams::default())));
        assert!(result.is_solved());
        assert!(result.converged);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.led_states["LED1"], LedState::On);

        let expected = (9.0 - 2.0) / (330.0 + 25.0);
        assert_relative_eq!(result.current("LED1").unwrap(), expected, max_relative = 1e-6);
        assert_relative_eq!(result.current("R1").unwrap(), expected, max_relative = 1e-6);
        assert_relative_eq!(result.led_brightness["LED1"], expected / 0.02, max_relative = 1e-6);
    }

    #[test]
    fn test_series_led_below_threshold_leaks() {
        let result = solve(&series(1.5, 330.0, Some(LedParams::default())));
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.led_states["LED1"], LedState::Leak);
        let current = result.current("LED1").unwrap();
        assert!(current > 0.0 && current < 1e-8, "leak current {}", current);
        assert_eq!(result.led_brightness["LED1"], current / 0.02);
    }

    #[test]
    fn test_reversed_led_blocks() {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 9.0).unwrap();
        let r = model.add_resistor("R1", 330.0).unwrap();
        let d = model.add_led("LED1", LedParams::default()).unwrap();
        model.connect(Terminal::a(v), Terminal::a(r)).unwrap();
        model.connect(Terminal::b(r), Terminal::b(d)).unwrap();
        model.connect(Terminal::a(d), Terminal::b(v)).unwrap();

        let result = solve(&model);
        assert_eq!(result.led_states["LED1"], LedState::Leak);
        assert!(result.current("LED1").unwrap().abs() < 1e-8);
        assert_eq!(result.led_brightness["LED1"], 0.0);
    }

    fn parallel_leds() -> CircuitModel {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 5.0).unwrap();
        let r = model.add_resistor("R1", 330.0).unwrap();
        let red = model.add_led("LED1", LedParams::from_color("red").unwrap()).unwrap();
        let blue = model.add_led("LED2", LedParams::from_color("blue").unwrap()).unwrap();
        model.connect(Terminal::a(v), Terminal::a(r)).unwrap();
        model.connect(Terminal::b(r), Terminal::a(red)).unwrap();
        model.connect(Terminal::b(r), Terminal::a(blue)).unwrap();
        model.connect(Terminal::b(red), Terminal::b(v)).unwrap();
        model.connect(Terminal::b(blue), Terminal::b(v)).unwrap();
        model
    }

    #[test]
    fn test_parallel_leds_lowest_threshold_wins() {
        let result = solve(&parallel_leds());
        assert!(result.converged);
        // Leak/Leak, On/On, On/Leak
        assert_eq!(result.iterations, 3);
        assert_eq!(result.led_states["LED1"], LedState::On);
        assert_eq!(result.led_states["LED2"], LedState::Leak);
        assert_relative_eq!(
            result.current("LED1").unwrap(),
            (5.0 - 1.8) / (330.0 + 25.0),
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_iteration_cap_is_best_effort() {
        let config = SolverConfig::new().with_max_iterations(1);
        let result = solve_with_config(&series(9.0, 330.0, Some(LedParams::default())), &config);
        assert!(result.is_solved());
        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        // States stamped for the last solve are reported
        assert_eq!(result.led_states["LED1"], LedState::Leak);
    }

    #[test]
    fn test_cap_reports_last_stamped_states() {
        let config = SolverConfig::new().with_max_iterations(2);
        let result = solve_with_config(&parallel_leds(), &config);
        assert!(result.is_solved());
        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
        // Second pass was stamped with both LEDs on
        assert_eq!(result.led_states["LED1"], LedState::On);
        assert_eq!(result.led_states["LED2"], LedState::On);
        // The blue LED sits below its Vf, so its On-state current is negative
        assert!(result.current("LED2").unwrap() < 0.0);
        assert_eq!(result.led_brightness["LED2"], 0.0);
    }

    #[test]
    fn test_zero_iterations_clamped() {
        assert_eq!(SolverConfig::new().with_max_iterations(0).max_iterations, 1);
    }

    #[test]
    fn test_no_complete_network() {
        let empty = solve(&CircuitModel::new());
        assert_eq!(empty.failure_reason, Some(FailureReason::NoCompleteNetwork));

        let mut model = CircuitModel::new();
        model.add_battery("V1", 9.0).unwrap();
        model.add_resistor("R1", 100.0).unwrap();
        let result = solve(&model);
        assert!(!result.is_solved());
        assert_eq!(result.failure_reason, Some(FailureReason::NoCompleteNetwork));
        assert!(result.element_currents.is_empty());
    }

    #[test]
    fn test_battery_terminals_joined_is_singular() {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 9.0).unwrap();
        model.connect(Terminal::a(v), Terminal::b(v)).unwrap();
        let result = solve(&model);
        assert_eq!(result.failure_reason, Some(FailureReason::SingularMatrix));
        assert!(result.node_voltages.is_empty());
    }

    #[test]
    fn test_zero_pivot_epsilon_still_singular() {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 9.0).unwrap();
        model.connect(Terminal::a(v), Terminal::b(v)).unwrap();

        let config = SolverConfig::new().with_pivot_epsilon(0.0);
        assert_eq!(config.pivot_epsilon, PIVOT_EPSILON);
        let result = solve_with_config(&model, &config);
        assert_eq!(result.failure_reason, Some(FailureReason::SingularMatrix));

        // Set directly, bypassing the builder
        let config = SolverConfig {
            pivot_epsilon: 0.0,
            ..SolverConfig::default()
        };
        let result = solve_with_config(&model, &config);
        assert!(!result.is_solved());
        assert_eq!(result.failure_reason, Some(FailureReason::SingularMatrix));
        assert!(result.element_currents.is_empty());
    }

    #[test]
    fn test_wire_short_is_bounded() {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 9.0).unwrap();
        let w = model.add_wire("W1").unwrap();
        model.connect(Terminal::a(v), Terminal::a(w)).unwrap();
        model.connect(Terminal::b(w), Terminal::b(v)).unwrap();
        let result = solve(&model);
        assert!(result.is_solved());
        assert_relative_eq!(result.current("W1").unwrap(), 9.0 / 1e-6, max_relative = 1e-6);
        assert_relative_eq!(result.current("V1").unwrap(), 9.0 / 1e-6, max_relative = 1e-6);
    }

    #[test]
    fn test_open_switch_carries_nothing() {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 9.0).unwrap();
        let r = model.add_resistor("R1", 100.0).unwrap();
        let s = model.add_switch("SW1", false).unwrap();
        model.connect(Terminal::a(v), Terminal::a(r)).unwrap();
        model.connect(Terminal::b(r), Terminal::a(s)).unwrap();
        model.connect(Terminal::b(s), Terminal::b(v)).unwrap();

        let open = solve(&model);
        assert!(open.is_solved());
        assert_eq!(open.current("SW1"), Some(0.0));
        assert!(open.current("R1").unwrap().abs() < 1e-9);

        model.set_switch("SW1", true).unwrap();
        let closed = solve(&model);
        assert_relative_eq!(closed.current("SW1").unwrap(), 9.0 / 100.0, max_relative = 1e-6);
    }

    #[test]
    fn test_solve_is_deterministic() {
        let model = series(9.0, 330.0, Some(LedParams::default()));
        assert_eq!(solve(&model), solve(&model));
    }

    #[test]
    fn test_netlist_end_to_end() {
        let ast = crate::dsl::parse(
            "V1 9\nR1 1k\nLED1 red\n.connect V1:pos R1:a\n.connect R1:b LED1:anode\n.connect LED1:cathode V1:neg\n",
        )
        .unwrap();
        let model = CircuitModel::from_ast(ast).unwrap();
        let result = solve(&model);
        assert!(result.converged);
        assert_relative_eq!(
            result.current("LED1").unwrap(),
            (9.0 - 1.8) / (1000.0 + 25.0),
            max_relative = 1e-6
        );
    }
}

//! Fixed-point iteration over LED conduction states.

use log::{debug, warn};

use crate::circuit::{CircuitModel, ComponentId, Topology};
use crate::components::{Component, Led, LedState};
use crate::error::Result;

use super::dc::SolverConfig;
use super::mna::{assemble, MnaLayout};

/// Conduction assumption for every LED of a circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConductionStates {
    /// `Some` for LEDs, indexed by `ComponentId`
    states: Vec<Option<LedState>>,
}

impl ConductionStates {
    /// Start every LED in the `Leak` state.
    pub fn new(model: &CircuitModel) -> Self {
        Self {
            states: model
                .components()
                .iter()
                .map(|c| c.is_nonlinear().then_some(LedState::Leak))
                .collect(),
        }
    }

    /// State of an LED; non-LED components read as `Leak`.
    pub fn get(&self, id: ComponentId) -> LedState {
        self.states.get(id.0).copied().flatten().unwrap_or_default()
    }

    /// Override the state of an LED.
    pub fn set(&mut self, id: ComponentId, state: LedState) {
        if let Some(slot) = self.states.get_mut(id.0) {
            if slot.is_some() {
                *slot = Some(state);
            }
        }
    }

    /// Number of LEDs in the `On` state.
    pub fn count_on(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == Some(LedState::On))
            .count()
    }

    /// States implied by a solution vector.
    fn implied_by(
        &self,
        model: &CircuitModel,
        topology: &Topology,
        layout: &MnaLayout,
        x: &[f64],
        epsilon: f64,
    ) -> Self {
        let mut next = self.clone();
        for component in model.components() {
            let Component::Led(led) = component else {
                continue;
            };
            let Some(nodes) = topology.component_nodes(led.id) else {
                continue;
            };
            let anode = nodes[Led::ANODE.index()];
            let cathode = nodes[Led::CATHODE.index()];
            let v_d = layout.voltage(x, anode) - layout.voltage(x, cathode);
            next.set(led.id, led.assumed_state(v_d, epsilon));
        }
        next
    }
}

/// Final pass of an LED iteration.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    /// Solution vector of the last linear solve
    pub solution: Vec<f64>,
    /// LED states that were stamped for that solve
    pub states: ConductionStates,
    /// Number of linear solves performed
    pub iterations: usize,
    /// False if the cap was reached with states still changing
    pub converged: bool,
}

/// Piecewise-linear LED solver.
///
/// Each pass stamps the circuit with the current LED assumptions, solves
/// it, then re-derives every LED's state from its solved voltage drop. The
/// loop ends when a pass changes nothing or after
/// [`SolverConfig::max_iterations`] passes.
pub struct LedIteration<'a> {
    config: &'a SolverConfig,
}

impl<'a> LedIteration<'a> {
    /// Create an iteration driven by a solver configuration.
    pub fn new(config: &'a SolverConfig) -> Self {
        Self { config }
    }

    /// Run passes until the LED states settle.
    ///
    /// A singular pass aborts the whole solve.
    pub fn run(
        &self,
        model: &CircuitModel,
        topology: &Topology,
        layout: &MnaLayout,
    ) -> Result<IterationOutcome> {
        let config = self.config;
        let max_iterations = config.max_iterations.max(1);
        let mut states = ConductionStates::new(model);
        let mut pass = 0;

        loop {
            pass += 1;
            let system = assemble(model, topology, layout, &states, config);
            let solution = system.solve(config.pivot_epsilon)?;

            let next =
                states.implied_by(model, topology, layout, &solution, config.threshold_epsilon);
            if next == states {
                debug!("LED states settled after {} pass(es), {} on", pass, states.count_on());
                return Ok(IterationOutcome {
                    solution,
                    states,
                    iterations: pass,
                    converged: true,
                });
            }

            debug!(
                "pass {}: LED states changed ({} on -> {} on)",
                pass,
                states.count_on(),
                next.count_on()
            );

            if pass >= max_iterations {
                warn!(
                    "LED states did not settle within {} passes, keeping the last solution",
                    max_iterations
                );
                return Ok(IterationOutcome {
                    solution,
                    states,
                    iterations: pass,
                    converged: false,
                });
            }

            states = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{NodeId, Terminal};
    use crate::components::LedParams;

    #[test]
    fn test_states_start_leak() {
        let mut model = CircuitModel::new();
        model.add_resistor("R1", 10.0).unwrap();
        model.add_led("LED1", LedParams::default()).unwrap();
        let mut states = ConductionStates::new(&model);
        assert_eq!(states.get(ComponentId(1)), LedState::Leak);
        assert_eq!(states.count_on(), 0);

        states.set(ComponentId(1), LedState::On);
        // Resistors have no state to set
        states.set(ComponentId(0), LedState::On);
        assert_eq!(states.count_on(), 1);
    }

    fn series_led(emf: f64) -> CircuitModel {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", emf).unwrap();
        let r = model.add_resistor("R1", 330.0).unwrap();
        let d = model.add_led("LED1", LedParams::default()).unwrap();
        model.connect(Terminal::a(v), Terminal::a(r)).unwrap();
        model.connect(Terminal::b(r), Terminal::a(d)).unwrap();
        model.connect(Terminal::b(d), Terminal::b(v)).unwrap();
        model
    }

    fn run(model: &CircuitModel, config: &SolverConfig) -> IterationOutcome {
        let topo = Topology::build(model);
        let layout = MnaLayout::new(model, &topo, topo.last().unwrap_or(NodeId(0)));
        LedIteration::new(config).run(model, &topo, &layout).unwrap()
    }

    #[test]
    fn test_series_led_turns_on_in_two_passes() {
        let outcome = run(&series_led(9.0), &SolverConfig::default());
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.states.get(ComponentId(2)), LedState::On);
    }

    #[test]
    fn test_iteration_reads_limits_from_config() {
        let capped = run(&series_led(9.0), &SolverConfig::new().with_max_iterations(1));
        assert!(!capped.converged);
        assert_eq!(capped.iterations, 1);
        assert_eq!(capped.states.get(ComponentId(2)), LedState::Leak);

        // 1.5 V is below the 2 V forward voltage
        let dim = series_led(1.5);
        let outcome = run(&dim, &SolverConfig::default());
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.states.get(ComponentId(2)), LedState::Leak);

        // A 1 V tolerance lowers the turn-on point below the supply
        let loose = SolverConfig::new().with_threshold_epsilon(1.0);
        let outcome = run(&dim, &loose);
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.states.get(ComponentId(2)), LedState::On);
    }
}

//! Solve results and failure reasons.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::circuit::{CircuitModel, Node, NodeId, Topology};
use crate::components::{Component, LedState};
use crate::error::BreadboardError;

use super::dc::SolverConfig;
use super::iteration::IterationOutcome;
use super::mna::MnaLayout;

/// Why a circuit could not be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Nothing placed or nothing wired
    NoCompleteNetwork,
    /// The MNA matrix had no usable pivot
    SingularMatrix,
    /// The requested reference node does not exist
    InvalidReference,
    /// The model failed validation
    InvalidCircuit,
}

impl FailureReason {
    /// Classify an error raised while solving.
    pub fn from_error(error: &BreadboardError) -> Self {
        match error {
            BreadboardError::NoCompleteNetwork => FailureReason::NoCompleteNetwork,
            BreadboardError::SingularMatrix { .. } => FailureReason::SingularMatrix,
            BreadboardError::InvalidReference { .. } => FailureReason::InvalidReference,
            _ => FailureReason::InvalidCircuit,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::NoCompleteNetwork => "no complete network",
            FailureReason::SingularMatrix => "singular matrix",
            FailureReason::InvalidReference => "invalid reference node",
            FailureReason::InvalidCircuit => "invalid circuit",
        };
        f.write_str(text)
    }
}

/// Outcome of one DC solve.
///
/// Passive element currents flow from terminal A to terminal B through the
/// element. Battery currents are the current delivered out of the positive
/// terminal. An unsolved result has empty maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolveResult {
    pub success: bool,
    pub failure_reason: Option<FailureReason>,
    /// Node held at 0 V
    pub reference: Option<NodeId>,
    /// Terminal membership of every node
    pub nodes: Vec<Node>,
    pub node_voltages: BTreeMap<NodeId, f64>,
    /// Current per component name, in amperes
    pub element_currents: BTreeMap<String, f64>,
    pub led_states: BTreeMap<String, LedState>,
    /// Current over rated current, clamped to `[0, 1]`
    pub led_brightness: BTreeMap<String, f64>,
    /// Number of linear solves
    pub iterations: usize,
    /// False if the LED iteration hit its cap
    pub converged: bool,
}

impl SolveResult {
    /// An unsolved result.
    pub fn unsolved(reason: FailureReason) -> Self {
        Self {
            success: false,
            failure_reason: Some(reason),
            ..Self::default()
        }
    }

    /// Check whether the circuit was solved.
    pub fn is_solved(&self) -> bool {
        self.success
    }

    /// Current through a component by name.
    pub fn current(&self, name: &str) -> Option<f64> {
        self.element_currents.get(name).copied()
    }

    /// Voltage of a node.
    pub fn voltage(&self, node: NodeId) -> Option<f64> {
        self.node_voltages.get(&node).copied()
    }

    /// Build a solved result from the final iteration pass.
    pub(crate) fn extract(
        model: &CircuitModel,
        topology: &Topology,
        layout: &MnaLayout,
        outcome: IterationOutcome,
        config: &SolverConfig,
    ) -> Self {
        let x = &outcome.solution;

        let node_voltages: BTreeMap<NodeId, f64> = topology
            .nodes()
            .iter()
            .map(|n| (n.id, layout.voltage(x, n.id)))
            .collect();

        let mut element_currents = BTreeMap::new();
        let mut led_states = BTreeMap::new();
        let mut led_brightness = BTreeMap::new();

        for component in model.components() {
            let Some(pair) = topology.component_nodes(component.id()) else {
                continue;
            };
            let [v_a, v_b] = pair.map(|node| layout.voltage(x, node));
            let v_ab = v_a - v_b;

            let current = match component {
                Component::Resistor(r) => r.current(v_ab),
                Component::Wire(_) => v_ab / config.wire_resistance,
                Component::Switch(s) => {
                    if s.closed {
                        v_ab / config.wire_resistance
                    } else {
                        0.0
                    }
                }
                Component::Battery(b) => match layout.branch_index(b.id) {
                    Some(br) => b.delivered_current(x[br]),
                    None => 0.0,
                },
                Component::Led(d) => {
                    let state = outcome.states.get(d.id);
                    let current = d.current(v_ab, state);
                    led_states.insert(d.name.clone(), state);
                    led_brightness.insert(d.name.clone(), d.brightness(current));
                    current
                }
            };
            element_currents.insert(component.name().to_string(), current);
        }

        Self {
            success: true,
            failure_reason: None,
            reference: Some(layout.reference()),
            nodes: topology.nodes().to_vec(),
            node_voltages,
            element_currents,
            led_states,
            led_brightness,
            iterations: outcome.iterations,
            converged: outcome.converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_mapping() {
        let singular = BreadboardError::SingularMatrix { column: 2, pivot: 0.0 };
        assert_eq!(FailureReason::from_error(&singular), FailureReason::SingularMatrix);
        assert_eq!(
            FailureReason::from_error(&BreadboardError::NoCompleteNetwork),
            FailureReason::NoCompleteNetwork
        );
        assert_eq!(
            FailureReason::from_error(&BreadboardError::not_found("R9")),
            FailureReason::InvalidCircuit
        );
    }

    #[test]
    fn test_unsolved_is_empty() {
        let result = SolveResult::unsolved(FailureReason::SingularMatrix);
        assert!(!result.is_solved());
        assert!(result.node_voltages.is_empty());
        assert!(result.element_currents.is_empty());
        assert_eq!(result.current("R1"), None);
        assert_eq!(FailureReason::SingularMatrix.to_string(), "singular matrix");
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&FailureReason::NoCompleteNetwork).unwrap();
        assert_eq!(json, "\"no_complete_network\"");
    }
}

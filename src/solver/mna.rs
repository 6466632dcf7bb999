//! MNA system layout and component stamping.

use log::trace;

use crate::circuit::{BranchId, CircuitModel, ComponentId, NodeId, Topology};
use crate::components::{Battery, Component, Led};
use crate::error::Result;

use super::dc::SolverConfig;
use super::iteration::ConductionStates;
use super::linear::{solve_dense, DenseMatrix};

/// Mapping from nodes and batteries to rows of the MNA system.
///
/// Rows `0..num_nodes - 1` hold the non-reference node voltages in node
/// order (nodes above the reference shift down by one); the rows after them
/// hold one branch current per battery, in component order.
#[derive(Debug, Clone, PartialEq)]
pub struct MnaLayout {
    reference: NodeId,
    num_nodes: usize,
    /// Branch of each component, indexed by `ComponentId`
    branches: Vec<Option<BranchId>>,
    num_branches: usize,
}

impl MnaLayout {
    /// Build the layout for a circuit with the given reference node.
    pub fn new(model: &CircuitModel, topology: &Topology, reference: NodeId) -> Self {
        let mut num_branches = 0;
        let branches = model
            .components()
            .iter()
            .map(|component| match component {
                Component::Battery(_) => {
                    let branch = BranchId(num_branches);
                    num_branches += 1;
                    Some(branch)
                }
                _ => None,
            })
            .collect();

        Self {
            reference,
            num_nodes: topology.len(),
            branches,
            num_branches,
        }
    }

    /// The node held at 0 V.
    pub fn reference(&self) -> NodeId {
        self.reference
    }

    /// Number of unknown node voltages.
    pub fn num_voltages(&self) -> usize {
        self.num_nodes.saturating_sub(1)
    }

    /// Total number of unknowns.
    pub fn size(&self) -> usize {
        self.num_voltages() + self.num_branches
    }

    /// Row of a node voltage, `None` for the reference.
    pub fn node_index(&self, node: NodeId) -> Option<usize> {
        use std::cmp::Ordering;
        match node.0.cmp(&self.reference.0) {
            Ordering::Less => Some(node.0),
            Ordering::Equal => None,
            Ordering::Greater => Some(node.0 - 1),
        }
    }

    /// Row of a battery's branch current.
    pub fn branch_index(&self, component: ComponentId) -> Option<usize> {
        self.branches
            .get(component.0)
            .copied()
            .flatten()
            .map(|b| self.num_voltages() + b.0)
    }

    /// Voltage of a node in a solution vector.
    pub fn voltage(&self, x: &[f64], node: NodeId) -> f64 {
        match self.node_index(node) {
            Some(i) => x[i],
            None => 0.0, // Reference
        }
    }
}

/// MNA system `A·x = z`.
#[derive(Debug, Clone)]
pub struct MnaSystem {
    /// System matrix A
    pub matrix: DenseMatrix,
    /// Source vector z
    pub z: Vec<f64>,
}

impl MnaSystem {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            matrix: DenseMatrix::zeros(size),
            z: vec![0.0; size],
        }
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.matrix.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.matrix.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.matrix.add(i, j, -g);
            self.matrix.add(j, i, -g);
        }
    }

    /// Stamp a voltage source between two nodes with branch current at index br.
    /// V[n+] - V[n-] = E
    pub fn stamp_voltage_source(
        &mut self,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        br: usize,
        voltage: f64,
    ) {
        if let Some(i) = n_pos {
            self.matrix.add(br, i, 1.0);
            self.matrix.add(i, br, 1.0);
        }
        if let Some(j) = n_neg {
            self.matrix.add(br, j, -1.0);
            self.matrix.add(j, br, -1.0);
        }
        self.z[br] = voltage;
    }

    /// Stamp a current source between two nodes.
    /// Current flows from n+ to n- through the source, so it is drawn out
    /// of n+ and pushed into n-.
    pub fn stamp_current_source(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, current: f64) {
        if let Some(i) = n_pos {
            self.z[i] -= current;
        }
        if let Some(j) = n_neg {
            self.z[j] += current;
        }
    }

    /// Tie every node voltage row to the reference through `g`, so a
    /// floating node does not make the matrix singular.
    pub fn add_min_conductance(&mut self, num_voltages: usize, g: f64) {
        for i in 0..num_voltages {
            self.matrix.add(i, i, g);
        }
    }

    /// Solve the system.
    pub fn solve(&self, pivot_epsilon: f64) -> Result<Vec<f64>> {
        solve_dense(&self.matrix, &self.z, pivot_epsilon)
    }
}

/// Assemble the MNA system for one pass with fixed LED states.
pub fn assemble(
    model: &CircuitModel,
    topology: &Topology,
    layout: &MnaLayout,
    states: &ConductionStates,
    config: &SolverConfig,
) -> MnaSystem {
    let mut system = MnaSystem::new(layout.size());
    trace!(
        "assembling {}x{} system ({} node rows)",
        layout.size(),
        layout.size(),
        layout.num_voltages()
    );

    let wire_conductance = 1.0 / config.wire_resistance;

    for component in model.components() {
        // Components always have nodes once the topology is non-empty
        let Some(pair) = topology.component_nodes(component.id()) else {
            continue;
        };
        let rows = pair.map(|node| layout.node_index(node));
        let [n1, n2] = rows;

        match component {
            Component::Resistor(r) => system.stamp_conductance(n1, n2, r.conductance()),

            Component::Wire(_) => system.stamp_conductance(n1, n2, wire_conductance),

            Component::Switch(s) => {
                if s.closed {
                    system.stamp_conductance(n1, n2, wire_conductance);
                }
            }

            Component::Battery(b) => {
                if let Some(br) = layout.branch_index(b.id) {
                    let pos = rows[Battery::POSITIVE.index()];
                    let neg = rows[Battery::NEGATIVE.index()];
                    system.stamp_voltage_source(pos, neg, br, b.emf);
                }
            }

            Component::Led(d) => {
                let state = states.get(d.id);
                let anode = rows[Led::ANODE.index()];
                let cathode = rows[Led::CATHODE.index()];
                // The Vf offset pushes current into the anode
                system.stamp_conductance(anode, cathode, d.conductance(state));
                system.stamp_current_source(cathode, anode, d.offset_current(state));
            }
        }
    }

    system.add_min_conductance(layout.num_voltages(), config.min_conductance);
    system
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Terminal;
    use crate::components::LedParams;
    use approx::assert_relative_eq;

    fn divider() -> CircuitModel {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 10.0).unwrap();
        let r1 = model.add_resistor("R1", 1000.0).unwrap();
        let r2 = model.add_resistor("R2", 1000.0).unwrap();
        model.connect(Terminal::a(v), Terminal::a(r1)).unwrap();
        model.connect(Terminal::b(r1), Terminal::a(r2)).unwrap();
        model.connect(Terminal::b(r2), Terminal::b(v)).unwrap();
        model
    }

    #[test]
    fn test_layout_skips_reference() {
        let model = divider();
        let topo = Topology::build(&model);
        let layout = MnaLayout::new(&model, &topo, NodeId(1));
        assert_eq!(layout.size(), 3);
        assert_eq!(layout.node_index(NodeId(0)), Some(0));
        assert_eq!(layout.node_index(NodeId(1)), None);
        assert_eq!(layout.node_index(NodeId(2)), Some(1));
        assert_eq!(layout.branch_index(ComponentId(0)), Some(2));
        assert_eq!(layout.branch_index(ComponentId(1)), None);
    }

    #[test]
    fn test_stamp_conductance_symmetry() {
        let mut sys = MnaSystem::new(2);
        sys.stamp_conductance(Some(0), Some(1), 0.5);
        sys.stamp_conductance(Some(1), None, 0.25);
        assert_eq!(sys.matrix.get(0, 0), 0.5);
        assert_eq!(sys.matrix.get(0, 1), -0.5);
        assert_eq!(sys.matrix.get(1, 0), -0.5);
        assert_eq!(sys.matrix.get(1, 1), 0.75);
    }

    #[test]
    fn test_divider_solution() {
        let model = divider();
        let topo = Topology::build(&model);
        let layout = MnaLayout::new(&model, &topo, NodeId(1));
        let states = ConductionStates::new(&model);
        let sys = assemble(&model, &topo, &layout, &states, &SolverConfig::default());
        let x = sys.solve(1e-15).unwrap();
        assert_relative_eq!(layout.voltage(&x, NodeId(0)), 10.0, epsilon = 1e-9);
        assert_relative_eq!(layout.voltage(&x, NodeId(2)), 5.0, epsilon = 1e-6);
        // Branch current enters the positive terminal: 5 mA discharging
        assert_relative_eq!(x[2], -0.005, epsilon = 1e-9);
    }

    #[test]
    fn test_led_on_offset() {
        let mut model = CircuitModel::new();
        model.add_led("LED1", LedParams::with_forward_voltage(2.0)).unwrap();
        model.add_wire("W1").unwrap();
        model
            .connect(Terminal::b(ComponentId(0)), Terminal::a(ComponentId(1)))
            .unwrap();
        let topo = Topology::build(&model);
        let layout = MnaLayout::new(&model, &topo, topo.last().unwrap());
        let mut states = ConductionStates::new(&model);
        states.set(ComponentId(0), crate::components::LedState::On);
        let sys = assemble(&model, &topo, &layout, &states, &SolverConfig::default());

        let anode = layout.node_index(NodeId(0)).unwrap();
        let cathode = layout.node_index(NodeId(1)).unwrap();
        assert_relative_eq!(sys.z[anode], 2.0 / 25.0);
        assert_relative_eq!(sys.z[cathode], -2.0 / 25.0);
    }
}

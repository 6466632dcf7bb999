//! Electrical node discovery.
//!
//! Each component terminal is a vertex and each connection an edge; the
//! nodes of the circuit are the connected components of that graph. Nodes
//! are numbered in order of first appearance, scanning components in arena
//! order with terminal A before terminal B, so the numbering is stable for
//! an unchanged model.

use std::collections::HashMap;

use serde::Serialize;

use super::model::CircuitModel;
use super::types::{ComponentId, NodeId, Terminal};

/// An equivalence class of terminals, all at the same voltage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub terminals: Vec<Terminal>,
}

/// The nodes of a circuit and the terminal-to-node mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    nodes: Vec<Node>,
    /// `[node of A, node of B]`, indexed by `ComponentId`
    component_nodes: Vec<[NodeId; 2]>,
}

impl Topology {
    /// Derive the nodes of a circuit.
    ///
    /// Returns an empty topology when nothing is placed or nothing is
    /// connected: there is no network to solve in either case.
    pub fn build(model: &CircuitModel) -> Self {
        if model.components().is_empty() || model.connections().is_empty() {
            return Self::default();
        }

        let vertex_count = model.components().len() * 2;
        let mut dsu = DisjointSet::new(vertex_count);
        for connection in model.connections() {
            dsu.union(connection.a.vertex(), connection.b.vertex());
        }

        let mut root_to_node: HashMap<usize, NodeId> = HashMap::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut component_nodes = Vec::with_capacity(model.components().len());

        for component in model.components() {
            let mut pair = [NodeId(0); 2];
            for terminal in component.terminals() {
                let root = dsu.find(terminal.vertex());
                let node = *root_to_node.entry(root).or_insert_with(|| {
                    let id = NodeId(nodes.len());
                    nodes.push(Node {
                        id,
                        terminals: Vec::new(),
                    });
                    id
                });
                nodes[node.0].terminals.push(terminal);
                pair[terminal.side.index()] = node;
            }
            component_nodes.push(pair);
        }

        Self {
            nodes,
            component_nodes,
        }
    }

    /// All nodes, in discovery order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether there is nothing to solve.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The most recently discovered node, the default reference.
    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().map(|n| n.id)
    }

    /// Nodes of a component's `[A, B]` terminals.
    pub fn component_nodes(&self, component: ComponentId) -> Option<[NodeId; 2]> {
        self.component_nodes.get(component.0).copied()
    }

    /// Node a terminal belongs to.
    pub fn node_of(&self, terminal: Terminal) -> Option<NodeId> {
        self.component_nodes(terminal.component)
            .map(|pair| pair[terminal.side.index()])
    }
}

/// Union-find over terminal vertices, with path compression.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Compress the walked path
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i != root_j {
            self.parent[root_j] = root_i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_loop() -> CircuitModel {
        let mut model = CircuitModel::new();
        let v = model.add_battery("V1", 9.0).unwrap();
        let r1 = model.add_resistor("R1", 100.0).unwrap();
        let r2 = model.add_resistor("R2", 200.0).unwrap();
        model.connect(Terminal::a(v), Terminal::a(r1)).unwrap();
        model.connect(Terminal::b(r1), Terminal::a(r2)).unwrap();
        model.connect(Terminal::b(r2), Terminal::b(v)).unwrap();
        model
    }

    #[test]
    fn test_series_loop_nodes() {
        let model = series_loop();
        let topo = Topology::build(&model);
        assert_eq!(topo.len(), 3);
        // V1:a is seen first, V1:b second
        assert_eq!(topo.component_nodes(ComponentId(0)), Some([NodeId(0), NodeId(1)]));
        assert_eq!(topo.component_nodes(ComponentId(1)), Some([NodeId(0), NodeId(2)]));
        assert_eq!(topo.component_nodes(ComponentId(2)), Some([NodeId(2), NodeId(1)]));
        assert_eq!(topo.last(), Some(NodeId(2)));
        assert_eq!(topo.nodes()[1].terminals.len(), 2);
    }

    #[test]
    fn test_isolated_terminal_is_its_own_node() {
        let mut model = series_loop();
        model.add_resistor("R3", 10.0).unwrap();
        let topo = Topology::build(&model);
        assert_eq!(topo.len(), 5);
        let r3 = topo.component_nodes(ComponentId(3)).unwrap();
        assert_ne!(r3[0], r3[1]);
        assert_eq!(topo.nodes()[r3[0].0].terminals, vec![Terminal::a(ComponentId(3))]);
    }

    #[test]
    fn test_transitive_merge() {
        let mut model = CircuitModel::new();
        for name in ["R1", "R2", "R3"] {
            model.add_resistor(name, 1.0).unwrap();
        }
        model.connect(Terminal::a(ComponentId(0)), Terminal::a(ComponentId(1))).unwrap();
        model.connect(Terminal::a(ComponentId(1)), Terminal::a(ComponentId(2))).unwrap();
        let topo = Topology::build(&model);
        let a0 = topo.node_of(Terminal::a(ComponentId(0)));
        assert_eq!(a0, topo.node_of(Terminal::a(ComponentId(2))));
        assert_ne!(a0, topo.node_of(Terminal::b(ComponentId(0))));
    }

    #[test]
    fn test_empty_inputs_give_no_nodes() {
        assert!(Topology::build(&CircuitModel::new()).is_empty());

        let mut model = CircuitModel::new();
        model.add_battery("V1", 9.0).unwrap();
        model.add_resistor("R1", 100.0).unwrap();
        assert!(Topology::build(&model).is_empty());
    }
}

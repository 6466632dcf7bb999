//! Core types for circuit representation.

use std::fmt;

use serde::Serialize;

/// Index of an electrical node, assigned in discovery order per solve.
///
/// Unlike a netlist with a fixed ground, any node may be picked as the
/// reference for a given solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Arena index of a component inside a [`CircuitModel`](super::CircuitModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Index for extra variables in the MNA matrix (battery currents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchId(pub usize);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

/// One of the two connection points of a component.
///
/// For a battery `A` is the positive terminal, for an LED `A` is the anode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalSide {
    A,
    B,
}

impl TerminalSide {
    /// Both sides, in the order the topology builder visits them.
    pub const BOTH: [TerminalSide; 2] = [TerminalSide::A, TerminalSide::B];

    /// Parse a side label. Accepts the generic and the polarity spellings.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "a" | "left" | "pos" | "positive" | "plus" | "anode" => Some(Self::A),
            "b" | "right" | "neg" | "negative" | "minus" | "cathode" => Some(Self::B),
            _ => None,
        }
    }

    /// Position of this side in a `[A, B]` pair.
    pub fn index(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for TerminalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "a"),
            Self::B => write!(f, "b"),
        }
    }
}

/// A (component, side) pair identifying a connection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Terminal {
    pub component: ComponentId,
    pub side: TerminalSide,
}

impl Terminal {
    pub fn new(component: ComponentId, side: TerminalSide) -> Self {
        Self { component, side }
    }

    /// Terminal A of a component.
    pub fn a(component: ComponentId) -> Self {
        Self::new(component, TerminalSide::A)
    }

    /// Terminal B of a component.
    pub fn b(component: ComponentId) -> Self {
        Self::new(component, TerminalSide::B)
    }

    /// Flat vertex index used by the topology builder: `2 * component + side`.
    pub fn vertex(&self) -> usize {
        self.component.0 * 2 + self.side.index()
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.component, self.side)
    }
}

/// An unordered pair of terminals declared electrically identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub a: Terminal,
    pub b: Terminal,
}

impl Connection {
    pub fn new(a: Terminal, b: Terminal) -> Self {
        Self { a, b }
    }

    /// Check whether this connection joins the same two terminals as `other`,
    /// in either order.
    pub fn same_as(&self, other: &Connection) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }

    /// Check whether either end belongs to the given component.
    pub fn touches(&self, component: ComponentId) -> bool {
        self.a.component == component || self.b.component == component
    }
}

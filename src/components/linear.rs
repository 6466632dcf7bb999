//! Linear passive components: Resistor and Wire.

use crate::circuit::ComponentId;

/// A resistor component.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub id: ComponentId,
    pub name: String,
    /// Resistance in ohms
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(id: ComponentId, name: impl Into<String>, resistance: f64) -> Self {
        Self {
            id,
            name: name.into(),
            resistance,
        }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    /// Current from terminal A to terminal B for a given voltage drop.
    pub fn current(&self, v_ab: f64) -> f64 {
        v_ab * self.conductance()
    }
}

/// A wire placed as a component.
///
/// Stamped as a very small resistance rather than an ideal short, so its
/// current stays finite and readable. The resistance itself comes from
/// the solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub id: ComponentId,
    pub name: String,
}

impl Wire {
    /// Create a new wire.
    pub fn new(id: ComponentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

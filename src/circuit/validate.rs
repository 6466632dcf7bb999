//! Circuit validation.

use std::collections::HashSet;

use crate::components::Component;
use crate::error::{BreadboardError, Result};

use super::CircuitModel;

fn require(ok: bool, component: &str, param: &str, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(BreadboardError::invalid_parameter(component, param, message))
    }
}

/// Validate the parameters of a single component.
///
/// Checks:
/// - Resistances are finite and strictly positive
/// - Battery EMF is finite
/// - LED forward voltage is finite and non-negative, resistances and rated
///   current are finite and strictly positive
pub fn validate_component(component: &Component) -> Result<()> {
    let positive = |v: f64| v.is_finite() && v > 0.0;

    match component {
        Component::Resistor(r) => require(
            positive(r.resistance),
            &r.name,
            "resistance",
            "must be a positive number of ohms",
        ),
        Component::Battery(b) => require(b.emf.is_finite(), &b.name, "emf", "must be finite"),
        Component::Led(d) => {
            let p = &d.params;
            require(
                p.forward_voltage.is_finite() && p.forward_voltage >= 0.0,
                &d.name,
                "vf",
                "must be a non-negative number of volts",
            )?;
            require(positive(p.forward_resistance), &d.name, "rf", "must be positive")?;
            require(positive(p.leakage_resistance), &d.name, "rleak", "must be positive")?;
            require(positive(p.rated_current), &d.name, "imax", "must be positive")
        }
        Component::Switch(_) | Component::Wire(_) => Ok(()),
    }
}

/// Validate a whole circuit.
///
/// Checks:
/// - Component names are unique and non-empty
/// - Arena indices match positions
/// - Every component passes [`validate_component`]
/// - Every connection refers to an existing component
pub fn validate_circuit(circuit: &CircuitModel) -> Result<()> {
    let mut names = HashSet::new();
    for (idx, component) in circuit.components().iter().enumerate() {
        if component.name().is_empty() {
            return Err(BreadboardError::InvalidTopology {
                message: format!("component {} has an empty name", component.id()),
            });
        }
        if !names.insert(component.name()) {
            return Err(BreadboardError::DuplicateComponent {
                name: component.name().to_string(),
            });
        }
        if component.id().0 != idx {
            return Err(BreadboardError::InvalidTopology {
                message: format!("component '{}' is out of place", component.name()),
            });
        }
        validate_component(component)?;
    }

    let count = circuit.components().len();
    for connection in circuit.connections() {
        for terminal in [connection.a, connection.b] {
            if terminal.component.0 >= count {
                return Err(BreadboardError::InvalidTopology {
                    message: format!("connection refers to missing component {}", terminal.component),
                });
            }
        }
    }

    Ok(())
}

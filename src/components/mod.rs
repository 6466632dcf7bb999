//! Component models for circuit simulation.
//!
//! This module provides models for the parts that can be placed on the board:
//! - Linear: Resistor, Wire
//! - Sources: Battery
//! - Nonlinear: LED (piecewise-linear)
//! - Controls: Switch
//!
//! Every component has exactly two terminals, `A` and `B`.

mod controls;
mod led;
mod linear;
mod sources;

pub use controls::Switch;
pub use led::{Led, LedParams, LedState};
pub use linear::{Resistor, Wire};
pub use sources::Battery;

use crate::circuit::{ComponentId, Terminal, TerminalSide};
use crate::dsl::{ComponentDef, ComponentType};
use crate::error::{BreadboardError, Result};

/// A circuit component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    Battery(Battery),
    Led(Led),
    Switch(Switch),
    Wire(Wire),
}

impl Component {
    /// Create a component from a netlist definition.
    pub fn from_def(id: ComponentId, def: &ComponentDef) -> Result<Self> {
        let invalid = |message: String| BreadboardError::invalid_component(&def.name, def.line, message);

        // Only LEDs and switches accept extra keywords
        let check_flags = |allowed: &[&str]| -> Result<()> {
            match def.flags.iter().find(|f| !allowed.contains(&f.as_str())) {
                Some(flag) => Err(invalid(format!("unknown keyword '{}'", flag))),
                None => Ok(()),
            }
        };
        let check_params = |allowed: &[&str]| -> Result<()> {
            let mut keys: Vec<&String> = def.params.keys().collect();
            keys.sort();
            match keys.into_iter().find(|k| !allowed.contains(&k.as_str())) {
                Some(key) => Err(BreadboardError::invalid_parameter(
                    &def.name,
                    key.as_str(),
                    "not accepted by this component",
                )),
                None => Ok(()),
            }
        };

        match def.component_type {
            ComponentType::Resistor => {
                check_flags(&[])?;
                check_params(&[])?;
                let value = def
                    .value
                    .ok_or_else(|| invalid("resistor requires a value".to_string()))?;
                Ok(Component::Resistor(Resistor::new(id, def.name.clone(), value)))
            }

            ComponentType::Battery => {
                check_flags(&[])?;
                check_params(&[])?;
                let value = def
                    .value
                    .ok_or_else(|| invalid("battery requires a value".to_string()))?;
                Ok(Component::Battery(Battery::new(id, def.name.clone(), value)))
            }

            ComponentType::Led => {
                check_params(&["vf", "rf", "rleak", "imax"])?;
                if def.value.is_some() {
                    return Err(invalid("use vf=<volts> to set the forward voltage".to_string()));
                }
                let mut params = LedParams::default();
                match def.flags.as_slice() {
                    [] => {}
                    [color] => {
                        params = LedParams::from_color(color)
                            .ok_or_else(|| invalid(format!("unknown LED color '{}'", color)))?;
                    }
                    _ => return Err(invalid("at most one LED color may be given".to_string())),
                }
                if let Some(&vf) = def.params.get("vf") {
                    params.forward_voltage = vf;
                }
                if let Some(&rf) = def.params.get("rf") {
                    params.forward_resistance = rf;
                }
                if let Some(&rleak) = def.params.get("rleak") {
                    params.leakage_resistance = rleak;
                }
                if let Some(&imax) = def.params.get("imax") {
                    params.rated_current = imax;
                }
                Ok(Component::Led(Led::new(id, def.name.clone(), params)))
            }

            ComponentType::Switch => {
                check_flags(&["open", "closed"])?;
                check_params(&["state"])?;
                let mut closed = def.params.get("state").map(|v| *v > 0.5).unwrap_or(true);
                if let Some(flag) = def.flags.last() {
                    closed = flag == "closed";
                }
                Ok(Component::Switch(Switch::new(id, def.name.clone(), closed)))
            }

            ComponentType::Wire => {
                check_flags(&[])?;
                check_params(&[])?;
                if def.value.is_some() {
                    return Err(invalid("wires take no value".to_string()));
                }
                Ok(Component::Wire(Wire::new(id, def.name.clone())))
            }
        }
    }

    /// Get the component ID.
    pub fn id(&self) -> ComponentId {
        match self {
            Component::Resistor(r) => r.id,
            Component::Battery(b) => b.id,
            Component::Led(d) => d.id,
            Component::Switch(s) => s.id,
            Component::Wire(w) => w.id,
        }
    }

    /// Reassign the arena index after a removal.
    pub(crate) fn set_id(&mut self, id: ComponentId) {
        match self {
            Component::Resistor(r) => r.id = id,
            Component::Battery(b) => b.id = id,
            Component::Led(d) => d.id = id,
            Component::Switch(s) => s.id = id,
            Component::Wire(w) => w.id = id,
        }
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::Battery(b) => &b.name,
            Component::Led(d) => &d.name,
            Component::Switch(s) => &s.name,
            Component::Wire(w) => &w.name,
        }
    }

    /// Get the component type.
    pub fn component_type(&self) -> ComponentType {
        match self {
            Component::Resistor(_) => ComponentType::Resistor,
            Component::Battery(_) => ComponentType::Battery,
            Component::Led(_) => ComponentType::Led,
            Component::Switch(_) => ComponentType::Switch,
            Component::Wire(_) => ComponentType::Wire,
        }
    }

    /// Both terminals, `[A, B]`.
    pub fn terminals(&self) -> [Terminal; 2] {
        TerminalSide::BOTH.map(|side| Terminal::new(self.id(), side))
    }

    /// Check if this component needs the outer LED iteration.
    pub fn is_nonlinear(&self) -> bool {
        matches!(self, Component::Led(_))
    }

    /// Edit the main value of a component.
    ///
    /// Resistance for resistors, EMF for batteries, forward voltage for
    /// LEDs, and state for switches (`> 0.5` is closed). Wires have no value.
    /// The caller is responsible for re-validating.
    pub fn set_value(&mut self, value: f64) -> Result<()> {
        match self {
            Component::Resistor(r) => r.resistance = value,
            Component::Battery(b) => b.emf = value,
            Component::Led(d) => d.params.forward_voltage = value,
            Component::Switch(s) => s.set_closed(value > 0.5),
            Component::Wire(w) => {
                return Err(BreadboardError::invalid_parameter(
                    &w.name,
                    "value",
                    "wires have no editable value",
                ));
            }
        }
        Ok(())
    }
}

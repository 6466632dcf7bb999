//! Piecewise-linear LED model.
//!
//! An LED is modeled as one of two linear devices, picked by the solver's
//! outer iteration:
//!
//! - `On`: a forward voltage `Vf` in series with a forward resistance `Rf`,
//!   so `I = (Vd - Vf) / Rf`
//! - `Leak`: a large leakage resistance, so `I = Vd / Rleak`
//!
//! where `Vd = V(anode) - V(cathode)`.

use serde::Serialize;

use crate::circuit::{ComponentId, TerminalSide};

/// Parameters for an LED model.
#[derive(Debug, Clone, PartialEq)]
pub struct LedParams {
    /// Forward voltage threshold (Vf) in volts
    pub forward_voltage: f64,
    /// Series resistance while conducting (Rf) in ohms
    pub forward_resistance: f64,
    /// Resistance while not conducting (Rleak) in ohms
    pub leakage_resistance: f64,
    /// Current at full brightness, in amperes
    pub rated_current: f64,
}

impl Default for LedParams {
    fn default() -> Self {
        Self {
            forward_voltage: 2.0,
            forward_resistance: 25.0,
            leakage_resistance: 1e9,
            rated_current: 0.02,
        }
    }
}

impl LedParams {
    /// Create parameters for a given forward voltage, other values default.
    pub fn with_forward_voltage(forward_voltage: f64) -> Self {
        Self {
            forward_voltage,
            ..Self::default()
        }
    }

    /// Look up a colour preset.
    ///
    /// Red ~1.8V, yellow ~2.1V, green ~2.2V, blue ~3.0V, white ~3.1V.
    pub fn from_color(color: &str) -> Option<Self> {
        let vf = match color.to_ascii_lowercase().as_str() {
            "red" => 1.8,
            "yellow" => 2.1,
            "green" => 2.2,
            "blue" => 3.0,
            "white" => 3.1,
            _ => return None,
        };
        Some(Self::with_forward_voltage(vf))
    }
}

/// Conduction assumption for one LED during the solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    /// Not conducting; modeled as the leakage resistance
    #[default]
    Leak,
    /// Conducting; modeled as Vf in series with Rf
    On,
}

/// An LED component.
#[derive(Debug, Clone, PartialEq)]
pub struct Led {
    pub id: ComponentId,
    pub name: String,
    pub params: LedParams,
}

impl Led {
    /// Side of the anode.
    pub const ANODE: TerminalSide = TerminalSide::A;
    /// Side of the cathode.
    pub const CATHODE: TerminalSide = TerminalSide::B;

    /// Create a new LED.
    pub fn new(id: ComponentId, name: impl Into<String>, params: LedParams) -> Self {
        Self {
            id,
            name: name.into(),
            params,
        }
    }

    /// Pick the conduction state implied by a solved voltage drop.
    ///
    /// `epsilon` widens the threshold slightly so an LED sitting exactly at
    /// `Vf` is not flipped back by rounding.
    pub fn assumed_state(&self, v_d: f64, epsilon: f64) -> LedState {
        if v_d >= self.params.forward_voltage - epsilon {
            LedState::On
        } else {
            LedState::Leak
        }
    }

    /// Conductance stamped for a state.
    pub fn conductance(&self, state: LedState) -> f64 {
        match state {
            LedState::On => 1.0 / self.params.forward_resistance,
            LedState::Leak => 1.0 / self.params.leakage_resistance,
        }
    }

    /// Equivalent current injected into the anode (and drawn from the
    /// cathode) by the forward-voltage offset: `Vf / Rf` when on.
    pub fn offset_current(&self, state: LedState) -> f64 {
        match state {
            LedState::On => self.params.forward_voltage / self.params.forward_resistance,
            LedState::Leak => 0.0,
        }
    }

    /// Anode-to-cathode current for a voltage drop under a given state.
    pub fn current(&self, v_d: f64, state: LedState) -> f64 {
        v_d * self.conductance(state) - self.offset_current(state)
    }

    /// Relative brightness in `[0, 1]`.
    pub fn brightness(&self, current: f64) -> f64 {
        (current / self.params.rated_current).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn red() -> Led {
        Led::new(ComponentId(0), "LED1", LedParams::from_color("red").unwrap())
    }

    #[test]
    fn test_led_threshold() {
        let d = red();
        assert_eq!(d.assumed_state(1.0, 1e-9), LedState::Leak);
        assert_eq!(d.assumed_state(1.8, 1e-9), LedState::On);
        assert_eq!(d.assumed_state(1.8 - 1e-12, 1e-9), LedState::On);
        assert_eq!(d.assumed_state(-5.0, 1e-9), LedState::Leak);
    }

    #[test]
    fn test_led_on_current_is_affine() {
        let d = red();
        // At exactly Vf no current flows through the on model
        assert_abs_diff_eq!(d.current(1.8, LedState::On), 0.0, epsilon = 1e-15);
        // One Rf worth of volts above Vf gives 1A
        assert_relative_eq!(d.current(1.8 + 25.0, LedState::On), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_led_leak_current_is_tiny() {
        let d = red();
        let i = d.current(1.5, LedState::Leak);
        assert!(i > 0.0 && i < 1e-8);
    }

    #[test]
    fn test_brightness_clamps() {
        let d = red();
        assert_eq!(d.brightness(-0.01), 0.0);
        assert_relative_eq!(d.brightness(0.01), 0.5);
        assert_eq!(d.brightness(1.0), 1.0);
    }

    #[test]
    fn test_unknown_color() {
        assert!(LedParams::from_color("ultraviolet").is_none());
    }
}

//! Ideal DC voltage source.

use crate::circuit::{ComponentId, TerminalSide};

/// A battery (ideal voltage source).
///
/// Batteries require an extra row/column in the MNA matrix for the branch
/// current. The source enforces: V(A) - V(B) = emf, so terminal A is the
/// positive terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    pub id: ComponentId,
    pub name: String,
    /// Electromotive force in volts
    pub emf: f64,
}

impl Battery {
    /// Side of the positive terminal.
    pub const POSITIVE: TerminalSide = TerminalSide::A;
    /// Side of the negative terminal.
    pub const NEGATIVE: TerminalSide = TerminalSide::B;

    /// Create a new battery.
    pub fn new(id: ComponentId, name: impl Into<String>, emf: f64) -> Self {
        Self {
            id,
            name: name.into(),
            emf,
        }
    }

    /// Current delivered out of the positive terminal, given the solved MNA
    /// branch current.
    ///
    /// The MNA branch unknown counts current entering the positive terminal
    /// from the circuit, so a discharging battery solves to a negative value.
    pub fn delivered_current(&self, branch_current: f64) -> f64 {
        -branch_current
    }
}

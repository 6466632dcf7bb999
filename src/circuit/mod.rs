//! Circuit representation and validation.
//!
//! This module holds the editable [`CircuitModel`] (components and the
//! connections between their terminals) and the [`Topology`] derived from it
//! for each solve.

mod model;
mod topology;
mod types;
mod validate;

pub use model::CircuitModel;
pub use topology::{Node, Topology};
pub use types::*;
pub use validate::{validate_circuit, validate_component};

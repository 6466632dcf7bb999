//! Control components: Switch.

use crate::circuit::ComponentId;

/// A simple on/off switch.
///
/// A closed switch is stamped like a wire; an open switch contributes
/// nothing to the matrix and carries no current.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub id: ComponentId,
    pub name: String,
    /// True if the switch is closed (conducting)
    pub closed: bool,
}

impl Switch {
    /// Create a new switch.
    pub fn new(id: ComponentId, name: impl Into<String>, closed: bool) -> Self {
        Self {
            id,
            name: name.into(),
            closed,
        }
    }

    /// Set the switch state.
    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Toggle the switch state.
    pub fn toggle(&mut self) {
        self.closed = !self.closed;
    }
}

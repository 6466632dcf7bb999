//! The editable circuit: placed components plus the connections between
//! their terminals.

use log::debug;

use super::types::{ComponentId, Connection, Terminal, TerminalSide};
use super::validate::{validate_circuit, validate_component};
use crate::components::{Battery, Component, Led, LedParams, Resistor, Switch, Wire};
use crate::dsl::{CircuitAst, TerminalRef};
use crate::error::{BreadboardError, Result};

/// A circuit ready for solving.
///
/// Components live in an arena indexed by [`ComponentId`]; connections refer
/// to terminals by those indices. Every mutation keeps the model valid, so
/// the solver never has to re-check parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircuitModel {
    /// All components, indexed by `ComponentId`
    components: Vec<Component>,

    /// Declared terminal-to-terminal connections
    connections: Vec<Connection>,

    /// Preferred reference terminal, if the user declared one
    ground: Option<Terminal>,
}

impl CircuitModel {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a circuit from a parsed netlist.
    pub fn from_ast(ast: CircuitAst) -> Result<Self> {
        let mut model = Self::new();

        for def in &ast.components {
            let id = ComponentId(model.components.len());
            let component = Component::from_def(id, def)?;
            model.add(component)?;
        }

        for def in &ast.connections {
            let (first, rest) = def
                .terminals
                .split_first()
                .ok_or_else(|| BreadboardError::parse(def.line, "empty connection"))?;
            let first = model.resolve(first)?;
            for other in rest {
                let terminal = model.resolve(other)?;
                model.connect(first, terminal)?;
            }
        }

        if let Some(ground) = &ast.ground {
            let terminal = model.resolve(ground)?;
            model.set_ground(Some(terminal))?;
        }

        debug!(
            "built circuit: {} components, {} connections",
            model.components.len(),
            model.connections.len()
        );

        Ok(model)
    }

    fn resolve(&self, reference: &TerminalRef) -> Result<Terminal> {
        self.terminal(&reference.component, &reference.side).map_err(|e| match e {
            BreadboardError::ComponentNotFound { name } => BreadboardError::parse(
                reference.line,
                format!("connection to unknown component '{}'", name),
            ),
            other => other,
        })
    }

    // ============ Placement ============

    /// Insert a component, validating its parameters and name.
    ///
    /// The component's id is overwritten with its arena index.
    pub fn add(&mut self, mut component: Component) -> Result<ComponentId> {
        if self.find(component.name()).is_some() {
            return Err(BreadboardError::DuplicateComponent {
                name: component.name().to_string(),
            });
        }
        if component.name().is_empty() {
            return Err(BreadboardError::InvalidTopology {
                message: "component names must not be empty".to_string(),
            });
        }
        validate_component(&component)?;

        let id = ComponentId(self.components.len());
        component.set_id(id);
        self.components.push(component);
        Ok(id)
    }

    /// Place a resistor.
    pub fn add_resistor(&mut self, name: impl Into<String>, resistance: f64) -> Result<ComponentId> {
        let id = self.next_id();
        self.add(Component::Resistor(Resistor::new(id, name, resistance)))
    }

    /// Place a battery. Terminal A is positive.
    pub fn add_battery(&mut self, name: impl Into<String>, emf: f64) -> Result<ComponentId> {
        let id = self.next_id();
        self.add(Component::Battery(Battery::new(id, name, emf)))
    }

    /// Place an LED. Terminal A is the anode.
    pub fn add_led(&mut self, name: impl Into<String>, params: LedParams) -> Result<ComponentId> {
        let id = self.next_id();
        self.add(Component::Led(Led::new(id, name, params)))
    }

    /// Place a switch.
    pub fn add_switch(&mut self, name: impl Into<String>, closed: bool) -> Result<ComponentId> {
        let id = self.next_id();
        self.add(Component::Switch(Switch::new(id, name, closed)))
    }

    /// Place a wire component.
    pub fn add_wire(&mut self, name: impl Into<String>) -> Result<ComponentId> {
        let id = self.next_id();
        self.add(Component::Wire(Wire::new(id, name)))
    }

    fn next_id(&self) -> ComponentId {
        ComponentId(self.components.len())
    }

    /// Delete a component together with every connection that touches it.
    ///
    /// Components after it move down one slot, so previously returned
    /// [`ComponentId`]s past the removed one are no longer valid.
    pub fn remove(&mut self, name: &str) -> Result<Component> {
        let id = self.find(name).ok_or_else(|| BreadboardError::not_found(name))?;

        let removed = self.components.remove(id.0);
        self.connections.retain(|c| !c.touches(id));
        if self.ground.map(|g| g.component) == Some(id) {
            self.ground = None;
        }

        let shift = |t: &mut Terminal| {
            if t.component.0 > id.0 {
                t.component = ComponentId(t.component.0 - 1);
            }
        };
        for connection in &mut self.connections {
            shift(&mut connection.a);
            shift(&mut connection.b);
        }
        if let Some(ground) = self.ground.as_mut() {
            shift(ground);
        }
        for (idx, component) in self.components.iter_mut().enumerate() {
            component.set_id(ComponentId(idx));
        }

        Ok(removed)
    }

    // ============ Wiring ============

    /// Join two terminals. Connecting an already-joined pair is a no-op.
    pub fn connect(&mut self, a: Terminal, b: Terminal) -> Result<()> {
        self.check_terminal(a)?;
        self.check_terminal(b)?;
        let connection = Connection::new(a, b);
        if !self.connections.iter().any(|c| c.same_as(&connection)) {
            self.connections.push(connection);
        }
        Ok(())
    }

    /// Remove a connection between two terminals, in either order.
    ///
    /// Returns whether a connection was removed.
    pub fn disconnect(&mut self, a: Terminal, b: Terminal) -> bool {
        let target = Connection::new(a, b);
        let before = self.connections.len();
        self.connections.retain(|c| !c.same_as(&target));
        self.connections.len() != before
    }

    /// Declare (or clear) the preferred reference terminal.
    pub fn set_ground(&mut self, ground: Option<Terminal>) -> Result<()> {
        if let Some(terminal) = ground {
            self.check_terminal(terminal)?;
        }
        self.ground = ground;
        Ok(())
    }

    fn check_terminal(&self, terminal: Terminal) -> Result<()> {
        if terminal.component.0 < self.components.len() {
            Ok(())
        } else {
            Err(BreadboardError::InvalidTopology {
                message: format!("terminal {} refers to a missing component", terminal),
            })
        }
    }

    // ============ Editing ============

    /// Change the main value of a component (see [`Component::set_value`]).
    ///
    /// On failure the component keeps its previous value.
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<()> {
        let id = self.find(name).ok_or_else(|| BreadboardError::not_found(name))?;
        let mut edited = self.components[id.0].clone();
        edited.set_value(value)?;
        validate_component(&edited)?;
        self.components[id.0] = edited;
        Ok(())
    }

    /// Open or close a switch.
    pub fn set_switch(&mut self, name: &str, closed: bool) -> Result<()> {
        self.switch_mut(name)?.set_closed(closed);
        Ok(())
    }

    /// Flip a switch, returning its new state.
    pub fn toggle_switch(&mut self, name: &str) -> Result<bool> {
        let switch = self.switch_mut(name)?;
        switch.toggle();
        Ok(switch.closed)
    }

    fn switch_mut(&mut self, name: &str) -> Result<&mut Switch> {
        let id = self.find(name).ok_or_else(|| BreadboardError::not_found(name))?;
        match &mut self.components[id.0] {
            Component::Switch(s) => Ok(s),
            other => Err(BreadboardError::invalid_parameter(
                other.name(),
                "state",
                format!("'{}' is a {}, not a switch", name, other.component_type().label()),
            )),
        }
    }

    // ============ Lookup ============

    /// All components in arena order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// All connections in declaration order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The declared reference terminal, if any.
    pub fn ground(&self) -> Option<Terminal> {
        self.ground
    }

    /// Check whether nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Find a component's arena index by name.
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.name() == name)
            .map(ComponentId)
    }

    /// Get a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.find(name).map(|id| &self.components[id.0])
    }

    /// Get a component by arena index.
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Resolve a terminal from a component name and a side label.
    pub fn terminal(&self, component: &str, side: &str) -> Result<Terminal> {
        let id = self
            .find(component)
            .ok_or_else(|| BreadboardError::not_found(component))?;
        let side = TerminalSide::from_label(side).ok_or_else(|| BreadboardError::UnknownTerminal {
            terminal: format!("{}:{}", component, side),
        })?;
        Ok(Terminal::new(id, side))
    }

    /// Resolve a `<component>:<side>` string.
    pub fn parse_terminal(&self, text: &str) -> Result<Terminal> {
        let (component, side) = text.split_once(':').ok_or_else(|| BreadboardError::UnknownTerminal {
            terminal: text.to_string(),
        })?;
        self.terminal(component.trim(), side.trim())
    }

    /// Human-readable `<name>:<side>` form of a terminal.
    pub fn terminal_label(&self, terminal: Terminal) -> String {
        match self.get(terminal.component) {
            Some(c) => format!("{}:{}", c.name(), terminal.side),
            None => terminal.to_string(),
        }
    }

    /// Re-check every invariant of the model.
    pub fn validate(&self) -> Result<()> {
        validate_circuit(self)
    }
}

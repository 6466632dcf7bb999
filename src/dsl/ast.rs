//! Abstract Syntax Tree types for the netlist format.

use std::collections::HashMap;

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct CircuitAst {
    /// All component instances, in declaration order
    pub components: Vec<ComponentDef>,
    /// All `.connect` directives, in declaration order
    pub connections: Vec<ConnectionDef>,
    /// Preferred reference terminal from `.ground`
    pub ground: Option<TerminalRef>,
}

impl CircuitAst {
    /// Create a new empty circuit AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A component definition from the netlist.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    /// Component type, derived from the name prefix
    pub component_type: ComponentType,
    /// Unique component name
    pub name: String,
    /// Main value (resistance, EMF)
    pub value: Option<f64>,
    /// Bare keywords such as `open` or `red`, lowercased
    pub flags: Vec<String>,
    /// `key=value` parameters, keys lowercased
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// A `.connect` directive: every terminal is joined to the first one.
#[derive(Debug, Clone)]
pub struct ConnectionDef {
    pub terminals: Vec<TerminalRef>,
    pub line: usize,
}

/// A textual `<component>:<side>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalRef {
    pub component: String,
    pub side: String,
    pub line: usize,
}

/// Component types supported by the netlist format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Resistor
    Resistor,
    /// Battery (ideal voltage source)
    Battery,
    /// Light-emitting diode
    Led,
    /// Switch
    Switch,
    /// Wire placed as a component
    Wire,
}

impl ComponentType {
    /// Determine the component type from a component name.
    ///
    /// Multi-character prefixes are checked before single characters so
    /// `SW1` is a switch rather than anything else starting with `S`.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if upper.starts_with("LED") {
            return Some(Self::Led);
        }
        if upper.starts_with("SW") {
            return Some(Self::Switch);
        }
        match upper.chars().next()? {
            'R' => Some(Self::Resistor),
            'V' | 'B' => Some(Self::Battery),
            'W' => Some(Self::Wire),
            _ => None,
        }
    }

    /// Human-readable type name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resistor => "resistor",
            Self::Battery => "battery",
            Self::Led => "led",
            Self::Switch => "switch",
            Self::Wire => "wire",
        }
    }

    /// Whether the type requires a main value on its line.
    pub fn requires_value(&self) -> bool {
        matches!(self, Self::Resistor | Self::Battery)
    }
}

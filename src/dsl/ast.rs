//! Abstract Syntax Tree types for the netlist DSL.

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct CircuitAst {
    /// All component instances, in source order
    pub components: Vec<ComponentDef>,
    /// Ground node declared with `.ground`, if any
    pub ground_node: Option<String>,
}

impl CircuitAst {
    /// Create a new empty circuit AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A component definition from the DSL.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    /// Component type
    pub component_type: ComponentType,
    /// Unique component name
    pub name: String,
    /// Connected node names
    pub nodes: Vec<String>,
    /// Component value (resistance, voltage, current, ...)
    pub value: Option<f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Component types supported by the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// Resistor
    Resistor,
    /// Capacitor
    Capacitor,
    /// Inductor
    Inductor,
    /// DC Voltage Source
    VoltageSource,
    /// DC Current Source
    CurrentSource,
    /// Ground reference marker
    Ground,
}

impl ComponentType {
    /// Parse a component type from its DSL prefix.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'R' => Some(Self::Resistor),
            'C' => Some(Self::Capacitor),
            'L' => Some(Self::Inductor),
            'V' => Some(Self::VoltageSource),
            'I' => Some(Self::CurrentSource),
            _ => None,
        }
    }

    /// Parse a component type from a keyword. Keyword lines carry the
    /// component name as their second token.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "GND" | "GROUND" => Some(Self::Ground),
            _ => None,
        }
    }

    /// Get the expected number of nodes for this component type.
    pub fn expected_node_count(&self) -> usize {
        match self {
            Self::Ground => 1,
            _ => 2,
        }
    }

    /// Whether a value token follows the nodes.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Ground)
    }

    /// Human-readable name for messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Resistor => "resistor",
            Self::Capacitor => "capacitor",
            Self::Inductor => "inductor",
            Self::VoltageSource => "voltage source",
            Self::CurrentSource => "current source",
            Self::Ground => "ground marker",
        }
    }
}

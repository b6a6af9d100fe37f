//! Circuit container.

use std::collections::BTreeSet;

use crate::components::Component;
use crate::dsl::{CircuitAst, DEFAULT_GROUND};
use crate::error::{NodalError, Result};

/// A complete circuit ready for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// All components, in declaration order
    pub components: Vec<Component>,
    /// Node that serves as the 0 V reference
    pub ground_node_id: String,
}

impl Circuit {
    /// Create an empty circuit referenced to `ground_node_id`.
    pub fn new(ground_node_id: impl Into<String>) -> Self {
        Self {
            components: Vec::new(),
            ground_node_id: ground_node_id.into(),
        }
    }

    /// Builder-style [`add`](Self::add).
    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        self.add(component);
        self
    }

    /// Append a component.
    pub fn add(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    /// Build a circuit from a parsed AST.
    pub fn from_ast(ast: CircuitAst) -> Result<Self> {
        let ground_node_id = ast
            .ground_node
            .unwrap_or_else(|| DEFAULT_GROUND.to_string());
        let components = ast
            .components
            .iter()
            .map(Component::from_def)
            .collect::<Result<Vec<_>>>()?;
        if components.is_empty() {
            return Err(NodalError::invalid_circuit("netlist has no components"));
        }
        Ok(Self {
            components,
            ground_node_id,
        })
    }

    /// Find a component by id.
    pub fn find_component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    /// Every node id referenced by any component, sorted.
    pub fn node_ids(&self) -> BTreeSet<&str> {
        self.components
            .iter()
            .flat_map(|c| c.node_ids().iter().map(String::as_str))
            .collect()
    }
}

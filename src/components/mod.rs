//! Component models for circuit analysis.
//!
//! This module provides models for the supported circuit components:
//! - Linear: Resistor, Capacitor, Inductor
//! - Sources: DC Voltage Source, DC Current Source
//! - Reference: Ground marker
//!
//! Field-level checks (non-empty ids, distinct terminals, value ranges) run
//! in the constructors, so a [`Component`] is well-formed once it exists.
//! Topology checks live in [`crate::circuit::validate_topology`].

mod linear;
mod sources;

pub use linear::{Capacitor, Inductor, Resistor};
pub use sources::{CurrentSource, VoltageSource};

use crate::dsl::{ComponentDef, ComponentType};
use crate::error::{NodalError, Result};

/// Marks a node as a ground reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Ground {
    pub id: String,
    pub node: String,
}

impl Ground {
    /// Create a new ground marker.
    pub fn new(id: impl Into<String>, node: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let node = node.into();
        check_id(&id)?;
        if node.is_empty() {
            return Err(NodalError::invalid_component(id, "node id must not be empty"));
        }
        Ok(Self { id, node })
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(NodalError::invalid_parameter("component id must not be empty"));
    }
    Ok(())
}

/// Shared checks for two-terminal components.
pub(crate) fn check_two_terminal(id: &str, nodes: &[String; 2]) -> Result<()> {
    check_id(id)?;
    if nodes.iter().any(|n| n.is_empty()) {
        return Err(NodalError::invalid_component(id, "node id must not be empty"));
    }
    if nodes[0] == nodes[1] {
        return Err(NodalError::invalid_component(
            id,
            format!("both terminals connect to node '{}'", nodes[0]),
        ));
    }
    Ok(())
}

/// A circuit component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    Ground(Ground),
}

impl Component {
    /// Create a component from a netlist definition.
    pub fn from_def(def: &ComponentDef) -> Result<Self> {
        let expected = def.component_type.expected_node_count();
        if def.nodes.len() != expected {
            return Err(NodalError::invalid_component(
                &def.name,
                format!(
                    "expected {} nodes, got {} (line {})",
                    expected,
                    def.nodes.len(),
                    def.line
                ),
            ));
        }

        let value = || {
            def.value.ok_or_else(|| {
                NodalError::invalid_component(
                    &def.name,
                    format!(
                        "{} requires a value (line {})",
                        def.component_type.description(),
                        def.line
                    ),
                )
            })
        };
        let (n0, n1) = (def.nodes[0].as_str(), def.nodes.get(1).map_or("", String::as_str));

        match def.component_type {
            ComponentType::Resistor => Ok(Component::Resistor(Resistor::new(
                def.name.as_str(),
                n0,
                n1,
                value()?,
            )?)),
            ComponentType::Capacitor => Ok(Component::Capacitor(Capacitor::new(
                def.name.as_str(),
                n0,
                n1,
                value()?,
            )?)),
            ComponentType::Inductor => Ok(Component::Inductor(Inductor::new(
                def.name.as_str(),
                n0,
                n1,
                value()?,
            )?)),
            ComponentType::VoltageSource => Ok(Component::VoltageSource(VoltageSource::new(
                def.name.as_str(),
                n0,
                n1,
                value()?,
            )?)),
            ComponentType::CurrentSource => Ok(Component::CurrentSource(CurrentSource::new(
                def.name.as_str(),
                n0,
                n1,
                value()?,
            )?)),
            ComponentType::Ground => Ok(Component::Ground(Ground::new(def.name.as_str(), n0)?)),
        }
    }

    /// Get the component id.
    pub fn id(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.id,
            Component::Capacitor(c) => &c.id,
            Component::Inductor(l) => &l.id,
            Component::VoltageSource(v) => &v.id,
            Component::CurrentSource(i) => &i.id,
            Component::Ground(g) => &g.id,
        }
    }

    /// Stable type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Component::Resistor(_) => "resistor",
            Component::Capacitor(_) => "capacitor",
            Component::Inductor(_) => "inductor",
            Component::VoltageSource(_) => "voltage_source_dc",
            Component::CurrentSource(_) => "current_source_dc",
            Component::Ground(_) => "ground",
        }
    }

    /// Node ids this component attaches to.
    pub fn node_ids(&self) -> &[String] {
        match self {
            Component::Resistor(r) => &r.nodes,
            Component::Capacitor(c) => &c.nodes,
            Component::Inductor(l) => &l.nodes,
            Component::VoltageSource(v) => &v.nodes,
            Component::CurrentSource(i) => &i.nodes,
            Component::Ground(g) => std::slice::from_ref(&g.node),
        }
    }

    /// Whether the DC operating-point analysis can stamp this component.
    pub fn is_dc_supported(&self) -> bool {
        matches!(
            self,
            Component::Resistor(_)
                | Component::VoltageSource(_)
                | Component::CurrentSource(_)
                | Component::Ground(_)
        )
    }
}

impl From<Resistor> for Component {
    fn from(r: Resistor) -> Self {
        Component::Resistor(r)
    }
}

impl From<Capacitor> for Component {
    fn from(c: Capacitor) -> Self {
        Component::Capacitor(c)
    }
}

impl From<Inductor> for Component {
    fn from(l: Inductor) -> Self {
        Component::Inductor(l)
    }
}

impl From<VoltageSource> for Component {
    fn from(v: VoltageSource) -> Self {
        Component::VoltageSource(v)
    }
}

impl From<CurrentSource> for Component {
    fn from(i: CurrentSource) -> Self {
        Component::CurrentSource(i)
    }
}

impl From<Ground> for Component {
    fn from(g: Ground) -> Self {
        Component::Ground(g)
    }
}

//! Topology validation.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::components::Component;
use crate::error::{NodalError, Result};

/// Validate a component list for DC analysis.
///
/// Checks, in order:
/// - the list is non-empty with unique component ids
/// - the ground node appears in the topology
/// - every other node has at least two distinct components attached
/// - every component type is supported by the DC path
pub fn validate_topology(components: &[Component], ground: &str) -> Result<()> {
    if components.is_empty() {
        return Err(NodalError::invalid_circuit("circuit has no components"));
    }

    let mut seen = HashSet::with_capacity(components.len());
    for component in components {
        if !seen.insert(component.id()) {
            return Err(NodalError::invalid_circuit(format!(
                "duplicate component id '{}'",
                component.id()
            )));
        }
    }

    // Node -> distinct attached component ids. BTreeMap keeps error reporting deterministic.
    let mut attachments: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for component in components {
        for node in component.node_ids() {
            attachments.entry(node).or_default().insert(component.id());
        }
    }

    if !attachments.contains_key(ground) {
        return Err(NodalError::NoGround {
            node: ground.to_string(),
        });
    }

    for (node, attached) in &attachments {
        if *node != ground && attached.len() < 2 {
            return Err(NodalError::FloatingNode {
                node: node.to_string(),
                attachments: attached.len(),
            });
        }
    }

    if let Some(component) = components.iter().find(|c| !c.is_dc_supported()) {
        return Err(NodalError::UnsupportedAnalysis {
            component: component.id().to_string(),
            component_type: component.type_name().to_string(),
            analysis: "DC",
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Capacitor, Ground, Resistor, VoltageSource};
    use crate::error::ErrorKind;

    fn divider() -> Vec<Component> {
        vec![
            VoltageSource::new("V1", "1", "0", 12.0).unwrap().into(),
            Resistor::new("R1", "1", "2", 1e3).unwrap().into(),
            Resistor::new("R2", "2", "0", 2e3).unwrap().into(),
        ]
    }

    #[test]
    fn test_valid_circuit() {
        assert!(validate_topology(&divider(), "0").is_ok());
    }

    #[test]
    fn test_empty_circuit() {
        let err = validate_topology(&[], "0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCircuit);
    }

    #[test]
    fn test_missing_ground() {
        let err = validate_topology(&divider(), "gnd").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoGround);
        assert_eq!(err.node_id(), Some("gnd"));
    }

    #[test]
    fn test_empty_ground_id_is_missing_ground() {
        let err = validate_topology(&divider(), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoGround);
        assert_eq!(err.node_id(), Some(""));
    }

    #[test]
    fn test_ground_marker_counts_as_topology() {
        let components = vec![Component::from(Ground::new("G1", "0").unwrap())];
        assert!(validate_topology(&components, "0").is_ok());
    }

    #[test]
    fn test_floating_node() {
        let mut components = divider();
        components.push(Resistor::new("R3", "2", "3", 1e3).unwrap().into());
        let err = validate_topology(&components, "0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FloatingNode);
        assert_eq!(err.node_id(), Some("3"));
    }

    #[test]
    fn test_unsupported_component() {
        let mut components = divider();
        components.push(Capacitor::new("C1", "2", "0", 1e-6).unwrap().into());
        let err = validate_topology(&components, "0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAnalysis);
        assert_eq!(err.component_id(), Some("C1"));
    }

    #[test]
    fn test_duplicate_ids() {
        let mut components = divider();
        components.push(Resistor::new("R1", "2", "0", 5.0).unwrap().into());
        let err = validate_topology(&components, "0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCircuit);
    }
}

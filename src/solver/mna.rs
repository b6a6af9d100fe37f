//! MNA matrix assembly.

use std::collections::BTreeMap;

use log::debug;

use crate::circuit::validate_topology;
use crate::components::Component;
use crate::error::Result;
use crate::linalg::{Matrix, Vector};

/// Maps node ids and voltage sources to rows of the MNA system.
///
/// Non-ground nodes take indices `0..num_nodes` in sorted id order, so two
/// assemblies of the same topology produce the same matrix. Voltage-source
/// branch currents follow, in component order. Ground has no index.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeIndexMap {
    ground: String,
    node_index: BTreeMap<String, usize>,
    node_names: Vec<String>,
    voltage_sources: Vec<String>,
    branch_index: BTreeMap<String, usize>,
}

impl NodeIndexMap {
    /// Build the index map for a component list.
    pub fn new(components: &[Component], ground: &str) -> Self {
        let mut node_index = BTreeMap::new();
        for component in components {
            for node in component.node_ids() {
                if node != ground {
                    node_index.entry(node.clone()).or_insert(0);
                }
            }
        }
        // BTreeMap iterates in sorted key order
        let node_names: Vec<String> = node_index.keys().cloned().collect();
        for (i, idx) in node_index.values_mut().enumerate() {
            *idx = i;
        }

        let num_nodes = node_names.len();
        let voltage_sources: Vec<String> = components
            .iter()
            .filter_map(|c| match c {
                Component::VoltageSource(v) => Some(v.id.clone()),
                _ => None,
            })
            .collect();
        let branch_index = voltage_sources
            .iter()
            .enumerate()
            .map(|(k, id)| (id.clone(), num_nodes + k))
            .collect();

        Self {
            ground: ground.to_string(),
            node_index,
            node_names,
            voltage_sources,
            branch_index,
        }
    }

    /// Matrix index for a node. Returns None for ground.
    pub fn node_index(&self, node: &str) -> Option<usize> {
        if node == self.ground {
            None
        } else {
            self.node_index.get(node).copied()
        }
    }

    /// Matrix index for a voltage source's branch current.
    pub fn branch_index(&self, source_id: &str) -> Option<usize> {
        self.branch_index.get(source_id).copied()
    }

    /// Node id at a matrix index (node rows only).
    pub fn node_name(&self, index: usize) -> Option<&str> {
        self.node_names.get(index).map(String::as_str)
    }

    /// The ground node id.
    pub fn ground(&self) -> &str {
        &self.ground
    }

    /// Non-ground node ids, in index order.
    pub fn node_names(&self) -> &[String] {
        &self.node_names
    }

    /// Voltage source ids, in branch order.
    pub fn voltage_sources(&self) -> &[String] {
        &self.voltage_sources
    }

    /// Number of non-ground nodes.
    pub fn num_nodes(&self) -> usize {
        self.node_names.len()
    }

    /// Total system dimension: nodes plus voltage-source branches.
    pub fn size(&self) -> usize {
        self.node_names.len() + self.voltage_sources.len()
    }
}

/// Assembled system `A x = b` together with its index map.
#[derive(Debug, Clone)]
pub struct MnaSystem {
    pub matrix: Matrix,
    pub rhs: Vector,
    pub index: NodeIndexMap,
}

impl MnaSystem {
    /// System dimension.
    pub fn size(&self) -> usize {
        self.index.size()
    }
}

/// Mutable accumulation buffer used while stamping.
#[derive(Debug)]
struct MnaBuilder {
    a: Vec<f64>,
    z: Vec<f64>,
    size: usize,
}

impl MnaBuilder {
    fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            size,
        }
    }

    fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Stamp a voltage source between two nodes with branch current at index br.
    /// V[n+] - V[n-] = E
    fn stamp_voltage_source(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, br: usize, voltage: f64) {
        if let Some(i) = n_pos {
            self.add(br, i, 1.0);
            self.add(i, br, 1.0);
        }
        if let Some(j) = n_neg {
            self.add(br, j, -1.0);
            self.add(j, br, -1.0);
        }
        self.z[br] = voltage;
    }

    /// Stamp a current source drawing `current` out of n+ and into n-.
    fn stamp_current_source(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, current: f64) {
        if let Some(i) = n_pos {
            self.add_source(i, -current);
        }
        if let Some(j) = n_neg {
            self.add_source(j, current);
        }
    }

    fn finish(self) -> (Matrix, Vector) {
        (
            Matrix::from_raw(self.size, self.size, self.a),
            Vector::from_vec(self.z),
        )
    }
}

/// Validate the topology and assemble the MNA system.
///
/// Solving the result yields node voltages (in [`NodeIndexMap`] order)
/// followed by one branch current per voltage source.
pub fn assemble(components: &[Component], ground: &str) -> Result<MnaSystem> {
    validate_topology(components, ground)?;

    let index = NodeIndexMap::new(components, ground);
    let mut builder = MnaBuilder::new(index.size());

    for component in components {
        match component {
            Component::Resistor(r) => {
                let n1 = index.node_index(&r.nodes[0]);
                let n2 = index.node_index(&r.nodes[1]);
                builder.stamp_conductance(n1, n2, r.conductance());
            }

            Component::VoltageSource(v) => {
                let n1 = index.node_index(&v.nodes[0]);
                let n2 = index.node_index(&v.nodes[1]);
                // Every voltage source received a branch in NodeIndexMap::new
                if let Some(br) = index.branch_index(&v.id) {
                    builder.stamp_voltage_source(n1, n2, br, v.voltage);
                }
            }

            Component::CurrentSource(i) => {
                let n1 = index.node_index(&i.nodes[0]);
                let n2 = index.node_index(&i.nodes[1]);
                builder.stamp_current_source(n1, n2, i.current);
            }

            // Reference marker only; rejected types never get past validation
            Component::Ground(_) | Component::Capacitor(_) | Component::Inductor(_) => {}
        }
    }

    debug!(
        "assembled {}x{} MNA system ({} nodes, {} voltage sources)",
        index.size(),
        index.size(),
        index.num_nodes(),
        index.voltage_sources().len()
    );

    let (matrix, rhs) = builder.finish();
    Ok(MnaSystem { matrix, rhs, index })
}

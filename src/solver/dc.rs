//! DC operating-point analysis.

use std::collections::BTreeMap;

use log::{debug, info};

use super::mna::{assemble, MnaSystem};
use super::options::SolverOptions;
use crate::circuit::Circuit;
use crate::components::Component;
use crate::error::{ErrorKind, NodalError, Result};
use crate::linalg::{solve_linear_system, Vector};

/// Kind of analysis that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AnalysisType {
    Dc,
}

/// Node voltages, branch currents and dissipated powers at the operating point.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OperatingPoint {
    /// Node id -> voltage (V). Ground is exactly 0.
    pub node_voltages: BTreeMap<String, f64>,
    /// Component id -> current (A)
    pub branch_currents: BTreeMap<String, f64>,
    /// Component id -> power (W). Sources delivering energy are negative.
    pub component_powers: BTreeMap<String, f64>,
}

/// Convergence summary attached to every analysis result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConvergenceInfo {
    pub converged: bool,
    pub iterations: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub final_error: f64,
}

impl ConvergenceInfo {
    /// The linear DC path is a single exact solve.
    fn direct_solve() -> Self {
        Self {
            converged: true,
            iterations: 1,
            max_iterations: 1,
            tolerance: 0.0,
            final_error: 0.0,
        }
    }
}

/// Result of [`analyze_dc`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DcAnalysis {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub analysis_type: AnalysisType,
    pub operating_point: OperatingPoint,
    pub convergence_info: ConvergenceInfo,
}

/// Compute the DC operating point of a linear circuit.
///
/// Validates the options and the topology, assembles the MNA system and
/// solves it once. A singular system is reported with hints about the
/// circuit configurations that usually cause it.
pub fn analyze_dc(circuit: &Circuit, options: &SolverOptions) -> Result<DcAnalysis> {
    options.validate()?;
    let system = assemble(&circuit.components, &circuit.ground_node_id)?;

    let solution = if system.size() == 0 {
        debug!("no unknowns; skipping factorization");
        Vector::zeros(0)
    } else {
        solve_linear_system(&system.matrix, &system.rhs, options).map_err(|e| {
            if e.kind() == ErrorKind::SingularMatrix {
                singular_circuit_error(&e)
            } else {
                e
            }
        })?
    };

    let operating_point = extract_operating_point(&circuit.components, &system, &solution);
    info!(
        "DC analysis complete: {} nodes, {} components",
        operating_point.node_voltages.len(),
        circuit.components.len()
    );

    Ok(DcAnalysis {
        analysis_type: AnalysisType::Dc,
        operating_point,
        convergence_info: ConvergenceInfo::direct_solve(),
    })
}

fn singular_circuit_error(cause: &NodalError) -> NodalError {
    NodalError::singular(format!(
        "circuit has no unique DC solution ({}). Check for voltage sources in \
         parallel, loops made only of voltage sources, or subcircuits with no \
         path to ground",
        cause
    ))
}

fn extract_operating_point(
    components: &[Component],
    system: &MnaSystem,
    solution: &Vector,
) -> OperatingPoint {
    let index = &system.index;
    let voltage = |node: &str| index.node_index(node).map_or(0.0, |i| solution.get(i));

    let mut op = OperatingPoint::default();
    op.node_voltages.insert(index.ground().to_string(), 0.0);
    for (i, name) in index.node_names().iter().enumerate() {
        op.node_voltages.insert(name.clone(), solution.get(i));
    }

    for component in components {
        let (current, power) = match component {
            Component::Resistor(r) => {
                let v = voltage(&r.nodes[0]) - voltage(&r.nodes[1]);
                let i = v / r.resistance;
                (i, v * i)
            }
            Component::VoltageSource(s) => {
                // Branch unknown is current into the + terminal; report current delivered
                let i = index.branch_index(&s.id).map_or(0.0, |k| -solution.get(k));
                (i, -s.voltage * i)
            }
            Component::CurrentSource(s) => {
                let v = voltage(&s.nodes[0]) - voltage(&s.nodes[1]);
                (s.current, v * s.current)
            }
            Component::Ground(_) | Component::Capacitor(_) | Component::Inductor(_) => continue,
        };
        op.branch_currents.insert(component.id().to_string(), current);
        op.component_powers.insert(component.id().to_string(), power);
    }

    op
}

//! Independent DC voltage and current sources.

use super::check_two_terminal;
use crate::error::{NodalError, Result};

fn check_finite(id: &str, what: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(NodalError::invalid_component(
            id,
            format!("{} must be finite, got {}", what, value),
        ));
    }
    Ok(())
}

/// An ideal DC voltage source.
///
/// Voltage sources require an extra row/column in the MNA matrix for the
/// branch current. The source enforces: V(nodes[0]) - V(nodes[1]) = voltage
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    pub id: String,
    pub nodes: [String; 2], // [positive, negative]
    /// Source voltage in volts
    pub voltage: f64,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(
        id: impl Into<String>,
        n_pos: impl Into<String>,
        n_neg: impl Into<String>,
        voltage: f64,
    ) -> Result<Self> {
        let id = id.into();
        let nodes = [n_pos.into(), n_neg.into()];
        check_two_terminal(&id, &nodes)?;
        check_finite(&id, "voltage", voltage)?;
        Ok(Self { id, nodes, voltage })
    }
}

/// An ideal DC current source.
///
/// Current sources add directly to the RHS vector of the MNA equations:
/// `current` is drawn out of `nodes[0]` and pushed into `nodes[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSource {
    pub id: String,
    pub nodes: [String; 2],
    /// Source current in amperes
    pub current: f64,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(
        id: impl Into<String>,
        n_pos: impl Into<String>,
        n_neg: impl Into<String>,
        current: f64,
    ) -> Result<Self> {
        let id = id.into();
        let nodes = [n_pos.into(), n_neg.into()];
        check_two_terminal(&id, &nodes)?;
        check_finite(&id, "current", current)?;
        Ok(Self { id, nodes, current })
    }
}

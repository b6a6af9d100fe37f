//! Linear passive components: Resistor, Capacitor, Inductor.

use super::check_two_terminal;
use crate::error::{NodalError, Result};

fn check_positive(id: &str, what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(NodalError::invalid_component(
            id,
            format!("{} must be finite and positive, got {}", what, value),
        ));
    }
    Ok(())
}

/// A resistor between `nodes[0]` and `nodes[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub id: String,
    pub nodes: [String; 2],
    /// Resistance in ohms
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(
        id: impl Into<String>,
        n_pos: impl Into<String>,
        n_neg: impl Into<String>,
        resistance: f64,
    ) -> Result<Self> {
        let id = id.into();
        let nodes = [n_pos.into(), n_neg.into()];
        check_two_terminal(&id, &nodes)?;
        check_positive(&id, "resistance", resistance)?;
        Ok(Self {
            id,
            nodes,
            resistance,
        })
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

/// A capacitor. Open at DC; the DC analysis rejects it rather than
/// silently dropping it from the topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    pub id: String,
    pub nodes: [String; 2],
    /// Capacitance in farads
    pub capacitance: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(
        id: impl Into<String>,
        n_pos: impl Into<String>,
        n_neg: impl Into<String>,
        capacitance: f64,
    ) -> Result<Self> {
        let id = id.into();
        let nodes = [n_pos.into(), n_neg.into()];
        check_two_terminal(&id, &nodes)?;
        check_positive(&id, "capacitance", capacitance)?;
        Ok(Self {
            id,
            nodes,
            capacitance,
        })
    }
}

/// An inductor. Not supported by the DC analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Inductor {
    pub id: String,
    pub nodes: [String; 2],
    /// Inductance in henries
    pub inductance: f64,
}

impl Inductor {
    /// Create a new inductor.
    pub fn new(
        id: impl Into<String>,
        n_pos: impl Into<String>,
        n_neg: impl Into<String>,
        inductance: f64,
    ) -> Result<Self> {
        let id = id.into();
        let nodes = [n_pos.into(), n_neg.into()];
        check_two_terminal(&id, &nodes)?;
        check_positive(&id, "inductance", inductance)?;
        Ok(Self {
            id,
            nodes,
            inductance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_resistor_conductance() {
        let r = Resistor::new("R1", "1", "0", 1000.0).unwrap();
        assert!((r.conductance() - 0.001).abs() < 1e-15);
    }

    #[test]
    fn test_resistor_range_checks() {
        for bad in [0.0, -10.0, f64::INFINITY, f64::NAN] {
            let err = Resistor::new("R1", "1", "0", bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
            assert_eq!(err.component_id(), Some("R1"));
        }
    }

    #[test]
    fn test_reactive_value_checks() {
        assert!(Capacitor::new("C1", "a", "b", 100e-9).is_ok());
        assert!(Capacitor::new("C1", "a", "b", 0.0).is_err());
        assert!(Inductor::new("L1", "a", "b", -1e-3).is_err());
    }
}

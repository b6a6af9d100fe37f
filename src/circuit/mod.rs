//! Circuit representation and topology validation.
//!
//! The [`Circuit`] struct holds the component list and the declared ground
//! node in a form ready for the solver.

mod graph;
mod validate;

pub use graph::Circuit;
pub use validate::validate_topology;

//! Error types for the Nodal DC solver.
//!
//! This module provides a unified error type [`NodalError`] that covers
//! netlist parsing, circuit validation, and the numerical core. Every
//! variant belongs to exactly one [`ErrorKind`], so callers can branch on
//! the kind without matching every variant.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`NodalError`].
pub type Result<T> = std::result::Result<T, NodalError>;

/// Coarse error classification shared by every [`NodalError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or empty circuit
    InvalidCircuit,
    /// Declared ground node absent from the topology
    NoGround,
    /// Node attached to fewer than two components
    FloatingNode,
    /// Component type not handled by the requested analysis
    UnsupportedAnalysis,
    /// Malformed numeric input or configuration
    InvalidParameter,
    /// Singular or near-singular linear system
    SingularMatrix,
    /// Newton-Raphson iteration failed
    ConvergenceFailed,
    /// Netlist text could not be tokenized or parsed
    Parse,
    /// File system failure
    Io,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCircuit => "INVALID_CIRCUIT",
            ErrorKind::NoGround => "NO_GROUND",
            ErrorKind::FloatingNode => "FLOATING_NODE",
            ErrorKind::UnsupportedAnalysis => "UNSUPPORTED_ANALYSIS",
            ErrorKind::InvalidParameter => "INVALID_PARAMETER",
            ErrorKind::SingularMatrix => "SINGULAR_MATRIX",
            ErrorKind::ConvergenceFailed => "CONVERGENCE_FAILED",
            ErrorKind::Parse => "PARSE_ERROR",
            ErrorKind::Io => "IO_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Why a Newton-Raphson run stopped without converging.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvergenceFailure {
    /// The Jacobian could not be factorized at the given iteration (1-based).
    SingularJacobian { iteration: usize },
    /// The residual became NaN or infinite after the step at the given iteration.
    NonFiniteResidual { iteration: usize },
    /// The iteration budget ran out.
    MaxIterationsExceeded {
        iterations: usize,
        residual_norm: f64,
        update_norm: f64,
    },
}

impl fmt::Display for ConvergenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceFailure::SingularJacobian { iteration } => {
                write!(f, "singular Jacobian at iteration {}", iteration)
            }
            ConvergenceFailure::NonFiniteResidual { iteration } => {
                write!(f, "non-finite residual at iteration {}", iteration)
            }
            ConvergenceFailure::MaxIterationsExceeded {
                iterations,
                residual_norm,
                update_norm,
            } => write!(
                f,
                "no convergence after {} iterations (residual: {:.2e}, update: {:.2e})",
                iterations, residual_norm, update_norm
            ),
        }
    }
}

/// Unified error type for all Nodal operations.
#[derive(Error, Debug)]
pub enum NodalError {
    // ============ Netlist Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Unknown component prefix in a netlist
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    // ============ Circuit Validation Errors ============
    /// Null or empty circuit
    #[error("Invalid circuit: {message}")]
    InvalidCircuit { message: String },

    /// Ground node not present in the topology
    #[error("Ground node '{node}' is not connected to any component")]
    NoGround { node: String },

    /// Node with fewer than two component attachments
    #[error("Floating node '{node}' has {attachments} connection(s); at least 2 are required")]
    FloatingNode { node: String, attachments: usize },

    /// Component type not supported by the analysis
    #[error("Component '{component}' of type '{component_type}' is not supported by {analysis} analysis")]
    UnsupportedAnalysis {
        component: String,
        component_type: String,
        analysis: &'static str,
    },

    /// Invalid numeric input or configuration
    #[error("Invalid parameter{}: {message}", component_suffix(.component))]
    InvalidParameter {
        component: Option<String>,
        message: String,
    },

    // ============ Numerical Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix: {message}")]
    SingularMatrix { message: String },

    /// Newton-Raphson iteration did not converge
    #[error("Newton-Raphson failed: {reason}")]
    ConvergenceFailed { reason: ConvergenceFailure },

    // ============ I/O Errors ============
    /// Error reading a netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn component_suffix(component: &Option<String>) -> String {
    match component {
        Some(id) => format!(" for component '{}'", id),
        None => String::new(),
    }
}

impl NodalError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid circuit error
    pub fn invalid_circuit(message: impl Into<String>) -> Self {
        Self::InvalidCircuit {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error with no component context
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            component: None,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error naming the offending component
    pub fn invalid_component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            component: Some(component.into()),
            message: message.into(),
        }
    }

    /// Create a singular matrix error
    pub fn singular(message: impl Into<String>) -> Self {
        Self::SingularMatrix {
            message: message.into(),
        }
    }

    /// Create a convergence failure error
    pub fn convergence_failure(reason: ConvergenceFailure) -> Self {
        Self::ConvergenceFailed { reason }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NodalError::LexerError { .. }
            | NodalError::ParseError { .. }
            | NodalError::UnknownComponentType { .. } => ErrorKind::Parse,
            NodalError::InvalidCircuit { .. } => ErrorKind::InvalidCircuit,
            NodalError::NoGround { .. } => ErrorKind::NoGround,
            NodalError::FloatingNode { .. } => ErrorKind::FloatingNode,
            NodalError::UnsupportedAnalysis { .. } => ErrorKind::UnsupportedAnalysis,
            NodalError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            NodalError::SingularMatrix { .. } => ErrorKind::SingularMatrix,
            NodalError::ConvergenceFailed { .. } => ErrorKind::ConvergenceFailed,
            NodalError::FileReadError { .. } => ErrorKind::Io,
        }
    }

    /// The component this error is about, if any.
    pub fn component_id(&self) -> Option<&str> {
        match self {
            NodalError::UnsupportedAnalysis { component, .. } => Some(component),
            NodalError::InvalidParameter { component, .. } => component.as_deref(),
            _ => None,
        }
    }

    /// The node this error is about, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            NodalError::NoGround { node } | NodalError::FloatingNode { node, .. } => Some(node),
            _ => None,
        }
    }
}

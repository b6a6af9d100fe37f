//! DSL (Domain Specific Language) parser for netlists.
//!
//! This module provides a SPICE-inspired text format for describing DC
//! circuits. The DSL is line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';' | '*') { any_char }
//! directive   = ".ground" node | ".end"
//! component   = type name node node [ "DC" ] value
//!             | "GND" name node
//!
//! type        = "R" | "C" | "L" | "V" | "I"
//! node        = identifier | number
//! value       = number [unit_suffix]
//!
//! number      = ['-'|'+'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! ```
//!
//! The ground node defaults to `0` unless a `.ground` directive names another.
//!
//! # Example
//!
//! ```text
//! # Voltage divider
//! V1  in   0    DC 12
//! R1  in   out  1k
//! R2  out  0    2k
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::circuit::Circuit;
use crate::error::Result;

/// Ground node used when a netlist has no `.ground` directive.
pub const DEFAULT_GROUND: &str = "0";

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<CircuitAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist string straight into a [`Circuit`].
pub fn parse_circuit(input: &str) -> Result<Circuit> {
    Circuit::from_ast(parse(input)?)
}

/// Parse a netlist file.
pub fn parse_file(path: &std::path::Path) -> Result<Circuit> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::NodalError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_circuit(&content)
}

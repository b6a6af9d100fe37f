//! Parser for the netlist DSL.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{NodalError, Result};

/// Parser for netlist DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<CircuitAst> {
        let mut ast = CircuitAst::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {}
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    if ast.components.iter().any(|c| c.name == component.name) {
                        return Err(NodalError::parse(
                            component.line,
                            format!("duplicate component name '{}'", component.name),
                        ));
                    }
                    ast.components.push(component);
                }
                _ => {
                    return Err(NodalError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(NodalError::parse(
                        self.current.line,
                        format!("unexpected trailing token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Consume a node name. Bare numbers such as `0` or `12` are valid names.
    fn expect_node(&mut self) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            _ => Err(NodalError::parse(
                self.current.line,
                format!("expected node name, got {:?}", self.current.text),
            )),
        }
    }

    fn parse_directive(&mut self, ast: &mut CircuitAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".ground" | ".gnd" => {
                let node = self.expect_node()?;
                if let Some(existing) = &ast.ground_node {
                    if *existing != node {
                        return Err(NodalError::parse(
                            line,
                            format!("ground already declared as '{}'", existing),
                        ));
                    }
                }
                ast.ground_node = Some(node);
            }
            ".end" => {
                // Everything after .end is ignored
                while self.current.kind != TokenKind::Eof {
                    self.advance()?;
                }
            }
            _ => {
                return Err(NodalError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let first_token = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        // Keywords first, so "GND" is not mistaken for a prefix
        let (component_type, name) = if let Some(ct) = ComponentType::from_keyword(&first_token) {
            let name = match self.current.kind {
                TokenKind::Identifier | TokenKind::Number => self.current.text.clone(),
                _ => {
                    return Err(NodalError::parse(
                        line,
                        format!("{} requires a name", ct.description()),
                    ))
                }
            };
            self.advance()?;
            (ct, name)
        } else {
            let first_char = first_token.chars().next().unwrap_or('?');
            let ct = ComponentType::from_prefix(first_char).ok_or_else(|| {
                NodalError::UnknownComponentType {
                    component_type: first_token.clone(),
                    line,
                }
            })?;
            (ct, first_token)
        };

        let expected_nodes = component_type.expected_node_count();
        let mut nodes = Vec::with_capacity(expected_nodes);
        while nodes.len() < expected_nodes && !self.at_line_end() {
            nodes.push(self.expect_node()?);
        }

        let mut value = None;
        if component_type.takes_value() && !self.at_line_end() {
            // Optional DC keyword before a source value
            if self.current.kind == TokenKind::Identifier
                && self.current.text.eq_ignore_ascii_case("dc")
                && matches!(
                    component_type,
                    ComponentType::VoltageSource | ComponentType::CurrentSource
                )
            {
                self.advance()?;
            }
            let text = self.current.text.clone();
            value = Some(parse_value(&text).ok_or_else(|| {
                NodalError::parse(line, format!("invalid value '{}' for '{}'", text, name))
            })?);
            self.advance()?;
        }

        Ok(ComponentDef {
            component_type,
            name,
            nodes,
            value,
            line,
        })
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }
}

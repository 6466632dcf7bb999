//! Parser for the netlist format.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{BreadboardError, Result};

/// Parser for netlist input.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser, reading the first token eagerly.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<CircuitAst> {
        let mut ast = CircuitAst::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    ast.components.push(component);
                }
                _ => {
                    return Err(BreadboardError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            // Anything left on the line is an error
            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(BreadboardError::parse(
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

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(BreadboardError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn parse_directive(&mut self, ast: &mut CircuitAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".connect" => {
                let mut terminals = Vec::new();
                while !self.at_line_end() {
                    terminals.push(self.parse_terminal()?);
                }
                if terminals.len() < 2 {
                    return Err(BreadboardError::parse(
                        line,
                        ".connect needs at least two terminals",
                    ));
                }
                ast.connections.push(ConnectionDef { terminals, line });
            }
            ".ground" => {
                if ast.ground.is_some() {
                    return Err(BreadboardError::parse(line, "ground declared twice"));
                }
                ast.ground = Some(self.parse_terminal()?);
            }
            _ => {
                return Err(BreadboardError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_terminal(&mut self) -> Result<TerminalRef> {
        let component = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Colon)?;
        let side = self.expect(TokenKind::Identifier)?;
        Ok(TerminalRef {
            component: component.text,
            side: side.text,
            line: component.line,
        })
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let name = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let component_type = ComponentType::from_name(&name).ok_or_else(|| {
            BreadboardError::UnknownComponentType {
                name: name.clone(),
                line,
            }
        })?;

        let mut value = None;
        let mut flags = Vec::new();
        let mut params = HashMap::new();

        while !self.at_line_end() {
            match self.current.kind {
                TokenKind::Identifier => {
                    let text = self.current.text.clone();
                    self.advance()?;

                    // param=value syntax
                    if self.current.kind == TokenKind::Equals {
                        self.advance()?;
                        let val_text = self.expect(TokenKind::Number)?.text;
                        let v = parse_value(&val_text).ok_or_else(|| {
                            BreadboardError::parse(line, format!("invalid number: {}", val_text))
                        })?;
                        params.insert(text.to_lowercase(), v);
                    } else {
                        flags.push(text.to_lowercase());
                    }
                }
                TokenKind::Number => {
                    let text = self.current.text.clone();
                    self.advance()?;
                    let v = parse_value(&text).ok_or_else(|| {
                        BreadboardError::parse(line, format!("invalid number: {}", text))
                    })?;
                    if value.replace(v).is_some() {
                        return Err(BreadboardError::invalid_component(
                            &name,
                            line,
                            "more than one value given",
                        ));
                    }
                }
                _ => {
                    return Err(BreadboardError::parse(
                        line,
                        format!("unexpected token in component: {:?}", self.current.text),
                    ));
                }
            }
        }

        if component_type.requires_value() && value.is_none() {
            return Err(BreadboardError::invalid_component(
                &name,
                line,
                format!("{} requires a value", component_type.label()),
            ));
        }

        Ok(ComponentDef {
            component_type,
            name,
            value,
            flags,
            params,
            line,
        })
    }
}

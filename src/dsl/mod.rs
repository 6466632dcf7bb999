//! Netlist parser for breadboard circuit descriptions.
//!
//! A small line-oriented text format for describing the parts placed on the
//! board and the wires joining their terminals. It exists so circuits can be
//! stored in files, fed to the CLI and handed across the WASM boundary.
//!
//! # Grammar Overview
//!
//! ```text
//! circuit    = { line }
//! line       = comment | directive | component | empty
//! comment    = ('#' | ';') { any_char }
//! component  = name [value] { flag | param '=' value }
//! directive  = '.connect' terminal terminal { terminal }
//!            | '.ground' terminal
//! terminal   = name ':' side
//!
//! value      = number [unit_suffix] [unit]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! unit       = 'V' | 'ohm' | 'ohms' | 'Ω'    (case-insensitive, ignored)
//! ```
//!
//! # Component Types
//!
//! | Prefix | Description | Syntax |
//! |--------|-------------|--------|
//! | R | Resistor | `R<name> <ohms>` |
//! | V, B | Battery | `V<name> <volts>` (terminal `a` is positive) |
//! | LED | LED | `LED<name> [color] [vf=] [rf=] [rleak=] [imax=]` (terminal `a` is the anode) |
//! | SW | Switch | `SW<name> [open\|closed]` |
//! | W | Wire | `W<name>` |
//!
//! Terminal sides are `a`/`b`, with the aliases `left`/`right`,
//! `pos`/`neg` and `anode`/`cathode`.
//!
//! # Example
//!
//! ```text
//! # Battery, resistor and a red LED
//! V1   9
//! R1   330
//! LED1 red
//!
//! .connect V1:pos R1:a
//! .connect R1:b LED1:anode
//! .connect LED1:cathode V1:neg
//! .ground V1:neg
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<CircuitAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<CircuitAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::BreadboardError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

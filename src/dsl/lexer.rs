//! Lexer (tokenizer) for the netlist format.

use crate::error::{BreadboardError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the netlist format.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier (component name, terminal side, flag)
    Identifier,
    /// A number (integer or floating point, possibly with suffix)
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Terminal separator ':'
    Colon,
    /// Equals sign '='
    Equals,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let ch = match self.chars.peek() {
            Some(&(_, ch)) => ch,
            None => return Ok(self.token(TokenKind::Eof, String::new(), self.line, self.column)),
        };

        let start_column = self.column;
        let start_line = self.line;

        let token = match ch {
            '\n' => {
                self.advance();
                self.token(TokenKind::Newline, "\n".to_string(), start_line, start_column)
            }
            '.' => {
                self.advance();
                let text = self.read_identifier();
                if text.is_empty() {
                    return Err(BreadboardError::lexer(
                        start_line,
                        start_column,
                        "expected directive name after '.'",
                    ));
                }
                self.token(TokenKind::Directive, format!(".{}", text), start_line, start_column)
            }
            ':' => {
                self.advance();
                self.token(TokenKind::Colon, ":".to_string(), start_line, start_column)
            }
            '=' => {
                self.advance();
                self.token(TokenKind::Equals, "=".to_string(), start_line, start_column)
            }
            '-' | '+' | '0'..='9' => {
                let text = self.read_number();
                self.token(TokenKind::Number, text, start_line, start_column)
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                self.token(TokenKind::Identifier, text, start_line, start_column)
            }
            _ => {
                return Err(BreadboardError::lexer(
                    start_line,
                    start_column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    fn token(&self, kind: TokenKind, text: String, line: usize, column: usize) -> Token {
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                // Skip comment until end of line
                while let Some(&(_, c)) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();

        // Optional sign
        if let Some(&(_, ch)) = self.chars.peek() {
            if ch == '-' || ch == '+' {
                text.push(ch);
                self.advance();
            }
        }

        // Integer part
        self.read_digits(&mut text);

        // Decimal part
        if let Some(&(_, '.')) = self.chars.peek() {
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        // Exponent part
        if let Some(&(_, ch)) = self.chars.peek() {
            if ch == 'e' || ch == 'E' {
                text.push(ch);
                self.advance();
                if let Some(&(_, sign)) = self.chars.peek() {
                    if sign == '-' || sign == '+' {
                        text.push(sign);
                        self.advance();
                    }
                }
                self.read_digits(&mut text);
            }
        }

        // Unit suffix (p, n, u, m, k, M, G)
        if let Some(&(_, ch)) = self.chars.peek() {
            if matches!(ch, 'p' | 'n' | 'u' | 'µ' | 'm' | 'k' | 'K' | 'M' | 'G') {
                text.push(ch);
                self.advance();
            }
        }

        self.skip_unit();
        text
    }

    /// Drop a unit word written straight after a number (`9V`, `1kohm`,
    /// `470Ω`). Any other trailing word is left for the next token.
    fn skip_unit(&mut self) {
        let mut ahead = self.chars.clone();
        let mut word = String::new();
        while let Some(&(_, ch)) = ahead.peek() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            word.push(ch);
            ahead.next();
        }

        if is_unit(&word) {
            for _ in word.chars() {
                self.advance();
            }
        }
    }
}

fn is_unit(word: &str) -> bool {
    matches!(word.to_lowercase().as_str(), "v" | "ohm" | "ohms" | "ω")
}

/// Parse a number string with optional unit suffix.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let last = text.chars().last()?;

    let multiplier = match last {
        'p' => 1e-12,
        'n' => 1e-9,
        'u' | 'µ' => 1e-6,
        'm' => 1e-3,
        'k' | 'K' => 1e3,
        'M' => 1e6,
        'G' => 1e9,
        _ => 1.0,
    };
    let num_str = if multiplier != 1.0 {
        &text[..text.len() - last.len_utf8()]
    } else {
        text
    };

    num_str
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * multiplier)
}

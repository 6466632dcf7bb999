//! Error types for the Breadboard circuit solver.
//!
//! This module provides a unified error type [`BreadboardError`] that covers
//! netlist parsing, circuit construction and the internal solve pipeline.
//! The public [`solve`](crate::solver::solve) entry point never returns these
//! directly: it folds solve-time errors into a
//! [`FailureReason`](crate::solver::FailureReason) on the result.

use thiserror::Error;

/// Result type alias using [`BreadboardError`].
pub type Result<T> = std::result::Result<T, BreadboardError>;

/// Unified error type for all Breadboard operations.
#[derive(Error, Debug)]
pub enum BreadboardError {
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

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type for '{name}' at line {line}")]
    UnknownComponentType { name: String, line: usize },

    // ============ Circuit Construction Errors ============
    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    /// Terminal side label not recognised
    #[error("Unknown terminal '{terminal}' (expected <component>:<a|b>)")]
    UnknownTerminal { terminal: String },

    /// Component not found in circuit
    #[error("Component '{name}' not found in circuit")]
    ComponentNotFound { name: String },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    // ============ Solve Errors ============
    /// Nothing is wired together
    #[error("No complete network - the circuit has no connected components")]
    NoCompleteNetwork,

    /// Requested reference node does not exist
    #[error("Invalid reference node: {message}")]
    InvalidReference { message: String },

    /// Matrix is singular and cannot be solved
    #[error("Singular matrix at column {column} (largest pivot {pivot:.2e}) - check for shorted or looped batteries")]
    SingularMatrix { column: usize, pivot: f64 },

    // ============ I/O Errors ============
    /// Error reading circuit file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing the solve report
    #[error("Report output error: {message}")]
    ReportError { message: String },
}

impl BreadboardError {
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

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a component-not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ComponentNotFound { name: name.into() }
    }
}

//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Geometry diagnostics and reporting
//! - Error types and result types

pub mod diagnostics;
pub mod error;

// Re-export commonly used items
pub use diagnostics::{
    check_document, check_notation, check_table, format_diagnostics, CheckResult, Diagnostic,
    DiagnosticLevel,
};
pub use error::{EditError, MatrixError, NotationError, TableError, TableResult};

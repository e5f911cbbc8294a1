//! Error types for coefficient operations.
//!
//! Every variant is fatal for the operation that produced it: combine
//! operations leave the receiver untouched and decode never returns a
//! partially-built store.

use thiserror::Error;

/// Errors that can occur while combining, configuring or decoding coefficients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoefficientError {
    /// Two stores taking part in an elementwise operation have different shapes.
    #[error("dimension mismatch in {group}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The coefficient group whose dimension differs.
        group: &'static str,
        /// Dimension of the receiver.
        expected: usize,
        /// Dimension of the other operand.
        actual: usize,
    },

    /// The first line of an encoding is not `W:R,C,A:k0,k1,k2`.
    #[error("malformed header: {reason}")]
    MalformedHeader {
        /// What is wrong with the header line.
        reason: String,
    },

    /// A numeric or boolean token could not be parsed.
    #[error("line {line}: invalid token {token:?}")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A body line has the wrong number of comma-separated fields.
    #[error("line {line}: expected {expected} fields, got {actual}")]
    FieldCount {
        /// 1-based line number.
        line: usize,
        /// Number of fields the line should have.
        expected: usize,
        /// Number of fields found.
        actual: usize,
    },

    /// A weight or factor index is not below its declared bound.
    #[error("line {line}: index {index} out of range (bound: {bound})")]
    IndexOutOfRange {
        /// 1-based line number.
        line: usize,
        /// The index read from the line.
        index: usize,
        /// The exclusive upper bound declared in the header.
        bound: usize,
    },

    /// A weight index appears on more than one line.
    #[error("line {line}: weight index {index} appears more than once")]
    DuplicateWeightIndex {
        /// 1-based line number of the repeated index.
        line: usize,
        /// The repeated index.
        index: usize,
    },

    /// A factor coordinate appears on more than one line.
    #[error("line {line}: factor entry ({row}, {col}) appears more than once")]
    DuplicateFactorEntry {
        /// 1-based line number of the repeated entry.
        line: usize,
        /// Row of the repeated entry.
        row: usize,
        /// Column of the repeated entry.
        col: usize,
    },

    /// A factor line carries a zero value; only non-zero entries are listed.
    #[error("line {line}: factor entry ({row}, {col}) is zero")]
    ZeroFactorEntry {
        /// 1-based line number.
        line: usize,
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
    },

    /// The encoding ends before every declared line was read.
    #[error("unexpected end of input: expected {expected_lines} lines, got {actual_lines}")]
    UnexpectedEnd {
        /// Number of lines the header declares.
        expected_lines: usize,
        /// Number of lines present.
        actual_lines: usize,
    },

    /// The encoding continues past the last declared line.
    #[error("unexpected trailing data at line {line}")]
    TrailingData {
        /// 1-based line number of the first extra line.
        line: usize,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoefficientError {
    /// Returns `true` for errors raised while decoding an encoded store.
    pub fn is_decode_error(&self) -> bool {
        !matches!(
            self,
            CoefficientError::DimensionMismatch { .. } | CoefficientError::InvalidConfig { .. }
        )
    }
}

/// A specialized Result type for coefficient operations.
pub type Result<T> = std::result::Result<T, CoefficientError>;

//! Error types for the Boolean network core.
//!
//! Compile errors are fatal and surface before any simulation starts.
//! Evaluation errors are scoped to a single trajectory: the runner records
//! them as that task's failure and keeps going with the others.

use thiserror::Error;

use crate::registry::NodeId;

/// What went wrong while parsing a rule line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Non-blank, non-comment line without `=`
    #[error("expected `name = expression`")]
    MissingAssignment,

    /// Left-hand side is empty, not an identifier, or a reserved word
    #[error("invalid rule target `{0}`")]
    InvalidTarget(String),

    /// Nothing where an operand was required
    #[error("empty clause at column {column}")]
    EmptyClause {
        /// 1-based column of the position where an operand was expected
        column: usize,
    },

    /// An operator or `)` appeared where an operand was required
    #[error("expected operand at column {column}, found `{found}`")]
    ExpectedOperand {
        /// 1-based column of the offending token
        column: usize,
        /// Text of the offending token
        found: String,
    },

    /// `(` without a matching `)`
    #[error("unclosed `(` opened at column {column}")]
    UnclosedParen {
        /// 1-based column of the unmatched `(`
        column: usize,
    },

    /// `)` without a matching `(`
    #[error("unexpected `)` at column {column}")]
    UnexpectedParen {
        /// 1-based column of the unmatched `)`
        column: usize,
    },

    /// `NOT`s, parentheses or operator chains nested past the depth limit
    #[error("expression nested too deeply at column {column}")]
    NestingTooDeep {
        /// 1-based column of the operator or `(` that crossed the limit
        column: usize,
    },

    /// Character that is neither part of an identifier, whitespace, nor a
    /// parenthesis
    #[error("unexpected character {ch:?} at column {column}")]
    UnexpectedCharacter {
        /// The offending character
        ch: char,
        /// 1-based column of the character
        column: usize,
    },
}

/// Errors raised while compiling rule text into a [`Network`].
///
/// Both variants abort the run before any trajectory is traced.
///
/// [`Network`]: crate::Network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Malformed rule or expression text
    #[error("rule syntax error on line {line}: {kind}")]
    Syntax {
        /// 1-based line number in the rule text
        line: usize,
        /// Specific failure
        kind: SyntaxErrorKind,
    },

    /// A token sits in operator position but is not `AND` or `OR`
    #[error("undefined operator `{token}` on line {line}")]
    UndefinedOperator {
        /// 1-based line number in the rule text
        line: usize,
        /// The unrecognised token
        token: String,
    },
}

impl CompileError {
    /// Line of the rule text the error points at.
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. } | Self::UndefinedOperator { line, .. } => *line,
        }
    }
}

/// Errors raised while evaluating rules against a state vector.
///
/// A compiled network never produces these for vectors of the right length;
/// they indicate a caller handing in a state built for another network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// State vector length differs from the registry size
    #[error("state has {actual} bits, network has {expected} nodes")]
    StateLength {
        /// Registry size
        expected: usize,
        /// Length of the offending state
        actual: usize,
    },

    /// Expression references a node index past the end of the state
    #[error("node index {node} out of range for state of {len} bits")]
    NodeOutOfRange {
        /// Referenced node
        node: NodeId,
        /// Length of the state being read
        len: usize,
    },
}

/// Errors raised while parsing the textual form of a state vector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseStateError {
    /// Character other than `0` or `1`
    #[error("invalid bit {ch:?} at position {position}")]
    InvalidBit {
        /// The offending character
        ch: char,
        /// 0-based position in the string
        position: usize,
    },

    /// String length differs from the registry size
    #[error("state has {actual} bits, expected {expected}")]
    Length {
        /// Expected number of bits
        expected: usize,
        /// Number of bits found
        actual: usize,
    },
}

//! Boolean expression trees and their evaluation.
//!
//! [`Expr`] is generic over its leaf type: the parser produces
//! `Expr<String>` (leaves are node names), compilation resolves names to
//! registry positions and produces `Expr<NodeId>`, the form the evaluator
//! runs.

use std::fmt;

use crate::{error::EvalError, registry::NodeId, state::StateVector};

/// Boolean expression over AND, OR, NOT, constants and node references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr<V> {
    /// Literal `0` or `1`
    Const(bool),
    /// Reference to another node's current bit
    Var(V),
    /// Logical complement
    Not(Box<Expr<V>>),
    /// Conjunction
    And(Box<Expr<V>>, Box<Expr<V>>),
    /// Disjunction
    Or(Box<Expr<V>>, Box<Expr<V>>),
}

impl<V> Expr<V> {
    /// `NOT inner`
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// `lhs AND rhs`
    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs OR rhs`
    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Rewrite every leaf, failing on the first leaf `f` rejects.
    pub fn try_map_vars<W, E>(self, f: &mut impl FnMut(V) -> Result<W, E>) -> Result<Expr<W>, E> {
        Ok(match self {
            Self::Const(value) => Expr::Const(value),
            Self::Var(v) => Expr::Var(f(v)?),
            Self::Not(inner) => Expr::not(inner.try_map_vars(f)?),
            Self::And(lhs, rhs) => Expr::and(lhs.try_map_vars(f)?, rhs.try_map_vars(f)?),
            Self::Or(lhs, rhs) => Expr::or(lhs.try_map_vars(f)?, rhs.try_map_vars(f)?),
        })
    }

    /// Visit every leaf reference, left to right. Repeats are visited again.
    pub fn for_each_var<'a>(&'a self, f: &mut impl FnMut(&'a V)) {
        match self {
            Self::Const(_) => {},
            Self::Var(v) => f(v),
            Self::Not(inner) => inner.for_each_var(f),
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.for_each_var(f);
                rhs.for_each_var(f);
            },
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Self::Const(_) | Self::Var(_) => 1,
            Self::Not(inner) => 1 + inner.size(),
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => 1 + lhs.size() + rhs.size(),
        }
    }

    /// Binding strength used when rendering: OR < AND < NOT/atoms.
    fn precedence(&self) -> u8 {
        match self {
            Self::Or(..) => 1,
            Self::And(..) => 2,
            Self::Not(_) | Self::Const(_) | Self::Var(_) => 3,
        }
    }
}

impl Expr<NodeId> {
    /// Evaluate against `state`.
    ///
    /// Pure: reads only its inputs, so any number of workers may evaluate
    /// the same shared tree concurrently.
    pub fn eval(&self, state: &StateVector) -> Result<bool, EvalError> {
        match self {
            Self::Const(value) => Ok(*value),
            Self::Var(id) => {
                state.get(*id).ok_or(EvalError::NodeOutOfRange { node: *id, len: state.len() })
            },
            Self::Not(inner) => Ok(!inner.eval(state)?),
            Self::And(lhs, rhs) => Ok(lhs.eval(state)? && rhs.eval(state)?),
            Self::Or(lhs, rhs) => Ok(lhs.eval(state)? || rhs.eval(state)?),
        }
    }
}

impl<V: fmt::Display> fmt::Display for Expr<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Left operands may share the parent's precedence (left associative);
        // right operands must bind tighter to keep the tree shape.
        fn operand<V: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            child: &Expr<V>,
            min: u8,
        ) -> fmt::Result {
            if child.precedence() < min { write!(f, "({child})") } else { write!(f, "{child}") }
        }

        match self {
            Self::Const(value) => f.write_str(if *value { "1" } else { "0" }),
            Self::Var(v) => write!(f, "{v}"),
            Self::Not(inner) => {
                f.write_str("NOT ")?;
                operand(f, inner, 3)
            },
            Self::And(lhs, rhs) => {
                operand(f, lhs, 2)?;
                f.write_str(" AND ")?;
                operand(f, rhs, 3)
            },
            Self::Or(lhs, rhs) => {
                operand(f, lhs, 1)?;
                f.write_str(" OR ")?;
                operand(f, rhs, 2)
            },
        }
    }
}

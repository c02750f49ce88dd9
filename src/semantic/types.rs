//! Simple type system for the binder.

use std::fmt;

use crate::ast_core::{AstKind, BinaryOp};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimpleType {
    Int,
    String,
    Boolean,
    Unit,
    /// User type (class name) or a type name the binder does not know.
    Named(String),
    Unknown,
}

impl SimpleType {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Int" => Self::Int,
            "String" => Self::String,
            "Boolean" => Self::Boolean,
            "Unit" => Self::Unit,
            other => Self::Named(other.to_string()),
        }
    }

    /// Type of a literal node, `None` for anything else.
    pub fn of_literal(kind: AstKind) -> Option<Self> {
        match kind {
            AstKind::IntLiteral => Some(Self::Int),
            AstKind::StringLiteral => Some(Self::String),
            AstKind::BoolLiteral => Some(Self::Boolean),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("Int"),
            Self::String => f.write_str("String"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Unit => f.write_str("Unit"),
            Self::Named(name) => f.write_str(name),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

pub fn binary_result(lhs: &SimpleType, op: BinaryOp, rhs: &SimpleType) -> SimpleType {
    match (lhs, op, rhs) {
        (SimpleType::Int, _, SimpleType::Int) => SimpleType::Int,
        // конкатенация строк: String + что угодно
        (SimpleType::String, BinaryOp::Add, _) => SimpleType::String,
        _ => SimpleType::Unknown,
    }
}

pub fn negate_result(inner: &SimpleType) -> SimpleType {
    match inner {
        SimpleType::Int => SimpleType::Int,
        _ => SimpleType::Unknown,
    }
}

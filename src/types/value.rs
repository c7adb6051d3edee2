//! # Cell Values
//!
//! `Value` is the owned form of a single table cell, used by record views
//! for reads and write-through assignment. Its `Display` form is what a
//! record view concatenates when printing a row.

use std::fmt;

use crate::types::logical::VarSeq;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bits(Vec<bool>),
    Bytes(Vec<u8>),
    Seq(VarSeq),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bits(_) => "bit array",
            Value::Bytes(_) => "bytes",
            Value::Seq(_) => "sequence",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Bits(bits) => {
                write!(f, "[")?;
                for (i, b) in bits.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", if *b { 1 } else { 0 })?;
                }
                write!(f, "]")
            }
            Value::Bytes(bytes) => write!(f, "{bytes:?}"),
            Value::Seq(seq) => match seq {
                VarSeq::Bytes(v) => write!(f, "{v:?}"),
                VarSeq::Ints(v) => write!(f, "{v:?}"),
                VarSeq::Floats(v) => write!(f, "{v:?}"),
                VarSeq::Booleans(v) => write!(f, "{v:?}"),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Text("abc".into()).to_string(), "'abc'");
        assert_eq!(Value::Bits(vec![true, false]).to_string(), "[1 0]");
    }
}

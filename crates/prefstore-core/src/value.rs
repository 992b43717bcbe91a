//! Scalar value model for preference entries
//!
//! A preference entry holds exactly one of five scalar kinds: boolean,
//! 32-bit float, 32-bit int, 64-bit long, or string. Adapters that can
//! only store text (e.g. a browser-local-storage style backing) satisfy
//! typed reads through the coercion helpers here.

use std::fmt;

/// The five scalar kinds a preference value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Boolean,
    Float,
    Int,
    Long,
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Float => "float",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::String => "string",
        };
        f.write_str(name)
    }
}

/// A typed preference value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Float(f32),
    Int(i32),
    Long(i64),
    String(String),
}

impl Scalar {
    /// The kind tag of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Boolean(_) => ScalarKind::Boolean,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Long(_) => ScalarKind::Long,
            Scalar::String(_) => ScalarKind::String,
        }
    }

    /// Parse a textual representation as the requested kind.
    ///
    /// Returns `None` when the text does not represent a value of that
    /// kind. String-typed backings use this for best-effort coercion;
    /// a failed coercion is treated as "absent", not as an error.
    ///
    /// Booleans accept only `"true"` and `"false"` — anything else is a
    /// coercion failure rather than a silent `false`.
    pub fn from_text(kind: ScalarKind, text: &str) -> Option<Scalar> {
        match kind {
            ScalarKind::Boolean => match text {
                "true" => Some(Scalar::Boolean(true)),
                "false" => Some(Scalar::Boolean(false)),
                _ => None,
            },
            ScalarKind::Float => text.parse::<f32>().ok().map(Scalar::Float),
            ScalarKind::Int => text.parse::<i32>().ok().map(Scalar::Int),
            ScalarKind::Long => text.parse::<i64>().ok().map(Scalar::Long),
            ScalarKind::String => Some(Scalar::String(text.to_string())),
        }
    }

    /// Canonical textual form, round-trippable through [`from_text`](Self::from_text).
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Boolean(v) => v.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Int(v) => v.to_string(),
            Scalar::Long(v) => v.to_string(),
            Scalar::String(v) => v.clone(),
        }
    }
}

use serde::Serialize;

use crate::schema::{Operator, ScalarKind};
use crate::value::ValueError;

/// Convenience alias for results produced by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error returned when decoding a query string into a filter instance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The query string itself could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The query string parsed, but one or more fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// A malformed query string, such as a percent escape decoding to invalid
/// UTF-8. `position` is the byte offset of the offending component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parsing failed with error: '{message}' at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// Every field-level failure collected over one decode.
///
/// Decoding never keeps a partial result: either the whole query string
/// validates, or the caller gets the full list of failures. Serializes as a
/// JSON array of [`FieldError`] entries, suitable for a 422 response body.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("filter validation failed with {} error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Invariant: `errors` is non-empty.
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        ValidationErrors { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.errors
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// One field-level validation failure.
///
/// `loc` names the failing attribute, the operator keyword, and the value
/// index where one applies, e.g. `["quantity", "gt", 0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<Loc>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub(crate) fn unknown_operator(attribute: &str, keyword: &str) -> Self {
        FieldError {
            loc: vec![Loc::Key(attribute.to_owned()), Loc::Key(keyword.to_owned())],
            msg: format!("unknown operator `{keyword}`"),
            kind: FieldErrorKind::UnknownOperator,
        }
    }

    pub(crate) fn operator_not_allowed(attribute: &str, operator: Operator) -> Self {
        FieldError {
            loc: vec![
                Loc::Key(attribute.to_owned()),
                Loc::Key(operator.as_str().to_owned()),
            ],
            msg: format!("operator `{operator}` is not allowed for this field"),
            kind: FieldErrorKind::OperatorNotAllowed,
        }
    }

    pub(crate) fn invalid_value(
        attribute: &str,
        operator: Operator,
        index: usize,
        error: &ValueError,
    ) -> Self {
        FieldError {
            loc: vec![
                Loc::Key(attribute.to_owned()),
                Loc::Key(operator.as_str().to_owned()),
                Loc::Index(index),
            ],
            msg: error.to_string(),
            kind: FieldErrorKind::InvalidValue,
        }
    }

    pub(crate) fn invalid_flag(attribute: &str, operator: Operator) -> Self {
        FieldError {
            loc: vec![
                Loc::Key(attribute.to_owned()),
                Loc::Key(operator.as_str().to_owned()),
            ],
            msg: "unexpected value; permitted: true".to_owned(),
            kind: FieldErrorKind::InvalidFlag,
        }
    }
}

/// One segment of a [`FieldError`] location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Loc {
    Key(String),
    Index(usize),
}

/// Machine-readable classification of a [`FieldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    UnknownOperator,
    OperatorNotAllowed,
    InvalidValue,
    InvalidFlag,
}

/// Error raised while building a [`FilterSchema`](crate::FilterSchema).
///
/// A misdeclared schema fails here, at construction, rather than on the
/// first request that exercises the bad field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("filter field `{field}` declares no operators")]
    EmptyOperators { field: &'static str },
    #[error("operator `{operator}` is not supported by {kind} field `{field}`")]
    UnsupportedOperator {
        field: &'static str,
        kind: ScalarKind,
        operator: Operator,
    },
    #[error("default operator `{operator}` of field `{field}` is not among its allowed operators")]
    DefaultOperatorNotAllowed {
        field: &'static str,
        operator: Operator,
    },
    #[error("duplicate operator `{operator}` on field `{field}`")]
    DuplicateOperator {
        field: &'static str,
        operator: Operator,
    },
    #[error("duplicate field `{name}`")]
    DuplicateField { name: &'static str },
    #[error("duplicate wire name `{name}`")]
    DuplicateWireName { name: &'static str },
}

//! Filter schema declarations.
//!
//! A [`FilterSchema`] lists every field a request may filter on: filter
//! attributes with their value kind and allowed operators, plus plain fields
//! that pass through undecoded. Schemas are validated once when built and
//! then shared immutably by decoders, parameter synthesis and documentation.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SchemaError;

/// The operator taxonomy shared by every wire style.
///
/// `is_empty` and `is_not_empty` are flag operators: they assert presence and
/// never carry a value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    IsEmpty,
    IsNotEmpty,
    IsBefore,
    IsAfter,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
    In,
    NotIn,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::IsBefore,
        Operator::IsAfter,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Contains,
        Operator::NotContains,
        Operator::In,
        Operator::NotIn,
    ];

    /// The keyword this operator goes by on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::IsBefore => "is_before",
            Operator::IsAfter => "is_after",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::In => "in",
            Operator::NotIn => "not_in",
        }
    }

    /// Resolves a wire keyword, `None` if it names no operator.
    pub fn parse(keyword: &str) -> Option<Operator> {
        match keyword {
            "eq" => Some(Operator::Eq),
            "neq" => Some(Operator::Neq),
            "gt" => Some(Operator::Gt),
            "lt" => Some(Operator::Lt),
            "gte" => Some(Operator::Gte),
            "lte" => Some(Operator::Lte),
            "is_empty" => Some(Operator::IsEmpty),
            "is_not_empty" => Some(Operator::IsNotEmpty),
            "is_before" => Some(Operator::IsBefore),
            "is_after" => Some(Operator::IsAfter),
            "starts_with" => Some(Operator::StartsWith),
            "ends_with" => Some(Operator::EndsWith),
            "contains" => Some(Operator::Contains),
            "not_contains" => Some(Operator::NotContains),
            "in" => Some(Operator::In),
            "not_in" => Some(Operator::NotIn),
            _ => None,
        }
    }

    /// Whether this operator is a presence flag rather than value-bearing.
    pub const fn is_flag(self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = UnknownOperatorError;

    fn from_str(keyword: &str) -> Result<Self, Self::Err> {
        Operator::parse(keyword).ok_or(UnknownOperatorError)
    }
}

/// Error returned when a keyword names no [`Operator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator keyword")]
pub struct UnknownOperatorError;

/// The value type a filter attribute coerces its wire strings into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Decimal,
    Bool,
    Date,
    DateTime,
    Uuid,
}

impl ScalarKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Str => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Bool => "bool",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Uuid => "uuid",
        }
    }

    /// Every operator this kind supports. A [`FilterField`] may restrict the
    /// set further but never extend it.
    pub const fn supported_operators(self) -> &'static [Operator] {
        use Operator::*;
        match self {
            ScalarKind::Str => &[
                Eq, Neq, Contains, NotContains, StartsWith, EndsWith, IsEmpty, IsNotEmpty, In,
                NotIn,
            ],
            ScalarKind::Uuid => &[Eq, Neq, IsEmpty, IsNotEmpty, In, NotIn],
            ScalarKind::Int | ScalarKind::Float | ScalarKind::Decimal => {
                &[Eq, Neq, Gt, Lt, Gte, Lte, IsEmpty, IsNotEmpty]
            }
            ScalarKind::Bool => &[Eq, Neq, IsEmpty, IsNotEmpty],
            ScalarKind::Date | ScalarKind::DateTime => &[
                Eq, Neq, Gt, Lt, Gte, Lte, IsEmpty, IsNotEmpty, IsBefore, IsAfter,
            ],
        }
    }

    pub fn supports(self, operator: Operator) -> bool {
        self.supported_operators().contains(&operator)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The filter rule for one attribute.
///
/// A fresh field allows the full operator set of its kind and defaults bare
/// values to `eq`; the builder-style setters narrow or override that.
///
/// ## Example
///
/// ```
/// use filter_qs::{FilterField, Operator};
///
/// let quantity = FilterField::int("quantity")
///     .operators(&[Operator::Eq, Operator::Gt, Operator::Lt])
///     .description("items in stock");
/// ```
#[derive(Debug, Clone)]
pub struct FilterField {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub kind: ScalarKind,
    pub operators: Vec<Operator>,
    pub default_operator: Operator,
    pub description: Option<&'static str>,
    pub example: Option<&'static str>,
}

impl FilterField {
    pub fn new(name: &'static str, kind: ScalarKind) -> Self {
        FilterField {
            name,
            alias: None,
            kind,
            operators: kind.supported_operators().to_vec(),
            default_operator: Operator::Eq,
            description: None,
            example: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, ScalarKind::Str)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, ScalarKind::Int)
    }

    pub fn float(name: &'static str) -> Self {
        Self::new(name, ScalarKind::Float)
    }

    pub fn decimal(name: &'static str) -> Self {
        Self::new(name, ScalarKind::Decimal)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, ScalarKind::Bool)
    }

    pub fn date(name: &'static str) -> Self {
        Self::new(name, ScalarKind::Date)
    }

    pub fn datetime(name: &'static str) -> Self {
        Self::new(name, ScalarKind::DateTime)
    }

    pub fn uuid(name: &'static str) -> Self {
        Self::new(name, ScalarKind::Uuid)
    }

    /// Sets the name this attribute goes by in query strings. Defaults to
    /// the attribute name itself.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Restricts the attribute to `operators`. Building the schema rejects
    /// operators the kind does not support.
    pub fn operators(mut self, operators: &[Operator]) -> Self {
        self.operators = operators.to_vec();
        self
    }

    /// Sets the operator applied to tokens without an operator prefix.
    pub fn default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn example(mut self, example: &'static str) -> Self {
        self.example = Some(example);
        self
    }

    /// The name this attribute resolves to on the wire.
    pub fn wire_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    pub fn allows(&self, operator: Operator) -> bool {
        self.operators.contains(&operator)
    }
}

/// A field passed through as its raw wire string, skipping operator
/// decoding. `kind` only informs documentation.
#[derive(Debug, Clone)]
pub struct PlainField {
    pub name: &'static str,
    pub kind: ScalarKind,
    pub description: Option<&'static str>,
}

impl PlainField {
    pub fn new(name: &'static str, kind: ScalarKind) -> Self {
        PlainField {
            name,
            kind,
            description: None,
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// One declared field: a filter attribute or a plain passthrough value.
#[derive(Debug, Clone)]
pub enum FieldRule {
    Filter(FilterField),
    Plain(PlainField),
}

impl FieldRule {
    pub fn name(&self) -> &'static str {
        match self {
            FieldRule::Filter(field) => field.name,
            FieldRule::Plain(field) => field.name,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldRule::Filter(field) => field.wire_name(),
            FieldRule::Plain(field) => field.name,
        }
    }

    pub fn as_filter(&self) -> Option<&FilterField> {
        match self {
            FieldRule::Filter(field) => Some(field),
            FieldRule::Plain(_) => None,
        }
    }
}

/// The validated set of fields one endpoint accepts, in declaration order.
#[derive(Debug, Clone)]
pub struct FilterSchema {
    fields: Vec<FieldRule>,
}

impl FilterSchema {
    pub fn builder() -> FilterSchemaBuilder {
        FilterSchemaBuilder::default()
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn filter_fields(&self) -> impl Iterator<Item = &FilterField> {
        self.fields.iter().filter_map(FieldRule::as_filter)
    }

    pub fn plain_fields(&self) -> impl Iterator<Item = &PlainField> {
        self.fields.iter().filter_map(|rule| match rule {
            FieldRule::Plain(field) => Some(field),
            FieldRule::Filter(_) => None,
        })
    }

    pub(crate) fn filter_by_wire(&self, wire_name: &str) -> Option<&FilterField> {
        self.filter_fields().find(|f| f.wire_name() == wire_name)
    }

    pub(crate) fn filter_by_name(&self, name: &str) -> Option<&FilterField> {
        self.filter_fields().find(|f| f.name == name)
    }

    pub(crate) fn plain_by_wire(&self, wire_name: &str) -> Option<&PlainField> {
        self.plain_fields().find(|f| f.name == wire_name)
    }
}

/// Builder validating field declarations into a [`FilterSchema`].
///
/// ## Example
///
/// ```
/// use filter_qs::{FilterField, FilterSchema, Operator, PlainField, ScalarKind};
///
/// let schema = FilterSchema::builder()
///     .filter(FilterField::string("name"))
///     .filter(FilterField::int("quantity").operators(&[Operator::Eq, Operator::Gt]))
///     .plain(PlainField::new("limit", ScalarKind::Int))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.fields().len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct FilterSchemaBuilder {
    fields: Vec<FieldRule>,
}

impl FilterSchemaBuilder {
    pub fn filter(mut self, field: FilterField) -> Self {
        self.fields.push(FieldRule::Filter(field));
        self
    }

    pub fn plain(mut self, field: PlainField) -> Self {
        self.fields.push(FieldRule::Plain(field));
        self
    }

    /// Validates every declaration and builds the schema.
    ///
    /// Declare schemas in statics so a bad declaration surfaces at startup.
    pub fn build(self) -> Result<FilterSchema, SchemaError> {
        for (i, rule) in self.fields.iter().enumerate() {
            for earlier in &self.fields[..i] {
                if earlier.name() == rule.name() {
                    return Err(SchemaError::DuplicateField { name: rule.name() });
                }
                if earlier.wire_name() == rule.wire_name() {
                    return Err(SchemaError::DuplicateWireName {
                        name: rule.wire_name(),
                    });
                }
            }
            let Some(field) = rule.as_filter() else {
                continue;
            };
            if field.operators.is_empty() {
                return Err(SchemaError::EmptyOperators { field: field.name });
            }
            for (j, &operator) in field.operators.iter().enumerate() {
                if !field.kind.supports(operator) {
                    return Err(SchemaError::UnsupportedOperator {
                        field: field.name,
                        kind: field.kind,
                        operator,
                    });
                }
                if field.operators[..j].contains(&operator) {
                    return Err(SchemaError::DuplicateOperator {
                        field: field.name,
                        operator,
                    });
                }
            }
            if !field.allows(field.default_operator) {
                return Err(SchemaError::DefaultOperatorNotAllowed {
                    field: field.name,
                    operator: field.default_operator,
                });
            }
        }
        Ok(FilterSchema {
            fields: self.fields,
        })
    }
}

/// Binds a marker type to its static filter schema so extractors and helper
/// functions can locate it.
///
/// ## Example
///
/// ```
/// use std::sync::LazyLock;
///
/// use filter_qs::{FilterField, FilterModel, FilterSchema};
///
/// struct ProductFilters;
///
/// static SCHEMA: LazyLock<FilterSchema> = LazyLock::new(|| {
///     FilterSchema::builder()
///         .filter(FilterField::string("name"))
///         .build()
///         .expect("valid filter schema")
/// });
///
/// impl FilterModel for ProductFilters {
///     fn schema() -> &'static FilterSchema {
///         &SCHEMA
///     }
/// }
/// ```
pub trait FilterModel {
    /// The schema requests are decoded against.
    fn schema() -> &'static FilterSchema;
}

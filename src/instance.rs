//! Decoded filter instances.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::de::{RawEntry, RawInstance};
use crate::error::{FieldError, ValidationErrors};
use crate::schema::{FilterSchema, Operator};
use crate::value::{parse_bool, FilterValue};

/// The decoded content under one attribute/operator pair.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorEntry {
    /// Values accumulated under a value-bearing operator. Repetition is an
    /// implicit OR; order follows the query string.
    Values(Vec<FilterValue>),
    /// A flag operator asserted by the request.
    Flag,
}

impl Serialize for OperatorEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OperatorEntry::Values(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            // asserted flags are always `true`; unasserted ones are absent
            OperatorEntry::Flag => serializer.serialize_bool(true),
        }
    }
}

/// The operator entries decoded for one attribute, in wire order.
///
/// Absence of an operator key means the request put nothing under it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct AttributeFilter {
    entries: IndexMap<Operator, OperatorEntry>,
}

impl AttributeFilter {
    /// The entry under `operator`, if the request set one.
    pub fn get(&self, operator: Operator) -> Option<&OperatorEntry> {
        self.entries.get(&operator)
    }

    /// The values bucketed under `operator`; empty when unset or a flag.
    pub fn values(&self, operator: Operator) -> &[FilterValue] {
        match self.entries.get(&operator) {
            Some(OperatorEntry::Values(values)) => values,
            _ => &[],
        }
    }

    /// Whether the request asserted `operator` as a flag.
    pub fn has_flag(&self, operator: Operator) -> bool {
        matches!(self.entries.get(&operator), Some(OperatorEntry::Flag))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operator, &OperatorEntry)> {
        self.entries.iter().map(|(&operator, entry)| (operator, entry))
    }

    fn append_value(&mut self, operator: Operator, value: FilterValue) {
        match self
            .entries
            .entry(operator)
            .or_insert_with(|| OperatorEntry::Values(Vec::new()))
        {
            OperatorEntry::Values(values) => values.push(value),
            OperatorEntry::Flag => {}
        }
    }

    fn set_flag(&mut self, operator: Operator) {
        // keeps the position of an existing entry
        self.entries.insert(operator, OperatorEntry::Flag);
    }
}

/// The validated result of decoding one request's filter parameters.
///
/// Every filter attribute the schema declares is present, with an empty
/// [`AttributeFilter`] when the request did not mention it. Plain fields
/// carry their raw last-seen wire value. Serializes as a single flat map of
/// field name to decoded content.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterInstance {
    attributes: IndexMap<&'static str, AttributeFilter>,
    plain: IndexMap<&'static str, Option<String>>,
}

impl FilterInstance {
    /// The decoded filter for `name`, `None` for undeclared attributes.
    pub fn attribute(&self, name: &str) -> Option<&AttributeFilter> {
        self.attributes.get(name)
    }

    /// Iterates declared filter attributes in schema order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &AttributeFilter)> {
        self.attributes.iter().map(|(&name, filter)| (name, filter))
    }

    /// The raw value of a declared plain field.
    pub fn plain(&self, name: &str) -> Option<&str> {
        self.plain.get(name).and_then(|value| value.as_deref())
    }

    /// Whether any attribute carries at least one operator entry.
    pub fn is_active(&self) -> bool {
        self.attributes.values().any(|filter| !filter.is_empty())
    }

    /// Resolves raw operator buckets against `schema`, collecting every
    /// field error instead of stopping at the first.
    pub(crate) fn build(schema: &FilterSchema, raw: RawInstance) -> Result<Self, ValidationErrors> {
        let RawInstance {
            attributes: mut raw_attributes,
            plain: raw_plain,
        } = raw;
        let mut errors = Vec::new();
        let mut attributes = IndexMap::new();

        for field in schema.filter_fields() {
            let mut decoded = AttributeFilter::default();
            if let Some(raw_attribute) = raw_attributes.swap_remove(field.name) {
                for (keyword, entry) in raw_attribute.entries {
                    let Some(operator) = Operator::parse(&keyword) else {
                        errors.push(FieldError::unknown_operator(field.name, &keyword));
                        continue;
                    };
                    if !field.allows(operator) {
                        errors.push(FieldError::operator_not_allowed(field.name, operator));
                        continue;
                    }
                    match (entry, operator.is_flag()) {
                        (RawEntry::Flag, _) => decoded.set_flag(operator),
                        (RawEntry::FlagLiteral(literal), _) => match parse_bool(&literal) {
                            Some(true) => decoded.set_flag(operator),
                            _ => errors.push(FieldError::invalid_flag(field.name, operator)),
                        },
                        (RawEntry::Values(values), false) => {
                            for (index, raw_value) in values.iter().enumerate() {
                                match FilterValue::parse(field.kind, raw_value) {
                                    Ok(value) => decoded.append_value(operator, value),
                                    Err(error) => errors.push(FieldError::invalid_value(
                                        field.name, operator, index, &error,
                                    )),
                                }
                            }
                        }
                        (RawEntry::Values(values), true) => {
                            match values.last().map(|literal| parse_bool(literal)) {
                                Some(Some(true)) => decoded.set_flag(operator),
                                _ => errors.push(FieldError::invalid_flag(field.name, operator)),
                            }
                        }
                    }
                }
            }
            attributes.insert(field.name, decoded);
        }

        let mut plain = IndexMap::new();
        for field in schema.plain_fields() {
            let value = raw_plain.get(field.name).cloned().flatten();
            plain.insert(field.name, value);
        }

        if errors.is_empty() {
            Ok(FilterInstance { attributes, plain })
        } else {
            Err(ValidationErrors::new(errors))
        }
    }
}

impl Serialize for FilterInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + self.plain.len()))?;
        for (name, filter) in &self.attributes {
            map.serialize_entry(name, filter)?;
        }
        for (name, value) in &self.plain {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

//! Query-string decoders for the two filter wire styles.
//!
//! [`DelimitedDecoder`] reads repeatable `key=operator:value` parameters;
//! [`DeepObjectDecoder`] reads bracketed `key[operator]=value` parameters.
//! Both produce the same [`FilterInstance`] model for equivalent input, so
//! handlers never care which style a client spoke.
//!
//! Decoding runs in two phases. The style-specific decoder buckets raw wire
//! strings per attribute and operator keyword without judging them; instance
//! construction then resolves keywords against the schema, coerces values and
//! aggregates every field error.

mod deep_object;
mod delimited;
mod pairs;

pub use deep_object::DeepObjectDecoder;
pub use delimited::DelimitedDecoder;

use indexmap::IndexMap;

use crate::error::Result;
use crate::instance::FilterInstance;
use crate::schema::FilterModel;

/// Decodes a delimited-style query string against `M`'s schema.
///
/// ## Example
///
/// ```
/// use std::sync::LazyLock;
///
/// use filter_qs::{FilterField, FilterModel, FilterSchema, FilterValue, Operator};
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
///
/// let filters = filter_qs::delimited_from_str::<ProductFilters>("name=contains:shell").unwrap();
/// assert_eq!(
///     filters.attribute("name").unwrap().values(Operator::Contains),
///     [FilterValue::Str("shell".into())]
/// );
/// ```
pub fn delimited_from_str<M: FilterModel>(query: &str) -> Result<FilterInstance> {
    DelimitedDecoder::new(M::schema()).decode_str(query)
}

/// Decodes a deep-object-style query string against `M`'s schema.
///
/// The deep-object twin of [`delimited_from_str`]: the query string
/// `name[contains]=shell` decodes to the same instance as
/// `name=contains:shell` does there.
pub fn deep_object_from_str<M: FilterModel>(query: &str) -> Result<FilterInstance> {
    DeepObjectDecoder::new(M::schema()).decode_str(query)
}

/// Style-independent decode product handed to instance construction.
///
/// Keys of `attributes` are schema attribute names; operator keywords inside
/// stay unresolved strings so construction can report unknown ones.
#[derive(Debug, Default)]
pub(crate) struct RawInstance {
    pub(crate) attributes: IndexMap<&'static str, RawAttribute>,
    pub(crate) plain: IndexMap<&'static str, Option<String>>,
}

impl RawInstance {
    pub(crate) fn attribute_mut(&mut self, name: &'static str) -> &mut RawAttribute {
        self.attributes.entry(name).or_default()
    }

    /// Plain fields are scalars: the last write wins.
    pub(crate) fn set_plain(&mut self, name: &'static str, value: String) {
        self.plain.insert(name, Some(value));
    }
}

/// Keyword buckets collected for one attribute, in wire order.
#[derive(Debug, Default)]
pub(crate) struct RawAttribute {
    pub(crate) entries: IndexMap<String, RawEntry>,
}

impl RawAttribute {
    /// Appends a value under `keyword`, creating the bucket if absent.
    pub(crate) fn push_value(&mut self, keyword: &str, value: impl Into<String>) {
        if let RawEntry::Values(values) = self
            .entries
            .entry(keyword.to_owned())
            .or_insert_with(|| RawEntry::Values(Vec::new()))
        {
            values.push(value.into());
        }
    }

    /// Replaces the bucket under `keyword` with a single value.
    pub(crate) fn set_value(&mut self, keyword: &str, value: impl Into<String>) {
        self.entries
            .insert(keyword.to_owned(), RawEntry::Values(vec![value.into()]));
    }

    /// Marks a flag keyword as asserted, with no literal to validate.
    pub(crate) fn assert_flag(&mut self, keyword: &str) {
        self.entries.insert(keyword.to_owned(), RawEntry::Flag);
    }

    /// Records a flag keyword whose wire literal still needs validation.
    pub(crate) fn set_flag_literal(&mut self, keyword: &str, literal: impl Into<String>) {
        self.entries
            .insert(keyword.to_owned(), RawEntry::FlagLiteral(literal.into()));
    }
}

/// One keyword bucket prior to validation.
#[derive(Debug)]
pub(crate) enum RawEntry {
    Values(Vec<String>),
    Flag,
    FlagLiteral(String),
}

use std::borrow::Cow;

use tracing::trace;

use crate::error::{Error, Result};
use crate::instance::FilterInstance;
use crate::params::{deep_object_params, ParamSpec, BINDING_SEPARATOR};
use crate::schema::{FilterField, FilterSchema, Operator};

use super::pairs::{self, PairValue};
use super::RawInstance;

/// Decoder for the deep-object wire style.
///
/// Wire keys take the bracketed form `attribute[operator]=value`; the
/// synthesized binding form `attribute__operator=value` is accepted as well.
/// Each key is a scalar, so writing the same attribute/operator twice keeps
/// the last value. A bare attribute key is reserved for the documented
/// umbrella parameter and never populates anything.
///
/// ## Example
///
/// ```
/// use std::sync::LazyLock;
///
/// use filter_qs::{DeepObjectDecoder, FilterField, FilterSchema, FilterValue, Operator};
///
/// static SCHEMA: LazyLock<FilterSchema> = LazyLock::new(|| {
///     FilterSchema::builder()
///         .filter(FilterField::string("name"))
///         .build()
///         .expect("valid filter schema")
/// });
///
/// let filters = DeepObjectDecoder::new(&SCHEMA)
///     .decode_str("name[contains]=shell")
///     .unwrap();
/// assert_eq!(
///     filters.attribute("name").unwrap().values(Operator::Contains),
///     [FilterValue::Str("shell".into())]
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DeepObjectDecoder<'s> {
    schema: &'s FilterSchema,
}

impl<'s> DeepObjectDecoder<'s> {
    pub const fn new(schema: &'s FilterSchema) -> Self {
        DeepObjectDecoder { schema }
    }

    /// The wire parameters this decoder extracts, for documentation.
    pub fn params(&self) -> Vec<ParamSpec> {
        deep_object_params(self.schema)
    }

    /// Decodes a raw query string.
    pub fn decode_str(&self, query: &str) -> Result<FilterInstance> {
        self.decode(pairs::parse_pairs(query)?)
    }

    /// Decodes pre-split `(key, value)` pairs the caller already URL-decoded.
    /// `None` marks a key that appeared without any `=`.
    pub fn decode_pairs<'a, I>(&self, pairs: I) -> Result<FilterInstance>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        self.decode(pairs.into_iter().map(|(key, value)| {
            let value = match value {
                Some("") => PairValue::Null,
                Some(value) => PairValue::String(Cow::Borrowed(value)),
                None => PairValue::NoValue,
            };
            (Cow::Borrowed(key), value)
        }))
    }

    fn decode<'qs>(
        &self,
        pairs: impl IntoIterator<Item = (Cow<'qs, str>, PairValue<'qs>)>,
    ) -> Result<FilterInstance> {
        let mut raw = RawInstance::default();
        for (key, value) in pairs {
            // keys with no value at all are dropped before decoding
            let value = match value {
                PairValue::String(value) => value,
                PairValue::Null => Cow::Borrowed(""),
                PairValue::NoValue => continue,
            };
            if let Some((field, keyword)) = self.split_filter_key(&key) {
                let attribute = raw.attribute_mut(field.name);
                if Operator::parse(keyword).is_some_and(Operator::is_flag) {
                    attribute.set_flag_literal(keyword, value.into_owned());
                } else {
                    // scalar extraction parameter: last write wins
                    attribute.set_value(keyword, value.into_owned());
                }
            } else if self.schema.filter_by_wire(&key).is_some() {
                trace!(key = %key, "ignoring reserved umbrella parameter");
            } else if let Some(plain) = self.schema.plain_by_wire(&key) {
                raw.set_plain(plain.name, value.into_owned());
            } else {
                trace!(key = %key, "ignoring undeclared query parameter");
            }
        }
        FilterInstance::build(self.schema, raw).map_err(Error::from)
    }

    /// Splits `attribute[operator]` or `attribute__operator` and resolves the
    /// attribute. Bracketed keys resolve by wire name, binding keys by
    /// attribute name. `None` for anything else, malformed brackets included.
    fn split_filter_key<'k>(&self, key: &'k str) -> Option<(&FilterField, &'k str)> {
        if let Some((base, rest)) = key.split_once('[') {
            let keyword = rest.strip_suffix(']')?;
            if keyword.is_empty() || keyword.contains(['[', ']']) {
                return None;
            }
            return self
                .schema
                .filter_by_wire(base)
                .map(|field| (field, keyword));
        }
        let (base, keyword) = key.split_once(BINDING_SEPARATOR)?;
        if keyword.is_empty() {
            return None;
        }
        self.schema
            .filter_by_name(base)
            .map(|field| (field, keyword))
    }
}

use std::borrow::Cow;

use tracing::trace;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::instance::FilterInstance;
use crate::params::{delimited_params, ParamSpec};
use crate::schema::{FilterField, FilterSchema, Operator};

use super::pairs::{self, PairValue};
use super::{RawAttribute, RawInstance};

/// Decoder for the delimited wire style.
///
/// Each filter attribute is one repeatable parameter whose values are
/// `operator:value` tokens. A token without the delimiter is a value under
/// the attribute's default operator, unless it names one of the attribute's
/// flag operators, which asserts the flag instead. Only the first delimiter
/// separates, so `contains:a:b` filters on `a:b`.
///
/// ## Example
///
/// ```
/// use std::sync::LazyLock;
///
/// use filter_qs::{
///     Config, DelimitedDecoder, FilterField, FilterSchema, FilterValue, Operator,
/// };
///
/// static SCHEMA: LazyLock<FilterSchema> = LazyLock::new(|| {
///     FilterSchema::builder()
///         .filter(FilterField::string("name"))
///         .build()
///         .expect("valid filter schema")
/// });
///
/// let decoder = DelimitedDecoder::with_config(&SCHEMA, Config::new().delimiter('~'));
/// let filters = decoder.decode_str("name=contains~sea").unwrap();
/// assert_eq!(
///     filters.attribute("name").unwrap().values(Operator::Contains),
///     [FilterValue::Str("sea".into())]
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DelimitedDecoder<'s> {
    schema: &'s FilterSchema,
    config: Config,
}

impl<'s> DelimitedDecoder<'s> {
    /// Creates a decoder with the default [`Config`].
    pub const fn new(schema: &'s FilterSchema) -> Self {
        Self::with_config(schema, Config::new())
    }

    pub const fn with_config(schema: &'s FilterSchema, config: Config) -> Self {
        DelimitedDecoder { schema, config }
    }

    /// The wire parameters this decoder extracts, for documentation.
    pub fn params(&self) -> Vec<ParamSpec> {
        delimited_params(self.schema, self.config)
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
            if let Some(field) = self.schema.filter_by_wire(&key) {
                let token = match value {
                    PairValue::String(token) => token,
                    PairValue::Null => Cow::Borrowed(""),
                    // a bare key carries no token to decode
                    PairValue::NoValue => continue,
                };
                self.decode_token(field, raw.attribute_mut(field.name), &token);
            } else if let Some(plain) = self.schema.plain_by_wire(&key) {
                match value {
                    PairValue::String(value) => raw.set_plain(plain.name, value.into_owned()),
                    PairValue::Null => raw.set_plain(plain.name, String::new()),
                    PairValue::NoValue => {}
                }
            } else {
                trace!(key = %key, "ignoring undeclared query parameter");
            }
        }
        FilterInstance::build(self.schema, raw).map_err(Error::from)
    }

    fn decode_token(&self, field: &FilterField, attribute: &mut RawAttribute, token: &str) {
        match token.split_once(self.config.delimiter) {
            Some((keyword, value)) => {
                if allowed_flag(field, keyword) {
                    // the remainder of a flag token is not a value
                    attribute.assert_flag(keyword);
                } else {
                    attribute.push_value(keyword, value);
                }
            }
            None => {
                if allowed_flag(field, token) {
                    attribute.assert_flag(token);
                } else {
                    attribute.push_value(field.default_operator.as_str(), token);
                }
            }
        }
    }
}

/// Whether `keyword` names a flag operator this field allows. Anything else
/// is left for instance construction to resolve or reject.
fn allowed_flag(field: &FilterField, keyword: &str) -> bool {
    Operator::parse(keyword).is_some_and(|operator| operator.is_flag() && field.allows(operator))
}

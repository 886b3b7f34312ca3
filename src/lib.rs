//! Structured filter expressions over query strings.
//!
//! `filter_qs` decodes query parameters like
//! `?name=contains:shell&name=neq:shell+beach` or their deep-object twins
//! `?name[contains]=shell&name[neq]=shell%20beach` into one validated,
//! ordered attribute/operator/values mapping, driven by a declared
//! [`FilterSchema`].
//!
//! Two wire styles share the same semantic model:
//!
//! - **delimited**: each attribute is a repeatable `key=[operator:]value`
//!   parameter; a token without an operator prefix uses the attribute's
//!   default operator, and a bare flag keyword such as `is_empty` asserts a
//!   presence flag.
//! - **deep object**: each attribute/operator pair is its own scalar
//!   parameter `key[operator]=value`, the OpenAPI `deepObject` encoding.
//!
//! ## Usage
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use filter_qs::{FilterField, FilterModel, FilterSchema, FilterValue, Operator};
//!
//! struct ProductFilters;
//!
//! static SCHEMA: LazyLock<FilterSchema> = LazyLock::new(|| {
//!     FilterSchema::builder()
//!         .filter(FilterField::string("name"))
//!         .filter(FilterField::int("quantity").operators(&[
//!             Operator::Eq,
//!             Operator::Gt,
//!             Operator::Lt,
//!         ]))
//!         .build()
//!         .expect("valid filter schema")
//! });
//!
//! impl FilterModel for ProductFilters {
//!     fn schema() -> &'static FilterSchema {
//!         &SCHEMA
//!     }
//! }
//!
//! let filters = filter_qs::delimited_from_str::<ProductFilters>(
//!     "name=contains:shell&name=neq:shell+beach&quantity=gt:3",
//! )
//! .unwrap();
//!
//! let name = filters.attribute("name").unwrap();
//! assert_eq!(
//!     name.values(Operator::Contains),
//!     [FilterValue::Str("shell".into())]
//! );
//! assert_eq!(
//!     name.values(Operator::Neq),
//!     [FilterValue::Str("shell beach".into())]
//! );
//! assert_eq!(
//!     filters.attribute("quantity").unwrap().values(Operator::Gt),
//!     [FilterValue::Int(3)]
//! );
//! assert!(filters.is_active());
//! ```
//!
//! Validation never stops at the first problem: unknown operators,
//! disallowed operators and uncoercible values are all collected into one
//! [`ValidationErrors`], so a client sees every mistake at once.
//!
//! ## Features
//!
//! - `axum`: request extractors for the axum web framework, in
//!   [`axum`](crate::axum).
//! - `openapi`: documents both wire styles on a built utoipa OpenAPI
//!   document, in [`openapi`](crate::openapi).

mod config;
pub mod de;
mod error;
mod instance;
mod params;
mod schema;
mod value;

#[cfg(feature = "axum")]
pub mod axum;
#[cfg(feature = "openapi")]
pub mod openapi;

#[doc(inline)]
pub use de::{deep_object_from_str, delimited_from_str, DeepObjectDecoder, DelimitedDecoder};

pub use config::Config;
pub use error::{
    Error, FieldError, FieldErrorKind, Loc, ParseError, Result, SchemaError, ValidationErrors,
};
pub use instance::{AttributeFilter, FilterInstance, OperatorEntry};
pub use params::{
    deep_object_params, delimited_params, OperatorSchema, ParamSpec, ParamStyle, ParamType,
    BINDING_SEPARATOR,
};
pub use schema::{
    FieldRule, FilterField, FilterModel, FilterSchema, FilterSchemaBuilder, Operator, PlainField,
    ScalarKind, UnknownOperatorError,
};
pub use value::{FilterValue, ValueError};

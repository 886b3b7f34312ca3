//! Extractors for the axum web framework.

use axum_framework as axum;

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::config::Config;
use crate::de::{DeepObjectDecoder, DelimitedDecoder};
use crate::error::{Error, ParseError, ValidationErrors};
use crate::instance::FilterInstance;
use crate::schema::FilterModel;

/// Extractor decoding delimited-style filter parameters against `M`'s
/// schema.
///
/// Dereferences to the decoded [`FilterInstance`]. A [`Config`] inserted
/// into the request extensions, per route or from middleware, overrides the
/// default delimiter.
///
/// ```no_run
/// use std::sync::LazyLock;
///
/// use axum_framework as axum;
///
/// use axum::routing::get;
/// use axum::Router;
/// use filter_qs::axum::DelimitedQuery;
/// use filter_qs::{FilterField, FilterModel, FilterSchema, Operator};
///
/// struct ProductFilters;
///
/// static SCHEMA: LazyLock<FilterSchema> = LazyLock::new(|| {
///     FilterSchema::builder()
///         .filter(FilterField::string("name"))
///         .filter(FilterField::int("quantity"))
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
/// async fn list_products(filters: DelimitedQuery<ProductFilters>) -> String {
///     format!("filtering: {}", filters.is_active())
/// }
///
/// let app: Router = Router::new().route("/products", get(list_products));
/// ```
pub struct DelimitedQuery<M> {
    instance: FilterInstance,
    _model: PhantomData<fn() -> M>,
}

impl<M> DelimitedQuery<M> {
    /// Consumes the extractor, returning the decoded filters.
    pub fn into_filters(self) -> FilterInstance {
        self.instance
    }
}

impl<M> Deref for DelimitedQuery<M> {
    type Target = FilterInstance;

    fn deref(&self) -> &FilterInstance {
        &self.instance
    }
}

impl<M> fmt::Debug for DelimitedQuery<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DelimitedQuery").field(&self.instance).finish()
    }
}

impl<M, S> FromRequestParts<S> for DelimitedQuery<M>
where
    M: FilterModel,
    S: Send + Sync,
{
    type Rejection = FilterRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<Config>()
            .copied()
            .unwrap_or_default();
        let query = parts.uri.query().unwrap_or_default();
        let instance = DelimitedDecoder::with_config(M::schema(), config).decode_str(query)?;
        Ok(DelimitedQuery {
            instance,
            _model: PhantomData,
        })
    }
}

/// Extractor decoding deep-object-style filter parameters against `M`'s
/// schema.
///
/// The deep-object twin of [`DelimitedQuery`]: `?name[contains]=shell`
/// extracts the same filters `?name=contains:shell` does there.
pub struct DeepObjectQuery<M> {
    instance: FilterInstance,
    _model: PhantomData<fn() -> M>,
}

impl<M> DeepObjectQuery<M> {
    /// Consumes the extractor, returning the decoded filters.
    pub fn into_filters(self) -> FilterInstance {
        self.instance
    }
}

impl<M> Deref for DeepObjectQuery<M> {
    type Target = FilterInstance;

    fn deref(&self) -> &FilterInstance {
        &self.instance
    }
}

impl<M> fmt::Debug for DeepObjectQuery<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeepObjectQuery").field(&self.instance).finish()
    }
}

impl<M, S> FromRequestParts<S> for DeepObjectQuery<M>
where
    M: FilterModel,
    S: Send + Sync,
{
    type Rejection = FilterRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let instance = DeepObjectDecoder::new(M::schema()).decode_str(query)?;
        Ok(DeepObjectQuery {
            instance,
            _model: PhantomData,
        })
    }
}

/// Rejection returned when filter extraction fails.
///
/// Malformed query strings map to 400; validation failures map to 422 with
/// a JSON body listing every field error under `detail`.
#[derive(Debug, thiserror::Error)]
pub enum FilterRejection {
    #[error("failed to parse query string: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid filter parameters: {0}")]
    Validation(#[from] ValidationErrors),
}

impl From<Error> for FilterRejection {
    fn from(error: Error) -> Self {
        match error {
            Error::Parse(error) => FilterRejection::Parse(error),
            Error::Validation(errors) => FilterRejection::Validation(errors),
        }
    }
}

impl IntoResponse for FilterRejection {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            FilterRejection::Parse(error) => (
                StatusCode::BAD_REQUEST,
                json!({ "detail": error.to_string() }),
            ),
            FilterRejection::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "detail": errors }))
            }
        };
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

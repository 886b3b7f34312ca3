#![cfg(feature = "axum")]

use std::sync::LazyLock;

use axum_framework as axum;

use axum::extract::FromRequestParts;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use filter_qs::axum::{DeepObjectQuery, DelimitedQuery, FilterRejection};
use filter_qs::{Config, FilterField, FilterModel, FilterSchema, FilterValue, Operator};
use pretty_assertions::assert_eq;

struct ProductFilters;

static SCHEMA: LazyLock<FilterSchema> = LazyLock::new(|| {
    FilterSchema::builder()
        .filter(FilterField::string("name"))
        .filter(FilterField::int("quantity").operators(&[
            Operator::Eq,
            Operator::Gt,
            Operator::IsEmpty,
        ]))
        .build()
        .expect("valid filter schema")
});

impl FilterModel for ProductFilters {
    fn schema() -> &'static FilterSchema {
        &SCHEMA
    }
}

fn parts_for(uri: &str) -> axum::http::request::Parts {
    let req = Request::builder().uri(uri).body(()).unwrap();
    let (parts, ()) = req.into_parts();
    parts
}

#[test]
fn extracts_delimited_filters() {
    futures::executor::block_on(async {
        let mut parts = parts_for("/products?name=contains:shell&quantity=gt:3");
        let filters = DelimitedQuery::<ProductFilters>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(
            filters.attribute("name").unwrap().values(Operator::Contains),
            [FilterValue::Str("shell".into())]
        );
        assert_eq!(
            filters.attribute("quantity").unwrap().values(Operator::Gt),
            [FilterValue::Int(3)]
        );
        assert!(filters.is_active());
    })
}

#[test]
fn extracts_deep_object_filters() {
    futures::executor::block_on(async {
        let mut parts = parts_for("/products?name[contains]=shell&quantity[is_empty]=true");
        let filters = DeepObjectQuery::<ProductFilters>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(
            filters.attribute("name").unwrap().values(Operator::Contains),
            [FilterValue::Str("shell".into())]
        );
        assert!(filters.attribute("quantity").unwrap().has_flag(Operator::IsEmpty));
    })
}

#[test]
fn missing_query_string_extracts_an_empty_instance() {
    futures::executor::block_on(async {
        let mut parts = parts_for("/products");
        let filters = DelimitedQuery::<ProductFilters>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(!filters.is_active());
        assert!(filters.attribute("name").unwrap().is_empty());
    })
}

#[test]
fn validation_failures_reject_with_422() {
    futures::executor::block_on(async {
        let mut parts = parts_for("/products?name=bogus:x&quantity=gt:abc");
        let rejection = DelimitedQuery::<ProductFilters>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        let FilterRejection::Validation(ref errors) = rejection else {
            panic!("expected a validation rejection");
        };
        assert_eq!(errors.len(), 2);

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    })
}

#[test]
fn parse_failures_reject_with_400() {
    futures::executor::block_on(async {
        let mut parts = parts_for("/products?name=eq:%FF");
        let rejection = DelimitedQuery::<ProductFilters>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(rejection, FilterRejection::Parse(_)));
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    })
}

#[test]
fn config_comes_from_request_extensions() {
    futures::executor::block_on(async {
        let req = Request::builder()
            .uri("/products?name=contains~a:b")
            .extension(Config::new().delimiter('~'))
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();
        let filters = DelimitedQuery::<ProductFilters>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(
            filters.attribute("name").unwrap().values(Operator::Contains),
            [FilterValue::Str("a:b".into())]
        );
    })
}

#[test]
fn into_filters_returns_the_owned_instance() {
    futures::executor::block_on(async {
        let mut parts = parts_for("/products?name=eq:x");
        let filters = DelimitedQuery::<ProductFilters>::from_request_parts(&mut parts, &())
            .await
            .unwrap()
            .into_filters();
        assert_eq!(
            filters.attribute("name").unwrap().values(Operator::Eq),
            [FilterValue::Str("x".into())]
        );
    })
}

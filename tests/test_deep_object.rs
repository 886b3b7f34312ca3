use std::sync::LazyLock;

use filter_qs::{
    deep_object_from_str, delimited_from_str, DeepObjectDecoder, Error, FieldErrorKind,
    FilterField, FilterInstance, FilterModel, FilterSchema, FilterValue, Loc, Operator,
    PlainField, ScalarKind,
};
use pretty_assertions::assert_eq;

struct ProductFilters;

static SCHEMA: LazyLock<FilterSchema> = LazyLock::new(|| {
    FilterSchema::builder()
        .filter(FilterField::string("name"))
        .filter(FilterField::int("quantity").operators(&[
            Operator::Eq,
            Operator::Gt,
            Operator::Lt,
            Operator::IsEmpty,
        ]))
        .filter(FilterField::float("rating"))
        .filter(FilterField::string("tag").alias("label"))
        .plain(PlainField::new("limit", ScalarKind::Int))
        .build()
        .expect("valid filter schema")
});

impl FilterModel for ProductFilters {
    fn schema() -> &'static FilterSchema {
        &SCHEMA
    }
}

fn decode(query: &str) -> FilterInstance {
    deep_object_from_str::<ProductFilters>(query).expect("query should decode")
}

fn strs(values: &[&str]) -> Vec<FilterValue> {
    values
        .iter()
        .map(|v| FilterValue::Str((*v).to_owned()))
        .collect()
}

#[test]
fn bracketed_keys_decode_into_operator_buckets() {
    let filters = decode("name[contains]=shell&name[neq]=shell%20beach&quantity[gt]=3");
    let name = filters.attribute("name").unwrap();
    assert_eq!(name.values(Operator::Contains), strs(&["shell"]));
    assert_eq!(name.values(Operator::Neq), strs(&["shell beach"]));
    assert_eq!(
        filters.attribute("quantity").unwrap().values(Operator::Gt),
        [FilterValue::Int(3)]
    );
    assert!(filters.is_active());
}

#[test]
fn both_styles_decode_to_the_same_instance() {
    let deep = decode("name[contains]=shell&name[neq]=shell%20beach&quantity[gt]=3");
    let delimited = delimited_from_str::<ProductFilters>(
        "name=contains:shell&name=neq:shell+beach&quantity=gt:3",
    )
    .unwrap();
    assert_eq!(deep, delimited);

    let deep = decode("quantity[is_empty]=true");
    let delimited = delimited_from_str::<ProductFilters>("quantity=is_empty").unwrap();
    assert_eq!(deep, delimited);
}

#[test]
fn repeated_pairs_keep_the_last_value() {
    let filters = decode("name[eq]=a&name[eq]=b");
    assert_eq!(
        filters.attribute("name").unwrap().values(Operator::Eq),
        strs(&["b"])
    );
}

#[test]
fn binding_names_are_accepted() {
    let filters = decode("name__eq=a&quantity__gt=2");
    assert_eq!(
        filters.attribute("name").unwrap().values(Operator::Eq),
        strs(&["a"])
    );
    assert_eq!(
        filters.attribute("quantity").unwrap().values(Operator::Gt),
        [FilterValue::Int(2)]
    );
}

#[test]
fn bracketed_keys_resolve_by_alias_and_binding_keys_by_name() {
    let filters = decode("label[eq]=sale");
    assert_eq!(
        filters.attribute("tag").unwrap().values(Operator::Eq),
        strs(&["sale"])
    );

    let filters = decode("tag__eq=sale");
    assert_eq!(
        filters.attribute("tag").unwrap().values(Operator::Eq),
        strs(&["sale"])
    );

    // the attribute name in brackets is not a wire key when aliased
    let filters = decode("tag[eq]=sale");
    assert!(filters.attribute("tag").unwrap().is_empty());
}

#[test]
fn flag_pairs_take_a_boolean_literal() {
    for literal in ["true", "True", "1"] {
        let filters = decode(&format!("quantity[is_empty]={literal}"));
        let quantity = filters.attribute("quantity").unwrap();
        assert!(quantity.has_flag(Operator::IsEmpty), "literal `{literal}`");
        assert!(quantity.values(Operator::IsEmpty).is_empty());
    }
}

#[test]
fn falsy_or_bad_flag_literals_are_rejected() {
    for literal in ["false", "0", "yes", ""] {
        let err =
            deep_object_from_str::<ProductFilters>(&format!("quantity[is_empty]={literal}"))
                .unwrap_err();
        let Error::Validation(errors) = err else {
            panic!("expected a validation error for literal `{literal}`");
        };
        let error = &errors.errors()[0];
        assert_eq!(error.kind, FieldErrorKind::InvalidFlag);
        assert_eq!(error.msg, "unexpected value; permitted: true");
        assert_eq!(
            error.loc,
            vec![Loc::Key("quantity".into()), Loc::Key("is_empty".into())]
        );
    }
}

#[test]
fn bare_attribute_keys_are_reserved_and_ignored() {
    // the umbrella parameter documents the style but never carries data
    let filters = decode("name=shell");
    assert!(filters.attribute("name").unwrap().is_empty());
    assert!(!filters.is_active());
}

#[test]
fn keys_without_values_are_dropped() {
    let filters = decode("name[eq]&quantity[is_empty]");
    assert!(filters.attribute("name").unwrap().is_empty());
    assert!(!filters.attribute("quantity").unwrap().has_flag(Operator::IsEmpty));
}

#[test]
fn explicitly_empty_values_stay_empty_strings() {
    let filters = decode("name[eq]=");
    assert_eq!(
        filters.attribute("name").unwrap().values(Operator::Eq),
        strs(&[""])
    );
}

#[test]
fn unknown_operator_keys_are_rejected() {
    let err = deep_object_from_str::<ProductFilters>("name[bogus]=x").unwrap_err();
    let Error::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    let error = &errors.errors()[0];
    assert_eq!(error.kind, FieldErrorKind::UnknownOperator);
    assert_eq!(
        error.loc,
        vec![Loc::Key("name".into()), Loc::Key("bogus".into())]
    );
}

#[test]
fn disallowed_operator_keys_are_rejected() {
    let err = deep_object_from_str::<ProductFilters>("quantity[gte]=5").unwrap_err();
    let Error::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.errors()[0].kind, FieldErrorKind::OperatorNotAllowed);
}

#[test]
fn all_field_errors_are_aggregated() {
    let err =
        deep_object_from_str::<ProductFilters>("quantity[gt]=abc&name[bogus]=x&rating[eq]=five")
            .unwrap_err();
    let Error::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    let kinds: Vec<FieldErrorKind> = errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldErrorKind::UnknownOperator,
            FieldErrorKind::InvalidValue,
            FieldErrorKind::InvalidValue,
        ]
    );
}

#[test]
fn malformed_bracket_keys_are_ignored() {
    for query in ["name[=x", "name[]=x", "name[eq]]=x", "name[a][b]=x"] {
        let filters = decode(query);
        assert!(
            filters.attribute("name").unwrap().is_empty(),
            "query `{query}` should decode to nothing"
        );
    }
}

#[test]
fn plain_fields_pass_through() {
    let filters = decode("limit=10&limit=25");
    assert_eq!(filters.plain("limit"), Some("25"));
}

#[test]
fn undeclared_parameters_are_ignored() {
    let filters = decode("sort[field]=name&name[eq]=x");
    assert_eq!(
        filters.attribute("name").unwrap().values(Operator::Eq),
        strs(&["x"])
    );
}

#[test]
fn decode_pairs_accepts_predecoded_input() {
    let decoder = DeepObjectDecoder::new(&SCHEMA);
    let filters = decoder
        .decode_pairs([
            ("name[contains]", Some("shell beach")),
            ("quantity[is_empty]", Some("true")),
            ("name[eq]", None),
        ])
        .unwrap();
    assert_eq!(
        filters.attribute("name").unwrap().values(Operator::Contains),
        strs(&["shell beach"])
    );
    assert!(filters.attribute("quantity").unwrap().has_flag(Operator::IsEmpty));
    assert!(filters.attribute("name").unwrap().values(Operator::Eq).is_empty());
}

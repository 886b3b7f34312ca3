//! OpenAPI post-processing.
//!
//! Umbrella `deepObject` parameters and delimited token lists exist only for
//! extraction as far as a router is concerned, so the built OpenAPI document
//! knows nothing about them. [`FilterDocs`] collects the synthesized
//! [`ParamSpec`] lists per route while the router is assembled and injects
//! the documented parameters afterwards, as a [`Modify`] pass over the
//! finished document.

use tracing::{debug, warn};
use utoipa::openapi::path::{
    HttpMethod, Operation, Parameter, ParameterBuilder, ParameterIn, ParameterStyle,
};
use utoipa::openapi::schema::{
    ArrayBuilder, KnownFormat, ObjectBuilder, Schema, SchemaFormat, SchemaType, Type,
};
use utoipa::openapi::{OpenApi, RefOr, Required};
use utoipa::Modify;

use crate::params::{OperatorSchema, ParamSpec, ParamStyle, ParamType};
use crate::schema::ScalarKind;

/// Deferred filter documentation for a set of routes.
///
/// Register each route's parameter list while building the application, then
/// apply the whole registry once to the finished document. The pass is
/// idempotent: a parameter name already documented on an operation is left
/// alone.
///
/// ```
/// use filter_qs::openapi::FilterDocs;
/// use filter_qs::{delimited_params, Config, FilterField, FilterSchema};
/// use utoipa::Modify;
///
/// let schema = FilterSchema::builder()
///     .filter(FilterField::string("name"))
///     .build()
///     .unwrap();
///
/// let docs = FilterDocs::new().route("/products", delimited_params(&schema, Config::new()));
///
/// let mut openapi = utoipa::openapi::OpenApiBuilder::new().build();
/// docs.modify(&mut openapi);
/// ```
#[derive(Debug, Default)]
pub struct FilterDocs {
    routes: Vec<RouteParams>,
}

#[derive(Debug)]
struct RouteParams {
    path: String,
    method: Option<HttpMethod>,
    params: Vec<ParamSpec>,
}

impl FilterDocs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `params` for every operation on `path`.
    pub fn route(mut self, path: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        self.routes.push(RouteParams {
            path: path.into(),
            method: None,
            params,
        });
        self
    }

    /// Registers `params` for a single method of `path`.
    pub fn route_method(
        mut self,
        path: impl Into<String>,
        method: HttpMethod,
        params: Vec<ParamSpec>,
    ) -> Self {
        self.routes.push(RouteParams {
            path: path.into(),
            method: Some(method),
            params,
        });
        self
    }
}

impl Modify for FilterDocs {
    fn modify(&self, openapi: &mut OpenApi) {
        for route in &self.routes {
            let Some(item) = openapi.paths.paths.get_mut(route.path.as_str()) else {
                warn!(path = %route.path, "no such path in the OpenAPI document");
                continue;
            };
            let operations = [
                (HttpMethod::Get, item.get.as_mut()),
                (HttpMethod::Put, item.put.as_mut()),
                (HttpMethod::Post, item.post.as_mut()),
                (HttpMethod::Delete, item.delete.as_mut()),
                (HttpMethod::Options, item.options.as_mut()),
                (HttpMethod::Head, item.head.as_mut()),
                (HttpMethod::Patch, item.patch.as_mut()),
                (HttpMethod::Trace, item.trace.as_mut()),
            ];
            for (method, operation) in operations {
                let Some(operation) = operation else { continue };
                if route.method.as_ref().is_none_or(|m| *m == method) {
                    document_operation(operation, &route.params);
                }
            }
        }
    }
}

fn document_operation(operation: &mut Operation, params: &[ParamSpec]) {
    for spec in params.iter().filter(|spec| spec.include_in_docs) {
        let documented = operation
            .parameters
            .as_ref()
            .is_some_and(|parameters| parameters.iter().any(|p| p.name == spec.wire_name));
        if documented {
            debug!(name = %spec.wire_name, "parameter already documented, skipping");
            continue;
        }
        operation
            .parameters
            .get_or_insert_with(Vec::new)
            .push(wire_parameter(spec));
    }
}

fn wire_parameter(spec: &ParamSpec) -> Parameter {
    let mut builder = ParameterBuilder::new()
        .name(spec.wire_name.clone())
        .parameter_in(ParameterIn::Query)
        .required(Required::False);

    builder = match spec.style {
        ParamStyle::DeepObject => builder
            .style(Some(ParameterStyle::DeepObject))
            .explode(Some(true))
            .description(Some(umbrella_description(spec)))
            .schema(spec.operator_schema.as_ref().map(operator_object)),
        ParamStyle::Form => builder
            .description(spec.description.clone())
            .schema(Some(form_schema(spec))),
    };

    if let Some(example) = &spec.example {
        builder = builder.example(Some(serde_json::Value::String(example.clone())));
    }
    builder.build()
}

/// Lists the allowed operator keys, with any custom description up front.
fn umbrella_description(spec: &ParamSpec) -> String {
    let keywords = spec
        .operator_schema
        .as_ref()
        .map(|schema| {
            schema
                .operators
                .iter()
                .map(|operator| operator.as_str())
                .collect::<Vec<_>>()
                .join("`, `")
        })
        .unwrap_or_default();
    let generated = format!("Allowed keys: `{keywords}`.");
    match &spec.description {
        Some(custom) => format!("{custom}. {generated}"),
        None => generated,
    }
}

/// The umbrella object schema: an array property per value operator and a
/// boolean per flag operator.
fn operator_object(schema: &OperatorSchema) -> RefOr<Schema> {
    let mut object = ObjectBuilder::new();
    for &operator in &schema.operators {
        if operator.is_flag() {
            object = object.property(
                operator.as_str(),
                ObjectBuilder::new().schema_type(SchemaType::Type(Type::Boolean)),
            );
        } else {
            object = object.property(
                operator.as_str(),
                ArrayBuilder::new()
                    .items(RefOr::T(Schema::Object(scalar_object(schema.kind).build()))),
            );
        }
    }
    object.into()
}

fn form_schema(spec: &ParamSpec) -> RefOr<Schema> {
    match spec.ty {
        ParamType::StringList => {
            let mut item = ObjectBuilder::new().schema_type(SchemaType::Type(Type::String));
            if let Some(pattern) = &spec.pattern {
                item = item.pattern(Some(pattern.clone()));
            }
            ArrayBuilder::new()
                .items(RefOr::T(Schema::Object(item.build())))
                .into()
        }
        ParamType::Scalar(kind) => scalar_object(kind).into(),
        ParamType::Object => ObjectBuilder::new()
            .schema_type(SchemaType::Type(Type::Object))
            .into(),
    }
}

fn scalar_object(kind: ScalarKind) -> ObjectBuilder {
    let object = ObjectBuilder::new();
    match kind {
        ScalarKind::Str | ScalarKind::Decimal => object.schema_type(SchemaType::Type(Type::String)),
        ScalarKind::Int => object
            .schema_type(SchemaType::Type(Type::Integer))
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64))),
        ScalarKind::Float => object
            .schema_type(SchemaType::Type(Type::Number))
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Double))),
        ScalarKind::Bool => object.schema_type(SchemaType::Type(Type::Boolean)),
        ScalarKind::Date => object
            .schema_type(SchemaType::Type(Type::String))
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Date))),
        ScalarKind::DateTime => object
            .schema_type(SchemaType::Type(Type::String))
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::DateTime))),
        ScalarKind::Uuid => object
            .schema_type(SchemaType::Type(Type::String))
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid))),
    }
}

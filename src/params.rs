//! Wire-parameter synthesis.
//!
//! Turns a [`FilterSchema`] into the flat list of parameter descriptors a
//! request framework needs to extract and document each wire style. The
//! descriptors are framework-neutral; the `openapi` feature renders them
//! into OpenAPI operation parameters.

use crate::config::Config;
use crate::schema::{FieldRule, FilterField, FilterSchema, Operator, PlainField, ScalarKind};

/// Separator joining attribute and operator in synthesized binding names.
pub const BINDING_SEPARATOR: &str = "__";

/// How a wire parameter is encoded in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// Plain `key=value` form parameter.
    Form,
    /// OpenAPI `deepObject` umbrella parameter.
    DeepObject,
}

/// The wire-level type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// A repeatable list of raw token strings.
    StringList,
    /// A single scalar of the given kind.
    Scalar(ScalarKind),
    /// A structured object; deep-object umbrella parameters only.
    Object,
}

/// The restricted operator mapping documented on an umbrella parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSchema {
    pub kind: ScalarKind,
    pub operators: Vec<Operator>,
}

/// One synthesized wire parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Binding name, e.g. `quantity` or `quantity__gt`.
    pub name: String,
    /// Name on the wire, e.g. `quantity` or `quantity[gt]`.
    pub wire_name: String,
    pub style: ParamStyle,
    pub ty: ParamType,
    /// Filter parameters are always optional.
    pub required: bool,
    /// Token validation pattern, delimited string-list parameters only.
    pub pattern: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    /// Hidden parameters exist for extraction only and stay out of the
    /// documented parameter list.
    pub include_in_docs: bool,
    /// Restricted operator schema, umbrella parameters only.
    pub operator_schema: Option<OperatorSchema>,
}

/// Synthesizes the delimited-style parameter list: one repeatable string
/// parameter per filter attribute plus one scalar per plain field, in
/// declaration order.
pub fn delimited_params(schema: &FilterSchema, config: Config) -> Vec<ParamSpec> {
    schema
        .fields()
        .iter()
        .map(|rule| match rule {
            FieldRule::Filter(field) => delimited_filter_param(field, config),
            FieldRule::Plain(field) => plain_param(field),
        })
        .collect()
}

/// Synthesizes the deep-object parameter list: per filter attribute, one
/// hidden extraction parameter per allowed operator followed by the
/// documented umbrella parameter; plain fields as in the delimited style.
pub fn deep_object_params(schema: &FilterSchema) -> Vec<ParamSpec> {
    let mut params = Vec::new();
    for rule in schema.fields() {
        match rule {
            FieldRule::Filter(field) => {
                for &operator in &field.operators {
                    params.push(operator_param(field, operator));
                }
                params.push(umbrella_param(field));
            }
            FieldRule::Plain(field) => params.push(plain_param(field)),
        }
    }
    params
}

fn delimited_filter_param(field: &FilterField, config: Config) -> ParamSpec {
    let keywords: Vec<&str> = field.operators.iter().map(|op| op.as_str()).collect();
    let generated = format!(
        "Allowed operators: `{}`. Default operator `{}`",
        keywords.join("`, `"),
        field.default_operator
    );
    ParamSpec {
        name: field.name.to_owned(),
        wire_name: field.wire_name().to_owned(),
        style: ParamStyle::Form,
        ty: ParamType::StringList,
        required: false,
        pattern: Some(token_pattern(&keywords, config.delimiter)),
        description: Some(join_description(field.description, generated)),
        example: field.example.map(str::to_owned),
        include_in_docs: true,
        operator_schema: None,
    }
}

fn operator_param(field: &FilterField, operator: Operator) -> ParamSpec {
    // flags surface as booleans regardless of the attribute kind
    let kind = if operator.is_flag() {
        ScalarKind::Bool
    } else {
        field.kind
    };
    ParamSpec {
        name: format!("{}{}{}", field.name, BINDING_SEPARATOR, operator),
        wire_name: format!("{}[{}]", field.wire_name(), operator),
        style: ParamStyle::Form,
        ty: ParamType::Scalar(kind),
        required: false,
        pattern: None,
        description: None,
        example: None,
        include_in_docs: false,
        operator_schema: None,
    }
}

fn umbrella_param(field: &FilterField) -> ParamSpec {
    ParamSpec {
        name: field.name.to_owned(),
        wire_name: field.wire_name().to_owned(),
        style: ParamStyle::DeepObject,
        ty: ParamType::Object,
        required: false,
        pattern: None,
        description: field.description.map(str::to_owned),
        example: field.example.map(str::to_owned),
        include_in_docs: true,
        operator_schema: Some(OperatorSchema {
            kind: field.kind,
            operators: field.operators.clone(),
        }),
    }
}

fn plain_param(field: &PlainField) -> ParamSpec {
    ParamSpec {
        name: field.name.to_owned(),
        wire_name: field.name.to_owned(),
        style: ParamStyle::Form,
        ty: ParamType::Scalar(field.kind),
        required: false,
        pattern: None,
        description: field.description.map(str::to_owned),
        example: None,
        include_in_docs: true,
        operator_schema: None,
    }
}

fn join_description(custom: Option<&'static str>, generated: String) -> String {
    match custom {
        Some(custom) => format!("{custom}. {generated}"),
        None => generated,
    }
}

/// Builds the token pattern, e.g. `^(eq:|neq:)?[^:]+$` for delimiter `:`:
/// either a bare value or an allowed keyword, the delimiter and the value.
fn token_pattern(keywords: &[&str], delimiter: char) -> String {
    let delimiter = escape_regex_char(delimiter);
    let mut pattern = String::from("^(");
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            pattern.push('|');
        }
        pattern.push_str(keyword);
        pattern.push_str(&delimiter);
    }
    pattern.push_str(")?[^");
    pattern.push_str(&delimiter);
    pattern.push_str("]+$");
    pattern
}

fn escape_regex_char(c: char) -> String {
    match c {
        '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        | '-' => format!("\\{c}"),
        _ => c.to_string(),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::schema::FilterSchema;

    fn schema() -> FilterSchema {
        FilterSchema::builder()
            .filter(
                FilterField::string("name")
                    .operators(&[Operator::Eq, Operator::Neq, Operator::Contains])
                    .description("product name"),
            )
            .filter(
                FilterField::int("quantity")
                    .alias("qty")
                    .operators(&[Operator::Eq, Operator::Gt, Operator::IsEmpty]),
            )
            .plain(PlainField::new("limit", ScalarKind::Int).description("page size"))
            .build()
            .unwrap()
    }

    #[test]
    fn delimited_params_are_one_per_field() {
        let params = delimited_params(&schema(), Config::new());
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "quantity", "limit"]);
        assert!(params.iter().all(|p| !p.required && p.include_in_docs));
    }

    #[test]
    fn delimited_filter_params_document_their_operators() {
        let params = delimited_params(&schema(), Config::new());
        let name = &params[0];
        assert_eq!(name.ty, ParamType::StringList);
        assert_eq!(
            name.pattern.as_deref(),
            Some("^(eq:|neq:|contains:)?[^:]+$")
        );
        assert_eq!(
            name.description.as_deref(),
            Some("product name. Allowed operators: `eq`, `neq`, `contains`. Default operator `eq`")
        );
    }

    #[test]
    fn delimited_params_respect_aliases_and_custom_delimiters() {
        let params = delimited_params(&schema(), Config::new().delimiter('~'));
        let quantity = &params[1];
        assert_eq!(quantity.name, "quantity");
        assert_eq!(quantity.wire_name, "qty");
        assert_eq!(
            quantity.pattern.as_deref(),
            Some("^(eq~|gt~|is_empty~)?[^~]+$")
        );
    }

    #[test]
    fn regex_special_delimiters_are_escaped() {
        let params = delimited_params(&schema(), Config::new().delimiter('|'));
        assert_eq!(
            params[0].pattern.as_deref(),
            Some("^(eq\\||neq\\||contains\\|)?[^\\|]+$")
        );
    }

    #[test]
    fn deep_object_params_pair_hidden_extractors_with_umbrellas() {
        let params = deep_object_params(&schema());
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "name__eq",
                "name__neq",
                "name__contains",
                "name",
                "quantity__eq",
                "quantity__gt",
                "quantity__is_empty",
                "quantity",
                "limit",
            ]
        );

        let hidden = &params[0];
        assert_eq!(hidden.wire_name, "name[eq]");
        assert_eq!(hidden.ty, ParamType::Scalar(ScalarKind::Str));
        assert!(!hidden.include_in_docs);

        let umbrella = &params[3];
        assert_eq!(umbrella.style, ParamStyle::DeepObject);
        assert_eq!(umbrella.ty, ParamType::Object);
        assert!(umbrella.include_in_docs);
        assert_eq!(
            umbrella.operator_schema,
            Some(OperatorSchema {
                kind: ScalarKind::Str,
                operators: vec![Operator::Eq, Operator::Neq, Operator::Contains],
            })
        );
    }

    #[test]
    fn hidden_params_use_the_wire_alias_in_brackets() {
        let params = deep_object_params(&schema());
        let gt = params.iter().find(|p| p.name == "quantity__gt").unwrap();
        assert_eq!(gt.wire_name, "qty[gt]");
        assert_eq!(gt.ty, ParamType::Scalar(ScalarKind::Int));
    }

    #[test]
    fn flag_extractors_surface_as_booleans() {
        let params = deep_object_params(&schema());
        let flag = params
            .iter()
            .find(|p| p.name == "quantity__is_empty")
            .unwrap();
        assert_eq!(flag.ty, ParamType::Scalar(ScalarKind::Bool));
        assert_eq!(flag.wire_name, "qty[is_empty]");
    }

    #[test]
    fn plain_params_keep_their_kind() {
        let params = deep_object_params(&schema());
        let limit = params.last().unwrap();
        assert_eq!(limit.ty, ParamType::Scalar(ScalarKind::Int));
        assert_eq!(limit.description.as_deref(), Some("page size"));
        assert_eq!(limit.operator_schema, None);
    }
}

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, Value,
    sea_query::{Expr, LikeExpr},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt};

use crate::errors::ApiError;

/// Escape character for `LIKE` patterns
const LIKE_ESCAPE: char = '!';

/// Field name to condition, ANDed together
pub type WhereInput = BTreeMap<String, FieldCondition>;

/// Value kind of a filterable column; request values are converted to it
/// before they reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    DateTime,
}

impl FieldKind {
    fn is_ordered(self) -> bool {
        !matches!(self, Self::Boolean)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "a string",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::DateTime => "an RFC 3339 timestamp",
        };
        f.write_str(name)
    }
}

/// Condition on a single field.
///
/// `{"name": "Ritz"}` is shorthand for equality and `{"name": null}` requires
/// the field to be null. Anything else goes through [`FieldOperators`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldCondition {
    Operators(FieldOperators),
    Value(JsonValue),
}

/// Operator form of a field condition; every present operator must hold.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldOperators {
    /// `Some(None)` is an explicit `null` and matches unset fields.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub equals: Option<Option<JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub not: Option<Option<JsonValue>>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub in_list: Option<Vec<JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_in: Option<Vec<JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_set: Option<bool>,
}

#[derive(Clone, Copy)]
enum Comparison {
    Lt,
    Lte,
    Gt,
    Gte,
}

/// Build the ANDed condition for a `where` map.
///
/// `fields` lists the filterable columns of the resource with their kinds.
///
/// # Errors
/// `BadRequest` for an unknown field, a value of the wrong kind, or an
/// operator that does not apply to the field's kind.
pub fn build_condition<C>(
    filter: &WhereInput,
    fields: &[(&'static str, C, FieldKind)],
) -> Result<Condition, ApiError>
where
    C: ColumnTrait,
{
    let mut condition = Condition::all();
    for (name, field_condition) in filter {
        let &(_, column, kind) = fields
            .iter()
            .find(|(field, _, _)| field == name)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown filter field '{name}'")))?;
        condition = condition.add(field_condition_expr(name, column, kind, field_condition)?);
    }
    Ok(condition)
}

fn field_condition_expr<C: ColumnTrait>(
    name: &str,
    column: C,
    kind: FieldKind,
    field_condition: &FieldCondition,
) -> Result<Condition, ApiError> {
    match field_condition {
        FieldCondition::Value(JsonValue::Null) => Ok(Condition::all().add(column.is_null())),
        FieldCondition::Value(value) => {
            Ok(Condition::all().add(column.eq(to_db_value(name, kind, value)?)))
        }
        FieldCondition::Operators(operators) => operator_condition(name, column, kind, operators),
    }
}

fn operator_condition<C: ColumnTrait>(
    name: &str,
    column: C,
    kind: FieldKind,
    operators: &FieldOperators,
) -> Result<Condition, ApiError> {
    let mut condition = Condition::all();

    match &operators.equals {
        Some(Some(value)) => condition = condition.add(column.eq(to_db_value(name, kind, value)?)),
        Some(None) => condition = condition.add(column.is_null()),
        None => {}
    }
    match &operators.not {
        Some(Some(value)) => condition = condition.add(column.ne(to_db_value(name, kind, value)?)),
        Some(None) => condition = condition.add(column.is_not_null()),
        None => {}
    }
    if let Some(values) = &operators.in_list {
        condition = condition.add(column.is_in(to_db_values(name, kind, values)?));
    }
    if let Some(values) = &operators.not_in {
        condition = condition.add(column.is_not_in(to_db_values(name, kind, values)?));
    }

    for (bound, comparison) in [
        (&operators.lt, Comparison::Lt),
        (&operators.lte, Comparison::Lte),
        (&operators.gt, Comparison::Gt),
        (&operators.gte, Comparison::Gte),
    ] {
        let Some(bound) = bound else { continue };
        if !kind.is_ordered() {
            return Err(ApiError::bad_request(format!(
                "Range operators are not supported on '{name}'"
            )));
        }
        let value = to_db_value(name, kind, bound)?;
        condition = condition.add(match comparison {
            Comparison::Lt => column.lt(value),
            Comparison::Lte => column.lte(value),
            Comparison::Gt => column.gt(value),
            Comparison::Gte => column.gte(value),
        });
    }

    let matchers: [(&Option<String>, fn(&str) -> String); 3] = [
        (&operators.contains, |s| format!("%{s}%")),
        (&operators.starts_with, |s| format!("{s}%")),
        (&operators.ends_with, |s| format!("%{s}")),
    ];
    for (needle, pattern) in matchers {
        let Some(needle) = needle else { continue };
        if kind != FieldKind::Text {
            return Err(ApiError::bad_request(format!(
                "Text matching is only supported on text fields, not '{name}'"
            )));
        }
        let like = LikeExpr::new(pattern(&escape_like_wildcards(needle))).escape(LIKE_ESCAPE);
        condition = condition.add(Expr::col((column.entity_name(), column)).like(like));
    }

    match operators.is_set {
        Some(true) => condition = condition.add(column.is_not_null()),
        Some(false) => condition = condition.add(column.is_null()),
        None => {}
    }

    Ok(condition)
}

fn escape_like_wildcards(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn to_db_values(name: &str, kind: FieldKind, values: &[JsonValue]) -> Result<Vec<Value>, ApiError> {
    values
        .iter()
        .map(|value| to_db_value(name, kind, value))
        .collect()
}

/// Convert a request value to the store type of the field
fn to_db_value(name: &str, kind: FieldKind, value: &JsonValue) -> Result<Value, ApiError> {
    let wrong_kind = || ApiError::bad_request(format!("Value for '{name}' must be {kind}"));
    match (kind, value) {
        (FieldKind::Text, JsonValue::String(s)) => Ok(Value::from(s.clone())),
        (FieldKind::Number, JsonValue::Number(n)) => n.as_f64().map(Value::from).ok_or_else(wrong_kind),
        (FieldKind::Boolean, JsonValue::Bool(b)) => Ok(Value::from(*b)),
        (FieldKind::DateTime, JsonValue::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|parsed| Value::from(parsed.with_timezone(&Utc)))
            .map_err(|_| wrong_kind()),
        _ => Err(wrong_kind()),
    }
}

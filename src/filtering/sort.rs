use sea_orm::{ColumnTrait, sea_query::Order};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC", alias = "Asc")]
    Asc,
    #[serde(alias = "DESC", alias = "Desc")]
    Desc,
}

/// One sort key; keys apply left to right, later keys break ties.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

fn parse_order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

fn parse_direction(raw: &str) -> Result<SortDirection, ApiError> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "asc" => Ok(SortDirection::Asc),
        "desc" => Ok(SortDirection::Desc),
        other => Err(ApiError::bad_request(format!(
            "Unknown sort direction '{other}'"
        ))),
    }
}

/// Parse the `sortBy` query parameter.
///
/// Accepts a JSON array (`[{"field":"name","direction":"desc"}]`) or the
/// compact form `name:desc,rating`.
///
/// # Errors
/// `BadRequest` when the value is neither form.
pub fn parse_sort_param(raw: &str) -> Result<Vec<SortKey>, ApiError> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        return serde_json::from_str(raw)
            .map_err(|e| ApiError::bad_request(format!("Invalid sortBy parameter: {e}")));
    }

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (field, direction) = part.split_once(':').unwrap_or((part, ""));
            Ok(SortKey {
                field: field.trim().to_string(),
                direction: parse_direction(direction.trim())?,
            })
        })
        .collect()
}

/// Resolve sort keys against the sortable columns of a resource.
///
/// # Errors
/// `BadRequest` for a field that is not sortable.
pub fn resolve_sort_keys<C>(keys: &[SortKey], columns: &[(&str, C)]) -> Result<Vec<(C, Order)>, ApiError>
where
    C: ColumnTrait + Copy,
{
    keys.iter()
        .map(|key| {
            columns
                .iter()
                .find(|&&(name, _)| name == key.field)
                .map(|&(_, column)| (column, parse_order(key.direction)))
                .ok_or_else(|| ApiError::bad_request(format!("Unknown sort field '{}'", key.field)))
        })
        .collect()
}

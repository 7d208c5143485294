use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::filtering::{SortKey, WhereInput, parse_sort_param};

/// Filter descriptor understood by the query builder.
///
/// ```json
/// {
///   "where": {"rating": {"gte": 4}, "name": {"contains": "Grand"}},
///   "sortBy": [{"field": "rating", "direction": "desc"}],
///   "skip": 0,
///   "take": 20
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindManyArgs {
    #[serde(rename = "where", default, skip_serializing_if = "WhereInput::is_empty")]
    pub filter: WhereInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<SortKey>,
}

impl FindManyArgs {
    /// Only the predicate; what `count` and the meta endpoint look at
    #[must_use]
    pub fn filtered(filter: WhereInput) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// Query-string form of [`FindManyArgs`].
///
/// `where` and `sortBy` are JSON-encoded; `sortBy` also accepts the compact
/// `field:asc,other:desc` form.
///
/// ```text
/// GET /api/rooms?where={"price":{"lt":200}}&sortBy=price:desc&skip=0&take=10
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindManyParams {
    #[serde(rename = "where")]
    pub filter: Option<String>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub sort_by: Option<String>,
}

impl FindManyParams {
    /// Decode the JSON-encoded parts.
    ///
    /// # Errors
    /// `BadRequest` when `where` or `sortBy` cannot be parsed.
    pub fn into_args(self) -> Result<FindManyArgs, ApiError> {
        let filter = match self.filter.as_deref().map(str::trim) {
            None | Some("") => WhereInput::new(),
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| ApiError::bad_request(format!("Invalid where parameter: {e}")))?,
        };
        let sort_by = match self.sort_by.as_deref() {
            None => Vec::new(),
            Some(raw) => parse_sort_param(raw)?,
        };
        Ok(FindManyArgs {
            filter,
            skip: self.skip,
            take: self.take,
            sort_by,
        })
    }
}

/// Response of the `meta` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct MetadataDto {
    pub count: u64,
}

/// Reference to a record by identifier, as sent in relationship bodies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
pub struct WhereUniqueInput {
    pub id: String,
}

impl WhereUniqueInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Identifiers of a list of references, in order
#[must_use]
pub fn reference_ids(references: &[WhereUniqueInput]) -> Vec<String> {
    references.iter().map(|reference| reference.id.clone()).collect()
}

//! # Filtering, sorting and pagination
//!
//! Turns the `where` / `sortBy` / `skip` / `take` part of a request into Sea-ORM
//! query pieces. The pieces are always applied in the same order by
//! [`crate::core::query`]: filter, then sort, then offset, then limit.
//!
//! ## Query examples
//!
//! ```text
//! // Equality shorthand and null checks
//! GET /api/hotels?where={"name":"Ritz","rating":null}
//!
//! // Operators, ANDed within a field and across fields
//! GET /api/rooms?where={"price":{"gte":100,"lt":250},"roomType":{"in":["double","suite"]}}
//!
//! // Text matching and presence
//! GET /api/customers?where={"email":{"endsWith":"@example.com"},"phoneNumber":{"isSet":true}}
//!
//! // Multi-key sort and pagination
//! GET /api/hotels?sortBy=rating:desc,name&skip=20&take=10
//! ```
//!
//! Unknown fields, values of the wrong kind and unsupported operators are
//! rejected with `400 Bad Request` rather than silently ignored.

pub mod conditions;
pub mod pagination;
pub mod sort;

pub use conditions::{FieldCondition, FieldKind, FieldOperators, WhereInput, build_condition};
pub use pagination::paginate;
pub use sort::{SortDirection, SortKey, parse_sort_param, resolve_sort_keys};

//! Generic CRUD core: the [`Resource`] trait, the list pipeline, versioned
//! writes and the relationship mutator.

pub mod crud_operations;
pub mod query;
pub mod relations;
pub mod traits;

pub use relations::Relationship;
pub use traits::Resource;

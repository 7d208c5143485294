use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::core::Resource;
use crate::errors::ApiError;

/// Identifier for a record created without one
#[must_use]
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Load the stored row for `id`.
///
/// # Errors
/// `NotFound` when no row has this identifier.
pub async fn find_record<R, C>(db: &C, id: &str) -> Result<R::ModelType, ApiError>
where
    R: Resource,
    C: ConnectionTrait,
{
    R::EntityType::find()
        .filter(R::ID_COLUMN.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(R::RESOURCE_NAME_SINGULAR, Some(id.to_owned())))
}

/// Write `changes` to row `id`, provided it is still at `version`.
///
/// The version column is set to `version + 1` as part of the same statement.
/// When no row matches, the row is looked up again: if it is gone the result
/// is `NotFound`, otherwise someone else wrote it first and the result is
/// `Conflict`.
///
/// # Errors
/// `NotFound` or `Conflict` as above; store failures become `Database`.
pub async fn save_versioned<R, C>(
    db: &C,
    id: &str,
    version: i32,
    mut changes: R::ActiveModelType,
) -> Result<(), ApiError>
where
    R: Resource,
    C: ConnectionTrait,
{
    changes.set(R::VERSION_COLUMN, (version + 1).into());
    let result = R::EntityType::update_many()
        .set(changes)
        .filter(R::ID_COLUMN.eq(id))
        .filter(R::VERSION_COLUMN.eq(version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(stale_write::<R, C>(db, id, version).await);
    }
    Ok(())
}

/// Increment the version of row `id` without changing anything else
///
/// # Errors
/// See [`save_versioned`].
pub async fn touch<R, C>(db: &C, id: &str, version: i32) -> Result<(), ApiError>
where
    R: Resource,
    C: ConnectionTrait,
{
    save_versioned::<R, C>(db, id, version, <R::ActiveModelType as ActiveModelTrait>::default())
        .await
}

async fn stale_write<R, C>(db: &C, id: &str, version: i32) -> ApiError
where
    R: Resource,
    C: ConnectionTrait,
{
    match find_record::<R, C>(db, id).await {
        Ok(current) => {
            tracing::warn!(
                resource = R::RESOURCE_NAME_SINGULAR,
                id,
                expected_version = version,
                current_version = R::record_version(&current),
                "Concurrent modification detected"
            );
            ApiError::conflict(format!(
                "{} '{id}' was modified concurrently",
                R::RESOURCE_NAME_SINGULAR
            ))
        }
        Err(err) => err,
    }
}

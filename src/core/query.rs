//! The list pipeline shared by every resource and relationship.

use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Select};

use crate::core::Resource;
use crate::errors::ApiError;
use crate::filtering::{build_condition, paginate, resolve_sort_keys};
use crate::models::FindManyArgs;

/// Apply `args` to `base`: filter, then sort, then skip, then take.
///
/// `base` may already carry conditions (a relationship scopes it to one
/// parent); the request predicate is ANDed on top.
///
/// # Errors
/// `BadRequest` for unknown filter or sort fields and mistyped values.
pub fn build_select<R: Resource>(
    base: Select<R::EntityType>,
    args: &FindManyArgs,
) -> Result<Select<R::EntityType>, ApiError> {
    let condition = build_condition(&args.filter, &R::filterable_columns())?;
    let order = resolve_sort_keys(&args.sort_by, &R::sortable_columns())?;

    let mut select = base.filter(condition);
    for (column, direction) in order {
        select = select.order_by(column, direction);
    }
    Ok(paginate(select, args.skip, args.take))
}

/// # Errors
/// See [`build_select`]; store failures become `Database`.
pub async fn find_many<R, C>(
    db: &C,
    base: Select<R::EntityType>,
    args: &FindManyArgs,
) -> Result<Vec<R::ModelType>, ApiError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let select = build_select::<R>(base, args)?;
    tracing::debug!(
        resource = R::RESOURCE_NAME_PLURAL,
        filters = args.filter.len(),
        sort_keys = args.sort_by.len(),
        skip = ?args.skip,
        take = ?args.take,
        "Running list query"
    );
    Ok(select.all(db).await?)
}

/// Number of records matching the predicate; sort and pagination are ignored.
///
/// # Errors
/// See [`build_select`].
pub async fn count<R, C>(
    db: &C,
    base: Select<R::EntityType>,
    args: &FindManyArgs,
) -> Result<u64, ApiError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let condition = build_condition(&args.filter, &R::filterable_columns())?;
    Ok(base.filter(condition).count(db).await?)
}

//! # Relationship mutator
//!
//! One engine for every parent/child pair. A [`Relationship`] names the parent
//! resource, the child resource and the child column holding the parent's
//! identifier; the functions here read the affected rows, work out which
//! children change, and write each change back with a versioned update.
//!
//! Two reference policies coexist:
//!
//! - to-many changes ([`connect`], [`replace`]) require at least one of the
//!   supplied child identifiers to resolve, otherwise `NotFound`;
//! - to-one references ([`resolve_reference`]) that do not resolve are ignored
//!   and the foreign key keeps its previous value.
//!
//! Every association change that modifies at least one child also increments
//! the parent's version, so concurrent mutations of one parent collide.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, TransactionTrait, Value,
};
use std::collections::{BTreeSet, HashMap};

use crate::core::{Resource, crud_operations, query};
use crate::errors::ApiError;
use crate::models::FindManyArgs;

/// A has-many / belongs-to pair between two resources.
pub trait Relationship: Send + Sync + 'static {
    type Parent: Resource;
    type Child: Resource;

    /// Child column holding the parent's identifier
    const FOREIGN_KEY: <Self::Child as Resource>::ColumnType;
    /// Path segment for the children of a parent, e.g. `rooms`
    const CHILDREN: &'static str;
    /// Path segment for the parent of a child, e.g. `hotel`
    const PARENT: &'static str;
}

type ChildModel<Rel> = <<Rel as Relationship>::Child as Resource>::ModelType;

/// Link the children in `child_ids` to `parent_id`.
///
/// Identifiers that do not resolve are dropped. Children already linked to
/// this parent are left untouched, so repeating a connect changes nothing.
///
/// # Errors
/// `NotFound` when the parent is missing or none of the identifiers resolve.
pub async fn connect<Rel: Relationship>(
    db: &DatabaseConnection,
    parent_id: &str,
    child_ids: &[String],
) -> Result<(), ApiError> {
    let txn = db.begin().await?;
    let parent = crud_operations::find_record::<Rel::Parent, _>(&txn, parent_id).await?;
    let children = resolve_children::<Rel, _>(&txn, child_ids).await?;
    if children.is_empty() {
        return Err(no_children_resolved::<Rel>());
    }

    let changed = attach::<Rel, _>(&txn, parent_id, children).await?;
    if changed > 0 {
        crud_operations::touch::<Rel::Parent, _>(&txn, parent_id, Rel::Parent::record_version(&parent))
            .await?;
    }
    txn.commit().await?;

    tracing::info!(
        parent = Rel::Parent::RESOURCE_NAME_SINGULAR,
        parent_id,
        children = Rel::CHILDREN,
        changed,
        "Connected children"
    );
    Ok(())
}

/// Unlink the children in `child_ids` from `parent_id`.
///
/// Unresolved identifiers, an empty list and children linked elsewhere are
/// all tolerated.
///
/// # Errors
/// `NotFound` when the parent is missing.
pub async fn disconnect<Rel: Relationship>(
    db: &DatabaseConnection,
    parent_id: &str,
    child_ids: &[String],
) -> Result<(), ApiError> {
    let txn = db.begin().await?;
    let parent = crud_operations::find_record::<Rel::Parent, _>(&txn, parent_id).await?;
    let children = resolve_children::<Rel, _>(&txn, child_ids).await?;

    let mut changed = 0;
    for child in children {
        if linked_parent::<Rel>(&child)?.as_deref() == Some(parent_id) {
            set_parent::<Rel, _>(&txn, child, None).await?;
            changed += 1;
        }
    }
    if changed > 0 {
        crud_operations::touch::<Rel::Parent, _>(&txn, parent_id, Rel::Parent::record_version(&parent))
            .await?;
    }
    txn.commit().await?;

    tracing::info!(
        parent = Rel::Parent::RESOURCE_NAME_SINGULAR,
        parent_id,
        children = Rel::CHILDREN,
        changed,
        "Disconnected children"
    );
    Ok(())
}

/// Make the resolved children in `child_ids` exactly the children of
/// `parent_id`; current children outside that set are unlinked.
///
/// # Errors
/// `NotFound` when the parent is missing or none of the identifiers resolve.
pub async fn replace<Rel: Relationship>(
    db: &DatabaseConnection,
    parent_id: &str,
    child_ids: &[String],
) -> Result<(), ApiError> {
    let txn = db.begin().await?;
    let parent = crud_operations::find_record::<Rel::Parent, _>(&txn, parent_id).await?;
    let children = resolve_children::<Rel, _>(&txn, child_ids).await?;
    if children.is_empty() {
        return Err(no_children_resolved::<Rel>());
    }

    let changed = reconcile::<Rel, _>(&txn, parent_id, children).await?;
    if changed > 0 {
        crud_operations::touch::<Rel::Parent, _>(&txn, parent_id, Rel::Parent::record_version(&parent))
            .await?;
    }
    txn.commit().await?;

    tracing::info!(
        parent = Rel::Parent::RESOURCE_NAME_SINGULAR,
        parent_id,
        children = Rel::CHILDREN,
        changed,
        "Replaced children"
    );
    Ok(())
}

/// List the children of `parent_id` through the query builder.
///
/// The parent itself is not checked; a missing parent simply has no children.
///
/// # Errors
/// `BadRequest` for invalid `args`.
pub async fn find_children<Rel: Relationship>(
    db: &DatabaseConnection,
    parent_id: &str,
    args: &FindManyArgs,
) -> Result<Vec<Rel::Child>, ApiError> {
    let base = <Rel::Child as Resource>::EntityType::find().filter(Rel::FOREIGN_KEY.eq(parent_id));
    let models = query::find_many::<Rel::Child, _>(db, base, args).await?;
    Ok(Rel::Child::project(db, models).await?)
}

/// The parent a child points at.
///
/// # Errors
/// `NotFound` when the child is missing, has no parent, or points at a parent
/// that no longer exists.
pub async fn get_parent<Rel: Relationship>(
    db: &DatabaseConnection,
    child_id: &str,
) -> Result<Rel::Parent, ApiError> {
    let child = crud_operations::find_record::<Rel::Child, _>(db, child_id).await?;
    let parent_id = linked_parent::<Rel>(&child)?.ok_or_else(|| {
        ApiError::not_found(
            format!("{} of {} '{child_id}'", Rel::PARENT, Rel::Child::RESOURCE_NAME_SINGULAR),
            None,
        )
    })?;
    Rel::Parent::get_one(db, &parent_id).await
}

/// Resolve a to-one reference.
///
/// Returns the identifier when a record of `R` exists with it, `None` for an
/// absent or unresolved reference. The caller leaves the foreign key as it
/// was in the `None` case.
///
/// # Errors
/// Only store failures.
pub async fn resolve_reference<R, C>(db: &C, candidate: Option<&str>) -> Result<Option<String>, ApiError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let Some(candidate) = candidate else {
        return Ok(None);
    };
    let found = R::EntityType::find()
        .filter(R::ID_COLUMN.eq(candidate))
        .one(db)
        .await?;
    if found.is_none() {
        tracing::debug!(
            resource = R::RESOURCE_NAME_SINGULAR,
            reference = candidate,
            "Ignoring unresolved reference"
        );
    }
    Ok(found.map(|model| R::record_id(&model).to_owned()))
}

/// Children of each parent in `parent_ids`, by parent, ordered by child id.
///
/// # Errors
/// Only store failures.
pub async fn child_ids<Rel, C>(db: &C, parent_ids: &[String]) -> Result<HashMap<String, Vec<String>>, DbErr>
where
    Rel: Relationship,
    C: ConnectionTrait,
{
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    if parent_ids.is_empty() {
        return Ok(grouped);
    }

    let children = <Rel::Child as Resource>::EntityType::find()
        .filter(Rel::FOREIGN_KEY.is_in(parent_ids.iter().cloned()))
        .order_by_asc(<Rel::Child as Resource>::ID_COLUMN)
        .all(db)
        .await?;
    for child in &children {
        if let Value::String(Some(parent_id)) = child.get(Rel::FOREIGN_KEY) {
            grouped
                .entry(*parent_id)
                .or_default()
                .push(Rel::Child::record_id(child).to_owned());
        }
    }
    Ok(grouped)
}

/// Link `children` to `parent_id` inside an open transaction, skipping those
/// already linked. Returns how many children changed.
///
/// # Errors
/// Versioned write failures on a child.
pub async fn attach<Rel, C>(db: &C, parent_id: &str, children: Vec<ChildModel<Rel>>) -> Result<usize, ApiError>
where
    Rel: Relationship,
    C: ConnectionTrait,
{
    let mut changed = 0;
    for child in children {
        if linked_parent::<Rel>(&child)?.as_deref() != Some(parent_id) {
            set_parent::<Rel, C>(db, child, Some(parent_id)).await?;
            changed += 1;
        }
    }
    Ok(changed)
}

/// Make `children` exactly the children of `parent_id` inside an open
/// transaction. An empty `children` unlinks every current child. Returns how
/// many children changed.
///
/// # Errors
/// Versioned write failures on a child.
pub async fn reconcile<Rel, C>(db: &C, parent_id: &str, children: Vec<ChildModel<Rel>>) -> Result<usize, ApiError>
where
    Rel: Relationship,
    C: ConnectionTrait,
{
    let keep: BTreeSet<String> = children
        .iter()
        .map(|child| Rel::Child::record_id(child).to_owned())
        .collect();

    let current = <Rel::Child as Resource>::EntityType::find()
        .filter(Rel::FOREIGN_KEY.eq(parent_id))
        .all(db)
        .await?;

    let mut changed = 0;
    for child in current {
        if !keep.contains(Rel::Child::record_id(&child)) {
            set_parent::<Rel, C>(db, child, None).await?;
            changed += 1;
        }
    }
    changed += attach::<Rel, C>(db, parent_id, children).await?;
    Ok(changed)
}

/// Load the children among `child_ids` that exist. Duplicates collapse.
///
/// # Errors
/// Only store failures.
pub async fn resolve_children<Rel, C>(db: &C, child_ids: &[String]) -> Result<Vec<ChildModel<Rel>>, ApiError>
where
    Rel: Relationship,
    C: ConnectionTrait,
{
    let unique: BTreeSet<&str> = child_ids.iter().map(String::as_str).collect();
    if unique.is_empty() {
        return Ok(Vec::new());
    }
    let requested = unique.len();
    let children = <Rel::Child as Resource>::EntityType::find()
        .filter(<Rel::Child as Resource>::ID_COLUMN.is_in(unique))
        .all(db)
        .await?;
    if children.len() < requested {
        tracing::debug!(
            children = Rel::CHILDREN,
            requested,
            resolved = children.len(),
            "Dropping unresolved child references"
        );
    }
    Ok(children)
}

fn linked_parent<Rel: Relationship>(child: &ChildModel<Rel>) -> Result<Option<String>, ApiError> {
    match child.get(Rel::FOREIGN_KEY) {
        Value::String(parent_id) => Ok(parent_id.map(|id| *id)),
        other => Err(ApiError::internal(
            "Unexpected foreign key type",
            Some(format!("{}: {other:?}", Rel::CHILDREN)),
        )),
    }
}

async fn set_parent<Rel, C>(db: &C, child: ChildModel<Rel>, parent_id: Option<&str>) -> Result<(), ApiError>
where
    Rel: Relationship,
    C: ConnectionTrait,
{
    let id = Rel::Child::record_id(&child).to_owned();
    let version = Rel::Child::record_version(&child);
    let mut changes = <<Rel::Child as Resource>::ActiveModelType as ActiveModelTrait>::default();
    changes.set(Rel::FOREIGN_KEY, parent_id.map(str::to_owned).into());
    crud_operations::save_versioned::<Rel::Child, C>(db, &id, version, changes).await
}

fn no_children_resolved<Rel: Relationship>() -> ApiError {
    ApiError::not_found(Rel::CHILDREN, None)
}

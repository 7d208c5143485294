use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, ModelTrait, QueryFilter,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::core::{crud_operations, query};
use crate::errors::ApiError;
use crate::filtering::FieldKind;
use crate::models::FindManyArgs;
use crate::validation::Validatable;

/// A record type exposed through the API.
///
/// `Self` is the DTO returned to clients; the associated types tie it to the
/// Sea-ORM entity that stores it. Listing, counting, lookups and deletes come
/// for free; `project`, `create` and `update` are entity specific because they
/// deal with the record's relationships.
#[async_trait]
pub trait Resource: Serialize + Sized + Send + Sync + 'static {
    type EntityType: EntityTrait<
            Model = Self::ModelType,
            Column = Self::ColumnType,
            ActiveModel = Self::ActiveModelType,
        > + Sync;
    type ModelType: ModelTrait<Entity = Self::EntityType> + FromQueryResult + Send + Sync;
    type ColumnType: ColumnTrait;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + Send
        + Sync;
    type CreateModel: Validatable + DeserializeOwned + Send + Sync + 'static;
    type UpdateModel: Validatable + DeserializeOwned + Send + Sync + 'static;

    const ID_COLUMN: Self::ColumnType;
    /// Concurrency token, incremented on every write of the row
    const VERSION_COLUMN: Self::ColumnType;
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    fn record_id(model: &Self::ModelType) -> &str;
    fn record_version(model: &Self::ModelType) -> i32;

    /// Fields accepted in `where`, by request name
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType, FieldKind)>;
    /// Fields accepted in `sortBy`, by request name
    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)>;

    /// Turn stored rows into DTOs, attaching related identifiers.
    async fn project(
        db: &DatabaseConnection,
        models: Vec<Self::ModelType>,
    ) -> Result<Vec<Self>, DbErr>;

    async fn create(db: &DatabaseConnection, input: Self::CreateModel) -> Result<Self, ApiError>;

    /// Patch the record; absent fields are left alone.
    async fn update(
        db: &DatabaseConnection,
        id: &str,
        input: Self::UpdateModel,
    ) -> Result<(), ApiError>;

    async fn find_many(db: &DatabaseConnection, args: &FindManyArgs) -> Result<Vec<Self>, ApiError> {
        let models = query::find_many::<Self, _>(db, Self::EntityType::find(), args).await?;
        Ok(Self::project(db, models).await?)
    }

    async fn count(db: &DatabaseConnection, args: &FindManyArgs) -> Result<u64, ApiError> {
        query::count::<Self, _>(db, Self::EntityType::find(), args).await
    }

    async fn get_one(db: &DatabaseConnection, id: &str) -> Result<Self, ApiError> {
        let model = crud_operations::find_record::<Self, _>(db, id).await?;
        Self::project(db, vec![model])
            .await?
            .pop()
            .ok_or_else(|| ApiError::not_found(Self::RESOURCE_NAME_SINGULAR, Some(id.to_owned())))
    }

    async fn delete(db: &DatabaseConnection, id: &str) -> Result<(), ApiError> {
        let result = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ApiError::not_found(Self::RESOURCE_NAME_SINGULAR, Some(id.to_owned())));
        }
        tracing::info!(resource = Self::RESOURCE_NAME_SINGULAR, id, "Deleted record");
        Ok(())
    }
}

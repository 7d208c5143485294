use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, TransactionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::customer::Customer;
use super::room::Room;
use crate::core::{Resource, crud_operations, relations};
use crate::errors::ApiError;
use crate::filtering::FieldKind;
use crate::models::WhereUniqueInput;
use crate::validation::{Validatable, ValidationErrors, validators};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,
    pub customer_id: Option<String>,
    pub room_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "SetNull"
    )]
    Room,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Reservation as returned by the API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub customer: Option<String>,
    pub room: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Reservation {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            start_date: model.start_date,
            end_date: model.end_date,
            customer: model.customer_id,
            room: model.room_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// New reservation. References to a missing customer or room leave the link
/// empty; no ordering between `startDate` and `endDate` is enforced.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer: Option<WhereUniqueInput>,
    #[serde(default)]
    pub room: Option<WhereUniqueInput>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_date: Option<Option<DateTime<Utc>>>,
    /// Relinks the reservation when the customer exists; ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    /// Relinks the reservation when the room exists; ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validatable for ReservationCreateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(id) = &self.id {
            errors.check(validators::validate_length("id", id, Some(1), None));
        }
        errors.result()
    }
}

impl Validatable for ReservationUpdateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

#[async_trait]
impl Resource for Reservation {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = ReservationCreateInput;
    type UpdateModel = ReservationUpdateInput;

    const ID_COLUMN: Column = Column::Id;
    const VERSION_COLUMN: Column = Column::Version;
    const RESOURCE_NAME_SINGULAR: &'static str = "reservation";
    const RESOURCE_NAME_PLURAL: &'static str = "reservations";

    fn record_id(model: &Model) -> &str {
        &model.id
    }

    fn record_version(model: &Model) -> i32 {
        model.version
    }

    fn filterable_columns() -> Vec<(&'static str, Column, FieldKind)> {
        vec![
            ("id", Column::Id, FieldKind::Text),
            ("startDate", Column::StartDate, FieldKind::DateTime),
            ("endDate", Column::EndDate, FieldKind::DateTime),
            ("customer", Column::CustomerId, FieldKind::Text),
            ("room", Column::RoomId, FieldKind::Text),
            ("createdAt", Column::CreatedAt, FieldKind::DateTime),
            ("updatedAt", Column::UpdatedAt, FieldKind::DateTime),
        ]
    }

    fn sortable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("startDate", Column::StartDate),
            ("endDate", Column::EndDate),
            ("customer", Column::CustomerId),
            ("room", Column::RoomId),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    async fn project(_db: &DatabaseConnection, models: Vec<Model>) -> Result<Vec<Self>, DbErr> {
        Ok(models.into_iter().map(Self::from).collect())
    }

    async fn create(db: &DatabaseConnection, input: ReservationCreateInput) -> Result<Self, ApiError> {
        input.validate()?;
        let id = input.id.clone().unwrap_or_else(crud_operations::new_record_id);

        let txn = db.begin().await?;
        let customer_id = relations::resolve_reference::<Customer, _>(
            &txn,
            input.customer.as_ref().map(|customer| customer.id.as_str()),
        )
        .await?;
        let room_id =
            relations::resolve_reference::<Room, _>(&txn, input.room.as_ref().map(|room| room.id.as_str())).await?;
        ActiveModel {
            id: Set(id.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            customer_id: Set(customer_id),
            room_id: Set(room_id),
            created_at: Set(input.created_at),
            updated_at: Set(input.updated_at),
            version: Set(1),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(id = %id, "Created reservation");
        Self::get_one(db, &id).await
    }

    async fn update(db: &DatabaseConnection, id: &str, input: ReservationUpdateInput) -> Result<(), ApiError> {
        input.validate()?;

        let txn = db.begin().await?;
        let current = crud_operations::find_record::<Self, _>(&txn, id).await?;
        let mut changes = ActiveModel::new();
        if let Some(start_date) = input.start_date {
            changes.start_date = Set(start_date);
        }
        if let Some(end_date) = input.end_date {
            changes.end_date = Set(end_date);
        }
        if let Some(customer_id) = relations::resolve_reference::<Customer, _>(&txn, input.customer.as_deref()).await? {
            changes.customer_id = Set(Some(customer_id));
        }
        if let Some(room_id) = relations::resolve_reference::<Room, _>(&txn, input.room.as_deref()).await? {
            changes.room_id = Set(Some(room_id));
        }
        if let Some(created_at) = input.created_at {
            changes.created_at = Set(created_at);
        }
        if let Some(updated_at) = input.updated_at {
            changes.updated_at = Set(updated_at);
        }
        crud_operations::save_versioned::<Self, _>(&txn, id, current.version, changes).await?;
        txn.commit().await?;

        tracing::info!(id, "Updated reservation");
        Ok(())
    }
}

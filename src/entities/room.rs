use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, TransactionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::hotel::Hotel;
use super::reservation::{self, Reservation};
use crate::core::{Relationship, Resource, crud_operations, relations};
use crate::errors::ApiError;
use crate::filtering::FieldKind;
use crate::models::{WhereUniqueInput, reference_ids};
use crate::validation::{Validatable, ValidationErrors, validators};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub number: Option<String>,
    pub price: Option<f64>,
    pub room_type: Option<String>,
    pub hotel_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::HotelId",
        to = "super::hotel::Column::Id",
        on_delete = "SetNull"
    )]
    Hotel,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::hotel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hotel.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Room as returned by the API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub number: Option<String>,
    pub price: Option<f64>,
    pub room_type: Option<String>,
    /// Identifier of the hotel the room belongs to
    pub hotel: Option<String>,
    /// Identifiers of the room's reservations
    pub reservations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub room_type: Option<String>,
    /// Left unset when the hotel does not exist
    #[serde(default)]
    pub hotel: Option<WhereUniqueInput>,
    #[serde(default)]
    pub reservations: Vec<WhereUniqueInput>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub number: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub room_type: Option<Option<String>>,
    /// Moves the room when the hotel exists; ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validatable for RoomCreateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(id) = &self.id {
            errors.check(validators::validate_length("id", id, Some(1), None));
        }
        errors.check(validators::validate_text("number", self.number.as_deref()));
        errors.check(validators::validate_bounded("price", self.price));
        errors.check(validators::validate_text("roomType", self.room_type.as_deref()));
        errors.result()
    }
}

impl Validatable for RoomUpdateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_text("number", self.number.as_ref().and_then(Option::as_deref)));
        errors.check(validators::validate_bounded("price", self.price.flatten()));
        errors.check(validators::validate_text("roomType", self.room_type.as_ref().and_then(Option::as_deref)));
        errors.result()
    }
}

/// Room to reservations
pub struct RoomReservations;

impl Relationship for RoomReservations {
    type Parent = Room;
    type Child = Reservation;

    const FOREIGN_KEY: reservation::Column = reservation::Column::RoomId;
    const CHILDREN: &'static str = "reservations";
    const PARENT: &'static str = "room";
}

#[async_trait]
impl Resource for Room {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = RoomCreateInput;
    type UpdateModel = RoomUpdateInput;

    const ID_COLUMN: Column = Column::Id;
    const VERSION_COLUMN: Column = Column::Version;
    const RESOURCE_NAME_SINGULAR: &'static str = "room";
    const RESOURCE_NAME_PLURAL: &'static str = "rooms";

    fn record_id(model: &Model) -> &str {
        &model.id
    }

    fn record_version(model: &Model) -> i32 {
        model.version
    }

    fn filterable_columns() -> Vec<(&'static str, Column, FieldKind)> {
        vec![
            ("id", Column::Id, FieldKind::Text),
            ("number", Column::Number, FieldKind::Text),
            ("price", Column::Price, FieldKind::Number),
            ("roomType", Column::RoomType, FieldKind::Text),
            ("hotel", Column::HotelId, FieldKind::Text),
            ("createdAt", Column::CreatedAt, FieldKind::DateTime),
            ("updatedAt", Column::UpdatedAt, FieldKind::DateTime),
        ]
    }

    fn sortable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("number", Column::Number),
            ("price", Column::Price),
            ("roomType", Column::RoomType),
            ("hotel", Column::HotelId),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    async fn project(db: &DatabaseConnection, models: Vec<Model>) -> Result<Vec<Self>, DbErr> {
        let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
        let mut reservations = relations::child_ids::<RoomReservations, _>(db, &ids).await?;
        Ok(models
            .into_iter()
            .map(|model| Self {
                reservations: reservations.remove(&model.id).unwrap_or_default(),
                id: model.id,
                number: model.number,
                price: model.price,
                room_type: model.room_type,
                hotel: model.hotel_id,
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
            .collect())
    }

    async fn create(db: &DatabaseConnection, input: RoomCreateInput) -> Result<Self, ApiError> {
        input.validate()?;
        let id = input.id.clone().unwrap_or_else(crud_operations::new_record_id);

        let txn = db.begin().await?;
        let hotel_id = relations::resolve_reference::<Hotel, _>(
            &txn,
            input.hotel.as_ref().map(|hotel| hotel.id.as_str()),
        )
        .await?;
        ActiveModel {
            id: Set(id.clone()),
            number: Set(input.number),
            price: Set(input.price),
            room_type: Set(input.room_type),
            hotel_id: Set(hotel_id),
            created_at: Set(input.created_at),
            updated_at: Set(input.updated_at),
            version: Set(1),
        }
        .insert(&txn)
        .await?;
        let reservations =
            relations::resolve_children::<RoomReservations, _>(&txn, &reference_ids(&input.reservations)).await?;
        relations::attach::<RoomReservations, _>(&txn, &id, reservations).await?;
        txn.commit().await?;

        tracing::info!(id = %id, "Created room");
        Self::get_one(db, &id).await
    }

    async fn update(db: &DatabaseConnection, id: &str, input: RoomUpdateInput) -> Result<(), ApiError> {
        input.validate()?;

        let txn = db.begin().await?;
        let current = crud_operations::find_record::<Self, _>(&txn, id).await?;
        let mut changes = ActiveModel::new();
        if let Some(number) = input.number {
            changes.number = Set(number);
        }
        if let Some(price) = input.price {
            changes.price = Set(price);
        }
        if let Some(room_type) = input.room_type {
            changes.room_type = Set(room_type);
        }
        if let Some(hotel_id) = relations::resolve_reference::<Hotel, _>(&txn, input.hotel.as_deref()).await? {
            changes.hotel_id = Set(Some(hotel_id));
        }
        if let Some(created_at) = input.created_at {
            changes.created_at = Set(created_at);
        }
        if let Some(updated_at) = input.updated_at {
            changes.updated_at = Set(updated_at);
        }
        crud_operations::save_versioned::<Self, _>(&txn, id, current.version, changes).await?;

        if let Some(reservation_ids) = input.reservations {
            let reservations = relations::resolve_children::<RoomReservations, _>(&txn, &reservation_ids).await?;
            relations::reconcile::<RoomReservations, _>(&txn, id, reservations).await?;
        }
        txn.commit().await?;

        tracing::info!(id, "Updated room");
        Ok(())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, TransactionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::room::{self, Room};
use crate::core::{Relationship, Resource, crud_operations, relations};
use crate::errors::ApiError;
use crate::filtering::FieldKind;
use crate::models::{WhereUniqueInput, reference_ids};
use crate::validation::{Validatable, ValidationErrors, validators};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "hotels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub address: Option<String>,
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room::Entity")]
    Rooms,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Hotel as returned by the API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub address: Option<String>,
    pub name: Option<String>,
    pub rating: Option<f64>,
    /// Identifiers of the hotel's rooms
    pub rooms: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hotel {
    fn from_model(model: Model, rooms: Vec<String>) -> Self {
        Self {
            id: model.id,
            address: model.address,
            name: model.name,
            rating: model.rating,
            rooms,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelCreateInput {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Rooms to link; unknown identifiers are skipped
    #[serde(default)]
    pub rooms: Vec<WhereUniqueInput>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Patch for a hotel. Absent fields are left alone, `null` clears a nullable
/// field.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Option<f64>>,
    /// When present, the hotel's rooms become exactly the ones that resolve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validatable for HotelCreateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(id) = &self.id {
            errors.check(validators::validate_length("id", id, Some(1), None));
        }
        errors.check(validators::validate_text("address", self.address.as_deref()));
        errors.check(validators::validate_text("name", self.name.as_deref()));
        errors.check(validators::validate_bounded("rating", self.rating));
        errors.result()
    }
}

impl Validatable for HotelUpdateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_text("address", self.address.as_ref().and_then(Option::as_deref)));
        errors.check(validators::validate_text("name", self.name.as_ref().and_then(Option::as_deref)));
        errors.check(validators::validate_bounded("rating", self.rating.flatten()));
        errors.result()
    }
}

/// Hotel to rooms
pub struct HotelRooms;

impl Relationship for HotelRooms {
    type Parent = Hotel;
    type Child = Room;

    const FOREIGN_KEY: room::Column = room::Column::HotelId;
    const CHILDREN: &'static str = "rooms";
    const PARENT: &'static str = "hotel";
}

#[async_trait]
impl Resource for Hotel {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = HotelCreateInput;
    type UpdateModel = HotelUpdateInput;

    const ID_COLUMN: Column = Column::Id;
    const VERSION_COLUMN: Column = Column::Version;
    const RESOURCE_NAME_SINGULAR: &'static str = "hotel";
    const RESOURCE_NAME_PLURAL: &'static str = "hotels";

    fn record_id(model: &Model) -> &str {
        &model.id
    }

    fn record_version(model: &Model) -> i32 {
        model.version
    }

    fn filterable_columns() -> Vec<(&'static str, Column, FieldKind)> {
        vec![
            ("id", Column::Id, FieldKind::Text),
            ("address", Column::Address, FieldKind::Text),
            ("name", Column::Name, FieldKind::Text),
            ("rating", Column::Rating, FieldKind::Number),
            ("createdAt", Column::CreatedAt, FieldKind::DateTime),
            ("updatedAt", Column::UpdatedAt, FieldKind::DateTime),
        ]
    }

    fn sortable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("address", Column::Address),
            ("name", Column::Name),
            ("rating", Column::Rating),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    async fn project(db: &DatabaseConnection, models: Vec<Model>) -> Result<Vec<Self>, DbErr> {
        let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
        let mut rooms = relations::child_ids::<HotelRooms, _>(db, &ids).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let model_rooms = rooms.remove(&model.id).unwrap_or_default();
                Self::from_model(model, model_rooms)
            })
            .collect())
    }

    async fn create(db: &DatabaseConnection, input: HotelCreateInput) -> Result<Self, ApiError> {
        input.validate()?;
        let id = input.id.clone().unwrap_or_else(crud_operations::new_record_id);

        let txn = db.begin().await?;
        ActiveModel {
            id: Set(id.clone()),
            address: Set(input.address),
            name: Set(input.name),
            rating: Set(input.rating),
            created_at: Set(input.created_at),
            updated_at: Set(input.updated_at),
            version: Set(1),
        }
        .insert(&txn)
        .await?;
        let rooms = relations::resolve_children::<HotelRooms, _>(&txn, &reference_ids(&input.rooms)).await?;
        relations::attach::<HotelRooms, _>(&txn, &id, rooms).await?;
        txn.commit().await?;

        tracing::info!(id = %id, "Created hotel");
        Self::get_one(db, &id).await
    }

    async fn update(db: &DatabaseConnection, id: &str, input: HotelUpdateInput) -> Result<(), ApiError> {
        input.validate()?;

        let txn = db.begin().await?;
        let current = crud_operations::find_record::<Self, _>(&txn, id).await?;
        let mut changes = ActiveModel::new();
        if let Some(address) = input.address {
            changes.address = Set(address);
        }
        if let Some(name) = input.name {
            changes.name = Set(name);
        }
        if let Some(rating) = input.rating {
            changes.rating = Set(rating);
        }
        if let Some(created_at) = input.created_at {
            changes.created_at = Set(created_at);
        }
        if let Some(updated_at) = input.updated_at {
            changes.updated_at = Set(updated_at);
        }
        crud_operations::save_versioned::<Self, _>(&txn, id, current.version, changes).await?;

        if let Some(room_ids) = input.rooms {
            let rooms = relations::resolve_children::<HotelRooms, _>(&txn, &room_ids).await?;
            relations::reconcile::<HotelRooms, _>(&txn, id, rooms).await?;
        }
        txn.commit().await?;

        tracing::info!(id, "Updated hotel");
        Ok(())
    }
}

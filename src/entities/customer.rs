use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, TransactionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::reservation::{self, Reservation};
use crate::core::{Relationship, Resource, crud_operations, relations};
use crate::errors::ApiError;
use crate::filtering::FieldKind;
use crate::models::{WhereUniqueInput, reference_ids};
use crate::validation::{Validatable, ValidationErrors, validators};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Customer as returned by the API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub reservations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub reservations: Vec<WhereUniqueInput>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub first_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub last_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validatable for CustomerCreateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(id) = &self.id {
            errors.check(validators::validate_length("id", id, Some(1), None));
        }
        for (field, value) in [
            ("email", &self.email),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("phoneNumber", &self.phone_number),
        ] {
            errors.check(validators::validate_text(field, value.as_deref()));
        }
        errors.result()
    }
}

impl Validatable for CustomerUpdateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("email", &self.email),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("phoneNumber", &self.phone_number),
        ] {
            errors.check(validators::validate_text(field, value.as_ref().and_then(Option::as_deref)));
        }
        errors.result()
    }
}

/// Customer to reservations
pub struct CustomerReservations;

impl Relationship for CustomerReservations {
    type Parent = Customer;
    type Child = Reservation;

    const FOREIGN_KEY: reservation::Column = reservation::Column::CustomerId;
    const CHILDREN: &'static str = "reservations";
    const PARENT: &'static str = "customer";
}

#[async_trait]
impl Resource for Customer {
    type EntityType = Entity;
    type ModelType = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = CustomerCreateInput;
    type UpdateModel = CustomerUpdateInput;

    const ID_COLUMN: Column = Column::Id;
    const VERSION_COLUMN: Column = Column::Version;
    const RESOURCE_NAME_SINGULAR: &'static str = "customer";
    const RESOURCE_NAME_PLURAL: &'static str = "customers";

    fn record_id(model: &Model) -> &str {
        &model.id
    }

    fn record_version(model: &Model) -> i32 {
        model.version
    }

    fn filterable_columns() -> Vec<(&'static str, Column, FieldKind)> {
        vec![
            ("id", Column::Id, FieldKind::Text),
            ("email", Column::Email, FieldKind::Text),
            ("firstName", Column::FirstName, FieldKind::Text),
            ("lastName", Column::LastName, FieldKind::Text),
            ("phoneNumber", Column::PhoneNumber, FieldKind::Text),
            ("createdAt", Column::CreatedAt, FieldKind::DateTime),
            ("updatedAt", Column::UpdatedAt, FieldKind::DateTime),
        ]
    }

    fn sortable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("email", Column::Email),
            ("firstName", Column::FirstName),
            ("lastName", Column::LastName),
            ("phoneNumber", Column::PhoneNumber),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    async fn project(db: &DatabaseConnection, models: Vec<Model>) -> Result<Vec<Self>, DbErr> {
        let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
        let mut reservations = relations::child_ids::<CustomerReservations, _>(db, &ids).await?;
        Ok(models
            .into_iter()
            .map(|model| Self {
                reservations: reservations.remove(&model.id).unwrap_or_default(),
                id: model.id,
                email: model.email,
                first_name: model.first_name,
                last_name: model.last_name,
                phone_number: model.phone_number,
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
            .collect())
    }

    async fn create(db: &DatabaseConnection, input: CustomerCreateInput) -> Result<Self, ApiError> {
        input.validate()?;
        let id = input.id.clone().unwrap_or_else(crud_operations::new_record_id);

        let txn = db.begin().await?;
        ActiveModel {
            id: Set(id.clone()),
            email: Set(input.email),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            phone_number: Set(input.phone_number),
            created_at: Set(input.created_at),
            updated_at: Set(input.updated_at),
            version: Set(1),
        }
        .insert(&txn)
        .await?;
        let reservations =
            relations::resolve_children::<CustomerReservations, _>(&txn, &reference_ids(&input.reservations))
                .await?;
        relations::attach::<CustomerReservations, _>(&txn, &id, reservations).await?;
        txn.commit().await?;

        tracing::info!(id = %id, "Created customer");
        Self::get_one(db, &id).await
    }

    async fn update(db: &DatabaseConnection, id: &str, input: CustomerUpdateInput) -> Result<(), ApiError> {
        input.validate()?;

        let txn = db.begin().await?;
        let current = crud_operations::find_record::<Self, _>(&txn, id).await?;
        let mut changes = ActiveModel::new();
        if let Some(email) = input.email {
            changes.email = Set(email);
        }
        if let Some(first_name) = input.first_name {
            changes.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            changes.last_name = Set(last_name);
        }
        if let Some(phone_number) = input.phone_number {
            changes.phone_number = Set(phone_number);
        }
        if let Some(created_at) = input.created_at {
            changes.created_at = Set(created_at);
        }
        if let Some(updated_at) = input.updated_at {
            changes.updated_at = Set(updated_at);
        }
        crud_operations::save_versioned::<Self, _>(&txn, id, current.version, changes).await?;

        if let Some(reservation_ids) = input.reservations {
            let reservations =
                relations::resolve_children::<CustomerReservations, _>(&txn, &reservation_ids).await?;
            relations::reconcile::<CustomerReservations, _>(&txn, id, reservations).await?;
        }
        txn.commit().await?;

        tracing::info!(id, "Updated customer");
        Ok(())
    }
}

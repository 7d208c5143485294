//! Schema for the four booking tables.
//!
//! Foreign keys use `ON DELETE SET NULL`: deleting a parent never deletes its
//! children, it only unlinks them.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateBookingTables)]
    }
}

pub struct CreateBookingTables;

impl MigrationName for CreateBookingTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_booking_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateBookingTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hotels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hotels::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Hotels::Address).string_len(1000).null())
                    .col(ColumnDef::new(Hotels::Name).string_len(1000).null())
                    .col(ColumnDef::new(Hotels::Rating).double().null())
                    .col(timestamp(Hotels::CreatedAt))
                    .col(timestamp(Hotels::UpdatedAt))
                    .col(version(Hotels::Version))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Customers::Email).string_len(1000).null())
                    .col(ColumnDef::new(Customers::FirstName).string_len(1000).null())
                    .col(ColumnDef::new(Customers::LastName).string_len(1000).null())
                    .col(ColumnDef::new(Customers::PhoneNumber).string_len(1000).null())
                    .col(timestamp(Customers::CreatedAt))
                    .col(timestamp(Customers::UpdatedAt))
                    .col(version(Customers::Version))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Rooms::Number).string_len(1000).null())
                    .col(ColumnDef::new(Rooms::Price).double().null())
                    .col(ColumnDef::new(Rooms::RoomType).string_len(1000).null())
                    .col(ColumnDef::new(Rooms::HotelId).string().null())
                    .col(timestamp(Rooms::CreatedAt))
                    .col(timestamp(Rooms::UpdatedAt))
                    .col(version(Rooms::Version))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_hotel_id")
                            .from(Rooms::Table, Rooms::HotelId)
                            .to(Hotels::Table, Hotels::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reservations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Reservations::StartDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Reservations::EndDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Reservations::CustomerId).string().null())
                    .col(ColumnDef::new(Reservations::RoomId).string().null())
                    .col(timestamp(Reservations::CreatedAt))
                    .col(timestamp(Reservations::UpdatedAt))
                    .col(version(Reservations::Version))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_customer_id")
                            .from(Reservations::Table, Reservations::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_room_id")
                            .from(Reservations::Table, Reservations::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, column) in [
            ("idx_rooms_hotel_id", Rooms::Table.into_iden(), Rooms::HotelId.into_iden()),
            (
                "idx_reservations_customer_id",
                Reservations::Table.into_iden(),
                Reservations::CustomerId.into_iden(),
            ),
            (
                "idx_reservations_room_id",
                Reservations::Table.into_iden(),
                Reservations::RoomId.into_iden(),
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Reservations::Table.into_iden(),
            Rooms::Table.into_iden(),
            Customers::Table.into_iden(),
            Hotels::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn timestamp<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column).timestamp_with_time_zone().not_null().to_owned()
}

fn version<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column).integer().not_null().default(1).to_owned()
}

#[derive(DeriveIden)]
enum Hotels {
    Table,
    Id,
    Address,
    Name,
    Rating,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    PhoneNumber,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    Number,
    Price,
    RoomType,
    HotelId,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum Reservations {
    Table,
    Id,
    StartDate,
    EndDate,
    CustomerId,
    RoomId,
    CreatedAt,
    UpdatedAt,
    Version,
}

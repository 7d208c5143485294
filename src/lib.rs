//! # hotelcrate
//!
//! A hotel booking backend: CRUD for hotels, rooms, customers and
//! reservations over Sea-ORM, exposed through axum.
//!
//! Two generic pieces do the heavy lifting:
//!
//! - the query builder ([`filtering`], [`core::query`]) turns a `where` /
//!   `sortBy` / `skip` / `take` descriptor into a single `SELECT`;
//! - the relationship mutator ([`core::relations`]) connects, disconnects and
//!   replaces the children of a parent for any [`Relationship`].
//!
//! ```rust,no_run
//! use hotelcrate::{migration::Migrator, routes::api_router};
//! use sea_orm::Database;
//! use sea_orm_migration::MigratorTrait;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite::memory:").await?;
//! Migrator::up(&db, None).await?;
//! let app = api_router(db);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod validation;

pub use crate::core::{Relationship, Resource};
pub use errors::ApiError;

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::{DateTime, TimeZone, Utc};
use hotelcrate::{
    Resource,
    entities::{
        Customer, CustomerCreateInput, Hotel, HotelCreateInput, Reservation, ReservationCreateInput,
        Room, RoomCreateInput,
    },
    migration::Migrator,
    models::WhereUniqueInput,
    routes::api_router,
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    api_router(db)
}

/// Fixed timestamps so records compare deterministically
pub fn ts(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

pub fn reference(id: &str) -> WhereUniqueInput {
    WhereUniqueInput::new(id)
}

pub async fn create_hotel(db: &DatabaseConnection, id: &str, name: &str, rating: Option<f64>) -> Hotel {
    Hotel::create(
        db,
        HotelCreateInput {
            id: Some(id.to_string()),
            address: Some(format!("{name} Street 1")),
            name: Some(name.to_string()),
            rating,
            rooms: Vec::new(),
            created_at: ts(1),
            updated_at: ts(1),
        },
    )
    .await
    .expect("Failed to create hotel")
}

pub async fn create_room(
    db: &DatabaseConnection,
    id: &str,
    number: &str,
    price: Option<f64>,
    room_type: &str,
    hotel: Option<&str>,
) -> Room {
    Room::create(
        db,
        RoomCreateInput {
            id: Some(id.to_string()),
            number: Some(number.to_string()),
            price,
            room_type: Some(room_type.to_string()),
            hotel: hotel.map(reference),
            reservations: Vec::new(),
            created_at: ts(2),
            updated_at: ts(2),
        },
    )
    .await
    .expect("Failed to create room")
}

pub async fn create_customer(db: &DatabaseConnection, id: &str, email: &str) -> Customer {
    Customer::create(
        db,
        CustomerCreateInput {
            id: Some(id.to_string()),
            email: Some(email.to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            phone_number: None,
            reservations: Vec::new(),
            created_at: ts(3),
            updated_at: ts(3),
        },
    )
    .await
    .expect("Failed to create customer")
}

pub async fn create_reservation(
    db: &DatabaseConnection,
    id: &str,
    customer: Option<&str>,
    room: Option<&str>,
) -> Reservation {
    Reservation::create(
        db,
        ReservationCreateInput {
            id: Some(id.to_string()),
            start_date: Some(ts(10)),
            end_date: Some(ts(12)),
            customer: customer.map(reference),
            room: room.map(reference),
            created_at: ts(4),
            updated_at: ts(4),
        },
    )
    .await
    .expect("Failed to create reservation")
}

/// Send one request through the router; returns the status and the JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Percent-encode a query parameter value
pub fn encode(raw: &str) -> String {
    let mut encoded = String::new();
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

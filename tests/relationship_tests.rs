use hotelcrate::{
    ApiError, Resource,
    core::relations,
    entities::{
        Customer, CustomerReservations, Hotel, HotelRooms, HotelUpdateInput, Reservation,
        ReservationUpdateInput, Room, RoomReservations, hotel,
    },
    models::FindManyArgs,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;

mod common;
use common::{create_customer, create_hotel, create_reservation, create_room, setup_test_db};

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

async fn rooms_of(db: &DatabaseConnection, hotel_id: &str) -> Vec<String> {
    Hotel::get_one(db, hotel_id).await.unwrap().rooms
}

async fn hotel_version(db: &DatabaseConnection, hotel_id: &str) -> i32 {
    hotel::Entity::find_by_id(hotel_id.to_string())
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .version
}

/// Hotel `h1` with rooms `r1`, `r2`; rooms `r3`, `r4` unassigned; hotel `h2`
/// with no rooms.
async fn seeded_db() -> DatabaseConnection {
    let db = setup_test_db().await.expect("Failed to setup test database");
    create_hotel(&db, "h1", "Grand Budapest", Some(4.5)).await;
    create_hotel(&db, "h2", "Overlook", Some(2.0)).await;
    create_room(&db, "r1", "101", Some(100.0), "single", Some("h1")).await;
    create_room(&db, "r2", "102", Some(120.0), "double", Some("h1")).await;
    create_room(&db, "r3", "103", Some(140.0), "double", None).await;
    create_room(&db, "r4", "104", Some(300.0), "suite", None).await;
    db
}

#[tokio::test]
async fn test_connect_adds_without_removing() {
    let db = seeded_db().await;
    relations::connect::<HotelRooms>(&db, "h1", &ids(&["r2", "r3"])).await.unwrap();
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r1", "r2", "r3"]));

    let room = Room::get_one(&db, "r3").await.unwrap();
    assert_eq!(room.hotel.as_deref(), Some("h1"));
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let db = seeded_db().await;
    relations::connect::<HotelRooms>(&db, "h1", &ids(&["r3"])).await.unwrap();
    let version = hotel_version(&db, "h1").await;

    relations::connect::<HotelRooms>(&db, "h1", &ids(&["r3", "r3"])).await.unwrap();
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r1", "r2", "r3"]));
    // Nothing changed, so the parent was not written
    assert_eq!(hotel_version(&db, "h1").await, version);
}

#[tokio::test]
async fn test_connect_moves_child_from_other_parent() {
    let db = seeded_db().await;
    relations::connect::<HotelRooms>(&db, "h2", &ids(&["r1"])).await.unwrap();
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r2"]));
    assert_eq!(rooms_of(&db, "h2").await, ids(&["r1"]));
}

#[tokio::test]
async fn test_connect_drops_unresolved_ids() {
    let db = seeded_db().await;
    relations::connect::<HotelRooms>(&db, "h2", &ids(&["r4", "missing"])).await.unwrap();
    assert_eq!(rooms_of(&db, "h2").await, ids(&["r4"]));
}

#[tokio::test]
async fn test_resolve_children_collapses_duplicate_ids() {
    let db = seeded_db().await;
    let rooms = relations::resolve_children::<HotelRooms, _>(&db, &ids(&["r3", "r3", "r4", "r3"]))
        .await
        .unwrap();
    let mut resolved: Vec<String> = rooms.into_iter().map(|room| room.id).collect();
    resolved.sort_unstable();
    assert_eq!(resolved, ids(&["r3", "r4"]));

    let rooms = relations::resolve_children::<HotelRooms, _>(&db, &ids(&["r4", "r4", "r9"]))
        .await
        .unwrap();
    assert_eq!(rooms.len(), 1);

    relations::connect::<HotelRooms>(&db, "h2", &ids(&["r3", "r3"])).await.unwrap();
    assert_eq!(rooms_of(&db, "h2").await, ids(&["r3"]));
}

#[tokio::test]
async fn test_connect_with_nothing_resolved_is_not_found() {
    let db = seeded_db().await;
    let before = hotel_version(&db, "h1").await;

    let err = relations::connect::<HotelRooms>(&db, "h1", &ids(&["r9"])).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    let err = relations::connect::<HotelRooms>(&db, "h1", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    assert_eq!(rooms_of(&db, "h1").await, ids(&["r1", "r2"]));
    assert_eq!(hotel_version(&db, "h1").await, before);
}

#[tokio::test]
async fn test_connect_to_missing_parent_is_not_found() {
    let db = seeded_db().await;
    let err = relations::connect::<HotelRooms>(&db, "nope", &ids(&["r3"])).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { ref resource, .. } if resource == "hotel"));
    assert_eq!(Room::get_one(&db, "r3").await.unwrap().hotel, None);
}

#[tokio::test]
async fn test_disconnect_unlinks_only_own_children() {
    let db = seeded_db().await;
    relations::connect::<HotelRooms>(&db, "h2", &ids(&["r3"])).await.unwrap();

    relations::disconnect::<HotelRooms>(&db, "h1", &ids(&["r1", "r3", "missing"]))
        .await
        .unwrap();
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r2"]));
    // r3 belongs to h2 and stays there
    assert_eq!(rooms_of(&db, "h2").await, ids(&["r3"]));
    assert_eq!(Room::get_one(&db, "r1").await.unwrap().hotel, None);
}

#[tokio::test]
async fn test_disconnect_tolerates_empty_and_unknown() {
    let db = seeded_db().await;
    let before = hotel_version(&db, "h1").await;
    relations::disconnect::<HotelRooms>(&db, "h1", &[]).await.unwrap();
    relations::disconnect::<HotelRooms>(&db, "h1", &ids(&["ghost"])).await.unwrap();
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r1", "r2"]));
    assert_eq!(hotel_version(&db, "h1").await, before);
}

#[tokio::test]
async fn test_replace_is_destructive() {
    let db = seeded_db().await;
    relations::replace::<HotelRooms>(&db, "h1", &ids(&["r2", "r4", "missing"]))
        .await
        .unwrap();
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r2", "r4"]));
    assert_eq!(Room::get_one(&db, "r1").await.unwrap().hotel, None);
}

#[tokio::test]
async fn test_replace_with_nothing_resolved_is_not_found() {
    let db = seeded_db().await;
    let err = relations::replace::<HotelRooms>(&db, "h1", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    let err = relations::replace::<HotelRooms>(&db, "h1", &ids(&["x", "y"])).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r1", "r2"]));
}

#[tokio::test]
async fn test_association_change_bumps_parent_version() {
    let db = seeded_db().await;
    let before = hotel_version(&db, "h1").await;
    relations::connect::<HotelRooms>(&db, "h1", &ids(&["r3"])).await.unwrap();
    assert_eq!(hotel_version(&db, "h1").await, before + 1);
    relations::disconnect::<HotelRooms>(&db, "h1", &ids(&["r3"])).await.unwrap();
    assert_eq!(hotel_version(&db, "h1").await, before + 2);
}

#[tokio::test]
async fn test_find_children_uses_query_builder() {
    let db = seeded_db().await;
    relations::connect::<HotelRooms>(&db, "h1", &ids(&["r3", "r4"])).await.unwrap();

    let args: FindManyArgs = serde_json::from_value(json!({
        "where": {"price": {"gte": 120}},
        "sortBy": [{"field": "price", "direction": "desc"}],
        "take": 2
    }))
    .unwrap();
    let rooms = relations::find_children::<HotelRooms>(&db, "h1", &args).await.unwrap();
    let found: Vec<&str> = rooms.iter().map(|room| room.id.as_str()).collect();
    assert_eq!(found, vec!["r4", "r3"]);

    let none = relations::find_children::<HotelRooms>(&db, "h2", &FindManyArgs::default())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_get_parent() {
    let db = seeded_db().await;
    let parent = relations::get_parent::<HotelRooms>(&db, "r1").await.unwrap();
    assert_eq!(parent.id, "h1");

    let err = relations::get_parent::<HotelRooms>(&db, "r3").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    let err = relations::get_parent::<HotelRooms>(&db, "missing").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn test_reservation_reference_policies() {
    let db = seeded_db().await;
    create_customer(&db, "c1", "ada@example.com").await;
    create_customer(&db, "c2", "grace@example.com").await;
    // An unresolved reference on create leaves the link empty
    let reservation = create_reservation(&db, "res1", Some("c1"), Some("ghost-room")).await;
    assert_eq!(reservation.customer.as_deref(), Some("c1"));
    assert_eq!(reservation.room, None);

    // An unresolved reference on update leaves the link unchanged
    Reservation::update(
        &db,
        "res1",
        ReservationUpdateInput {
            customer: Some("ghost".to_string()),
            room: Some("r2".to_string()),
            ..ReservationUpdateInput::default()
        },
    )
    .await
    .unwrap();
    let reservation = Reservation::get_one(&db, "res1").await.unwrap();
    assert_eq!(reservation.customer.as_deref(), Some("c1"));
    assert_eq!(reservation.room.as_deref(), Some("r2"));

    Reservation::update(
        &db,
        "res1",
        ReservationUpdateInput {
            customer: Some("c2".to_string()),
            ..ReservationUpdateInput::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(Customer::get_one(&db, "c1").await.unwrap().reservations, Vec::<String>::new());
    assert_eq!(Customer::get_one(&db, "c2").await.unwrap().reservations, ids(&["res1"]));
    assert_eq!(Room::get_one(&db, "r2").await.unwrap().reservations, ids(&["res1"]));
}

#[tokio::test]
async fn test_reservation_relationships_share_the_engine() {
    let db = seeded_db().await;
    create_customer(&db, "c1", "ada@example.com").await;
    create_reservation(&db, "res1", None, None).await;
    create_reservation(&db, "res2", None, None).await;

    relations::connect::<CustomerReservations>(&db, "c1", &ids(&["res1", "res2"]))
        .await
        .unwrap();
    relations::replace::<RoomReservations>(&db, "r4", &ids(&["res2"])).await.unwrap();

    assert_eq!(Customer::get_one(&db, "c1").await.unwrap().reservations, ids(&["res1", "res2"]));
    let parent = relations::get_parent::<RoomReservations>(&db, "res2").await.unwrap();
    assert_eq!(parent.id, "r4");
    let parent = relations::get_parent::<CustomerReservations>(&db, "res1").await.unwrap();
    assert_eq!(parent.id, "c1");
}

#[tokio::test]
async fn test_update_with_child_list_reconciles() {
    let db = seeded_db().await;
    Hotel::update(
        &db,
        "h1",
        HotelUpdateInput {
            rooms: Some(ids(&["r3", "missing"])),
            ..HotelUpdateInput::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r3"]));

    Hotel::update(
        &db,
        "h1",
        HotelUpdateInput {
            rooms: Some(Vec::new()),
            ..HotelUpdateInput::default()
        },
    )
    .await
    .unwrap();
    assert!(rooms_of(&db, "h1").await.is_empty());
}

#[tokio::test]
async fn test_create_with_children_links_them() {
    let db = seeded_db().await;
    let hotel = Hotel::create(
        &db,
        hotelcrate::entities::HotelCreateInput {
            id: Some("h3".to_string()),
            address: None,
            name: Some("Shining".to_string()),
            rating: None,
            rooms: vec![common::reference("r1"), common::reference("r4"), common::reference("zzz")],
            created_at: common::ts(5),
            updated_at: common::ts(5),
        },
    )
    .await
    .unwrap();
    assert_eq!(hotel.rooms, ids(&["r1", "r4"]));
    assert_eq!(rooms_of(&db, "h1").await, ids(&["r2"]));
}

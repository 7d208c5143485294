use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

mod common;
use common::{encode, send, setup_test_app, setup_test_db};

async fn app() -> axum::Router {
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    setup_test_app(db)
}

fn hotel_body(id: &str, name: &str, rating: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "address": format!("{name} Street"),
        "rating": rating,
        "createdAt": "2024-03-01T12:00:00Z",
        "updatedAt": "2024-03-01T12:00:00Z"
    })
}

fn room_body(id: &str, price: f64, hotel: Option<&str>) -> Value {
    json!({
        "id": id,
        "number": id.trim_start_matches('r'),
        "price": price,
        "roomType": "double",
        "hotel": hotel.map(|id| json!({"id": id})),
        "createdAt": "2024-03-02T12:00:00Z",
        "updatedAt": "2024-03-02T12:00:00Z"
    })
}

fn id_list(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .expect("array body")
        .iter()
        .map(|record| record["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_crud_round_trip_status_codes() {
    let app = app().await;

    let (status, created) = send(&app, Method::POST, "/api/hotels", Some(hotel_body("h1", "Overlook", 2.5))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "h1");
    assert_eq!(created["rooms"], json!([]));
    assert_eq!(created["createdAt"], "2024-03-01T12:00:00Z");

    let (status, fetched) = send(&app, Method::GET, "/api/hotels/h1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/hotels/h1",
        Some(json!({"name": "Stanley", "address": null})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, fetched) = send(&app, Method::GET, "/api/hotels/h1", None).await;
    assert_eq!(fetched["name"], "Stanley");
    assert_eq!(fetched["address"], Value::Null);
    assert_eq!(fetched["rating"], 2.5);

    let (status, _) = send(&app, Method::DELETE, "/api/hotels/h1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/api/hotels/h1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "hotel with ID 'h1' not found");

    let (status, _) = send(&app, Method::DELETE, "/api/hotels/h1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_status_codes() {
    let app = app().await;
    send(&app, Method::POST, "/api/hotels", Some(hotel_body("h1", "Overlook", 2.5))).await;

    let (status, _) = send(&app, Method::POST, "/api/hotels", Some(hotel_body("h1", "Again", 3.0))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/hotels",
        Some(hotel_body("h2", &"n".repeat(1001), 3.0)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed");
    // Both the name and the derived address are too long
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::PATCH, "/api/hotels/ghost", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/hotels?where={}", encode(r#"{"stars":5}"#));
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("stars"));

    let (status, _) = send(&app, Method::GET, "/api/hotels?where=%7Bbroken", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_with_query_string() {
    let app = app().await;
    send(&app, Method::POST, "/api/hotels", Some(hotel_body("h1", "Overlook", 2.5))).await;
    for (id, price) in [("r1", 80.0), ("r2", 150.0), ("r3", 220.0), ("r4", 150.0)] {
        let (status, _) = send(&app, Method::POST, "/api/rooms", Some(room_body(id, price, Some("h1")))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!(
        "/api/rooms?where={}&sortBy={}&take=3",
        encode(r#"{"price":{"gte":100}}"#),
        encode("price:desc,id:asc"),
    );
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_list(&body), vec!["r3", "r2", "r4"]);

    let uri = format!(
        "/api/rooms?sortBy={}&skip=1",
        encode(r#"[{"field":"id","direction":"desc"}]"#)
    );
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(id_list(&body), vec!["r3", "r2", "r1"]);
}

#[tokio::test]
async fn test_meta_counts() {
    let app = app().await;
    for (id, name, rating) in [("h1", "Overlook", 2.5), ("h2", "Ritz", 5.0), ("h3", "Savoy", 4.5)] {
        send(&app, Method::POST, "/api/hotels", Some(hotel_body(id, name, rating))).await;
    }

    let (status, body) = send(&app, Method::POST, "/api/hotels/meta", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"count": 3}));

    // Pagination in the body is ignored
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/hotels/meta",
        Some(json!({"where": {"rating": {"gte": 4}}, "take": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"count": 2}));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/hotels/meta",
        Some(json!({"where": {"stars": 1}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_children_routes() {
    let app = app().await;
    send(&app, Method::POST, "/api/hotels", Some(hotel_body("h1", "Overlook", 2.5))).await;
    for (id, price) in [("r1", 80.0), ("r2", 150.0), ("r3", 220.0)] {
        send(&app, Method::POST, "/api/rooms", Some(room_body(id, price, None))).await;
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/hotels/h1/rooms",
        Some(json!([{"id": "r1"}, {"id": "r2"}])),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/api/hotels/h1/rooms", None).await;
    assert_eq!(status, StatusCode::OK);
    let mut ids = id_list(&body);
    ids.sort_unstable();
    assert_eq!(ids, vec!["r1", "r2"]);

    let (status, _) = send(&app, Method::POST, "/api/hotels/h1/rooms", Some(json!([{"id": "r9"}]))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PATCH, "/api/hotels/h1/rooms", Some(json!([{"id": "r3"}]))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/api/hotels/h1", None).await;
    assert_eq!(body["rooms"], json!(["r3"]));

    let (status, _) = send(&app, Method::PATCH, "/api/hotels/h1/rooms", Some(json!([]))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/hotels/h1/rooms",
        Some(json!([{"id": "r3"}, {"id": "unknown"}])),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/api/hotels/h1/rooms", None).await;
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, Method::POST, "/api/hotels/ghost/rooms", Some(json!([{"id": "r1"}]))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_parent_routes() {
    let app = app().await;
    send(&app, Method::POST, "/api/hotels", Some(hotel_body("h1", "Overlook", 2.5))).await;
    send(&app, Method::POST, "/api/rooms", Some(room_body("r1", 80.0, Some("h1")))).await;
    send(&app, Method::POST, "/api/rooms", Some(room_body("r2", 90.0, None))).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/customers",
        Some(json!({
            "id": "c1",
            "email": "ada@example.com",
            "createdAt": "2024-03-03T12:00:00Z",
            "updatedAt": "2024-03-03T12:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, reservation) = send(
        &app,
        Method::POST,
        "/api/reservations",
        Some(json!({
            "id": "res1",
            "startDate": "2024-04-01T14:00:00Z",
            "endDate": "2024-04-03T10:00:00Z",
            "customer": {"id": "c1"},
            "room": {"id": "r1"},
            "createdAt": "2024-03-04T12:00:00Z",
            "updatedAt": "2024-03-04T12:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["customer"], "c1");

    let (status, body) = send(&app, Method::GET, "/api/rooms/r1/hotel", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "h1");

    let (status, _) = send(&app, Method::GET, "/api/rooms/r2/hotel", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/reservations/res1/customer", None).await;
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["reservations"], json!(["res1"]));

    let (_, body) = send(&app, Method::GET, "/api/reservations/res1/room", None).await;
    assert_eq!(body["id"], "r1");

    let (_, body) = send(&app, Method::GET, "/api/customers/c1/reservations", None).await;
    assert_eq!(id_list(&body), vec!["res1"]);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let schemas = &body["components"]["schemas"];
    for name in ["Hotel", "RoomCreateInput", "ReservationUpdateInput", "MetadataDto", "WhereUniqueInput"] {
        assert!(schemas.get(name).is_some(), "missing schema {name}");
    }
}

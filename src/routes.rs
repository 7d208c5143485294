use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;

use crate::core::{Relationship, Resource, relations};
use crate::entities::{
    Customer, CustomerReservations, Hotel, HotelRooms, Reservation, Room, RoomReservations,
};
use crate::errors::ApiError;
use crate::models::{FindManyArgs, FindManyParams, MetadataDto, WhereUniqueInput, reference_ids};
use crate::openapi;

pub async fn get_all<T>(
    State(db): State<DatabaseConnection>,
    Query(params): Query<FindManyParams>,
) -> Result<Json<Vec<T>>, ApiError>
where
    T: Resource,
{
    let args = params.into_args()?;
    Ok(Json(T::find_many(&db, &args).await?))
}

/// Count with an optional `{"where": ...}` body; an empty body counts all.
pub async fn meta<T>(
    State(db): State<DatabaseConnection>,
    body: Bytes,
) -> Result<Json<MetadataDto>, ApiError>
where
    T: Resource,
{
    let args = if body.iter().all(u8::is_ascii_whitespace) {
        FindManyArgs::default()
    } else {
        let args: FindManyArgs = serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid meta body: {e}")))?;
        FindManyArgs::filtered(args.filter)
    };
    let count = T::count(&db, &args).await?;
    Ok(Json(MetadataDto { count }))
}

pub async fn get_one<T>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiError>
where
    T: Resource,
{
    Ok(Json(T::get_one(&db, &id).await?))
}

pub async fn create_one<T>(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<T::CreateModel>,
) -> Result<(StatusCode, Json<T>), ApiError>
where
    T: Resource,
{
    let created = T::create(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_one<T>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(payload): Json<T::UpdateModel>,
) -> Result<StatusCode, ApiError>
where
    T: Resource,
{
    T::update(&db, &id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_one<T>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    T: Resource,
{
    T::delete(&db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_children<R>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Query(params): Query<FindManyParams>,
) -> Result<Json<Vec<R::Child>>, ApiError>
where
    R: Relationship,
{
    let args = params.into_args()?;
    Ok(Json(relations::find_children::<R>(&db, &id, &args).await?))
}

pub async fn connect_children<R>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(children): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, ApiError>
where
    R: Relationship,
{
    relations::connect::<R>(&db, &id, &reference_ids(&children)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn disconnect_children<R>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(children): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, ApiError>
where
    R: Relationship,
{
    relations::disconnect::<R>(&db, &id, &reference_ids(&children)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_children<R>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
    Json(children): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, ApiError>
where
    R: Relationship,
{
    relations::replace::<R>(&db, &id, &reference_ids(&children)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_parent<R>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<R::Parent>, ApiError>
where
    R: Relationship,
{
    Ok(Json(relations::get_parent::<R>(&db, &id).await?))
}

/// `/api/{plural}` routes of one resource: list, count, create, read,
/// update and delete.
pub fn resource_router<T: Resource>() -> Router<DatabaseConnection> {
    let base = format!("/api/{}", T::RESOURCE_NAME_PLURAL);
    Router::new()
        .route(&base, get(get_all::<T>).post(create_one::<T>))
        .route(&format!("{base}/meta"), post(meta::<T>))
        .route(
            &format!("{base}/{{id}}"),
            get(get_one::<T>).patch(update_one::<T>).delete(delete_one::<T>),
        )
}

/// `/api/{parent plural}/{id}/{children}`: list, connect, disconnect, replace
pub fn children_router<R: Relationship>() -> Router<DatabaseConnection> {
    let path = format!(
        "/api/{}/{{id}}/{}",
        <R::Parent as Resource>::RESOURCE_NAME_PLURAL,
        R::CHILDREN
    );
    Router::new().route(
        &path,
        get(find_children::<R>)
            .post(connect_children::<R>)
            .delete(disconnect_children::<R>)
            .patch(replace_children::<R>),
    )
}

/// `/api/{child plural}/{id}/{parent}`: the to-one read
pub fn parent_router<R: Relationship>() -> Router<DatabaseConnection> {
    let path = format!(
        "/api/{}/{{id}}/{}",
        <R::Child as Resource>::RESOURCE_NAME_PLURAL,
        R::PARENT
    );
    Router::new().route(&path, get(get_parent::<R>))
}

/// Every route of the booking API, bound to `db`.
pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        .merge(resource_router::<Hotel>())
        .merge(resource_router::<Room>())
        .merge(resource_router::<Customer>())
        .merge(resource_router::<Reservation>())
        .merge(children_router::<HotelRooms>())
        .merge(children_router::<CustomerReservations>())
        .merge(children_router::<RoomReservations>())
        .merge(parent_router::<HotelRooms>())
        .merge(parent_router::<CustomerReservations>())
        .merge(parent_router::<RoomReservations>())
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .with_state(db)
}

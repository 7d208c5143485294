use axum::Json;
use utoipa::OpenApi;

use crate::entities::{
    Customer, CustomerCreateInput, CustomerUpdateInput, Hotel, HotelCreateInput, HotelUpdateInput,
    Reservation, ReservationCreateInput, ReservationUpdateInput, Room, RoomCreateInput,
    RoomUpdateInput,
};
use crate::filtering::{SortDirection, SortKey};
use crate::models::{MetadataDto, WhereUniqueInput};

/// Schemas of every record, payload and helper type exchanged by the API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "hotelcrate",
        description = "Hotels, rooms, customers and reservations"
    ),
    components(schemas(
        Hotel,
        HotelCreateInput,
        HotelUpdateInput,
        Room,
        RoomCreateInput,
        RoomUpdateInput,
        Customer,
        CustomerCreateInput,
        CustomerUpdateInput,
        Reservation,
        ReservationCreateInput,
        ReservationUpdateInput,
        MetadataDto,
        WhereUniqueInput,
        SortKey,
        SortDirection,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

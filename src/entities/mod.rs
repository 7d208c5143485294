//! Sea-ORM entities, API records and relationships of the booking domain.
//!
//! | Parent   | Children       | Foreign key               |
//! |----------|----------------|---------------------------|
//! | Hotel    | Room           | `rooms.hotel_id`          |
//! | Customer | Reservation    | `reservations.customer_id`|
//! | Room     | Reservation    | `reservations.room_id`    |

pub mod customer;
pub mod hotel;
pub mod reservation;
pub mod room;

pub use customer::{Customer, CustomerCreateInput, CustomerReservations, CustomerUpdateInput};
pub use hotel::{Hotel, HotelCreateInput, HotelRooms, HotelUpdateInput};
pub use reservation::{Reservation, ReservationCreateInput, ReservationUpdateInput};
pub use room::{Room, RoomCreateInput, RoomReservations, RoomUpdateInput};

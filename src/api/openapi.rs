//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{appointment, preference, room, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description, served by Swagger UI when the
/// `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "rental-gateway",
        description = "Bookings, deposits, room listings and preference sets for a room-rental marketplace. Authenticated endpoints read the caller from the `x-user-id` header set by the upstream proxy."
    ),
    paths(
        system::health_handler,
        appointment::create_appointment,
        appointment::list_appointments,
        appointment::get_appointment,
        appointment::transition_appointment,
        appointment::deposit_qr,
        room::list_rooms,
        room::create_room,
        room::get_room,
        room::update_room,
        room::delete_room,
        preference::list_preferences,
        preference::clear_preferences,
        preference::contains_preference,
        preference::toggle_preference,
    ),
    components(schemas(ErrorResponse, ErrorBody)),
    tags(
        (name = "Appointments", description = "Viewing and deposit bookings"),
        (name = "Rooms", description = "Room catalog"),
        (name = "Preferences", description = "Favorites, history and compare sets"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

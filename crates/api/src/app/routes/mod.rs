use axum::{
    Router,
    routing::{get, patch, post},
};

pub mod system;
pub mod wizards;

/// Router for the booking wizard endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/bookings/:package_id/wizard", post(wizards::open_wizard))
        .route(
            "/wizards/:id",
            get(wizards::get_wizard).delete(wizards::discard_wizard),
        )
        .route("/wizards/:id/fields", patch(wizards::update_field))
        .route("/wizards/:id/next", post(wizards::next_stage))
        .route("/wizards/:id/back", post(wizards::previous_stage))
        .route("/wizards/:id/stages/:stage", post(wizards::go_to_stage))
        .route("/wizards/:id/payment-method", post(wizards::select_payment_method))
        .route("/wizards/:id/autofill", post(wizards::autofill))
        .route("/wizards/:id/submit", post(wizards::submit))
        .route("/wizards/:id/events", get(wizards::stream_events))
}

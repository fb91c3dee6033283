use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use imfo_booking::DraftField;
use imfo_core::{PackageId, PaymentMethodId, WizardId};
use imfo_infra::SessionError;

use crate::app::{dto, errors, services};
use crate::app::services::{AppServices, Session};
use crate::context::UserContext;

fn find_session(services: &AppServices, id: &str) -> Result<Arc<Session>, axum::response::Response> {
    let wizard_id: WizardId = id
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid wizard id"))?;

    services
        .session(wizard_id)
        .ok_or_else(|| errors::json_error(StatusCode::NOT_FOUND, "not_found", "wizard not found"))
}

fn state_response(session: &Session) -> axum::response::Response {
    (StatusCode::OK, Json(dto::WizardResponse::from_session(session))).into_response()
}

/// Run a synchronous wizard operation and answer with the new state.
fn apply<T>(
    services: &AppServices,
    id: &str,
    op: impl FnOnce(&Session) -> Result<T, SessionError>,
) -> axum::response::Response {
    let session = match find_session(services, id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match op(&session) {
        Ok(_) => state_response(&session),
        Err(e) => errors::session_error_to_response(e),
    }
}

/// POST /bookings/:package_id/wizard
pub async fn open_wizard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(package_id): Path<String>,
) -> axum::response::Response {
    let package_id = match PackageId::new(package_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let session = match services.open_wizard(package_id, user.into_user()).await {
        Ok(s) => s,
        Err(e) => return errors::session_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": session.id().to_string(),
            "state": dto::WizardResponse::from_session(&session),
        })),
    )
        .into_response()
}

/// GET /wizards/:id
pub async fn get_wizard(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match find_session(&services, &id) {
        Ok(session) => state_response(&session),
        Err(resp) => resp,
    }
}

/// DELETE /wizards/:id
pub async fn discard_wizard(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let wizard_id: WizardId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid wizard id"),
    };

    if services.discard(wizard_id) {
        tracing::info!(wizard_id = %wizard_id, "booking wizard discarded");
        StatusCode::NO_CONTENT.into_response()
    } else {
        errors::json_error(StatusCode::NOT_FOUND, "not_found", "wizard not found")
    }
}

/// PATCH /wizards/:id/fields
pub async fn update_field(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateFieldRequest>,
) -> axum::response::Response {
    let field: DraftField = match body.field.parse() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    apply(&services, &id, |s| s.update_field(field, body.value))
}

/// POST /wizards/:id/next
pub async fn next_stage(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    apply(&services, &id, |s| s.next())
}

/// POST /wizards/:id/back
pub async fn previous_stage(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    apply(&services, &id, |s| s.back())
}

/// POST /wizards/:id/stages/:stage
pub async fn go_to_stage(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, stage)): Path<(String, String)>,
) -> axum::response::Response {
    let stage: u8 = match stage.parse() {
        Ok(n) => n,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("stage must be between 1 and 3, got {stage}"),
            );
        }
    };

    apply(&services, &id, |s| s.go_to_stage(stage))
}

/// POST /wizards/:id/payment-method
pub async fn select_payment_method(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SelectPaymentMethodRequest>,
) -> axum::response::Response {
    let payment_method_id = match PaymentMethodId::new(body.payment_method_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    apply(&services, &id, |s| s.select_payment_method(payment_method_id))
}

/// POST /wizards/:id/autofill
pub async fn autofill(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let session = match find_session(&services, &id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match session.autofill().await {
        Ok(applied) => Json(dto::AutofillResponse {
            applied,
            state: dto::WizardResponse::from_session(&session),
        })
        .into_response(),
        Err(e) => errors::session_error_to_response(e),
    }
}

/// POST /wizards/:id/submit
///
/// A confirmed wizard is released; later requests for it answer 404.
pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let session = match find_session(&services, &id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.submit(&session).await {
        Ok(outcome) => Json(dto::SubmitResponse::new(
            outcome,
            dto::WizardResponse::from_session(&session),
        ))
        .into_response(),
        Err(e) => errors::session_error_to_response(e),
    }
}

/// GET /wizards/:id/events
///
/// Server-sent events of the wizard's event stream, from the moment of
/// subscription on.
pub async fn stream_events(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let session = match find_session(&services, &id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    services::wizard_sse_stream(services.subscribe_realtime(), session.id()).into_response()
}

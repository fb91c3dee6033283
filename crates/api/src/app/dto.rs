use serde::{Deserialize, Serialize};

use imfo_booking::{BookingConfirmation, BookingSummary, PAYMENT_OPTIONS, PackageSummary, Stage, WizardSnapshot};
use imfo_infra::SubmitOutcome;

use crate::app::services::Session;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectPaymentMethodRequest {
    pub payment_method_id: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PaymentOption {
    pub id: &'static str,
    pub label: &'static str,
}

/// Everything a view needs to render the current screen.
#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub wizard: WizardSnapshot,
    pub package: PackageSummary,
    /// Present on the review stage only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BookingSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_options: Vec<PaymentOption>,
}

impl WizardResponse {
    pub fn from_session(session: &Session) -> Self {
        let wizard = session.snapshot();
        let on_review = wizard.stage == Stage::Review;

        Self {
            summary: on_review.then(|| session.summary()),
            payment_options: if on_review {
                PAYMENT_OPTIONS
                    .iter()
                    .map(|&(id, label)| PaymentOption { id, label })
                    .collect()
            } else {
                Vec::new()
            },
            package: session.package().clone(),
            wizard,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AutofillResponse {
    pub applied: bool,
    #[serde(flatten)]
    pub state: WizardResponse,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// `confirmed`, `missing_payment_method`, `already_submitting` or `failed`.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<BookingConfirmation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub state: WizardResponse,
}

impl SubmitResponse {
    pub fn new(outcome: SubmitOutcome, state: WizardResponse) -> Self {
        let (outcome, confirmation, reason) = match outcome {
            SubmitOutcome::Confirmed(c) => ("confirmed", Some(c), None),
            SubmitOutcome::MissingPaymentMethod => ("missing_payment_method", None, None),
            SubmitOutcome::AlreadySubmitting => ("already_submitting", None, None),
            SubmitOutcome::Failed { reason } => ("failed", None, Some(reason)),
        };
        Self {
            outcome,
            confirmation,
            reason,
            state,
        }
    }
}

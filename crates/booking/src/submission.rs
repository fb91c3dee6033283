//! Submission lifecycle and the payload handed to the booking backend.

use serde::{Deserialize, Serialize};

use imfo_core::{PackageId, PaymentMethodId, UserId};

use crate::draft::BookingDraft;

/// Lifecycle of the final submission.
///
/// Legal moves: Idle → Submitting → Confirmed, and Submitting → Idle when the
/// backend rejects the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Confirmed,
}

impl SubmissionState {
    pub fn can_transition_to(&self, target: SubmissionState) -> bool {
        matches!(
            (self, target),
            (SubmissionState::Idle, SubmissionState::Submitting)
                | (SubmissionState::Submitting, SubmissionState::Confirmed)
                | (SubmissionState::Submitting, SubmissionState::Idle)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Confirmed)
    }
}

/// Payment options offered on the review stage.
///
/// The wizard only checks that *some* method was picked; the ids are opaque to
/// it and are passed through to the backend.
pub const PAYMENT_OPTIONS: [(&str, &str); 4] = [
    ("mastercard", "Mastercard"),
    ("visa", "Visa"),
    ("momo", "Mobile Money"),
    ("add", "Add Payment Method"),
];

/// Everything the booking backend needs to create a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub package_id: PackageId,
    pub payment_method_id: PaymentMethodId,
    pub user_id: Option<UserId>,
    pub draft: BookingDraft,
}

/// What the backend answers when a booking is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    #[serde(alias = "id")]
    pub booking_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

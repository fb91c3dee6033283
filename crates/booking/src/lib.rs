//! Booking wizard domain module.
//!
//! Holds the three-stage booking draft, its stage-scoped validation, the
//! review projection and the submission lifecycle, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod draft;
pub mod package;
pub mod profile;
pub mod stage;
pub mod submission;
pub mod summary;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use draft::{BookingDraft, DraftField, EventType, ProfileAutofill};
pub use package::PackageSummary;
pub use profile::{CurrentUser, UserProfile, autofill_from_profile};
pub use stage::Stage;
pub use submission::{BookingConfirmation, BookingRequest, PAYMENT_OPTIONS, SubmissionState};
pub use summary::{BookingSummary, ContactSummary, PackageLine};
pub use validation::{ValidationErrors, validate_stage, validate_stage1, validate_stage2};
pub use wizard::{
    AdvanceStage, ApplyAutofill, BeginSubmission, BookingConfirmed, BookingWizard, FieldUpdated,
    JumpToStage, PaymentMethodMissing, PaymentMethodSelected, ProfileMerged,
    RecordSubmissionFailure, RecordSubmissionSuccess, ReturnToPreviousStage, SelectPaymentMethod,
    StageAdvanced, StageJumped, StageReverted, StageValidationFailed, SubmissionFailed,
    SubmissionStarted, UpdateField, WizardCommand, WizardEvent, WizardSnapshot,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use imfo_core::{Aggregate, AggregateRoot, DomainError, PackageId, PaymentMethodId, WizardId};
use imfo_events::Event;

use crate::draft::{BookingDraft, DraftField, ProfileAutofill};
use crate::package::PackageSummary;
use crate::profile::CurrentUser;
use crate::stage::Stage;
use crate::submission::{BookingConfirmation, BookingRequest, SubmissionState};
use crate::summary::BookingSummary;
use crate::validation::{ValidationErrors, validate_stage};

/// Aggregate root: BookingWizard (one booking attempt for one package).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWizard {
    id: WizardId,
    package_id: PackageId,
    current_user: Option<CurrentUser>,
    stage: Stage,
    draft: BookingDraft,
    errors: ValidationErrors,
    payment_method: Option<PaymentMethodId>,
    submission: SubmissionState,
    payment_method_missing: bool,
    submission_error: Option<String>,
    confirmation: Option<BookingConfirmation>,
    version: u64,
}

impl BookingWizard {
    /// Fresh wizard: first stage, empty draft, no errors, nothing selected.
    pub fn new(id: WizardId, package_id: PackageId, current_user: Option<CurrentUser>) -> Self {
        Self {
            id,
            package_id,
            current_user,
            stage: Stage::YourDetails,
            draft: BookingDraft::new(),
            errors: ValidationErrors::new(),
            payment_method: None,
            submission: SubmissionState::Idle,
            payment_method_missing: false,
            submission_error: None,
            confirmation: None,
            version: 0,
        }
    }

    pub fn package_id(&self) -> &PackageId {
        &self.package_id
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn payment_method(&self) -> Option<&PaymentMethodId> {
        self.payment_method.as_ref()
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submission
    }

    /// Set by a submit attempt without a payment method; cleared by selecting one.
    pub fn payment_method_missing(&self) -> bool {
        self.payment_method_missing
    }

    /// Reason of the last failed submission, until the next attempt.
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn is_confirmed(&self) -> bool {
        self.submission.is_terminal()
    }

    /// Payload for the booking backend; `None` until a payment method is picked.
    pub fn booking_request(&self) -> Option<BookingRequest> {
        self.payment_method.as_ref().map(|payment_method_id| BookingRequest {
            package_id: self.package_id.clone(),
            payment_method_id: payment_method_id.clone(),
            user_id: self.current_user.as_ref().map(|u| u.id.clone()),
            draft: self.draft.clone(),
        })
    }

    /// Review projection of the current draft.
    pub fn summary(&self, package: Option<&PackageSummary>) -> BookingSummary {
        BookingSummary::build(&self.draft, package)
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            id: self.id,
            package_id: self.package_id.clone(),
            stage: self.stage,
            stage_number: self.stage.number(),
            stage_title: self.stage.title().to_string(),
            stage_subtitle: self.stage.subtitle().to_string(),
            draft: self.draft.clone(),
            errors: self.errors.clone(),
            payment_method_id: self.payment_method.clone(),
            payment_method_missing: self.payment_method_missing,
            submission_state: self.submission,
            submission_error: self.submission_error.clone(),
            confirmation: self.confirmation.clone(),
            version: self.version,
        }
    }
}

impl AggregateRoot for BookingWizard {
    type Id = WizardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Serializable view of the wizard for hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardSnapshot {
    pub id: WizardId,
    pub package_id: PackageId,
    pub stage: Stage,
    pub stage_number: u8,
    pub stage_title: String,
    pub stage_subtitle: String,
    pub draft: BookingDraft,
    pub errors: ValidationErrors,
    pub payment_method_id: Option<PaymentMethodId>,
    pub payment_method_missing: bool,
    pub submission_state: SubmissionState,
    pub submission_error: Option<String>,
    pub confirmation: Option<BookingConfirmation>,
    pub version: u64,
}

/// Command: UpdateField.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateField {
    pub field: DraftField,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApplyAutofill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyAutofill {
    pub autofill: ProfileAutofill,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdvanceStage ("Next").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceStage {
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReturnToPreviousStage ("Back").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnToPreviousStage {
    pub occurred_at: DateTime<Utc>,
}

/// Command: JumpToStage ("Edit" links on the review stage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpToStage {
    pub stage: Stage,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectPaymentMethod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectPaymentMethod {
    pub payment_method_id: PaymentMethodId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: BeginSubmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginSubmission {
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordSubmissionSuccess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSubmissionSuccess {
    pub confirmation: BookingConfirmation,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordSubmissionFailure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSubmissionFailure {
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardCommand {
    UpdateField(UpdateField),
    ApplyAutofill(ApplyAutofill),
    AdvanceStage(AdvanceStage),
    ReturnToPreviousStage(ReturnToPreviousStage),
    JumpToStage(JumpToStage),
    SelectPaymentMethod(SelectPaymentMethod),
    BeginSubmission(BeginSubmission),
    RecordSubmissionSuccess(RecordSubmissionSuccess),
    RecordSubmissionFailure(RecordSubmissionFailure),
}

/// Event: FieldUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdated {
    pub field: DraftField,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProfileMerged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMerged {
    pub autofill: ProfileAutofill,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StageValidationFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageValidationFailed {
    pub stage: Stage,
    pub errors: ValidationErrors,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StageAdvanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAdvanced {
    pub from: Stage,
    pub to: Stage,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StageReverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReverted {
    pub from: Stage,
    pub to: Stage,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StageJumped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageJumped {
    pub from: Stage,
    pub to: Stage,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentMethodSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodSelected {
    pub payment_method_id: PaymentMethodId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentMethodMissing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodMissing {
    pub occurred_at: DateTime<Utc>,
}

/// Event: SubmissionStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStarted {
    pub payment_method_id: PaymentMethodId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BookingConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmed {
    pub confirmation: BookingConfirmation,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SubmissionFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFailed {
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WizardEvent {
    FieldUpdated(FieldUpdated),
    ProfileMerged(ProfileMerged),
    StageValidationFailed(StageValidationFailed),
    StageAdvanced(StageAdvanced),
    StageReverted(StageReverted),
    StageJumped(StageJumped),
    PaymentMethodSelected(PaymentMethodSelected),
    PaymentMethodMissing(PaymentMethodMissing),
    SubmissionStarted(SubmissionStarted),
    BookingConfirmed(BookingConfirmed),
    SubmissionFailed(SubmissionFailed),
}

impl Event for WizardEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WizardEvent::FieldUpdated(_) => "booking.wizard.field_updated",
            WizardEvent::ProfileMerged(_) => "booking.wizard.profile_merged",
            WizardEvent::StageValidationFailed(_) => "booking.wizard.stage_validation_failed",
            WizardEvent::StageAdvanced(_) => "booking.wizard.stage_advanced",
            WizardEvent::StageReverted(_) => "booking.wizard.stage_reverted",
            WizardEvent::StageJumped(_) => "booking.wizard.stage_jumped",
            WizardEvent::PaymentMethodSelected(_) => "booking.wizard.payment_method_selected",
            WizardEvent::PaymentMethodMissing(_) => "booking.wizard.payment_method_missing",
            WizardEvent::SubmissionStarted(_) => "booking.wizard.submission_started",
            WizardEvent::BookingConfirmed(_) => "booking.wizard.booking_confirmed",
            WizardEvent::SubmissionFailed(_) => "booking.wizard.submission_failed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WizardEvent::FieldUpdated(e) => e.occurred_at,
            WizardEvent::ProfileMerged(e) => e.occurred_at,
            WizardEvent::StageValidationFailed(e) => e.occurred_at,
            WizardEvent::StageAdvanced(e) => e.occurred_at,
            WizardEvent::StageReverted(e) => e.occurred_at,
            WizardEvent::StageJumped(e) => e.occurred_at,
            WizardEvent::PaymentMethodSelected(e) => e.occurred_at,
            WizardEvent::PaymentMethodMissing(e) => e.occurred_at,
            WizardEvent::SubmissionStarted(e) => e.occurred_at,
            WizardEvent::BookingConfirmed(e) => e.occurred_at,
            WizardEvent::SubmissionFailed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for BookingWizard {
    type Command = WizardCommand;
    type Event = WizardEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            WizardEvent::FieldUpdated(e) => {
                // The value was checked in `handle`; a rejected value never becomes an event.
                let _ = self.draft.set(e.field, e.value.clone());
                self.errors.remove(e.field);
            }
            WizardEvent::ProfileMerged(e) => {
                self.draft.bulk_merge(&e.autofill);
            }
            WizardEvent::StageValidationFailed(e) => {
                self.errors = e.errors.clone();
            }
            WizardEvent::StageAdvanced(e) => {
                self.errors.clear();
                self.stage = e.to;
            }
            WizardEvent::StageReverted(e) => {
                self.stage = e.to;
            }
            WizardEvent::StageJumped(e) => {
                self.stage = e.to;
            }
            WizardEvent::PaymentMethodSelected(e) => {
                self.payment_method = Some(e.payment_method_id.clone());
                self.payment_method_missing = false;
            }
            WizardEvent::PaymentMethodMissing(_) => {
                self.payment_method_missing = true;
            }
            WizardEvent::SubmissionStarted(_) => {
                self.submission = SubmissionState::Submitting;
                self.submission_error = None;
            }
            WizardEvent::BookingConfirmed(e) => {
                self.submission = SubmissionState::Confirmed;
                self.confirmation = Some(e.confirmation.clone());
            }
            WizardEvent::SubmissionFailed(e) => {
                self.submission = SubmissionState::Idle;
                self.submission_error = Some(e.reason.clone());
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if self.is_confirmed() {
            return Err(DomainError::invariant("booking is already confirmed"));
        }

        match command {
            WizardCommand::UpdateField(cmd) => self.handle_update_field(cmd),
            WizardCommand::ApplyAutofill(cmd) => self.handle_apply_autofill(cmd),
            WizardCommand::AdvanceStage(cmd) => self.handle_advance(cmd),
            WizardCommand::ReturnToPreviousStage(cmd) => self.handle_back(cmd),
            WizardCommand::JumpToStage(cmd) => self.handle_jump(cmd),
            WizardCommand::SelectPaymentMethod(cmd) => self.handle_select_payment(cmd),
            WizardCommand::BeginSubmission(cmd) => self.handle_begin_submission(cmd),
            WizardCommand::RecordSubmissionSuccess(cmd) => self.handle_submission_success(cmd),
            WizardCommand::RecordSubmissionFailure(cmd) => self.handle_submission_failure(cmd),
        }
    }
}

impl BookingWizard {
    fn handle_update_field(&self, cmd: &UpdateField) -> Result<Vec<WizardEvent>, DomainError> {
        BookingDraft::check(cmd.field, &cmd.value)?;

        Ok(vec![WizardEvent::FieldUpdated(FieldUpdated {
            field: cmd.field,
            value: cmd.value.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_apply_autofill(&self, cmd: &ApplyAutofill) -> Result<Vec<WizardEvent>, DomainError> {
        if cmd.autofill.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![WizardEvent::ProfileMerged(ProfileMerged {
            autofill: cmd.autofill.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_advance(&self, cmd: &AdvanceStage) -> Result<Vec<WizardEvent>, DomainError> {
        let Some(to) = self.stage.next() else {
            return Ok(vec![]);
        };

        let errors = validate_stage(self.stage, &self.draft);
        if !errors.is_empty() {
            return Ok(vec![WizardEvent::StageValidationFailed(StageValidationFailed {
                stage: self.stage,
                errors,
                occurred_at: cmd.occurred_at,
            })]);
        }

        Ok(vec![WizardEvent::StageAdvanced(StageAdvanced {
            from: self.stage,
            to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_back(&self, cmd: &ReturnToPreviousStage) -> Result<Vec<WizardEvent>, DomainError> {
        let Some(to) = self.stage.previous() else {
            return Ok(vec![]);
        };

        Ok(vec![WizardEvent::StageReverted(StageReverted {
            from: self.stage,
            to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_jump(&self, cmd: &JumpToStage) -> Result<Vec<WizardEvent>, DomainError> {
        if cmd.stage == self.stage {
            return Ok(vec![]);
        }

        Ok(vec![WizardEvent::StageJumped(StageJumped {
            from: self.stage,
            to: cmd.stage,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_select_payment(
        &self,
        cmd: &SelectPaymentMethod,
    ) -> Result<Vec<WizardEvent>, DomainError> {
        Ok(vec![WizardEvent::PaymentMethodSelected(PaymentMethodSelected {
            payment_method_id: cmd.payment_method_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_begin_submission(
        &self,
        cmd: &BeginSubmission,
    ) -> Result<Vec<WizardEvent>, DomainError> {
        if self.stage != Stage::Review {
            return Err(DomainError::invariant(
                "bookings can only be submitted from the review stage",
            ));
        }

        // Re-entrancy guard: a submission is already in flight.
        if self.submission == SubmissionState::Submitting {
            return Ok(vec![]);
        }

        let Some(payment_method_id) = self.payment_method.clone() else {
            return Ok(vec![WizardEvent::PaymentMethodMissing(PaymentMethodMissing {
                occurred_at: cmd.occurred_at,
            })]);
        };

        Ok(vec![WizardEvent::SubmissionStarted(SubmissionStarted {
            payment_method_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn ensure_submitting(&self) -> Result<(), DomainError> {
        if !self.submission.can_transition_to(SubmissionState::Confirmed) {
            return Err(DomainError::invariant("no submission is in progress"));
        }
        Ok(())
    }

    fn handle_submission_success(
        &self,
        cmd: &RecordSubmissionSuccess,
    ) -> Result<Vec<WizardEvent>, DomainError> {
        self.ensure_submitting()?;

        Ok(vec![WizardEvent::BookingConfirmed(BookingConfirmed {
            confirmation: cmd.confirmation.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submission_failure(
        &self,
        cmd: &RecordSubmissionFailure,
    ) -> Result<Vec<WizardEvent>, DomainError> {
        self.ensure_submitting()?;

        Ok(vec![WizardEvent::SubmissionFailed(SubmissionFailed {
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

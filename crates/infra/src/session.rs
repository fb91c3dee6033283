//! Wizard sessions: one booking wizard bound to its package, collaborators and bus.
//!
//! ## Execution flow
//!
//! ```text
//! command
//!   ↓ lock wizard
//! handle (pure) → apply → publish envelopes
//!   ↓ unlock
//! ```
//!
//! Submission is the only suspending operation. The `Idle → Submitting`
//! transition is taken under the lock, the lock is released for the backend
//! call, and the outcome is recorded under the lock again. If the submitting
//! future is dropped mid-call, the wizard is returned to `Idle` with
//! [`SUBMISSION_CANCELLED`] as its error.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use imfo_booking::{
    AdvanceStage, ApplyAutofill, BeginSubmission, BookingConfirmation, BookingSummary,
    BookingWizard, CurrentUser, DraftField, JumpToStage, PackageSummary, RecordSubmissionFailure,
    RecordSubmissionSuccess, ReturnToPreviousStage, SelectPaymentMethod, Stage, UpdateField,
    WizardCommand, WizardEvent, WizardSnapshot, autofill_from_profile,
};
use imfo_core::{Aggregate, AggregateRoot, DomainError, PackageId, PaymentMethodId, WizardId};
use imfo_events::{Event, EventBus, EventEnvelope};

use crate::collaborators::{CollaboratorError, Collaborators};

pub type WizardEnvelope = EventEnvelope<WizardEvent>;

/// Failure reason recorded when a submission is abandoned before the backend answered.
pub const SUBMISSION_CANCELLED: &str = "submission cancelled before the backend answered";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The package could not be resolved; no wizard was created.
    #[error("package lookup failed: {0}")]
    PackageLookup(CollaboratorError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result of a submit attempt. Failures to book are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Confirmed(BookingConfirmation),
    MissingPaymentMethod,
    /// Another submission for this wizard is in flight; nothing was sent.
    AlreadySubmitting,
    Failed { reason: String },
}

pub struct WizardSession<B> {
    package: PackageSummary,
    wizard: Mutex<BookingWizard>,
    collaborators: Collaborators,
    bus: B,
}

impl<B> WizardSession<B>
where
    B: EventBus<WizardEnvelope>,
{
    /// Resolve the package and start a fresh wizard for it.
    pub async fn open(
        package_id: PackageId,
        current_user: Option<CurrentUser>,
        collaborators: Collaborators,
        bus: B,
    ) -> Result<Self, SessionError> {
        let package = collaborators
            .packages
            .package(&package_id)
            .await
            .map_err(|e| {
                tracing::warn!(package_id = %package_id, error = %e, "package lookup failed");
                SessionError::PackageLookup(e)
            })?;

        let wizard = BookingWizard::new(WizardId::new(), package_id, current_user);
        tracing::info!(
            wizard_id = %wizard.id(),
            package_id = %wizard.package_id(),
            "booking wizard opened"
        );

        Ok(Self {
            package,
            wizard: Mutex::new(wizard),
            collaborators,
            bus,
        })
    }

    pub fn id(&self) -> WizardId {
        *self.lock().id()
    }

    pub fn package(&self) -> &PackageSummary {
        &self.package
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        self.lock().snapshot()
    }

    pub fn summary(&self) -> BookingSummary {
        self.lock().summary(Some(&self.package))
    }

    /// Run a command against the wizard and publish what it emitted.
    pub fn execute(&self, command: WizardCommand) -> Result<Vec<WizardEvent>, SessionError> {
        let mut wizard = self.lock();
        self.run(&mut wizard, &command)
    }

    pub fn update_field(
        &self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<Vec<WizardEvent>, SessionError> {
        self.execute(WizardCommand::UpdateField(UpdateField {
            field,
            value: value.into(),
            occurred_at: Utc::now(),
        }))
    }

    pub fn next(&self) -> Result<Vec<WizardEvent>, SessionError> {
        self.execute(WizardCommand::AdvanceStage(AdvanceStage {
            occurred_at: Utc::now(),
        }))
    }

    pub fn back(&self) -> Result<Vec<WizardEvent>, SessionError> {
        self.execute(WizardCommand::ReturnToPreviousStage(ReturnToPreviousStage {
            occurred_at: Utc::now(),
        }))
    }

    /// Jump to a 1-based stage number; out-of-range numbers are rejected.
    pub fn go_to_stage(&self, stage: u8) -> Result<Vec<WizardEvent>, SessionError> {
        let stage = Stage::try_from(stage)?;
        self.execute(WizardCommand::JumpToStage(JumpToStage {
            stage,
            occurred_at: Utc::now(),
        }))
    }

    pub fn select_payment_method(
        &self,
        payment_method_id: PaymentMethodId,
    ) -> Result<Vec<WizardEvent>, SessionError> {
        self.execute(WizardCommand::SelectPaymentMethod(SelectPaymentMethod {
            payment_method_id,
            occurred_at: Utc::now(),
        }))
    }

    /// Fill "Your Details" from the signed-in user's profile.
    ///
    /// Returns `false` when there is no user or the profile lookup fails; the
    /// failure is logged and the draft is left alone.
    pub async fn autofill(&self) -> Result<bool, SessionError> {
        let user = self.lock().current_user().cloned();
        let Some(user) = user else {
            return Ok(false);
        };

        let profile = match self.collaborators.profiles.profile(&user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "profile autofill failed");
                return Ok(false);
            }
        };

        self.execute(WizardCommand::ApplyAutofill(ApplyAutofill {
            autofill: autofill_from_profile(&profile, &user),
            occurred_at: Utc::now(),
        }))?;
        Ok(true)
    }

    /// Submit the booking. At most one backend call is in flight per wizard.
    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        let request = {
            let mut wizard = self.lock();
            let events = self.run(
                &mut wizard,
                &WizardCommand::BeginSubmission(BeginSubmission {
                    occurred_at: Utc::now(),
                }),
            )?;

            match events.first() {
                None => return Ok(SubmitOutcome::AlreadySubmitting),
                Some(WizardEvent::PaymentMethodMissing(_)) => {
                    return Ok(SubmitOutcome::MissingPaymentMethod);
                }
                Some(_) => {}
            }

            wizard.booking_request().ok_or_else(|| {
                DomainError::invariant("submission started without a payment method")
            })?
        };

        let in_flight = InFlightSubmission::arm(self);
        let result = self.collaborators.bookings.create_booking(&request).await;
        in_flight.disarm();

        let mut wizard = self.lock();
        match result {
            Ok(confirmation) => {
                self.run(
                    &mut wizard,
                    &WizardCommand::RecordSubmissionSuccess(RecordSubmissionSuccess {
                        confirmation: confirmation.clone(),
                        occurred_at: Utc::now(),
                    }),
                )?;
                tracing::info!(
                    wizard_id = %wizard.id(),
                    booking_id = %confirmation.booking_id,
                    "booking confirmed"
                );
                Ok(SubmitOutcome::Confirmed(confirmation))
            }
            Err(e) => {
                let reason = e.to_string();
                self.run(
                    &mut wizard,
                    &WizardCommand::RecordSubmissionFailure(RecordSubmissionFailure {
                        reason: reason.clone(),
                        occurred_at: Utc::now(),
                    }),
                )?;
                tracing::warn!(wizard_id = %wizard.id(), error = %e, "booking submission failed");
                Ok(SubmitOutcome::Failed { reason })
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BookingWizard> {
        // `apply` cannot panic midway, so a poisoned wizard is still consistent.
        self.wizard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run(
        &self,
        wizard: &mut BookingWizard,
        command: &WizardCommand,
    ) -> Result<Vec<WizardEvent>, SessionError> {
        let from = wizard.stage();
        let events = wizard.execute(command)?;
        if wizard.stage() != from {
            tracing::debug!(
                wizard_id = %wizard.id(),
                from = from.number(),
                to = wizard.stage().number(),
                "stage changed"
            );
        }
        self.publish(wizard, &events);
        Ok(events)
    }

    /// Publish applied events in order. Lossy: a bus failure never undoes state.
    fn publish(&self, wizard: &BookingWizard, events: &[WizardEvent]) {
        let first_sequence = wizard.version() - events.len() as u64 + 1;
        for (offset, event) in events.iter().enumerate() {
            let envelope = EventEnvelope::new(
                Uuid::now_v7(),
                *wizard.id(),
                event.event_type(),
                first_sequence + offset as u64,
                event.clone(),
            );
            if let Err(e) = self.bus.publish(envelope) {
                tracing::warn!(wizard_id = %wizard.id(), error = ?e, "event publication failed");
            }
        }
    }
}

/// Records a failed submission if dropped while armed, so a cancelled
/// `submit` never leaves the wizard stuck in `Submitting`.
struct InFlightSubmission<'a, B>
where
    B: EventBus<WizardEnvelope>,
{
    session: &'a WizardSession<B>,
    armed: bool,
}

impl<'a, B> InFlightSubmission<'a, B>
where
    B: EventBus<WizardEnvelope>,
{
    fn arm(session: &'a WizardSession<B>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<B> Drop for InFlightSubmission<'_, B>
where
    B: EventBus<WizardEnvelope>,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut wizard = self.session.lock();
        let command = WizardCommand::RecordSubmissionFailure(RecordSubmissionFailure {
            reason: SUBMISSION_CANCELLED.to_string(),
            occurred_at: Utc::now(),
        });
        match self.session.run(&mut wizard, &command) {
            Ok(_) => tracing::warn!(wizard_id = %wizard.id(), "booking submission cancelled"),
            Err(e) => tracing::warn!(
                wizard_id = %wizard.id(),
                error = %e,
                "could not reset cancelled submission"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use imfo_booking::{
        BookingRequest, SubmissionState, UserProfile,
        validation::{STAGE1_REQUIRED, STAGE2_REQUIRED},
    };
    use imfo_core::UserId;
    use imfo_events::InMemoryEventBus;
    use tokio::sync::Notify;

    use crate::collaborators::{
        BookingGateway, InMemoryBookingGateway, InMemoryPackageCatalog, InMemoryProfileDirectory,
    };

    type TestBus = Arc<InMemoryEventBus<WizardEnvelope>>;

    struct Fixture {
        profiles: Arc<InMemoryProfileDirectory>,
        gateway: Arc<InMemoryBookingGateway>,
        bus: TestBus,
        collaborators: Collaborators,
    }

    fn fixture() -> Fixture {
        let profiles = Arc::new(InMemoryProfileDirectory::new());
        let gateway = Arc::new(InMemoryBookingGateway::new());
        let collaborators = Collaborators::new(
            Arc::new(InMemoryPackageCatalog::seeded()),
            profiles.clone(),
            gateway.clone(),
        );
        Fixture {
            profiles,
            gateway,
            bus: Arc::new(InMemoryEventBus::new()),
            collaborators,
        }
    }

    fn user() -> CurrentUser {
        CurrentUser::new(UserId::new("user-1").unwrap())
            .with_email("ama@x.com")
            .with_phone("0551234567")
    }

    fn bronze() -> PackageId {
        PackageId::new("bronze-wedding").unwrap()
    }

    async fn open(fx: &Fixture) -> WizardSession<TestBus> {
        WizardSession::open(bronze(), Some(user()), fx.collaborators.clone(), fx.bus.clone())
            .await
            .unwrap()
    }

    fn drive_to_review<B: EventBus<WizardEnvelope>>(session: &WizardSession<B>) {
        for (field, _) in STAGE1_REQUIRED.iter().chain(STAGE2_REQUIRED.iter()) {
            session.update_field(*field, "filled").unwrap();
        }
        session.next().unwrap();
        session.next().unwrap();
        assert_eq!(session.snapshot().stage, Stage::Review);
    }

    #[tokio::test]
    async fn unknown_package_fails_to_open() {
        let fx = fixture();
        let result = WizardSession::open(
            PackageId::new("missing").unwrap(),
            None,
            fx.collaborators.clone(),
            fx.bus.clone(),
        )
        .await;

        match result {
            Err(SessionError::PackageLookup(CollaboratorError::NotFound(_))) => {}
            Err(other) => panic!("Expected PackageLookup(NotFound), got {other:?}"),
            Ok(_) => panic!("Expected PackageLookup(NotFound), got a session"),
        }
    }

    #[tokio::test]
    async fn opened_session_exposes_package_and_fresh_wizard() {
        let fx = fixture();
        let session = open(&fx).await;
        assert_eq!(session.package().title, "Bronze Wedding");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.stage_number, 1);
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.id, session.id());
    }

    #[tokio::test]
    async fn out_of_range_stage_is_rejected() {
        let fx = fixture();
        let session = open(&fx).await;
        match session.go_to_stage(4).unwrap_err() {
            SessionError::Domain(DomainError::Validation(_)) => {}
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert_eq!(session.snapshot().stage, Stage::YourDetails);
    }

    #[tokio::test]
    async fn applied_events_are_published_in_sequence() {
        let fx = fixture();
        let session = open(&fx).await;
        let sub = fx.bus.subscribe();

        session.update_field(DraftField::FirstName, "Ama").unwrap();
        session.next().unwrap();

        let first = sub.try_recv().unwrap();
        let second = sub.try_recv().unwrap();
        assert!(sub.try_recv().is_err());

        assert_eq!(first.wizard_id(), session.id());
        assert_eq!(first.event_type(), "booking.wizard.field_updated");
        assert_eq!(first.sequence_number(), 1);
        assert_eq!(second.event_type(), "booking.wizard.stage_validation_failed");
        assert_eq!(second.sequence_number(), 2);
    }

    #[tokio::test]
    async fn autofill_uses_profile_and_user_context() {
        let fx = fixture();
        fx.profiles.insert(
            UserId::new("user-1").unwrap(),
            UserProfile {
                name: Some("Ama Serwaa Owusu".into()),
                location: Some("East Legon".into()),
            },
        );
        let session = open(&fx).await;

        assert!(session.autofill().await.unwrap());
        let draft = session.snapshot().draft;
        assert_eq!(draft.first_name, "Ama");
        assert_eq!(draft.last_name, "Serwaa Owusu");
        assert_eq!(draft.email, "ama@x.com");
        assert_eq!(draft.country, "Ghana");
        assert_eq!(draft.city, "East Legon");
    }

    #[tokio::test]
    async fn autofill_failure_is_ignored() {
        let fx = fixture();
        let session = open(&fx).await;
        assert!(!session.autofill().await.unwrap());
        assert_eq!(session.snapshot().version, 0);
    }

    #[tokio::test]
    async fn autofill_without_user_is_a_no_op() {
        let fx = fixture();
        let session =
            WizardSession::open(bronze(), None, fx.collaborators.clone(), fx.bus.clone())
                .await
                .unwrap();
        assert!(!session.autofill().await.unwrap());
    }

    #[tokio::test]
    async fn submit_without_payment_method_makes_no_call() {
        let fx = fixture();
        let session = open(&fx).await;
        drive_to_review(&session);

        let outcome = session.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::MissingPaymentMethod);
        assert_eq!(fx.gateway.calls(), 0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.submission_state, SubmissionState::Idle);
        assert!(snapshot.payment_method_missing);
    }

    #[tokio::test]
    async fn successful_submit_confirms_booking() {
        let fx = fixture();
        let session = open(&fx).await;
        drive_to_review(&session);
        session
            .select_payment_method(PaymentMethodId::new("momo").unwrap())
            .unwrap();

        match session.submit().await.unwrap() {
            SubmitOutcome::Confirmed(confirmation) => assert_eq!(confirmation.booking_id, "bk-1"),
            other => panic!("Expected Confirmed, got {other:?}"),
        }

        let accepted = fx.gateway.accepted();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].package_id, bronze());
        assert_eq!(accepted[0].user_id, Some(UserId::new("user-1").unwrap()));
        assert_eq!(session.snapshot().submission_state, SubmissionState::Confirmed);
    }

    #[tokio::test]
    async fn rejected_submit_returns_to_idle_with_draft_intact() {
        let fx = fixture();
        fx.gateway.reject_with("date unavailable");
        let session = open(&fx).await;
        drive_to_review(&session);
        session
            .select_payment_method(PaymentMethodId::new("visa").unwrap())
            .unwrap();
        let draft_before = session.snapshot().draft;

        match session.submit().await.unwrap() {
            SubmitOutcome::Failed { reason } if reason.contains("date unavailable") => {}
            other => panic!("Expected Failed, got {other:?}"),
        }

        let snapshot = session.snapshot();
        assert_eq!(snapshot.submission_state, SubmissionState::Idle);
        assert_eq!(snapshot.stage, Stage::Review);
        assert_eq!(snapshot.draft, draft_before);
        assert!(snapshot.submission_error.is_some());

        // A retry goes through once the backend accepts.
        fx.gateway.accept();
        assert!(matches!(
            session.submit().await.unwrap(),
            SubmitOutcome::Confirmed(_)
        ));
        assert_eq!(fx.gateway.calls(), 2);
    }

    /// Gateway that parks every call until released.
    #[derive(Default)]
    struct ParkedGateway {
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl BookingGateway for ParkedGateway {
        async fn create_booking(
            &self,
            _request: &BookingRequest,
        ) -> Result<BookingConfirmation, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(BookingConfirmation {
                booking_id: "bk-parked".into(),
                status: None,
            })
        }
    }

    #[tokio::test]
    async fn concurrent_submit_makes_a_single_call() {
        let fx = fixture();
        let gateway = Arc::new(ParkedGateway::default());
        let collaborators = Collaborators::new(
            fx.collaborators.packages.clone(),
            fx.collaborators.profiles.clone(),
            gateway.clone(),
        );
        let session = Arc::new(
            WizardSession::open(bronze(), Some(user()), collaborators, fx.bus.clone())
                .await
                .unwrap(),
        );
        drive_to_review(&*session);
        session
            .select_payment_method(PaymentMethodId::new("visa").unwrap())
            .unwrap();

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.submit().await })
        };

        while session.snapshot().submission_state != SubmissionState::Submitting {
            tokio::task::yield_now().await;
        }

        let second = session.submit().await.unwrap();
        assert_eq!(second, SubmitOutcome::AlreadySubmitting);

        gateway.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, SubmitOutcome::Confirmed(_)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_submit_returns_wizard_to_idle() {
        let fx = fixture();
        let gateway = Arc::new(ParkedGateway::default());
        let collaborators = Collaborators::new(
            fx.collaborators.packages.clone(),
            fx.collaborators.profiles.clone(),
            gateway.clone(),
        );
        let session = Arc::new(
            WizardSession::open(bronze(), Some(user()), collaborators, fx.bus.clone())
                .await
                .unwrap(),
        );
        drive_to_review(&*session);
        session
            .select_payment_method(PaymentMethodId::new("visa").unwrap())
            .unwrap();
        let draft_before = session.snapshot().draft;

        let task = {
            let session = session.clone();
            tokio::spawn(async move { session.submit().await })
        };
        while gateway.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.submission_state, SubmissionState::Idle);
        assert_eq!(snapshot.stage, Stage::Review);
        assert_eq!(snapshot.submission_error.as_deref(), Some(SUBMISSION_CANCELLED));
        assert_eq!(snapshot.draft, draft_before);

        // The stored permit lets the retry through straight away.
        gateway.release.notify_one();
        assert!(matches!(
            session.submit().await.unwrap(),
            SubmitOutcome::Confirmed(_)
        ));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }
}

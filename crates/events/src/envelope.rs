use serde::{Deserialize, Serialize};
use uuid::Uuid;

use imfo_core::WizardId;

/// Envelope for an event, containing stream metadata.
///
/// Notes:
/// - Every wizard session is its own stream, keyed by `wizard_id`.
/// - `sequence_number` is monotonically increasing per stream and equals the
///   wizard's version after the event was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    wizard_id: WizardId,
    event_type: String,

    /// Monotonically increasing position in the wizard stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        wizard_id: WizardId,
        event_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            wizard_id,
            event_type: event_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn wizard_id(&self) -> WizardId {
        self.wizard_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

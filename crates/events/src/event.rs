use chrono::{DateTime, Utc};

/// A fact emitted by a wizard once a command has been decided.
///
/// Sessions apply it to the wizard before publishing, so an event on the bus
/// always describes state that already exists. `event_type` names the topic
/// SSE clients see (e.g. "booking.wizard.stage_advanced"); `version` bumps
/// whenever the payload shape changes.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    fn version(&self) -> u32;

    /// Business time, taken from the command that caused the event.
    fn occurred_at(&self) -> DateTime<Utc>;
}

//! Stage-scoped, presence-only validation.
//!
//! Validators are pure functions of the draft. They never look at (or change)
//! the wizard's current stage or error map; the wizard decides what to do with
//! the result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::draft::{BookingDraft, DraftField};
use crate::stage::Stage;

/// Required fields of "Your Details", with their messages.
pub const STAGE1_REQUIRED: [(DraftField, &str); 7] = [
    (DraftField::FirstName, "First name is required"),
    (DraftField::LastName, "Last name is required"),
    (DraftField::Email, "Email is required"),
    (DraftField::Phone, "Phone number is required"),
    (DraftField::StreetAddress, "Street address is required"),
    (DraftField::City, "City is required"),
    (DraftField::StateRegion, "State/Region is required"),
];

/// Required fields of "Event Details" (event block plus primary contact).
pub const STAGE2_REQUIRED: [(DraftField, &str); 10] = [
    (DraftField::EventName, "Event name is required"),
    (DraftField::EventDate, "Event date is required"),
    (DraftField::StartTime, "Start time is required"),
    (DraftField::EndTime, "End time is required"),
    (DraftField::EventVenueAddress, "Venue address is required"),
    (DraftField::EventCity, "Event city is required"),
    (DraftField::EventStateRegion, "Event state/region is required"),
    (DraftField::PrimaryContactName, "Full name is required"),
    (DraftField::PrimaryContactPhone, "Phone number is required"),
    (DraftField::PrimaryContactEmail, "Email is required"),
];

/// Field name → human-readable message, for fields failing the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<DraftField, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: DraftField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: DraftField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: DraftField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn fields(&self) -> impl Iterator<Item = DraftField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl FromIterator<(DraftField, String)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (DraftField, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn required(draft: &BookingDraft, rules: &[(DraftField, &str)]) -> ValidationErrors {
    rules
        .iter()
        .filter(|(field, _)| draft.get(*field).trim().is_empty())
        .map(|(field, message)| (*field, (*message).to_string()))
        .collect()
}

/// Validate "Your Details". Middle name, country and postal code are optional.
pub fn validate_stage1(draft: &BookingDraft) -> ValidationErrors {
    required(draft, &STAGE1_REQUIRED)
}

/// Validate "Event Details". Event type, description, venue country/postal code,
/// guests, landmark, notes and the whole secondary contact are optional.
pub fn validate_stage2(draft: &BookingDraft) -> ValidationErrors {
    required(draft, &STAGE2_REQUIRED)
}

/// Validator gating the exit of `stage`; the review stage has none.
pub fn validate_stage(stage: Stage, draft: &BookingDraft) -> ValidationErrors {
    match stage {
        Stage::YourDetails => validate_stage1(draft),
        Stage::EventDetails => validate_stage2(draft),
        Stage::Review => ValidationErrors::new(),
    }
}

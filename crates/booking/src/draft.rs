//! The booking draft: every value the wizard collects, in one closed record.

use serde::{Deserialize, Serialize};

use imfo_core::{DomainError, DomainResult};

/// Where the event takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Indoor,
    Outdoor,
    Both,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Indoor => "indoor",
            EventType::Outdoor => "outdoor",
            EventType::Both => "both",
            EventType::Unset => "",
        }
    }

    /// Human label used on the review stage.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Indoor => "Indoor",
            EventType::Outdoor => "Outdoor",
            EventType::Both => "Indoor & Outdoor",
            EventType::Unset => "",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "indoor" => Ok(EventType::Indoor),
            "outdoor" => Ok(EventType::Outdoor),
            "both" => Ok(EventType::Both),
            "" => Ok(EventType::Unset),
            other => Err(DomainError::validation(format!(
                "event type must be one of: indoor, outdoor, both (got '{other}')"
            ))),
        }
    }
}

/// Closed enumeration of every draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    // Your details
    FirstName,
    MiddleName,
    LastName,
    Email,
    Phone,
    Country,
    PostalCode,
    StreetAddress,
    City,
    StateRegion,
    // Event details
    EventName,
    EventDescription,
    EventDate,
    StartTime,
    EndTime,
    EventType,
    EventVenueAddress,
    EventCity,
    EventStateRegion,
    EventCountry,
    EventPostalCode,
    NumberOfGuests,
    NearbyLandmark,
    SpecialNotes,
    // Event contacts
    PrimaryContactName,
    PrimaryContactPhone,
    PrimaryContactEmail,
    SecondaryContactName,
    SecondaryContactPhone,
    SecondaryContactEmail,
    // Review
    SpecialRequests,
}

impl DraftField {
    pub const ALL: [DraftField; 31] = [
        DraftField::FirstName,
        DraftField::MiddleName,
        DraftField::LastName,
        DraftField::Email,
        DraftField::Phone,
        DraftField::Country,
        DraftField::PostalCode,
        DraftField::StreetAddress,
        DraftField::City,
        DraftField::StateRegion,
        DraftField::EventName,
        DraftField::EventDescription,
        DraftField::EventDate,
        DraftField::StartTime,
        DraftField::EndTime,
        DraftField::EventType,
        DraftField::EventVenueAddress,
        DraftField::EventCity,
        DraftField::EventStateRegion,
        DraftField::EventCountry,
        DraftField::EventPostalCode,
        DraftField::NumberOfGuests,
        DraftField::NearbyLandmark,
        DraftField::SpecialNotes,
        DraftField::PrimaryContactName,
        DraftField::PrimaryContactPhone,
        DraftField::PrimaryContactEmail,
        DraftField::SecondaryContactName,
        DraftField::SecondaryContactPhone,
        DraftField::SecondaryContactEmail,
        DraftField::SpecialRequests,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::FirstName => "first_name",
            DraftField::MiddleName => "middle_name",
            DraftField::LastName => "last_name",
            DraftField::Email => "email",
            DraftField::Phone => "phone",
            DraftField::Country => "country",
            DraftField::PostalCode => "postal_code",
            DraftField::StreetAddress => "street_address",
            DraftField::City => "city",
            DraftField::StateRegion => "state_region",
            DraftField::EventName => "event_name",
            DraftField::EventDescription => "event_description",
            DraftField::EventDate => "event_date",
            DraftField::StartTime => "start_time",
            DraftField::EndTime => "end_time",
            DraftField::EventType => "event_type",
            DraftField::EventVenueAddress => "event_venue_address",
            DraftField::EventCity => "event_city",
            DraftField::EventStateRegion => "event_state_region",
            DraftField::EventCountry => "event_country",
            DraftField::EventPostalCode => "event_postal_code",
            DraftField::NumberOfGuests => "number_of_guests",
            DraftField::NearbyLandmark => "nearby_landmark",
            DraftField::SpecialNotes => "special_notes",
            DraftField::PrimaryContactName => "primary_contact_name",
            DraftField::PrimaryContactPhone => "primary_contact_phone",
            DraftField::PrimaryContactEmail => "primary_contact_email",
            DraftField::SecondaryContactName => "secondary_contact_name",
            DraftField::SecondaryContactPhone => "secondary_contact_phone",
            DraftField::SecondaryContactEmail => "secondary_contact_email",
            DraftField::SpecialRequests => "special_requests",
        }
    }
}

impl core::fmt::Display for DraftField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for DraftField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown draft field '{s}'")))
    }
}

/// In-progress form state for one booking attempt.
///
/// Every field always holds a value; "not provided" is the empty string (or
/// `EventType::Unset`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookingDraft {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub postal_code: String,
    pub street_address: String,
    pub city: String,
    pub state_region: String,

    pub event_name: String,
    pub event_description: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub event_date: String,
    /// 24-hour `HH:MM`.
    pub start_time: String,
    /// 24-hour `HH:MM`.
    pub end_time: String,
    pub event_type: EventType,
    pub event_venue_address: String,
    pub event_city: String,
    pub event_state_region: String,
    pub event_country: String,
    pub event_postal_code: String,
    /// Guest-count bucket, e.g. "51-100" or "500+".
    pub number_of_guests: String,
    pub nearby_landmark: String,
    pub special_notes: String,

    pub primary_contact_name: String,
    pub primary_contact_phone: String,
    pub primary_contact_email: String,
    pub secondary_contact_name: String,
    pub secondary_contact_phone: String,
    pub secondary_contact_email: String,

    pub special_requests: String,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field, as the view would render it in an input.
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::EventType => self.event_type.as_str(),
            other => self.text(other),
        }
    }

    /// Check that `value` is acceptable for `field` without touching the draft.
    ///
    /// Text fields accept anything, including the empty string.
    pub fn check(field: DraftField, value: &str) -> DomainResult<()> {
        if field == DraftField::EventType {
            EventType::parse(value)?;
        }
        Ok(())
    }

    /// Set a field. Only `event_type` can reject a value.
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) -> DomainResult<()> {
        let value = value.into();
        if field == DraftField::EventType {
            self.event_type = EventType::parse(&value)?;
            return Ok(());
        }
        if let Some(slot) = self.text_mut(field) {
            *slot = value;
        }
        Ok(())
    }

    /// Merge the keys present in `partial`; everything else stays as is.
    pub fn bulk_merge(&mut self, partial: &ProfileAutofill) {
        for (field, value) in partial.entries() {
            if let Some(slot) = self.text_mut(field) {
                *slot = value.to_string();
            }
        }
    }

    fn text(&self, field: DraftField) -> &str {
        match field {
            DraftField::FirstName => &self.first_name,
            DraftField::MiddleName => &self.middle_name,
            DraftField::LastName => &self.last_name,
            DraftField::Email => &self.email,
            DraftField::Phone => &self.phone,
            DraftField::Country => &self.country,
            DraftField::PostalCode => &self.postal_code,
            DraftField::StreetAddress => &self.street_address,
            DraftField::City => &self.city,
            DraftField::StateRegion => &self.state_region,
            DraftField::EventName => &self.event_name,
            DraftField::EventDescription => &self.event_description,
            DraftField::EventDate => &self.event_date,
            DraftField::StartTime => &self.start_time,
            DraftField::EndTime => &self.end_time,
            DraftField::EventType => self.event_type.as_str(),
            DraftField::EventVenueAddress => &self.event_venue_address,
            DraftField::EventCity => &self.event_city,
            DraftField::EventStateRegion => &self.event_state_region,
            DraftField::EventCountry => &self.event_country,
            DraftField::EventPostalCode => &self.event_postal_code,
            DraftField::NumberOfGuests => &self.number_of_guests,
            DraftField::NearbyLandmark => &self.nearby_landmark,
            DraftField::SpecialNotes => &self.special_notes,
            DraftField::PrimaryContactName => &self.primary_contact_name,
            DraftField::PrimaryContactPhone => &self.primary_contact_phone,
            DraftField::PrimaryContactEmail => &self.primary_contact_email,
            DraftField::SecondaryContactName => &self.secondary_contact_name,
            DraftField::SecondaryContactPhone => &self.secondary_contact_phone,
            DraftField::SecondaryContactEmail => &self.secondary_contact_email,
            DraftField::SpecialRequests => &self.special_requests,
        }
    }

    /// `None` for `event_type`, which is not free text.
    fn text_mut(&mut self, field: DraftField) -> Option<&mut String> {
        let slot = match field {
            DraftField::FirstName => &mut self.first_name,
            DraftField::MiddleName => &mut self.middle_name,
            DraftField::LastName => &mut self.last_name,
            DraftField::Email => &mut self.email,
            DraftField::Phone => &mut self.phone,
            DraftField::Country => &mut self.country,
            DraftField::PostalCode => &mut self.postal_code,
            DraftField::StreetAddress => &mut self.street_address,
            DraftField::City => &mut self.city,
            DraftField::StateRegion => &mut self.state_region,
            DraftField::EventName => &mut self.event_name,
            DraftField::EventDescription => &mut self.event_description,
            DraftField::EventDate => &mut self.event_date,
            DraftField::StartTime => &mut self.start_time,
            DraftField::EndTime => &mut self.end_time,
            DraftField::EventType => return None,
            DraftField::EventVenueAddress => &mut self.event_venue_address,
            DraftField::EventCity => &mut self.event_city,
            DraftField::EventStateRegion => &mut self.event_state_region,
            DraftField::EventCountry => &mut self.event_country,
            DraftField::EventPostalCode => &mut self.event_postal_code,
            DraftField::NumberOfGuests => &mut self.number_of_guests,
            DraftField::NearbyLandmark => &mut self.nearby_landmark,
            DraftField::SpecialNotes => &mut self.special_notes,
            DraftField::PrimaryContactName => &mut self.primary_contact_name,
            DraftField::PrimaryContactPhone => &mut self.primary_contact_phone,
            DraftField::PrimaryContactEmail => &mut self.primary_contact_email,
            DraftField::SecondaryContactName => &mut self.secondary_contact_name,
            DraftField::SecondaryContactPhone => &mut self.secondary_contact_phone,
            DraftField::SecondaryContactEmail => &mut self.secondary_contact_email,
            DraftField::SpecialRequests => &mut self.special_requests,
        };
        Some(slot)
    }
}

/// Partial record used to seed the draft from the signed-in user's profile.
///
/// `None` means "leave the draft's value alone".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileAutofill {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
}

impl ProfileAutofill {
    /// Present keys, in draft order.
    pub fn entries(&self) -> impl Iterator<Item = (DraftField, &str)> {
        [
            (DraftField::FirstName, &self.first_name),
            (DraftField::LastName, &self.last_name),
            (DraftField::Email, &self.email),
            (DraftField::Phone, &self.phone),
            (DraftField::Country, &self.country),
            (DraftField::StreetAddress, &self.street_address),
            (DraftField::City, &self.city),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_draft_has_every_field_empty() {
        let draft = BookingDraft::new();
        for field in DraftField::ALL {
            assert_eq!(draft.get(field), "", "{field} should start empty");
        }
        assert_eq!(draft.event_type, EventType::Unset);
    }

    #[test]
    fn set_then_get_returns_value_for_every_text_field() {
        let mut draft = BookingDraft::new();
        for field in DraftField::ALL {
            if field == DraftField::EventType {
                continue;
            }
            draft.set(field, format!("value-{field}")).unwrap();
            assert_eq!(draft.get(field), format!("value-{field}"));
        }
    }

    #[test]
    fn event_type_accepts_known_values_and_empty() {
        let mut draft = BookingDraft::new();
        draft.set(DraftField::EventType, "Outdoor").unwrap();
        assert_eq!(draft.event_type, EventType::Outdoor);
        assert_eq!(draft.get(DraftField::EventType), "outdoor");

        draft.set(DraftField::EventType, "").unwrap();
        assert_eq!(draft.event_type, EventType::Unset);
    }

    #[test]
    fn event_type_rejects_unknown_value_and_keeps_previous() {
        let mut draft = BookingDraft::new();
        draft.set(DraftField::EventType, "indoor").unwrap();

        let err = draft.set(DraftField::EventType, "underwater").unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("underwater") => {}
            _ => panic!("Expected Validation error for unknown event type"),
        }
        assert_eq!(draft.event_type, EventType::Indoor);
    }

    #[test]
    fn field_names_parse_back() {
        for field in DraftField::ALL {
            assert_eq!(field.as_str().parse::<DraftField>().unwrap(), field);
        }
        assert!("eventDate".parse::<DraftField>().is_err());
    }

    #[test]
    fn field_serde_name_matches_as_str() {
        for field in DraftField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn bulk_merge_only_touches_present_keys() {
        let mut draft = BookingDraft::new();
        draft.set(DraftField::StateRegion, "Ashanti").unwrap();
        draft.set(DraftField::Email, "old@x.com").unwrap();

        let partial = ProfileAutofill {
            first_name: Some("Ama".into()),
            city: Some("Kumasi".into()),
            ..Default::default()
        };
        draft.bulk_merge(&partial);

        assert_eq!(draft.first_name, "Ama");
        assert_eq!(draft.city, "Kumasi");
        assert_eq!(draft.email, "old@x.com");
        assert_eq!(draft.state_region, "Ashanti");
        assert_eq!(draft.last_name, "");
    }

    #[test]
    fn empty_autofill_reports_empty() {
        assert!(ProfileAutofill::default().is_empty());
        let partial = ProfileAutofill {
            country: Some("Ghana".into()),
            ..Default::default()
        };
        assert!(!partial.is_empty());
    }
}

//! Read-only projections of the draft for the review stage.
//!
//! Everything here is a pure function of its inputs.

use chrono::NaiveDate;
use serde::Serialize;

use crate::draft::BookingDraft;
use crate::package::PackageSummary;

const DEFAULT_COUNTRY: &str = "Ghana";
const PHONE_PREFIX: &str = "+233";
const PLACEHOLDER: &str = "-";

/// First, middle and last name joined by single spaces, skipping blanks.
pub fn format_full_name(draft: &BookingDraft) -> String {
    join_non_empty(
        [
            draft.first_name.as_str(),
            draft.middle_name.as_str(),
            draft.last_name.as_str(),
        ],
        " ",
    )
}

/// `YYYY-MM-DD` → "D Month YYYY". The input is a calendar date, never an
/// instant, so no timezone is involved. Unparseable input is returned trimmed.
pub fn format_date(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    // Tolerate a datetime by keeping the date part.
    let date_part = value.split('T').next().unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%-d %B %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// 24-hour `HH:MM` → 12-hour `H:MM AM/PM`. Unparseable input is returned trimmed.
pub fn format_time(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    let mut parts = value.split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return value.to_string();
    };
    let hour: u32 = match hours.trim().parse() {
        Ok(h) if h < 24 => h,
        _ => return value.to_string(),
    };
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minutes} {meridiem}")
}

/// "START - END", or whichever side is present.
pub fn format_time_range(start: &str, end: &str) -> String {
    join_non_empty([format_time(start).as_str(), format_time(end).as_str()], " - ")
}

/// Whether the secondary contact block should be shown.
pub fn has_secondary_contact(draft: &BookingDraft) -> bool {
    !draft.secondary_contact_name.trim().is_empty()
}

/// Price in pesewas → "GH₵ 5,000" (decimals only when there are pesewas).
pub fn format_price(pesewas: u64) -> String {
    let cedis = pesewas / 100;
    let rest = pesewas % 100;

    let digits = cedis.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rest == 0 {
        format!("GH₵ {grouped}")
    } else {
        format!("GH₵ {grouped}.{rest:02}")
    }
}

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn or_default(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn with_phone_prefix(phone: &str) -> String {
    let phone = phone.trim();
    if phone.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        format!("{PHONE_PREFIX} {phone}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSummary {
    pub name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLine {
    pub title: String,
    pub price: String,
}

/// The review stage, fully formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSummary {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub postal_code: String,
    pub address: String,

    pub event_name: String,
    pub event_description: String,
    pub event_date: String,
    pub event_time: String,
    pub event_type: String,
    pub venue: String,
    pub venue_country: String,
    pub venue_postal_code: String,
    pub guests: String,
    pub nearby_landmark: String,
    pub special_notes: Option<String>,

    pub primary_contact: ContactSummary,
    pub secondary_contact: Option<ContactSummary>,

    pub special_requests: String,
    pub package: Option<PackageLine>,
}

impl BookingSummary {
    pub fn build(draft: &BookingDraft, package: Option<&PackageSummary>) -> Self {
        let secondary_contact = has_secondary_contact(draft).then(|| ContactSummary {
            name: draft.secondary_contact_name.trim().to_string(),
            phone: with_phone_prefix(&draft.secondary_contact_phone),
            email: or_default(&draft.secondary_contact_email, PLACEHOLDER),
        });

        let special_notes = Some(draft.special_notes.trim())
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);

        Self {
            full_name: format_full_name(draft),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            country: or_default(&draft.country, DEFAULT_COUNTRY),
            postal_code: or_default(&draft.postal_code, PLACEHOLDER),
            address: join_non_empty(
                [
                    draft.street_address.as_str(),
                    draft.city.as_str(),
                    draft.state_region.as_str(),
                ],
                ", ",
            ),

            event_name: draft.event_name.trim().to_string(),
            event_description: draft.event_description.trim().to_string(),
            event_date: format_date(&draft.event_date),
            event_time: format_time_range(&draft.start_time, &draft.end_time),
            event_type: draft.event_type.label().to_string(),
            venue: join_non_empty(
                [
                    draft.event_venue_address.as_str(),
                    draft.event_city.as_str(),
                    draft.event_state_region.as_str(),
                ],
                ", ",
            ),
            venue_country: or_default(&draft.event_country, DEFAULT_COUNTRY),
            venue_postal_code: or_default(&draft.event_postal_code, PLACEHOLDER),
            guests: draft.number_of_guests.trim().to_string(),
            nearby_landmark: draft.nearby_landmark.trim().to_string(),
            special_notes,

            primary_contact: ContactSummary {
                name: draft.primary_contact_name.trim().to_string(),
                phone: with_phone_prefix(&draft.primary_contact_phone),
                email: draft.primary_contact_email.trim().to_string(),
            },
            secondary_contact,

            special_requests: draft.special_requests.trim().to_string(),
            package: package.map(|p| PackageLine {
                title: p.title.clone(),
                price: format_price(p.price_pesewas),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::EventType;
    use crate::testing::{complete_draft, sample_package};
    use proptest::prelude::*;

    #[test]
    fn scenario_c_time_formatting() {
        assert_eq!(format_time("13:30"), "1:30 PM");
        assert_eq!(format_time("00:15"), "12:15 AM");
        assert_eq!(format_time(""), "");
    }

    #[test]
    fn noon_is_pm_and_morning_is_am() {
        assert_eq!(format_time("12:00"), "12:00 PM");
        assert_eq!(format_time("09:05"), "9:05 AM");
        assert_eq!(format_time("23:59"), "11:59 PM");
    }

    #[test]
    fn seconds_are_ignored_and_garbage_passes_through() {
        assert_eq!(format_time("18:45:00"), "6:45 PM");
        assert_eq!(format_time("soon"), "soon");
        assert_eq!(format_time("25:00"), "25:00");
    }

    #[test]
    fn dates_render_day_month_year() {
        assert_eq!(format_date("2025-10-06"), "6 October 2025");
        assert_eq!(format_date("2026-01-31"), "31 January 2026");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn dates_are_calendar_dates_not_instants() {
        assert_eq!(format_date("2025-12-31T23:30:00-05:00"), "31 December 2025");
        assert_eq!(format_date("next week"), "next week");
    }

    #[test]
    fn full_name_collapses_missing_middle_name() {
        let mut draft = BookingDraft::new();
        draft.first_name = "Ama".into();
        draft.last_name = "Owusu".into();
        assert_eq!(format_full_name(&draft), "Ama Owusu");

        draft.middle_name = "  Serwaa ".into();
        assert_eq!(format_full_name(&draft), "Ama Serwaa Owusu");

        draft.middle_name = "   ".into();
        assert_eq!(format_full_name(&draft), "Ama Owusu");
    }

    #[test]
    fn secondary_contact_needs_a_name() {
        let mut draft = BookingDraft::new();
        draft.secondary_contact_phone = "0200000000".into();
        assert!(!has_secondary_contact(&draft));
        draft.secondary_contact_name = "Yaw".into();
        assert!(has_secondary_contact(&draft));
    }

    #[test]
    fn prices_are_grouped_like_the_catalogue() {
        assert_eq!(format_price(500_000), "GH₵ 5,000");
        assert_eq!(format_price(1_200_000), "GH₵ 12,000");
        assert_eq!(format_price(330_350), "GH₵ 3,303.50");
        assert_eq!(format_price(99), "GH₵ 0.99");
        assert_eq!(format_price(123_456_789_00), "GH₵ 123,456,789");
    }

    #[test]
    fn summary_applies_review_defaults() {
        let mut draft = complete_draft();
        draft.country.clear();
        draft.event_postal_code.clear();
        draft.special_notes = "  ".into();
        draft.event_type = EventType::Both;

        let summary = BookingSummary::build(&draft, Some(&sample_package()));

        assert_eq!(summary.full_name, "Ama Owusu");
        assert_eq!(summary.country, "Ghana");
        assert_eq!(summary.venue_postal_code, "-");
        assert_eq!(summary.address, "12 Ring Rd, Accra, Greater Accra");
        assert_eq!(summary.event_date, "6 October 2025");
        assert_eq!(summary.event_time, "1:30 PM - 6:00 PM");
        assert_eq!(summary.event_type, "Indoor & Outdoor");
        assert_eq!(summary.special_notes, None);
        assert_eq!(summary.primary_contact.phone, "+233 0241234567");
        assert_eq!(summary.secondary_contact, None);
        let package = summary.package.unwrap();
        assert_eq!(package.title, "Bronze Wedding");
        assert_eq!(package.price, "GH₵ 5,000");
    }

    #[test]
    fn summary_fills_secondary_contact_placeholders() {
        let mut draft = complete_draft();
        draft.secondary_contact_name = "Yaw Mensah".into();

        let summary = BookingSummary::build(&draft, None);
        let secondary = summary.secondary_contact.unwrap();
        assert_eq!(secondary.name, "Yaw Mensah");
        assert_eq!(secondary.phone, "-");
        assert_eq!(secondary.email, "-");
        assert!(summary.package.is_none());
    }

    proptest! {
        /// Property: formatting twice gives the same answer.
        #[test]
        fn formatting_is_idempotent(
            h in 0u32..24,
            m in 0u32..60,
            y in 1990i32..2100,
            mo in 1u32..13,
            d in 1u32..29,
            first in "[A-Za-z ]{0,8}",
            middle in "[A-Za-z ]{0,8}",
            last in "[A-Za-z ]{0,8}",
        ) {
            let time = format!("{h:02}:{m:02}");
            let date = format!("{y:04}-{mo:02}-{d:02}");
            let draft = BookingDraft {
                first_name: first,
                middle_name: middle,
                last_name: last,
                ..BookingDraft::default()
            };

            prop_assert_eq!(format_time(&time), format_time(&time));
            prop_assert_eq!(format_date(&date), format_date(&date));
            prop_assert_eq!(format_full_name(&draft), format_full_name(&draft));
        }

        /// Property: full names never carry doubled or edge whitespace.
        #[test]
        fn full_name_has_no_space_artifacts(
            first in "[A-Za-z ]{0,8}",
            middle in "[ ]{0,3}",
            last in "[A-Za-z ]{0,8}",
        ) {
            let draft = BookingDraft {
                first_name: first,
                middle_name: middle,
                last_name: last,
                ..BookingDraft::default()
            };
            let name = format_full_name(&draft);
            prop_assert_eq!(name.trim(), name.as_str());
            // Inner spaces of a single token are kept as typed; only joins are normalised.
            prop_assert!(!name.starts_with(' '));
        }

        /// Property: every valid 24-hour time renders with an hour in 1..=12.
        #[test]
        fn twelve_hour_clock_is_in_range(h in 0u32..24, m in 0u32..60) {
            let rendered = format_time(&format!("{h:02}:{m:02}"));
            let hour: u32 = rendered.split(':').next().unwrap().parse().unwrap();
            prop_assert!((1..=12).contains(&hour));
            prop_assert_eq!(rendered.ends_with("PM"), h >= 12);
        }
    }
}

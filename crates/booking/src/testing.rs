//! Shared fixtures for unit tests.

use chrono::{DateTime, TimeZone, Utc};

use imfo_core::{PackageId, UserId, VendorId};

use crate::draft::BookingDraft;
use crate::package::PackageSummary;
use crate::profile::CurrentUser;

pub(crate) fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap()
}

pub(crate) fn test_package_id() -> PackageId {
    PackageId::new("pkg-bronze-wedding").unwrap()
}

pub(crate) fn test_user() -> CurrentUser {
    CurrentUser::new(UserId::new("user-1").unwrap())
        .with_email("ama@x.com")
        .with_phone("0551234567")
}

/// Draft passing "Your Details" and nothing else.
pub(crate) fn valid_stage1_draft() -> BookingDraft {
    BookingDraft {
        first_name: "Ama".into(),
        last_name: "Owusu".into(),
        email: "ama@x.com".into(),
        phone: "0551234567".into(),
        street_address: "12 Ring Rd".into(),
        city: "Accra".into(),
        state_region: "Greater Accra".into(),
        ..BookingDraft::default()
    }
}

/// Draft passing both validated stages, without a secondary contact.
pub(crate) fn complete_draft() -> BookingDraft {
    BookingDraft {
        event_name: "Ama & Kofi Wedding".into(),
        event_date: "2025-10-06".into(),
        start_time: "13:30".into(),
        end_time: "18:00".into(),
        event_venue_address: "Labadi Beach Hotel".into(),
        event_city: "Accra".into(),
        event_state_region: "Greater Accra".into(),
        primary_contact_name: "Kofi Owusu".into(),
        primary_contact_phone: "0241234567".into(),
        primary_contact_email: "kofi@x.com".into(),
        ..valid_stage1_draft()
    }
}

pub(crate) fn sample_package() -> PackageSummary {
    PackageSummary {
        id: test_package_id(),
        title: "Bronze Wedding".into(),
        price_pesewas: 500_000,
        details: vec!["Decor for 100 guests".into()],
        image: None,
        vendor_id: VendorId::new("vendor-1").unwrap(),
        vendor_name: Some("Royal Touch Events".into()),
    }
}

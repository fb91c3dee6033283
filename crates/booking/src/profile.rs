//! Signed-in user context and profile autofill.

use serde::{Deserialize, Serialize};

use imfo_core::UserId;

use crate::draft::ProfileAutofill;

const AUTOFILL_COUNTRY: &str = "Ghana";

/// The signed-in user, handed to the wizard by its host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CurrentUser {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Public profile fields the autofill reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Derive the "Your Details" autofill from a profile and the signed-in user.
///
/// The profile name splits on whitespace: first token is the first name, the
/// rest is the last name. Contact details come from the user context; the
/// profile location stands in for both street address and city.
pub fn autofill_from_profile(profile: &UserProfile, user: &CurrentUser) -> ProfileAutofill {
    let mut tokens = profile
        .name
        .as_deref()
        .unwrap_or_default()
        .split_whitespace();
    let first_name = tokens.next().unwrap_or_default().to_string();
    let last_name = tokens.collect::<Vec<_>>().join(" ");
    let location = profile.location.clone().unwrap_or_default();

    ProfileAutofill {
        first_name: Some(first_name),
        last_name: Some(last_name),
        email: Some(user.email.clone().unwrap_or_default()),
        phone: Some(user.phone.clone().unwrap_or_default()),
        country: Some(AUTOFILL_COUNTRY.to_string()),
        street_address: Some(location.clone()),
        city: Some(location),
    }
}

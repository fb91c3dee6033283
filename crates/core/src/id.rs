//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a wizard session (one booking attempt).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WizardId(Uuid);

/// Identifier of a package, as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageId(String);

/// Identifier of a vendor (photographer), as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VendorId(String);

/// Identifier of a signed-in user, as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

/// Identifier of a payment method option (e.g. "momo", "visa").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentMethodId(String);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

/// Backend-issued identifiers are opaque strings; the only rule is that they
/// are not blank.
macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: must not be empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(id: $t) -> Self {
                id.0
            }
        }
    };
}

impl_uuid_newtype!(WizardId, "WizardId");
impl_string_newtype!(PackageId, "PackageId");
impl_string_newtype!(VendorId, "VendorId");
impl_string_newtype!(UserId, "UserId");
impl_string_newtype!(PaymentMethodId, "PaymentMethodId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_are_trimmed() {
        let id = PackageId::new("  pkg-1 ").unwrap();
        assert_eq!(id.as_str(), "pkg-1");
        assert_eq!(id.to_string(), "pkg-1");
    }

    #[test]
    fn blank_string_ids_are_rejected() {
        let err = UserId::new("   ").unwrap_err();
        match err {
            DomainError::InvalidId(msg) if msg.contains("UserId") => {}
            _ => panic!("Expected InvalidId for blank user id"),
        }
    }

    #[test]
    fn deserialization_applies_the_same_rules_as_new() {
        let id: PackageId = serde_json::from_str("\" pkg-1 \"").unwrap();
        assert_eq!(id.as_str(), "pkg-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"pkg-1\"");

        assert!(serde_json::from_str::<PackageId>("\"\"").is_err());
        assert!(serde_json::from_str::<PaymentMethodId>("\"   \"").is_err());
    }

    #[test]
    fn wizard_id_round_trips_through_display() {
        let id = WizardId::new();
        let parsed: WizardId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn malformed_wizard_id_is_rejected() {
        assert!("not-a-uuid".parse::<WizardId>().is_err());
    }
}

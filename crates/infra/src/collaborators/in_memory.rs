//! In-memory collaborators for tests and local development.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use imfo_booking::{BookingConfirmation, BookingRequest, PackageSummary, UserProfile};
use imfo_core::{PackageId, UserId, VendorId};

use super::{BookingGateway, CollaboratorError, PackageCatalog, ProfileDirectory};

#[derive(Debug, Default)]
pub struct InMemoryPackageCatalog {
    packages: RwLock<HashMap<PackageId, PackageSummary>>,
}

impl InMemoryPackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue seeded with the demo wedding packages.
    pub fn seeded() -> Self {
        let catalog = Self::new();
        for package in demo_packages() {
            catalog.insert(package);
        }
        catalog
    }

    pub fn insert(&self, package: PackageSummary) {
        self.packages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(package.id.clone(), package);
    }
}

#[async_trait::async_trait]
impl PackageCatalog for InMemoryPackageCatalog {
    async fn package(&self, id: &PackageId) -> Result<PackageSummary, CollaboratorError> {
        self.packages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(format!("package {id}")))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProfileDirectory {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: UserId, profile: UserProfile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, profile);
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, CollaboratorError> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(format!("profile {user_id}")))
    }
}

#[derive(Debug, Default)]
struct GatewayState {
    accepted: Vec<BookingRequest>,
    calls: usize,
    reject_with: Option<String>,
}

/// Records every booking request; can be told to reject them.
#[derive(Debug, Default)]
pub struct InMemoryBookingGateway {
    state: Mutex<GatewayState>,
}

impl InMemoryBookingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every following request with `reason` (as an API 422).
    pub fn reject_with(&self, reason: impl Into<String>) {
        self.lock().reject_with = Some(reason.into());
    }

    pub fn accept(&self) {
        self.lock().reject_with = None;
    }

    /// Number of `create_booking` calls, accepted or not.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    pub fn accepted(&self) -> Vec<BookingRequest> {
        self.lock().accepted.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl BookingGateway for InMemoryBookingGateway {
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, CollaboratorError> {
        let mut state = self.lock();
        state.calls += 1;

        if let Some(reason) = &state.reject_with {
            return Err(CollaboratorError::Api(422, reason.clone()));
        }

        state.accepted.push(request.clone());
        Ok(BookingConfirmation {
            booking_id: format!("bk-{}", state.accepted.len()),
            status: Some("pending".to_string()),
        })
    }
}

fn demo_package(id: &str, title: &str, price_ghs: u64, details: &[&str]) -> Option<PackageSummary> {
    Some(PackageSummary {
        id: PackageId::new(id).ok()?,
        title: title.to_string(),
        price_pesewas: price_ghs * 100,
        details: details.iter().map(|d| d.to_string()).collect(),
        image: None,
        vendor_id: VendorId::new("kwame-mensah").ok()?,
        vendor_name: Some("Kwame Mensah".to_string()),
    })
}

fn demo_packages() -> Vec<PackageSummary> {
    [
        demo_package(
            "bronze-wedding",
            "Bronze Wedding",
            5_000,
            &[
                "6 Hours Photography Coverage",
                "Free Initial Consultation",
                "50 Premium Edits",
            ],
        ),
        demo_package(
            "silver-wedding",
            "Silver Wedding",
            8_000,
            &[
                "8 Hours Photography Coverage",
                "100 Premium Edits",
                "Drone Photography Available",
            ],
        ),
        demo_package(
            "gold-wedding",
            "Gold Wedding",
            12_000,
            &[
                "Full Day Photography Coverage",
                "200 Premium Edits",
                "2 Handcrafted Photo Albums",
            ],
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use imfo_booking::BookingDraft;
    use imfo_core::PaymentMethodId;

    fn request() -> BookingRequest {
        BookingRequest {
            package_id: PackageId::new("bronze-wedding").unwrap(),
            payment_method_id: PaymentMethodId::new("visa").unwrap(),
            user_id: None,
            draft: BookingDraft::new(),
        }
    }

    #[tokio::test]
    async fn seeded_catalog_serves_demo_packages() {
        let catalog = InMemoryPackageCatalog::seeded();
        let package = catalog
            .package(&PackageId::new("gold-wedding").unwrap())
            .await
            .unwrap();
        assert_eq!(package.title, "Gold Wedding");
        assert_eq!(package.price_pesewas, 1_200_000);
    }

    #[tokio::test]
    async fn unknown_package_is_not_found() {
        let catalog = InMemoryPackageCatalog::new();
        let err = catalog
            .package(&PackageId::new("nope").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn gateway_counts_calls_and_rejects_on_demand() {
        let gateway = InMemoryBookingGateway::new();
        let confirmation = gateway.create_booking(&request()).await.unwrap();
        assert_eq!(confirmation.booking_id, "bk-1");

        gateway.reject_with("slot taken");
        match gateway.create_booking(&request()).await.unwrap_err() {
            CollaboratorError::Api(422, msg) if msg == "slot taken" => {}
            other => panic!("Expected Api(422) error, got {other:?}"),
        }

        assert_eq!(gateway.calls(), 2);
        assert_eq!(gateway.accepted().len(), 1);
    }
}

//! External systems the wizard depends on but does not implement.
//!
//! Each collaborator is an object-safe async trait so sessions can hold them
//! as `Arc<dyn ...>` and tests can swap in the in-memory versions.

use std::sync::Arc;

use imfo_booking::{BookingConfirmation, BookingRequest, PackageSummary, UserProfile};
use imfo_core::{PackageId, UserId};

pub mod http;
pub mod in_memory;

pub use http::HttpBackend;
pub use in_memory::{InMemoryBookingGateway, InMemoryPackageCatalog, InMemoryProfileDirectory};

use crate::config::{AppConfig, CollaboratorMode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error {0}: {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Resolves the package being booked.
#[async_trait::async_trait]
pub trait PackageCatalog: Send + Sync {
    async fn package(&self, id: &PackageId) -> Result<PackageSummary, CollaboratorError>;
}

/// Public profile lookup used by the optional autofill.
#[async_trait::async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, CollaboratorError>;
}

/// Creates bookings. The only side-effecting collaborator.
#[async_trait::async_trait]
pub trait BookingGateway: Send + Sync {
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, CollaboratorError>;
}

/// The three collaborators a session needs, shareable across sessions.
#[derive(Clone)]
pub struct Collaborators {
    pub packages: Arc<dyn PackageCatalog>,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub bookings: Arc<dyn BookingGateway>,
}

impl Collaborators {
    pub fn new(
        packages: Arc<dyn PackageCatalog>,
        profiles: Arc<dyn ProfileDirectory>,
        bookings: Arc<dyn BookingGateway>,
    ) -> Self {
        Self {
            packages,
            profiles,
            bookings,
        }
    }

    /// Seeded in-memory collaborators for local development.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryPackageCatalog::seeded()),
            Arc::new(InMemoryProfileDirectory::new()),
            Arc::new(InMemoryBookingGateway::new()),
        )
    }

    /// One shared HTTP client behind all three traits.
    pub fn http(backend: HttpBackend) -> Self {
        let backend = Arc::new(backend);
        Self::new(backend.clone(), backend.clone(), backend)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CollaboratorError> {
        match config.collaborators {
            CollaboratorMode::Memory => Ok(Self::in_memory()),
            CollaboratorMode::Http => Ok(Self::http(HttpBackend::new(
                config.api_url.clone(),
                config.api_timeout,
                config.api_token.clone(),
            )?)),
        }
    }
}

impl core::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

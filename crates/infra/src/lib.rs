//! Infrastructure layer: backend collaborators, wizard sessions, config.

pub mod collaborators;
pub mod config;
pub mod session;

pub use collaborators::{
    BookingGateway, CollaboratorError, Collaborators, PackageCatalog, ProfileDirectory,
};
pub use config::{AppConfig, CollaboratorMode, ConfigError};
pub use session::{SessionError, SubmitOutcome, WizardSession};

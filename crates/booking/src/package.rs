use serde::{Deserialize, Serialize};

use imfo_core::{PackageId, VendorId};

/// Read-only view of the package being booked, as owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub id: PackageId,
    pub title: String,
    /// Price in smallest currency unit (pesewas).
    pub price_pesewas: u64,
    pub details: Vec<String>,
    pub image: Option<String>,
    pub vendor_id: VendorId,
    pub vendor_name: Option<String>,
}

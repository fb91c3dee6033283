//! Collaborators backed by the Imfo Bookings REST API.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use imfo_booking::{BookingConfirmation, BookingDraft, BookingRequest, PackageSummary, UserProfile};
use imfo_core::{PackageId, UserId, VendorId};

use super::{BookingGateway, CollaboratorError, PackageCatalog, ProfileDirectory};

/// Thin `reqwest` client for the bookings backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self, CollaboratorError> {
        let base_url = base_url.into();
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| CollaboratorError::Parse(format!("base url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CollaboratorError::Parse(format!(
                "base url {base_url} cannot carry a path"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base path. Each segment is percent-encoded on
    /// its own, so ids can never add path levels or a query string.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response, CollaboratorError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CollaboratorError::NotFound(what.to_string()));
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(CollaboratorError::Api(status, resp.text().await.unwrap_or_default()));
        }
        Ok(resp)
    }
}

/// Package as served by `GET /v1/packages/{id}`.
#[derive(Debug, Clone, Deserialize)]
struct PackageDto {
    id: String,
    vendor_id: String,
    title: String,
    #[serde(default)]
    details: Option<Vec<String>>,
    price: f64,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    vendor_name: Option<String>,
}

impl TryFrom<PackageDto> for PackageSummary {
    type Error = CollaboratorError;

    fn try_from(dto: PackageDto) -> Result<Self, Self::Error> {
        if !dto.price.is_finite() || dto.price < 0.0 {
            return Err(CollaboratorError::Parse(format!("invalid package price {}", dto.price)));
        }

        Ok(PackageSummary {
            id: PackageId::new(dto.id).map_err(|e| CollaboratorError::Parse(e.to_string()))?,
            title: dto.title,
            price_pesewas: (dto.price * 100.0).round() as u64,
            details: dto.details.unwrap_or_default(),
            image: dto.image,
            vendor_id: VendorId::new(dto.vendor_id)
                .map_err(|e| CollaboratorError::Parse(e.to_string()))?,
            vendor_name: dto.vendor_name,
        })
    }
}

/// Profile as served by `GET /v1/profile/id/{user_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

impl From<ProfileDto> for UserProfile {
    fn from(dto: ProfileDto) -> Self {
        UserProfile {
            name: dto.name,
            location: dto.location,
        }
    }
}

/// Body of `POST /v1/bookings`: ids plus the draft fields inline.
#[derive(Debug, Serialize)]
struct CreateBookingBody<'a> {
    package_id: &'a str,
    payment_method_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(flatten)]
    draft: &'a BookingDraft,
}

impl<'a> From<&'a BookingRequest> for CreateBookingBody<'a> {
    fn from(request: &'a BookingRequest) -> Self {
        Self {
            package_id: request.package_id.as_str(),
            payment_method_id: request.payment_method_id.as_str(),
            user_id: request.user_id.as_ref().map(UserId::as_str),
            draft: &request.draft,
        }
    }
}

#[async_trait::async_trait]
impl PackageCatalog for HttpBackend {
    async fn package(&self, id: &PackageId) -> Result<PackageSummary, CollaboratorError> {
        let url = self.url(&["v1", "packages", id.as_str()]);
        let resp = self
            .send(self.client.get(url), &format!("package {id}"))
            .await?;
        let dto: PackageDto = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;
        dto.try_into()
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for HttpBackend {
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, CollaboratorError> {
        let url = self.url(&["v1", "profile", "id", user_id.as_str()]);
        let resp = self
            .send(self.client.get(url), &format!("profile {user_id}"))
            .await?;
        let dto: ProfileDto = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;
        Ok(dto.into())
    }
}

#[async_trait::async_trait]
impl BookingGateway for HttpBackend {
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, CollaboratorError> {
        let url = self.url(&["v1", "bookings"]);
        let body = CreateBookingBody::from(request);
        let resp = self
            .send(self.client.post(url).json(&body), "bookings endpoint")
            .await?;
        resp.json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))
    }
}

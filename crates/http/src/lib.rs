//! REST client for the BookTrack library backend.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use booktrack_kernel::models::{AddToLibrary, Book, Created, EntryPatch, LibraryItem, Status};
use booktrack_kernel::settings::ApiSettings;

pub mod error;
pub mod routes;

pub use error::ApiError;
use routes::Routes;

/// Backend operations the views depend on.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// `GET /api/search?q=`
    async fn search(&self, query: &str) -> Result<Vec<Book>, ApiError>;

    /// `GET /api/library[?status=]`
    async fn list(&self, status: Option<Status>) -> Result<Vec<LibraryItem>, ApiError>;

    /// `GET /api/library/<google_id>`
    async fn get(&self, google_id: &str) -> Result<LibraryItem, ApiError>;

    /// `POST /api/library`
    async fn add(&self, request: &AddToLibrary) -> Result<Created, ApiError>;

    /// `PATCH /api/library/<google_id>`; the response body is not used.
    async fn update(&self, google_id: &str, patch: &EntryPatch) -> Result<(), ApiError>;

    /// `DELETE /api/library/<google_id>`
    async fn remove(&self, google_id: &str) -> Result<(), ApiError>;
}

/// [`LibraryApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpLibraryApi {
    client: Client,
    routes: Routes,
}

impl HttpLibraryApi {
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build HTTP client")?;

        tracing::info!(
            base_url = %settings.base_url,
            timeout_ms = settings.request_timeout_ms,
            "library API client ready"
        );

        Ok(Self {
            client,
            routes: Routes::new(&settings.base_url),
        })
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    async fn send<B>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|err| {
            tracing::warn!(%method, %url, error = %err, "request failed");
        })?;

        let status = response.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let response = self.send::<()>(Method::GET, url, None).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl LibraryApi for HttpLibraryApi {
    async fn search(&self, query: &str) -> Result<Vec<Book>, ApiError> {
        self.fetch_json(self.routes.search(query)).await
    }

    async fn list(&self, status: Option<Status>) -> Result<Vec<LibraryItem>, ApiError> {
        self.fetch_json(self.routes.library(status)).await
    }

    async fn get(&self, google_id: &str) -> Result<LibraryItem, ApiError> {
        self.fetch_json(self.routes.entry(google_id)).await
    }

    async fn add(&self, request: &AddToLibrary) -> Result<Created, ApiError> {
        let url = self.routes.library(None);
        let response = self.send(Method::POST, url, Some(request)).await?;
        Ok(response.json::<Created>().await?)
    }

    async fn update(&self, google_id: &str, patch: &EntryPatch) -> Result<(), ApiError> {
        let url = self.routes.entry(google_id);
        self.send(Method::PATCH, url, Some(patch)).await?;
        Ok(())
    }

    async fn remove(&self, google_id: &str) -> Result<(), ApiError> {
        let url = self.routes.entry(google_id);
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }
}

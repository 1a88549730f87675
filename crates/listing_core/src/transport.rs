//! reqwest-backed page sources for the catalog REST API.

use std::{marker::PhantomData, time::Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Category, Product, Shop},
    error::TransportFailure,
    protocol::{PagedEnvelope, Resource},
};
use tracing::{info, warn};
use url::Url;

use crate::{config::ClientSettings, query::RequestDescriptor, PageSource};

const MALFORMED_BODY: &str = "Malformed response body";

#[derive(Debug, Clone)]
pub struct CatalogHttpClient {
    http: Client,
    base_url: Url,
}

impl CatalogHttpClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build catalog http client")?;
        Self::with_client(http, &settings.api_base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid catalog api url '{base_url}'"))?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, resource: Resource) -> Result<Url> {
        self.base_url
            .join(resource.path())
            .with_context(|| format!("failed to build {} endpoint", resource.path()))
    }

    pub fn shops(&self) -> HttpPageSource<Shop> {
        HttpPageSource::new(self.clone(), Resource::Shops)
    }

    pub fn products(&self) -> HttpPageSource<Product> {
        HttpPageSource::new(self.clone(), Resource::Products)
    }

    pub fn categories(&self) -> HttpPageSource<Category> {
        HttpPageSource::new(self.clone(), Resource::Categories)
    }

    pub async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        resource: Resource,
        descriptor: &RequestDescriptor,
    ) -> Result<PagedEnvelope<T>, TransportFailure> {
        let url = self.endpoint(resource).map_err(|err| {
            warn!(resource = resource.path(), error = %err, "catalog endpoint unavailable");
            TransportFailure::unreachable()
        })?;
        let started = Instant::now();

        let response = self
            .http
            .get(url)
            .query(&descriptor.query_pairs())
            .send()
            .await
            .map_err(|err| {
                warn!(resource = resource.path(), error = %err, "catalog request failed");
                classify_reqwest_error(&err)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                resource = resource.path(),
                status = status.as_u16(),
                query = %descriptor,
                "catalog request rejected"
            );
            return Err(TransportFailure::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let envelope = response.json::<PagedEnvelope<T>>().await.map_err(|err| {
            warn!(resource = resource.path(), error = %err, "catalog response body unreadable");
            if err.is_timeout() {
                TransportFailure::timeout()
            } else {
                TransportFailure::status(status.as_u16(), MALFORMED_BODY)
            }
        })?;

        info!(
            resource = resource.path(),
            query = %descriptor,
            items = envelope.content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog page fetched"
        );
        Ok(envelope)
    }
}

/// Timeouts win over everything; errors with no HTTP status mean the server
/// never answered.
pub fn classify_reqwest_error(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::timeout()
    } else if let Some(status) = err.status() {
        TransportFailure::status(status.as_u16(), status.canonical_reason().unwrap_or_default())
    } else {
        TransportFailure::unreachable()
    }
}

pub struct HttpPageSource<T> {
    client: CatalogHttpClient,
    resource: Resource,
    _entity: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    pub fn new(client: CatalogHttpClient, resource: Resource) -> Self {
        Self {
            client,
            resource,
            _entity: PhantomData,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<PagedEnvelope<T>, TransportFailure> {
        self.client.fetch_envelope(self.resource, descriptor).await
    }
}

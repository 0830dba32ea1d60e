//! HTTP plumbing shared by every platform API

use std::time::Duration;

use cloudprobe_core::ProbeConfig;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which deployment a path lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Cloud accounts, billing and the product catalog
    Global,
    /// Compute (SSH keys, VNets, instances)
    Regional,
}

/// Typed client for the platform REST APIs
///
/// Responses are decoded into the structs in [`crate::models`]. Any status
/// outside 2xx becomes [`ClientError::Status`], except 404 which becomes
/// [`ClientError::NotFound`].
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    global: String,
    regional: String,
    token: Option<String>,
}

impl PlatformClient {
    /// Build a client for the endpoints in `config`
    pub fn new(config: &ProbeConfig, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network {
                message: e.to_string(),
            })?;

        if token.is_none() {
            warn!("no bearer token configured, requests are sent unauthenticated");
        }

        Ok(Self {
            http,
            global: config.global_base().to_string(),
            regional: config.regional_base().to_string(),
            token,
        })
    }

    fn base(&self, service: Service) -> &str {
        match service {
            Service::Global => &self.global,
            Service::Regional => &self.regional,
        }
    }

    pub(crate) fn url(&self, service: Service, path: &str) -> String {
        format!("{}{}", self.base(service), path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map failure statuses
    async fn send(&self, method: Method, url: String, builder: RequestBuilder) -> Result<Response> {
        debug!(%method, %url, "request");
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(%url, "not found");
            return Err(ClientError::NotFound { url });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%method, %url, status = status.as_u16(), "request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, service: Service, path: &str) -> Result<T> {
        self.get_with_query(service, path, &[]).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(service, path);
        let builder = self.request(Method::GET, &url).query(query);
        let response = self.send(Method::GET, url.clone(), builder).await?;
        Self::decode(&url, response).await
    }

    pub(crate) async fn post<B, T>(&self, service: Service, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(service, path);
        let builder = self.request(Method::POST, &url).json(body);
        let response = self.send(Method::POST, url.clone(), builder).await?;
        Self::decode(&url, response).await
    }

    /// POST where the response body carries nothing of interest
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        service: Service,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let url = self.url(service, path);
        let builder = self.request(Method::POST, &url).json(body);
        self.send(Method::POST, url, builder).await?;
        Ok(())
    }

    pub(crate) async fn put<B, T>(&self, service: Service, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(service, path);
        let builder = self.request(Method::PUT, &url).json(body);
        let response = self.send(Method::PUT, url.clone(), builder).await?;
        Self::decode(&url, response).await
    }

    pub(crate) async fn delete(&self, service: Service, path: &str) -> Result<()> {
        let url = self.url(service, path);
        let builder = self.request(Method::DELETE, &url);
        self.send(Method::DELETE, url, builder).await?;
        Ok(())
    }
}

use reqwest::header::HeaderValue;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::ConsulError;
use super::types::{AclEntry, CreateResponse, QueryOptions};
use crate::config::ClientConfig;

const CONSUL_TOKEN_HEADER: &str = "X-Consul-Token";

#[derive(Clone)]
pub struct ConsulClient {
    client: reqwest::Client,
    config: ClientConfig,
    base_url: String,
}

impl ConsulClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConsulError> {
        // NOTE: Reject unusable tokens up front instead of on the first request
        if let Some(token) = &config.token {
            HeaderValue::from_str(token).map_err(|_| ConsulError::InvalidToken)?;
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(ConsulError::Network)?;
        let base_url = config.base_url();

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// NOTE: Primarily used for testing with mock servers.
    pub fn with_base_url(token: Option<String>, base_url: &str) -> Result<Self, ConsulError> {
        let config = ClientConfig::with_address(base_url)?.with_token(token);
        Self::new(config)
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `PUT /v1/acl/create`. Returns the identifier Consul assigned (or echoed
    /// back when the entry carried one).
    pub async fn create_acl(
        &self,
        entry: &AclEntry,
        opts: Option<&QueryOptions>,
    ) -> Result<String, ConsulError> {
        let endpoint = "/v1/acl/create";
        let request = self.request(Method::PUT, endpoint, opts)?.json(entry);
        let response = self.send(request).await?;
        let created: CreateResponse = decode(response, endpoint).await?;

        Ok(created.id)
    }

    pub async fn acl_info(
        &self,
        id: &str,
        opts: Option<&QueryOptions>,
    ) -> Result<AclEntry, ConsulError> {
        let endpoint = format!("/v1/acl/info/{}", urlencoding::encode(id));
        let request = self.request(Method::GET, &endpoint, opts)?;
        let response = self.send(request).await?;
        let entries: Vec<AclEntry> = decode(response, &endpoint).await?;

        entries
            .into_iter()
            .next()
            .ok_or_else(|| ConsulError::AclNotFound { id: id.to_string() })
    }

    pub async fn update_acl(
        &self,
        entry: &AclEntry,
        opts: Option<&QueryOptions>,
    ) -> Result<(), ConsulError> {
        let request = self.request(Method::PUT, "/v1/acl/update", opts)?.json(entry);
        self.send(request).await?;
        Ok(())
    }

    pub async fn destroy_acl(
        &self,
        id: &str,
        opts: Option<&QueryOptions>,
    ) -> Result<(), ConsulError> {
        let endpoint = format!("/v1/acl/destroy/{}", urlencoding::encode(id));
        let request = self.request(Method::PUT, &endpoint, opts)?;
        self.send(request).await?;
        Ok(())
    }

    pub async fn list_acls(
        &self,
        opts: Option<&QueryOptions>,
    ) -> Result<Vec<AclEntry>, ConsulError> {
        let endpoint = "/v1/acl/list";
        let request = self.request(Method::GET, endpoint, opts)?;
        let response = self.send(request).await?;

        decode(response, endpoint).await
    }

    fn request(
        &self,
        method: Method,
        endpoint: &str,
        opts: Option<&QueryOptions>,
    ) -> Result<RequestBuilder, ConsulError> {
        let datacenter = opts
            .and_then(|o| o.datacenter.as_deref())
            .or(self.config.datacenter.as_deref());
        let token = opts
            .and_then(|o| o.token.as_deref())
            .or(self.config.token.as_deref());

        let url = match datacenter {
            Some(dc) => format!("{}{}?dc={}", self.base_url, endpoint, urlencoding::encode(dc)),
            None => format!("{}{}", self.base_url, endpoint),
        };

        tracing::debug!(%method, %url, "consul request");

        let mut builder = self.client.request(method, &url);
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(token).map_err(|_| ConsulError::InvalidToken)?;
            value.set_sensitive(true);
            builder = builder.header(CONSUL_TOKEN_HEADER, value);
        }

        Ok(builder)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ConsulError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::OK {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ConsulError::Api {
            status: status.as_u16(),
            message: body.trim().to_string(),
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, ConsulError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ConsulError::InvalidResponse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
}

impl std::fmt::Debug for ConsulClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsulClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

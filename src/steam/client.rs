//! Steam community profile client

use async_trait::async_trait;
use reqwest::Client;

use super::request::ProfileRequest;
use crate::config::SteamConfig;
use crate::error::{AppError, AppResult};

/// Source of profile documents, split into the two phases the host reports
/// separately: connection established, then message received.
#[async_trait]
pub trait ProfileSource: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Send the request and check the response status
    async fn connect(&self, request: &ProfileRequest) -> AppResult<Self::Connection>;

    /// Read the response body
    async fn receive(&self, connection: Self::Connection) -> AppResult<String>;
}

pub struct SteamClient {
    http_client: Client,
}

impl SteamClient {
    pub fn new(config: &SteamConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl ProfileSource for SteamClient {
    type Connection = reqwest::Response;

    async fn connect(&self, request: &ProfileRequest) -> AppResult<reqwest::Response> {
        let mut builder = self.http_client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(AppError::Status(response.status().as_u16()));
        }

        tracing::trace!("[Steam] Connected to {}", request.url);
        Ok(response)
    }

    async fn receive(&self, connection: reqwest::Response) -> AppResult<String> {
        Ok(connection.text().await?)
    }
}

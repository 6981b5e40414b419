//! HTTP client for the Parasail API.
//!
//! Four operations: verify (exchange a signed terms message for a bearer
//! token), onboard, check-in, and node stats. The authenticated operations
//! carry no retry logic of their own; unauthorized handling lives entirely
//! in the scheduler's retry wrapper.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::models::NodeStats;
use crate::wallet::SignaturePayload;

use super::ApiError;

/// Base URL for the Parasail API
const API_BASE_URL: &str = "https://www.parasail.network/api";

/// Response from the verify endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub token: String,
}

/// Request body shared by the onboard and check-in endpoints.
#[derive(Debug, Serialize)]
struct AddressBody<'a> {
    address: &'a str,
}

/// Stats responses arrive wrapped in a `data` envelope.
#[derive(Debug, Deserialize)]
struct NodeStatsEnvelope {
    #[serde(default)]
    data: NodeStats,
}

/// The four remote operations the keeper drives.
///
/// Implementations surface 401 as [`ApiError::Unauthorized`] and every other
/// non-success outcome as a terminal error for that call.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Exchange a signed terms message for a bearer token. No auth header.
    async fn verify(&self, payload: &SignaturePayload) -> Result<VerifyResponse, ApiError>;

    /// Register the node for a wallet. Idempotent on the remote side;
    /// re-onboarding an onboarded node is a normal success.
    async fn onboard(&self, address: &str, token: &str) -> Result<(), ApiError>;

    /// Daily proof-of-liveness call.
    async fn check_in(&self, address: &str, token: &str) -> Result<(), ApiError>;

    /// Fetch the current stats snapshot for a wallet's node.
    async fn node_stats(&self, address: &str, token: &str) -> Result<NodeStats, ApiError>;
}

/// API client for Parasail.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ParasailClient {
    client: Client,
    base_url: String,
}

impl ParasailClient {
    /// Create a new API client.
    ///
    /// No request timeout is set: a hung remote call stalls only the one
    /// account pipeline awaiting it.
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl NodeApi for ParasailClient {
    async fn verify(&self, payload: &SignaturePayload) -> Result<VerifyResponse, ApiError> {
        let url = format!("{}/user/verify", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("verify response: {e}")))
    }

    async fn onboard(&self, address: &str, token: &str) -> Result<(), ApiError> {
        let url = format!("{}/v1/node/onboard", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&AddressBody { address })
            .send()
            .await?;

        // Success body is opaque; only the status matters.
        Self::check_response(response).await?;
        Ok(())
    }

    async fn check_in(&self, address: &str, token: &str) -> Result<(), ApiError> {
        let url = format!("{}/v1/node/check_in", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&AddressBody { address })
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn node_stats(&self, address: &str, token: &str) -> Result<NodeStats, ApiError> {
        let url = format!("{}/v1/node/node_stats", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("address", address)])
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let envelope: NodeStatsEnvelope = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("node_stats response: {e}")))?;
        Ok(envelope.data)
    }
}

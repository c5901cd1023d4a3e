//! HTTP transport for the document graph.
//!
//! Queries are sent unsigned. Mutations are signed with the event's identity
//! session: the exact request body is signed and the signature travels in the
//! `x-did-signature` header next to the session's DID in `x-did`.

use crate::error::GraphError;
use async_trait::async_trait;
use regaccess_core::environment::IdentitySession;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Header carrying the session DID
pub const DID_HEADER: &str = "x-did";

/// Header carrying the hex-encoded signature over the request body
pub const SIGNATURE_HEADER: &str = "x-did-signature";

/// Executes GraphQL documents against the document graph.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    /// Runs a query and returns its `data` object.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, or
    /// errors reported by the graph.
    async fn execute_query(&self, document: &str, variables: Value) -> Result<Value, GraphError>;

    /// Runs a mutation signed by `session` and returns its `data` object.
    ///
    /// # Errors
    ///
    /// Same as [`GraphTransport::execute_query`], plus `Unauthorized` when the
    /// signature is rejected.
    async fn execute_mutation(
        &self,
        session: &IdentitySession,
        document: &str,
        variables: Value,
    ) -> Result<Value, GraphError>;
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEntry {
    message: String,
}

/// Document-graph client over HTTP
#[derive(Clone, Debug)]
pub struct HttpGraphClient {
    client: Client,
    endpoint: String,
}

impl HttpGraphClient {
    /// Create a client for `endpoint` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ClientBuild` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraphError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint the client posts to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(
        &self,
        body: Vec<u8>,
        session: Option<&IdentitySession>,
    ) -> Result<Value, GraphError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json");

        if let Some(session) = session {
            let signature = hex::encode(session.sign(&body));
            request = request
                .header(DID_HEADER, session.did())
                .header(SIGNATURE_HEADER, signature);
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| GraphError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let envelope = response
                    .json::<GraphResponse>()
                    .await
                    .map_err(|e| GraphError::ResponseParseFailed(e.to_string()))?;
                unwrap_envelope(envelope)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GraphError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GraphError::ApiError {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

fn unwrap_envelope(envelope: GraphResponse) -> Result<Value, GraphError> {
    if !envelope.errors.is_empty() {
        return Err(GraphError::Graph(
            envelope.errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    envelope.data.ok_or(GraphError::MissingData)
}

fn encode_body(document: &str, variables: Value) -> Result<Vec<u8>, GraphError> {
    serde_json::to_vec(&json!({ "query": document, "variables": variables }))
        .map_err(|e| GraphError::RequestFailed(e.to_string()))
}

#[async_trait]
impl GraphTransport for HttpGraphClient {
    async fn execute_query(&self, document: &str, variables: Value) -> Result<Value, GraphError> {
        let body = encode_body(document, variables)?;
        self.post(body, None).await
    }

    async fn execute_mutation(
        &self,
        session: &IdentitySession,
        document: &str,
        variables: Value,
    ) -> Result<Value, GraphError> {
        let body = encode_body(document, variables)?;
        tracing::debug!(did = %session.did(), "Submitting signed graph mutation");
        self.post(body, Some(session)).await
    }
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as JsonResponse, Response},
    routing::{get, post},
};
use proofkey::{EncodingError, ProofField, proof::check_length};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::service::{NamedValue, ProofService};

/// Body returned by GET /hosting/proof-key
#[derive(Serialize, Deserialize)]
pub struct ProofKeyResponse {
    pub attributes: Vec<NamedValue>,
}

/// Body returned by POST /proof
#[derive(Serialize, Deserialize)]
pub struct ProofResponse {
    pub headers: Vec<NamedValue>,
}

/// Body for POST /proof requests
#[derive(Serialize, Deserialize)]
pub struct ProofRequest {
    /// As it appears in the `access_token` query parameter, still percent-encoded.
    pub access_token: String,
    pub uri: String,
}

impl ProofRequest {
    /// Rejects requests whose fields cannot be length-prefixed in a proof.
    /// Empty fields are fine: they encode as zero-length.
    pub fn validate(&self) -> Result<(), EncodingError> {
        check_length(ProofField::AccessToken, self.access_token.len())?;
        check_length(ProofField::Uri, self.uri.len())?;
        Ok(())
    }
}

/// Builds and runs the server on `addr`
pub async fn run_server(
    service: Arc<ProofService>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    run_server_with_listener(service, listener).await
}

/// Runs the server with a provided listener (useful for tests with ephemeral ports)
pub async fn run_server_with_listener(
    service: Arc<ProofService>,
    listener: tokio::net::TcpListener,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = listener.local_addr()?;
    info!("WOPI proof service starting on {}", addr);

    axum::serve(listener, router(service)).await?;
    Ok(())
}

pub fn router(service: Arc<ProofService>) -> Router {
    Router::new()
        .route("/hosting/proof-key", get(handle_get_proof_key))
        .route("/proof", post(handle_post_proof))
        .fallback(fallback_handler)
        .with_state(service)
}

/// GET /hosting/proof-key → discovery attributes, empty without a key
async fn handle_get_proof_key(State(service): State<Arc<ProofService>>) -> impl IntoResponse {
    let attributes = service.discovery_attributes().to_vec();
    info!(
        "Request: GET /hosting/proof-key → {} attributes",
        attributes.len()
    );
    (StatusCode::OK, JsonResponse(ProofKeyResponse { attributes }))
}

/// POST /proof (JSON body `{"access_token":"...","uri":"..."}`) → proof headers
async fn handle_post_proof(
    State(service): State<Arc<ProofService>>,
    Json(payload): Json<ProofRequest>,
) -> Response {
    if let Err(e) = payload.validate() {
        warn!("Rejecting proof request: {}", e);
        let err_body = serde_json::json!({ "error": e.to_string() });
        return (StatusCode::BAD_REQUEST, JsonResponse(err_body)).into_response();
    }

    let headers = service.proof_headers(&payload.access_token, &payload.uri);
    if headers.is_empty() {
        if service.require_proof() {
            error!("Request: POST /proof uri='{}' → no proof available", payload.uri);
            let err_body = serde_json::json!({ "error": "proof key unavailable" });
            return (StatusCode::SERVICE_UNAVAILABLE, JsonResponse(err_body)).into_response();
        }
        warn!("Request: POST /proof uri='{}' → sent without proof", payload.uri);
    } else {
        info!("Request: POST /proof uri='{}' → signed", payload.uri);
    }

    (StatusCode::OK, JsonResponse(ProofResponse { headers })).into_response()
}

/// Fallback for any unsupported route
async fn fallback_handler() -> impl IntoResponse {
    error!("Invalid request, returning 400");
    (StatusCode::BAD_REQUEST, "Invalid request")
}

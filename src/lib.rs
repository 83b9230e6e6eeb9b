//! WOPI proof-key service and client helpers.
//!
//! The server side signs outbound WOPI requests ([`service::ProofService`])
//! and exposes the proof headers and discovery attributes over HTTP
//! ([`server`]). The [`proof_requests`] module talks to a running service
//! and checks a proof the way a WOPI host would:
//! - `request_proof_key(...)`
//! - `request_proof(...)`
//! - `verify_proof(...)`

pub mod config;
pub mod server;
pub mod service;

pub use service::NamedValue;

pub mod proof_requests {
    use crate::server::{ProofKeyResponse, ProofRequest, ProofResponse};
    use crate::service::{NamedValue, PROOF_HEADER, TIMESTAMP_HEADER};
    use base64::{Engine as _, engine::general_purpose};
    use proofkey::{proof, verify_with_public_parts};
    use reqwest::blocking::Client;
    use std::error::Error;

    fn find<'a>(values: &'a [NamedValue], name: &str) -> Option<&'a str> {
        values
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| v.value.as_str())
    }

    /// Fetches the discovery proof-key attributes via HTTP GET.
    ///
    /// # Example
    /// ```no_run
    /// # use wopi_proof::proof_requests::request_proof_key;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let attributes = request_proof_key("http://127.0.0.1:9980")?;
    /// for attr in &attributes {
    ///     println!("{}={}", attr.name, attr.value);
    /// }
    /// # Ok(()) }
    /// ```
    pub fn request_proof_key(server_addr: &str) -> Result<Vec<NamedValue>, Box<dyn Error>> {
        let url = format!("{}/hosting/proof-key", server_addr);
        let client = Client::new();
        let resp = client.get(&url).send()?;
        if !resp.status().is_success() {
            return Err(format!("Server returned error: {}", resp.status()).into());
        }
        let body: ProofKeyResponse = resp.json()?;
        Ok(body.attributes)
    }

    /// Asks the service for the proof headers of one outbound request.
    ///
    /// # Example
    /// ```no_run
    /// # use wopi_proof::proof_requests::request_proof;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let headers = request_proof("http://127.0.0.1:9980", "tok%20en", "https://host/wopi/files/1")?;
    /// for h in &headers {
    ///     println!("{}: {}", h.name, h.value);
    /// }
    /// # Ok(()) }
    /// ```
    pub fn request_proof(
        server_addr: &str,
        access_token: &str,
        uri: &str,
    ) -> Result<Vec<NamedValue>, Box<dyn Error>> {
        let url = format!("{}/proof", server_addr);
        let client = Client::new();
        let body = ProofRequest {
            access_token: access_token.to_string(),
            uri: uri.to_string(),
        };
        let resp = client.post(&url).json(&body).send()?;
        if !resp.status().is_success() {
            return Err(format!("Server returned error: {}", resp.status()).into());
        }
        let body: ProofResponse = resp.json()?;
        Ok(body.headers)
    }

    /// Verifies `headers` (`X-WOPI-TimeStamp` and `X-WOPI-Proof`) for a
    /// request with `access_token` to `uri`, using only the published
    /// `modulus` and `exponent` attributes.
    ///
    /// # Example
    /// ```no_run
    /// # use wopi_proof::proof_requests::{request_proof_key, request_proof, verify_proof};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let server = "http://127.0.0.1:9980";
    /// let attributes = request_proof_key(server)?;
    /// let headers = request_proof(server, "token", "https://host/wopi/files/1")?;
    /// assert!(verify_proof("token", "https://host/wopi/files/1", &headers, &attributes));
    /// # Ok(()) }
    /// ```
    pub fn verify_proof(
        access_token: &str,
        uri: &str,
        headers: &[NamedValue],
        attributes: &[NamedValue],
    ) -> bool {
        // 1) Recreate the signed bytes from the timestamp header
        let ticks = match find(headers, TIMESTAMP_HEADER).map(str::parse::<i64>) {
            Some(Ok(t)) => t,
            _ => return false,
        };
        let bytes = match proof::build(access_token, uri, ticks) {
            Ok(b) => b,
            Err(_) => return false,
        };

        // 2) Base64-decode the published public key parts
        let decode = |name: &str| find(attributes, name).map(|v| general_purpose::STANDARD.decode(v));
        let (Some(Ok(modulus)), Some(Ok(exponent))) = (decode("modulus"), decode("exponent"))
        else {
            return false;
        };

        // 3) Verify
        match find(headers, PROOF_HEADER) {
            Some(signature) => verify_with_public_parts(&modulus, &exponent, &bytes, signature),
            None => false,
        }
    }
}

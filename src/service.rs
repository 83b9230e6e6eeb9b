//! Per-request WOPI proof headers and the discovery proof-key attributes.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use proofkey::{ProofKey, proof};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub const TIMESTAMP_HEADER: &str = "X-WOPI-TimeStamp";
pub const PROOF_HEADER: &str = "X-WOPI-Proof";

/// An ordered (name, value) pair, either an HTTP header or a discovery attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: String,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Holds the proof key for the life of the process.
///
/// Built once at startup and shared read-only (`Arc<ProofService>`) with
/// every request handler. Without a key, the service hands out no proofs
/// and no discovery attributes.
pub struct ProofService {
    key: Option<ProofKey>,
    attributes: Vec<NamedValue>,
    require_proof: bool,
}

impl ProofService {
    pub fn new(key: Option<ProofKey>) -> Self {
        let attributes = key.as_ref().map(discovery_attributes_for).unwrap_or_default();
        Self {
            key,
            attributes,
            require_proof: false,
        }
    }

    /// Makes callers treat a missing key as an error instead of sending
    /// requests unsigned.
    pub fn with_require_proof(mut self, require_proof: bool) -> Self {
        self.require_proof = require_proof;
        self
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn require_proof(&self) -> bool {
        self.require_proof
    }

    /// `X-WOPI-TimeStamp` and `X-WOPI-Proof`, in that order, for a request
    /// carrying `access_token` (as found in the query string) to `uri`.
    pub fn proof_headers(&self, access_token: &str, uri: &str) -> Vec<NamedValue> {
        self.proof_headers_at(access_token, uri, Utc::now())
    }

    pub fn proof_headers_at(
        &self,
        access_token: &str,
        uri: &str,
        now: DateTime<Utc>,
    ) -> Vec<NamedValue> {
        let Some(key) = &self.key else {
            return Vec::new();
        };

        let ticks = proof::ticks_since_epoch(now);
        match key.prove(access_token, uri, ticks) {
            Ok(signature) => {
                debug!("Signed proof for {} at tick {}", uri, ticks);
                vec![
                    NamedValue::new(TIMESTAMP_HEADER, ticks.to_string()),
                    NamedValue::new(PROOF_HEADER, signature),
                ]
            }
            Err(e) => {
                error!("Could not sign proof for {}: {}", uri, e);
                Vec::new()
            }
        }
    }

    /// `value`, `modulus` and `exponent` for the discovery `<proof-key>` element.
    pub fn discovery_attributes(&self) -> &[NamedValue] {
        &self.attributes
    }
}

fn discovery_attributes_for(key: &ProofKey) -> Vec<NamedValue> {
    let b64 = |bytes: &[u8]| general_purpose::STANDARD.encode(bytes);
    vec![
        NamedValue::new("value", b64(&key.public_key_blob())),
        NamedValue::new("modulus", b64(key.modulus())),
        NamedValue::new("exponent", b64(key.exponent())),
    ]
}

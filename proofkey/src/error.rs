use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain a usable private key.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("proof key file {0} does not exist")]
    NotFound(PathBuf),

    #[error("could not read proof key file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("proof key file {path} is not a PKCS#1 or PKCS#8 PEM RSA private key: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("could not generate RSA key: {0}")]
    Generate(#[source] rsa::Error),

    #[error("could not write proof key to {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

/// The RSA primitive refused to sign.
#[derive(Error, Debug)]
#[error("RSA-SHA256 signing failed: {0}")]
pub struct SigningError(#[from] pub rsa::signature::Error);

/// A field that is length-prefixed in the proof payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofField {
    AccessToken,
    Uri,
}

impl fmt::Display for ProofField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofField::AccessToken => f.write_str("access token"),
            ProofField::Uri => f.write_str("URI"),
        }
    }
}

/// A caller handed in a value the proof payload cannot encode.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    #[error("{field} is {len} bytes, longer than a signed 32-bit length prefix allows")]
    LengthOverflow { field: ProofField, len: usize },
}

/// Anything that can go wrong while producing one proof.
#[derive(Error, Debug)]
pub enum ProofError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

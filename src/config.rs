use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use proofkey::{KeyError, ProofKey, keygen_command};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "WOPI_PROOF_CONFIG";

pub const CONFIG_DIR_NAME: &str = "wopi-proof";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PROOF_KEY_FILE_NAME: &str = "proof_key";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Service settings, read from TOML. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the HTTP surface listens. `POST /proof` signs whatever it is
    /// sent, so it is only for collaborators on the same host; the default
    /// is loopback and should stay off public interfaces.
    pub listen_addr: SocketAddr,
    /// PEM encoded RSA private key used to sign proofs.
    pub proof_key_path: PathBuf,
    /// Create and save a key when `proof_key_path` does not exist.
    pub generate_missing_key: bool,
    pub key_bits: usize,
    /// Refuse to answer proof requests when no key is loaded.
    pub require_proof: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 9980)),
            proof_key_path: config_dir().join(PROOF_KEY_FILE_NAME),
            generate_missing_key: false,
            key_bits: 2048,
            require_proof: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source, path)
    }
}

/// `<platform config dir>/wopi-proof`, or the working directory when the
/// platform has none.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Reads settings from `$WOPI_PROOF_CONFIG`, else from the default config
/// file if it exists, else falls back to defaults.
pub fn load_settings() -> Result<Settings, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Settings::load_from_file(Path::new(&path));
    }

    let default_file = config_dir().join(CONFIG_FILE_NAME);
    if default_file.exists() {
        return Settings::load_from_file(&default_file);
    }

    Ok(Settings::default())
}

/// Loads the proof key named by `settings`, generating it first if allowed.
///
/// Never fails: any problem is logged and yields `None`, which disables
/// proof headers and the discovery proof-key attributes.
pub fn load_proof_key(settings: &Settings) -> Option<ProofKey> {
    let path = settings.proof_key_path.as_path();

    if settings.generate_missing_key && !path.exists() {
        match ProofKey::generate(settings.key_bits).and_then(|key| {
            key.save_pem(path)?;
            Ok(key)
        }) {
            Ok(key) => {
                info!("Generated new {}-bit proof key at {}", settings.key_bits, path.display());
                return Some(key);
            }
            Err(e) => {
                error!("Could not generate proof key: {}", e);
                return None;
            }
        }
    }

    match ProofKey::load_from_file(path) {
        Ok(key) => {
            info!(
                "Loaded {}-bit proof key from {}",
                key.modulus().len() * 8,
                path.display()
            );
            Some(key)
        }
        Err(KeyError::NotFound(_)) => {
            warn!(
                "Could not find {}\nNo proof-key will be present in discovery.\n\
                 Generate an RSA key using this command line:\n    {}",
                path.display(),
                keygen_command(path)
            );
            None
        }
        Err(e) => {
            error!("Could not open proof RSA key: {}", e);
            None
        }
    }
}

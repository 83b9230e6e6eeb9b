use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::uptime;
use wopi_proof::config::{load_proof_key, load_settings};
use wopi_proof::server;
use wopi_proof::service::ProofService;

#[tokio::main]
async fn main() {
    // Initialize logging to stdout: thread ids and time since start on every line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_ids(true)
        .with_timer(uptime())
        .init();
    tracing::info!("pid {}", std::process::id());

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    // Load the proof key once; every request handler shares it read-only
    let service =
        ProofService::new(load_proof_key(&settings)).with_require_proof(settings.require_proof);
    if !service.has_key() {
        tracing::warn!("Proof key unavailable, outbound WOPI requests will not carry proofs");
    }

    server::run_server(Arc::new(service), settings.listen_addr)
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Server error: {}", err);
        });
}

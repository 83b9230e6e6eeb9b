use std::path::Path;

use chrono::Utc;
use proofkey::{proof, verify_with_public_parts, ProofKey};

fn main() {
    // Generate a new key pair
    let key = ProofKey::generate(2048).unwrap();

    // Save the private key where a server would look for it
    let path = Path::new("proof_key");
    key.save_pem(path).unwrap();

    // Build and sign a proof
    let ticks = proof::ticks_since_epoch(Utc::now());
    let bytes = proof::build("my%20token", "https://host/wopi/files/1", ticks).unwrap();
    let signature = key.sign_proof(&bytes).unwrap();
    println!("X-WOPI-TimeStamp: {}", ticks);
    println!("X-WOPI-Proof: {}", signature);

    // Verify with the published public parts
    let is_valid = verify_with_public_parts(key.modulus(), key.exponent(), &bytes, &signature);
    println!("Proof is valid: {}", is_valid);

    // Load the key back and check it still verifies
    let loaded = ProofKey::load_from_file(path).unwrap();
    let resigned = loaded.sign_proof(&bytes).unwrap();
    println!("Signature matches after reload: {}", resigned == signature);
}

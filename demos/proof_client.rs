//! Fetch the published proof key, request proof headers for one WOPI call, and verify them.

use wopi_proof::proof_requests::{request_proof, request_proof_key, verify_proof};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = "http://127.0.0.1:9980";
    let access_token = "tok%20en";
    let uri = "https://host/wopi/files/1";

    // 1) Get the discovery attributes
    let attributes = request_proof_key(server)?;
    for attr in &attributes {
        println!("proof-key {}={}", attr.name, attr.value);
    }

    // 2) Request proof headers for one outbound request
    let headers = request_proof(server, access_token, uri)?;
    for header in &headers {
        println!("{}: {}", header.name, header.value);
    }

    // 3) Verify
    let is_valid = verify_proof(access_token, uri, &headers, &attributes);
    println!("Proof valid? {}", is_valid);

    Ok(())
}

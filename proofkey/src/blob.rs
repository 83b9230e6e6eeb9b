//! Byte-layout helpers for publishing an RSA public key.
//!
//! The discovery document carries the key as a Microsoft CryptoAPI
//! `PUBLICKEYBLOB`, which some hosts import directly as a platform key
//! container. Every byte here is part of that contract.

/// `BLOBHEADER` (PUBLICKEYBLOB, version 2, CALG_RSA_KEYX) followed by the
/// `RSAPUBKEY` magic `"RSA1"`.
pub const PUBLIC_KEY_BLOB_HEADER: [u8; 12] = [
    0x06, 0x02, 0x00, 0x00, //
    0x00, 0xA4, 0x00, 0x00, //
    0x52, 0x53, 0x41, 0x31,
];

/// Reorders a big-endian unsigned integer into least-significant-byte-first order.
pub fn to_little_endian(big_endian: &[u8]) -> Vec<u8> {
    big_endian.iter().rev().copied().collect()
}

/// Little-endian encoding of a `u32`, independent of the host byte order.
pub fn u32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Encodes `modulus` and `exponent` (both big-endian) as a CryptoAPI RSA1 public key blob.
///
/// Layout: the 12-byte header, the modulus bit length as a little-endian
/// `u32`, the exponent reversed, then the modulus reversed.
///
/// # Panics
///
/// If the modulus bit length does not fit in a `u32` (a modulus of 512 MiB
/// or more), which the container format cannot express.
pub fn build_public_key_blob(modulus: &[u8], exponent: &[u8]) -> Vec<u8> {
    let bit_len = modulus
        .len()
        .checked_mul(8)
        .and_then(|bits| u32::try_from(bits).ok())
        .unwrap_or_else(|| {
            panic!("{}-byte modulus is too large for an RSA1 blob", modulus.len())
        });

    let mut blob =
        Vec::with_capacity(PUBLIC_KEY_BLOB_HEADER.len() + 4 + exponent.len() + modulus.len());
    blob.extend_from_slice(&PUBLIC_KEY_BLOB_HEADER);
    blob.extend_from_slice(&u32_le(bit_len));
    blob.extend(to_little_endian(exponent));
    blob.extend(to_little_endian(modulus));
    blob
}

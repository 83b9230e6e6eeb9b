//! The canonical byte string a WOPI host reconstructs to check `X-WOPI-Proof`.

use chrono::{DateTime, Utc};

use crate::error::{EncodingError, ProofField};

/// Ticks between 0001-01-01T00:00:00Z and the Unix epoch.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

const NANOS_PER_TICK: i128 = 100;

/// Converts `now` to .NET ticks: 100 ns intervals since 0001-01-01T00:00:00Z.
///
/// Integer arithmetic only, truncating toward zero. Saturates at the `i64`
/// bounds for instants outside the representable range.
pub fn ticks_since_epoch(now: DateTime<Utc>) -> i64 {
    let nanos = i128::from(now.timestamp()) * 1_000_000_000 + i128::from(now.timestamp_subsec_nanos());
    let ticks = nanos / NANOS_PER_TICK + i128::from(UNIX_EPOCH_TICKS);
    i64::try_from(ticks).unwrap_or(if ticks < 0 { i64::MIN } else { i64::MAX })
}

/// Checks that a field of `len` bytes fits the signed 32-bit length prefix.
pub fn check_length(field: ProofField, len: usize) -> Result<i32, EncodingError> {
    i32::try_from(len).map_err(|_| EncodingError::LengthOverflow { field, len })
}

/// Builds the bytes to sign for `access_token` (still percent-encoded, as it
/// appears in the query string), `uri` and `ticks`.
///
/// All integers are big-endian:
///
/// ```text
/// i32 len(token) | token | i32 len(uri) | uri | i32 8 | i64 ticks
/// ```
pub fn build(access_token: &str, uri: &str, ticks: i64) -> Result<Vec<u8>, EncodingError> {
    let token = urlencoding::decode_binary(access_token.as_bytes());
    let token_len = check_length(ProofField::AccessToken, token.len())?;
    let uri_len = check_length(ProofField::Uri, uri.len())?;

    let mut buf = Vec::with_capacity(4 + token.len() + 4 + uri.len() + 4 + 8);
    buf.extend_from_slice(&token_len.to_be_bytes());
    buf.extend_from_slice(&token);
    buf.extend_from_slice(&uri_len.to_be_bytes());
    buf.extend_from_slice(uri.as_bytes());
    buf.extend_from_slice(&8i32.to_be_bytes());
    buf.extend_from_slice(&ticks.to_be_bytes());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn be_i32(bytes: &[u8]) -> i32 {
        i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[test]
    fn test_ticks_at_unix_epoch() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(ticks_since_epoch(epoch), 621_355_968_000_000_000);
    }

    #[test]
    fn test_ticks_at_year_one_is_zero() {
        let year_one = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(ticks_since_epoch(year_one), 0);
    }

    #[test]
    fn test_ticks_keep_sub_microsecond_precision() {
        let t = Utc.timestamp_opt(1, 999_999_999).unwrap();
        assert_eq!(ticks_since_epoch(t), UNIX_EPOCH_TICKS + 19_999_999);

        let t = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(ticks_since_epoch(t), UNIX_EPOCH_TICKS + 17_000_000_001_234_567);
    }

    #[test]
    fn test_ticks_non_decreasing() {
        let mut last = i64::MIN;
        for secs in [-5_000_000_000i64, -1, 0, 1, 1_600_000_000, 1_600_000_000, 4_000_000_000] {
            for nanos in [0u32, 99, 100, 500_000_000] {
                let ticks = ticks_since_epoch(Utc.timestamp_opt(secs, nanos).unwrap());
                assert!(ticks >= last, "{ticks} < {last} at {secs}.{nanos}");
                last = ticks;
            }
        }
    }

    #[test]
    fn test_build_plain_token() {
        let bytes = build("abc", "http://x/y", 0).unwrap();

        assert_eq!(bytes.len(), 4 + 3 + 4 + 10 + 4 + 8);
        assert_eq!(be_i32(&bytes[0..4]), 3);
        assert_eq!(&bytes[4..7], b"abc");
        assert_eq!(be_i32(&bytes[7..11]), 10);
        assert_eq!(&bytes[11..21], b"http://x/y");
        assert_eq!(be_i32(&bytes[21..25]), 8);
        assert_eq!(&bytes[25..], &[0u8; 8]);
    }

    #[test]
    fn test_build_decodes_percent_encoded_token() {
        let ticks = 637_000_000_000_000_000;
        let bytes = build("tok%20en", "https://host/wopi/files/1", ticks).unwrap();

        assert_eq!(bytes.len(), 4 + 6 + 4 + 25 + 4 + 8);
        assert_eq!(be_i32(&bytes[0..4]), 6);
        assert_eq!(&bytes[4..10], b"tok en");
        assert_eq!(be_i32(&bytes[10..14]), 25);
        assert_eq!(&bytes[bytes.len() - 8..], &ticks.to_be_bytes());
    }

    #[test]
    fn test_build_keeps_plus_sign() {
        let bytes = build("a+b", "u", 1).unwrap();
        assert_eq!(&bytes[4..7], b"a+b");
    }

    #[test]
    fn test_build_is_byte_stable() {
        assert_eq!(
            build("t", "u", 0x0102030405060708).unwrap(),
            vec![
                0, 0, 0, 1, b't', //
                0, 0, 0, 1, b'u', //
                0, 0, 0, 8, //
                1, 2, 3, 4, 5, 6, 7, 8,
            ]
        );
    }

    #[test]
    fn test_check_length_bounds() {
        assert_eq!(check_length(ProofField::Uri, 0), Ok(0));
        assert_eq!(check_length(ProofField::Uri, i32::MAX as usize), Ok(i32::MAX));
        assert_eq!(
            check_length(ProofField::AccessToken, i32::MAX as usize + 1),
            Err(EncodingError::LengthOverflow {
                field: ProofField::AccessToken,
                len: i32::MAX as usize + 1,
            })
        );
    }
}

//! TXT rdata codec (RFC 6763 §6).
//!
//! TXT rdata is a sequence of length-prefixed `key=value` segments. An empty
//! attribute set encodes to a single zero byte, the smallest rdata the RFC
//! allows.

use std::collections::BTreeMap;

use bytes::{BufMut, Bytes, BytesMut};

/// Encode an attribute map into TXT rdata.
///
/// Segments longer than 255 bytes cannot be length-prefixed and are skipped.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
///
/// let mut attrs = BTreeMap::new();
/// attrs.insert("foo".to_string(), "bar".to_string());
/// assert_eq!(&dnssd::txt::encode(&attrs)[..], b"\x07foo=bar");
/// ```
pub fn encode(attrs: &BTreeMap<String, String>) -> Bytes {
    if attrs.is_empty() {
        return Bytes::from_static(&[0]);
    }

    let mut buf = BytesMut::new();
    for (key, value) in attrs {
        let len = key.len() + 1 + value.len();
        if len > 255 {
            log::warn!("Skipping oversized TXT attribute `{key}` ({len} bytes)");
            continue;
        }
        buf.put_u8(len as u8);
        buf.put_slice(key.as_bytes());
        buf.put_u8(b'=');
        buf.put_slice(value.as_bytes());
    }

    if buf.is_empty() {
        return Bytes::from_static(&[0]);
    }
    buf.freeze()
}

/// Decode TXT rdata into an attribute map.
///
/// Segments without a `=` become keys with an empty value. Zero-length
/// segments are skipped and a truncated trailing segment ends the decode.
pub fn decode(data: &[u8]) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();

    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        i += 1;
        if len == 0 {
            continue;
        }
        if i + len > data.len() {
            break;
        }
        let segment = String::from_utf8_lossy(&data[i..i + len]);
        i += len;

        match segment.split_once('=') {
            Some((key, value)) => attrs.insert(key.to_string(), value.to_string()),
            None => attrs.insert(segment.into_owned(), String::new()),
        };
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_single_attribute() {
        let encoded = encode(&attrs(&[("foo", "bar")]));
        assert_eq!(
            &encoded[..],
            &[0x07, 0x66, 0x6f, 0x6f, 0x3d, 0x62, 0x61, 0x72]
        );
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(&encode(&BTreeMap::new())[..], &[0]);
    }

    #[test]
    fn test_round_trip() {
        let original = attrs(&[("foo", "bar"), ("path", "/printers/1"), ("empty", "")]);
        assert_eq!(decode(&encode(&original)), original);
    }

    #[test]
    fn test_decode_key_only_segment() {
        let decoded = decode(b"\x04bool");
        assert_eq!(decoded, attrs(&[("bool", "")]));
    }

    #[test]
    fn test_decode_empty_rdata() {
        assert!(decode(&[0]).is_empty());
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn test_decode_truncated_segment() {
        // Length prefix claims 9 bytes but only 3 follow.
        let decoded = decode(b"\x07foo=bar\x09abc");
        assert_eq!(decoded, attrs(&[("foo", "bar")]));
    }

    #[test]
    fn test_encode_skips_oversized_attribute() {
        let big = "x".repeat(300);
        let encoded = encode(&attrs(&[("big", &big), ("foo", "bar")]));
        assert_eq!(&encoded[..], b"\x07foo=bar");
    }
}

//! Length-prefixed codec for the package catalog
//!
//! A catalog travels in a single datagram framed as:
//! ```text
//! [ 4 bytes: length (u32, big-endian) ][ N bytes: protobuf Catalog ]
//! ```
//!
//! The prefix keeps the frame self-delimiting, so an empty catalog is still a
//! non-empty datagram the client can tell apart from a stray packet.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use thiserror::Error;

use crate::limits::MAX_UDP_PAYLOAD;

/// Frame header length
const PREFIX_LEN: usize = 4;

/// Ordered list of package file names held by the host
#[derive(Clone, PartialEq, Message)]
pub struct Catalog {
    #[prost(string, repeated, tag = "1")]
    pub packages: Vec<String>,
}

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Catalog too large: {0} bytes (max: {max})", max = MAX_UDP_PAYLOAD)]
    MessageTooLarge(usize),

    #[error("Length prefix {declared} does not match payload of {available} bytes")]
    LengthMismatch { declared: usize, available: usize },

    #[error("Not enough data: need {needed} bytes, have {available}")]
    NotEnoughData { needed: usize, available: usize },

    #[error("Protobuf decode error: {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("Protobuf encode error: {0}")]
    EncodeError(#[from] prost::EncodeError),
}

/// Encode package names into one length-prefixed datagram payload
pub fn encode_catalog(packages: &[String]) -> Result<Bytes, CodecError> {
    let catalog = Catalog {
        packages: packages.to_vec(),
    };
    let msg_len = catalog.encoded_len();

    if PREFIX_LEN + msg_len > MAX_UDP_PAYLOAD {
        return Err(CodecError::MessageTooLarge(PREFIX_LEN + msg_len));
    }

    let mut buf = BytesMut::with_capacity(PREFIX_LEN + msg_len);
    buf.put_u32(msg_len as u32);
    catalog.encode(&mut buf)?;

    Ok(buf.freeze())
}

/// Decode a datagram produced by [`encode_catalog`]
pub fn decode_catalog(datagram: &[u8]) -> Result<Vec<String>, CodecError> {
    if datagram.len() < PREFIX_LEN {
        return Err(CodecError::NotEnoughData {
            needed: PREFIX_LEN,
            available: datagram.len(),
        });
    }

    let mut buf = datagram;
    let msg_len = buf.get_u32() as usize;

    // One frame per datagram: trailing bytes mean a corrupted or foreign packet
    if msg_len != buf.len() {
        return Err(CodecError::LengthMismatch {
            declared: msg_len,
            available: buf.len(),
        });
    }

    let catalog = Catalog::decode(buf)?;
    Ok(catalog.packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_catalog_roundtrip_keeps_order() {
        let packages = names(&["b.jar", "a.jar", "z.jar"]);
        let encoded = encode_catalog(&packages).expect("encode failed");

        let len_prefix = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        assert_eq!(len_prefix as usize, encoded.len() - 4);

        let decoded = decode_catalog(&encoded).expect("decode failed");
        assert_eq!(decoded, packages);
    }

    #[test]
    fn test_empty_catalog_is_prefix_only() {
        let encoded = encode_catalog(&[]).expect("encode failed");
        assert_eq!(&encoded[..], &[0, 0, 0, 0]);
        assert!(decode_catalog(&encoded).expect("decode failed").is_empty());
    }

    #[test]
    fn test_short_datagram() {
        let result = decode_catalog(&[0, 0]);
        assert!(matches!(
            result,
            Err(CodecError::NotEnoughData { needed: 4, available: 2 })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let mut encoded = encode_catalog(&names(&["a.jar"])).expect("encode failed").to_vec();
        encoded.push(0);
        assert!(matches!(
            decode_catalog(&encoded),
            Err(CodecError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_catalog_too_large() {
        let huge = vec!["x".repeat(1000); 70];
        let result = encode_catalog(&huge);
        assert!(matches!(result, Err(CodecError::MessageTooLarge(_))));
    }
}

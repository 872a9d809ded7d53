//! Compact encoding of a PEM public key for the token `kid` header.
//!
//! Encoding is hex → gzip → base64, decoding runs the same steps backwards.
//! Embedding the whole key lets a verifier check a token without a
//! pre-registered key database.

use std::io::{Read, Write};

use base64::prelude::*;
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::crypto::ecdsa::{parse_public_key_pem, PublicKey};
use crate::error::KeyCodecError;

/// Largest hex text a `kid` may inflate to
///
/// A P-256 SubjectPublicKeyInfo PEM is under 200 bytes, so under 400 as hex.
pub const MAX_KEY_HEX_LEN: usize = 4096;

/// Encode raw key material (normally PEM text) into a `kid` string
///
/// # Example
/// ```rust
/// use nonce_auth::crypto::codec::{decode, encode};
///
/// let encoded = encode(b"-----BEGIN PUBLIC KEY-----").unwrap();
/// assert_eq!(decode(&encoded).unwrap(), b"-----BEGIN PUBLIC KEY-----");
/// ```
pub fn encode(raw_key: &[u8]) -> Result<String, KeyCodecError> {
    let key_hex = hex::encode(raw_key);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(key_hex.as_bytes())?;
    let compressed = encoder.finish()?;

    Ok(BASE64_STANDARD.encode(compressed))
}

/// Reverse [`encode`], returning the original key bytes
///
/// # Errors
/// The input is taken verbatim: it is also the key's identity in the
/// challenge store, so whitespace is rejected rather than trimmed.
///
/// # Errors
/// - `Empty` - nothing to decode
/// - `Base64` - the outer layer is not standard base64
/// - `Gzip` - the compressed stream is corrupt or truncated
/// - `TooLarge` - the stream inflates past [`MAX_KEY_HEX_LEN`]
/// - `Hex` - the decompressed text is odd-length or not hex
pub fn decode(encoded: &str) -> Result<Vec<u8>, KeyCodecError> {
    if encoded.is_empty() {
        return Err(KeyCodecError::Empty);
    }

    let compressed = BASE64_STANDARD.decode(encoded)?;

    let mut key_hex = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .take(MAX_KEY_HEX_LEN as u64 + 1)
        .read_to_end(&mut key_hex)?;
    if key_hex.len() > MAX_KEY_HEX_LEN {
        return Err(KeyCodecError::TooLarge(MAX_KEY_HEX_LEN));
    }

    Ok(hex::decode(key_hex)?)
}

/// Decode a `kid` string all the way to a usable P-256 public key
pub fn decode_public_key(encoded: &str) -> Result<PublicKey, KeyCodecError> {
    let raw = decode(encoded)?;
    let pem = std::str::from_utf8(&raw)?;
    parse_public_key_pem(pem)
}

use p256::pkcs8::{DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use secrecy::Secret;
use sha2::{Digest, Sha256};

use crate::error::KeyCodecError;

/// A validated P-256 public key, held in normalized PEM form
#[derive(Clone, Debug)]
pub struct PublicKey {
    pem: String,
}

impl PublicKey {
    /// SubjectPublicKeyInfo PEM with LF line endings
    pub fn pem(&self) -> &str {
        &self.pem
    }
}

/// A freshly generated P-256 key pair in PEM form
pub struct KeyPair {
    /// PKCS#8 private key PEM
    pub private_key_pem: Secret<String>,
    /// SubjectPublicKeyInfo public key PEM
    pub public_key_pem: String,
}

/// Parse a PEM-encoded P-256 SubjectPublicKeyInfo
///
/// Surrounding whitespace is ignored and CRLF line endings are accepted.
///
/// # Example
/// ```rust
/// use nonce_auth::crypto::ecdsa::{generate_key_pair, parse_public_key_pem};
///
/// let pair = generate_key_pair().unwrap();
/// let key = parse_public_key_pem(&pair.public_key_pem).unwrap();
/// assert_eq!(key.pem(), pair.public_key_pem);
/// ```
pub fn parse_public_key_pem(pem: &str) -> Result<PublicKey, KeyCodecError> {
    let key = p256::PublicKey::from_public_key_pem(pem.trim())
        .map_err(|e| KeyCodecError::Pem(e.to_string()))?;
    let pem = key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyCodecError::Pem(e.to_string()))?;

    Ok(PublicKey { pem })
}

/// Generate a P-256 key pair suitable for ES256 tokens
pub fn generate_key_pair() -> Result<KeyPair, KeyCodecError> {
    let secret_key = p256::SecretKey::random(&mut OsRng);

    let private_key_pem = secret_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeyCodecError::Pem(format!("Failed to encode private key: {}", e)))?;
    let public_key_pem = secret_key
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyCodecError::Pem(format!("Failed to encode public key: {}", e)))?;

    Ok(KeyPair {
        private_key_pem: Secret::new(private_key_pem.as_str().to_owned()),
        public_key_pem,
    })
}

/// Short, log-safe identifier for an encoded public key
///
/// First 16 hex characters of the SHA-256 of the encoded key.
pub fn key_fingerprint(encoded_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(encoded_key.as_bytes());
    let mut fingerprint = hex::encode(hasher.finalize());
    fingerprint.truncate(16);
    fingerprint
}

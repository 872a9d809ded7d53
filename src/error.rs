use thiserror::Error;

/// Failures while turning an encoded `kid` value back into a public key
///
/// Each stage of the decode pipeline (base64 → gzip → hex → PEM) has its own
/// variant so callers can report exactly where an encoded key went wrong.
#[derive(Debug, Error)]
pub enum KeyCodecError {
    /// Nothing to decode
    #[error("public key is empty")]
    Empty,

    /// The outer layer is not valid standard base64
    #[error("failed to decode compressed public key string: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The gzip stream is corrupt or truncated
    #[error("failed to read bytes from gzip reader: {0}")]
    Gzip(#[from] std::io::Error),

    /// The gzip stream inflates past the size of any real public key
    #[error("decompressed public key exceeds {0} bytes")]
    TooLarge(usize),

    /// The decompressed text is not an even-length hex string
    #[error("failed to decode hex public key string: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The hex payload is not UTF-8 PEM text
    #[error("public key is not valid PEM text: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The PEM block is not a P-256 SubjectPublicKeyInfo
    #[error("failed to parse public key: {0}")]
    Pem(String),
}

/// Signed token construction and validation errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// The `kid` header carrying the encoded public key is absent
    #[error("public key header not found")]
    MissingKeyHeader,

    /// The key referenced by the header could not be decoded
    #[error(transparent)]
    Key(#[from] KeyCodecError),

    /// Signature, algorithm or registered claims were rejected
    ///
    /// This covers:
    /// - A signature that does not match the header key
    /// - An algorithm other than ES256
    /// - A wrong audience, an expired token or a token used before `nbf`
    #[error("{0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// `iat + token_ttl` does not fit in a timestamp
    #[error("token lifetime overflows: issued at {issued_at}, ttl {ttl}")]
    Lifetime { issued_at: i64, ttl: i64 },

    /// A private key could not be loaded for signing
    #[error("invalid signing key: {0}")]
    SigningKey(String),
}

/// Challenge store failures
///
/// These are infrastructure faults, never protocol outcomes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A challenge for the same (public key, nonce) pair already exists
    #[error("challenge already exists for nonce {0}")]
    Duplicate(String),

    /// The backend could not be reached or its state is unusable
    #[error("challenge store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`ChallengeService`](crate::service::ChallengeService)
///
/// Verification outcomes such as a bad signature or an unknown nonce are not
/// errors; they come back as a [`ValidationResult`](crate::service::ValidationResult).
///
/// # Example
/// ```rust
/// use nonce_auth::{ChallengeError, Result};
///
/// fn handle(result: Result<()>) {
///     match result {
///         Ok(()) => println!("ok"),
///         Err(ChallengeError::InvalidPublicKey(e)) => println!("client error: {}", e),
///         Err(e) => println!("retryable: {}", e),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// The public key supplied by the client could not be decoded
    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[from] KeyCodecError),

    /// The challenge store failed
    #[error("challenge store error: {0}")]
    Store(#[from] StoreError),

    /// The service configuration is unusable
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChallengeError>;

//! # nonce-auth
//!
//! A Rust library for **nonce challenge-response authentication** with **ES256 signed tokens**.
//! A client asks for a one-time nonce bound to its public key, signs a token carrying that
//! nonce, and the verifier checks the signature, the key-nonce binding and the nonce expiry.
//!
//! ## Features
//!
//! - **Self-describing tokens** - The public key travels in the token `kid` header
//!   (hex → gzip → base64), no key registry needed
//! - **Single-use nonces** - UUID v4 nonces bound to a public key with a 5 minute lifetime
//! - **Pluggable storage** - Bring your own [`ChallengeStore`], an in-memory one is included
//! - **Injectable clock** - Expiry is computed and checked against a [`Clock`]
//! - **Outcomes, not errors** - Rejected tokens come back as a [`ValidationResult`];
//!   only infrastructure failures are errors
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use nonce_auth::{
//!     crypto::{codec, ecdsa::generate_key_pair, jwt::create_token},
//!     ChallengeConfig, ChallengeService, MemoryChallengeStore,
//! };
//!
//! let service = ChallengeService::with_system_clock(
//!     MemoryChallengeStore::new(),
//!     ChallengeConfig::default(),
//! ).unwrap();
//!
//! // Client side: a key pair and its encoded public key
//! let pair = generate_key_pair().unwrap();
//! let encoded_key = codec::encode(pair.public_key_pem.as_bytes()).unwrap();
//!
//! // Issue a nonce
//! let challenge = service.create_challenge(&encoded_key).unwrap();
//!
//! // Client signs a token carrying the nonce
//! let token = create_token(
//!     &challenge.nonce,
//!     &pair.private_key_pem,
//!     &pair.public_key_pem,
//!     Utc::now().timestamp(),
//!     service.config(),
//! ).unwrap();
//!
//! let result = service.verify_challenge(&token).unwrap();
//! assert!(result.valid);
//! ```

pub mod api;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod service;
pub mod store;

// Re-export main types for easier access
pub use api::{ApiReply, ApiResponse, ChallengeApi, ResponseCode, Status};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ChallengeConfig;
pub use crypto::jwt::{create_token, validate_token};
pub use error::{ChallengeError, KeyCodecError, Result, StoreError, TokenError};
pub use service::{ChallengeService, ValidationResult};
pub use store::{Challenge, ChallengeStore, MemoryChallengeStore};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::ChallengeConfig,
    crypto::{
        codec::decode_public_key, ecdsa::key_fingerprint, jwt::validate_token,
        nonce::generate_nonce,
    },
    error::{ChallengeError, Result},
    store::{Challenge, ChallengeStore},
};

/// Outcome of a challenge verification
///
/// A rejected token is a normal result, not an error: `valid` is false and
/// `validation_error` says why.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub validation_error: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            validation_error: String::new(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            validation_error: reason.into(),
        }
    }
}

/// Issues nonces and verifies the tokens that answer them
///
/// The service keeps no state of its own between calls; everything it knows
/// comes from the injected store, and "now" comes from the injected clock.
/// It is `Send + Sync` whenever the store and clock are.
pub struct ChallengeService<S, C = SystemClock> {
    store: S,
    clock: C,
    config: ChallengeConfig,
}

impl<S: ChallengeStore> ChallengeService<S, SystemClock> {
    /// Create a service backed by the wall clock
    ///
    /// # Example
    /// ```rust
    /// use nonce_auth::{ChallengeConfig, ChallengeService, MemoryChallengeStore};
    ///
    /// let service = ChallengeService::with_system_clock(
    ///     MemoryChallengeStore::new(),
    ///     ChallengeConfig::default(),
    /// ).unwrap();
    /// assert!(service.create_challenge("not-a-key").is_err());
    /// ```
    pub fn with_system_clock(store: S, config: ChallengeConfig) -> Result<Self> {
        Self::new(store, SystemClock, config)
    }
}

impl<S: ChallengeStore, C: Clock> ChallengeService<S, C> {
    /// Create a challenge service
    ///
    /// # Arguments
    /// * `store` - Where challenges are persisted
    /// * `clock` - Source of "now" for expiry computation and checks
    /// * `config` - Nonce lifetime and token validation settings
    ///
    /// # Errors
    /// - `Config` - the configuration fails [`ChallengeConfig::validate`]
    pub fn new(store: S, clock: C, config: ChallengeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// Issue a fresh nonce for an encoded public key
    ///
    /// The key is decoded first and never persisted unless it parses as a
    /// P-256 public key. The nonce expires `nonce_ttl` seconds from now.
    ///
    /// # Errors
    /// - `InvalidPublicKey` - the key does not decode; the store is not touched
    /// - `Config` - `now + nonce_ttl` does not fit in a timestamp
    /// - `Store` - the challenge could not be persisted
    pub fn create_challenge(&self, public_key: &str) -> Result<Challenge> {
        let fingerprint = key_fingerprint(public_key);

        if let Err(e) = decode_public_key(public_key) {
            warn!(key = %fingerprint, error = %e, "rejected challenge request");
            return Err(e.into());
        }

        let now = self.clock.now().timestamp();
        let expires_at = now.checked_add(self.config.nonce_ttl).ok_or_else(|| {
            ChallengeError::Config(format!(
                "nonce expiry overflows: now {now}, nonce_ttl {}",
                self.config.nonce_ttl
            ))
        })?;
        let nonce = generate_nonce();

        let challenge = self
            .store
            .create(public_key, &nonce, expires_at)
            .map_err(|e| {
                error!(key = %fingerprint, error = %e, "failed to store challenge");
                e
            })?;

        info!(key = %fingerprint, nonce = %challenge.nonce, expires_at, "challenge created");
        Ok(challenge)
    }

    /// Verify a signed token answering a previously issued challenge
    ///
    /// Steps, stopping at the first failure:
    /// 1. Decode the header, recover the public key from `kid` and check the
    ///    signature and registered claims, with `exp` and `nbf` measured
    ///    against the service clock
    /// 2. Look up the challenge for (`kid`, `jti`)
    /// 3. Reject when no challenge exists ("invalid nonce")
    /// 4. Reject when the first challenge found has expired ("expired nonce")
    ///
    /// The store is only queried once the signature has been verified.
    ///
    /// # Errors
    /// - `Store` - the lookup failed; callers should report the token as not
    ///   valid and may retry
    pub fn verify_challenge(&self, signed_token: &str) -> Result<ValidationResult> {
        let now = self.clock.now().timestamp();
        let verified = match validate_token(signed_token, &self.config, now) {
            Ok(verified) => verified,
            Err(e) => {
                warn!(error = %e, "failed to parse and validate token");
                return Ok(ValidationResult::invalid(e.to_string()));
            }
        };

        let fingerprint = key_fingerprint(&verified.public_key);
        let nonce = verified.claims.jti.as_str();

        let challenges = self
            .store
            .get(&verified.public_key, nonce)
            .map_err(|e| {
                error!(key = %fingerprint, nonce, error = %e, "failed to get challenge from store");
                e
            })?;

        // duplicates are not expected; the first row decides
        let Some(challenge) = challenges.first() else {
            debug!(key = %fingerprint, nonce, "no challenge for nonce");
            return Ok(ValidationResult::invalid("invalid nonce"));
        };

        if challenge.expires_at < now {
            debug!(key = %fingerprint, nonce, expires_at = challenge.expires_at, "nonce expired");
            return Ok(ValidationResult::invalid("expired nonce"));
        }

        debug!(key = %fingerprint, nonce, "challenge verified");
        Ok(ValidationResult::valid())
    }
}

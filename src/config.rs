use serde::Deserialize;

use crate::error::{ChallengeError, Result};

/// Audience every signed token must carry
pub const DEFAULT_AUDIENCE: &str = "wheltee";

/// Default lifetime of an issued nonce, in seconds
pub const DEFAULT_NONCE_TTL: i64 = 300;

/// Default lifetime of a signed token, in seconds
pub const DEFAULT_TOKEN_TTL: i64 = 300;

/// Upper bound for `nonce_ttl` and `token_ttl`, one day
pub const MAX_TTL: i64 = 86_400;

/// Upper bound for `leeway`, in seconds
pub const MAX_LEEWAY: u64 = 300;

/// Configuration for challenge issuance and token validation
///
/// # Example
/// ```rust
/// use nonce_auth::ChallengeConfig;
///
/// let config: ChallengeConfig = serde_json::from_str(r#"{ "nonce_ttl": 60 }"#).unwrap();
/// assert_eq!(config.nonce_ttl, 60);
/// assert_eq!(config.audience, "wheltee");
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Nonce Time To Live (TTL) in seconds
    ///
    /// A challenge is rejected as expired once `now` passes
    /// `issued_at + nonce_ttl`.
    pub nonce_ttl: i64,
    /// Signed token Time To Live (TTL) in seconds, used when signing
    ///
    /// Independent of the nonce lifetime.
    pub token_ttl: i64,
    /// Expected `aud` claim
    pub audience: String,
    /// Clock skew tolerated on `exp` and `nbf`, in seconds
    pub leeway: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            nonce_ttl: DEFAULT_NONCE_TTL,
            token_ttl: DEFAULT_TOKEN_TTL,
            audience: DEFAULT_AUDIENCE.to_string(),
            leeway: 0,
        }
    }
}

impl ChallengeConfig {
    /// Reject configurations that would issue already-dead or practically
    /// immortal nonces and tokens
    ///
    /// TTLs must lie in `1..=MAX_TTL` and `leeway` must not exceed `MAX_LEEWAY`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TTL).contains(&self.nonce_ttl) {
            return Err(ChallengeError::Config(format!(
                "nonce_ttl must be between 1 and {MAX_TTL} seconds"
            )));
        }
        if !(1..=MAX_TTL).contains(&self.token_ttl) {
            return Err(ChallengeError::Config(format!(
                "token_ttl must be between 1 and {MAX_TTL} seconds"
            )));
        }
        if self.leeway > MAX_LEEWAY {
            return Err(ChallengeError::Config(format!(
                "leeway must not exceed {MAX_LEEWAY} seconds"
            )));
        }
        if self.audience.trim().is_empty() {
            return Err(ChallengeError::Config("audience must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChallengeConfig::default();
        assert_eq!(config.nonce_ttl, 300);
        assert_eq!(config.token_ttl, 300);
        assert_eq!(config.audience, DEFAULT_AUDIENCE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: ChallengeConfig =
            serde_json::from_str(r#"{ "audience": "other", "leeway": 5 }"#).unwrap();
        assert_eq!(config.audience, "other");
        assert_eq!(config.leeway, 5);
        assert_eq!(config.nonce_ttl, DEFAULT_NONCE_TTL);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ChallengeConfig {
            nonce_ttl: 0,
            ..ChallengeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChallengeError::Config(_))));

        let config = ChallengeConfig {
            audience: " ".to_string(),
            ..ChallengeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChallengeError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_values() {
        let config: ChallengeConfig =
            serde_json::from_str(r#"{ "nonce_ttl": 9223372036854775807 }"#).unwrap();
        assert!(matches!(config.validate(), Err(ChallengeError::Config(_))));

        let config = ChallengeConfig {
            token_ttl: MAX_TTL + 1,
            ..ChallengeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChallengeError::Config(_))));

        let config = ChallengeConfig {
            leeway: u64::MAX,
            ..ChallengeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChallengeError::Config(_))));

        let config = ChallengeConfig {
            nonce_ttl: MAX_TTL,
            token_ttl: MAX_TTL,
            leeway: MAX_LEEWAY,
            ..ChallengeConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}

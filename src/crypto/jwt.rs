use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    config::ChallengeConfig,
    crypto::{codec, ecdsa::PublicKey},
    error::TokenError,
};

/// Claims of a challenge response token
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeClaims {
    /// Nonce issued by the challenge
    pub jti: String,
    /// Service the token is meant for
    pub aud: String,
    /// Issued at timestamp (Unix timestamp)
    pub iat: i64,
    /// Not before timestamp (Unix timestamp)
    pub nbf: i64,
    /// Expiration timestamp (Unix timestamp)
    pub exp: i64,
}

impl ChallengeClaims {
    pub fn new(nonce: &str, issued_at: i64, config: &ChallengeConfig) -> Result<Self, TokenError> {
        let exp = issued_at
            .checked_add(config.token_ttl)
            .ok_or(TokenError::Lifetime {
                issued_at,
                ttl: config.token_ttl,
            })?;

        Ok(Self {
            jti: nonce.to_string(),
            aud: config.audience.clone(),
            iat: issued_at,
            nbf: issued_at,
            exp,
        })
    }

    /// Check `exp` and `nbf` against `now`, allowing `leeway` seconds of skew
    fn check_time(&self, now: i64, leeway: u64) -> Result<(), TokenError> {
        let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);

        if self.exp.saturating_add(leeway) < now {
            return Err(TokenError::Invalid(ErrorKind::ExpiredSignature.into()));
        }
        if self.nbf.saturating_sub(leeway) > now {
            return Err(TokenError::Invalid(ErrorKind::ImmatureSignature.into()));
        }
        Ok(())
    }
}

/// A token whose signature and registered claims checked out
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Encoded public key taken from the `kid` header
    pub public_key: String,
    pub claims: ChallengeClaims,
}

/// Sign a challenge response token with ES256
///
/// The public key is encoded into the `kid` header so the verifier can
/// recover it from the token itself.
///
/// # Arguments
/// * `nonce` - Nonce returned by the challenge endpoint
/// * `private_key_pem` - PKCS#8 PEM private key
/// * `public_key_pem` - Matching SubjectPublicKeyInfo PEM
/// * `issued_at` - Unix timestamp used for `iat` and `nbf`
/// * `config` - Audience and token lifetime
///
/// # Example
/// ```rust
/// use chrono::Utc;
/// use nonce_auth::{ChallengeConfig, crypto::{ecdsa::generate_key_pair, jwt::{create_token, validate_token}}};
///
/// let config = ChallengeConfig::default();
/// let pair = generate_key_pair().unwrap();
/// let token = create_token(
///     "4b8b3887-e113-4e27-adb4-06f9aa66c395",
///     &pair.private_key_pem,
///     &pair.public_key_pem,
///     Utc::now().timestamp(),
///     &config,
/// ).unwrap();
///
/// let verified = validate_token(&token, &config, Utc::now().timestamp()).unwrap();
/// assert_eq!(verified.claims.jti, "4b8b3887-e113-4e27-adb4-06f9aa66c395");
/// ```
pub fn create_token(
    nonce: &str,
    private_key_pem: &Secret<String>,
    public_key_pem: &str,
    issued_at: i64,
    config: &ChallengeConfig,
) -> Result<String, TokenError> {
    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(codec::encode(public_key_pem.as_bytes())?);

    let encoding_key = EncodingKey::from_ec_pem(private_key_pem.expose_secret().as_bytes())
        .map_err(|e| TokenError::SigningKey(e.to_string()))?;

    let claims = ChallengeClaims::new(nonce, issued_at, config)?;
    encode(&header, &claims, &encoding_key)
        .map_err(|e| TokenError::SigningKey(format!("Failed to sign token: {}", e)))
}

/// Verify a challenge response token against the key in its own header
///
/// The header is decoded once; its `kid` is decoded into a P-256 key which
/// then checks the ES256 signature and audience. `exp` and `nbf` are checked
/// against `now` (unix seconds) rather than the wall clock.
///
/// # Errors
/// - `MissingKeyHeader` - the header has no `kid`
/// - `Key` - the `kid` does not decode to a public key
/// - `Invalid` - malformed token, bad signature or rejected claims
pub fn validate_token(
    token: &str,
    config: &ChallengeConfig,
    now: i64,
) -> Result<VerifiedToken, TokenError> {
    let header = decode_header(token)?;
    let public_key = header.kid.ok_or(TokenError::MissingKeyHeader)?;

    let decoding_key = decoding_key(&codec::decode_public_key(&public_key)?)?;
    let token_data = decode::<ChallengeClaims>(token, &decoding_key, &validation(config))?;
    token_data.claims.check_time(now, config.leeway)?;

    Ok(VerifiedToken {
        public_key,
        claims: token_data.claims,
    })
}

fn decoding_key(public_key: &PublicKey) -> Result<DecodingKey, TokenError> {
    Ok(DecodingKey::from_ec_pem(public_key.pem().as_bytes())?)
}

fn validation(config: &ChallengeConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::ES256);
    validation.set_audience(&[config.audience.as_str()]);
    validation.set_required_spec_claims(&["exp", "nbf", "aud"]);
    // checked by ChallengeClaims::check_time
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation
}

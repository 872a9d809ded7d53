//! Challenge persistence.
//!
//! The service only needs to insert a challenge and look it up again by
//! (public key, nonce); expiry is checked by the caller at read time.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A nonce issued to a public key
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Encoded public key the nonce was issued to
    pub public_key: String,
    /// Single-use nonce (UUID v4)
    pub nonce: String,
    /// Unix timestamp after which the nonce is rejected
    pub expires_at: i64,
}

/// Storage backend for issued challenges
pub trait ChallengeStore: Send + Sync {
    /// Insert a new challenge and return the stored record
    fn create(&self, public_key: &str, nonce: &str, expires_at: i64)
        -> Result<Challenge, StoreError>;

    /// Every challenge stored for the pair, empty when none match
    fn get(&self, public_key: &str, nonce: &str) -> Result<Vec<Challenge>, StoreError>;
}

impl<S: ChallengeStore + ?Sized> ChallengeStore for Arc<S> {
    fn create(
        &self,
        public_key: &str,
        nonce: &str,
        expires_at: i64,
    ) -> Result<Challenge, StoreError> {
        (**self).create(public_key, nonce, expires_at)
    }

    fn get(&self, public_key: &str, nonce: &str) -> Result<Vec<Challenge>, StoreError> {
        (**self).get(public_key, nonce)
    }
}

/// In-process challenge store
///
/// Rows live until [`purge_expired`](Self::purge_expired) removes them.
#[derive(Debug, Default)]
pub struct MemoryChallengeStore {
    rows: RwLock<Vec<Challenge>>,
}

impl MemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every challenge that expired before `now`, returning how many went
    pub fn purge_expired(&self, now: i64) -> Result<usize, StoreError> {
        let mut rows = self.rows.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let before = rows.len();
        rows.retain(|challenge| challenge.expires_at >= now);
        Ok(before - rows.len())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let rows = self.rows.read().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl ChallengeStore for MemoryChallengeStore {
    fn create(
        &self,
        public_key: &str,
        nonce: &str,
        expires_at: i64,
    ) -> Result<Challenge, StoreError> {
        let mut rows = self.rows.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if rows
            .iter()
            .any(|row| row.public_key == public_key && row.nonce == nonce)
        {
            return Err(StoreError::Duplicate(nonce.to_string()));
        }

        let challenge = Challenge {
            public_key: public_key.to_string(),
            nonce: nonce.to_string(),
            expires_at,
        };
        rows.push(challenge.clone());
        Ok(challenge)
    }

    fn get(&self, public_key: &str, nonce: &str) -> Result<Vec<Challenge>, StoreError> {
        let rows = self.rows.read().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(rows
            .iter()
            .filter(|row| row.public_key == public_key && row.nonce == nonce)
            .cloned()
            .collect())
    }
}

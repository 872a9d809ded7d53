use uuid::Uuid;

/// Generate a fresh single-use nonce
///
/// Returns a random (v4) UUID in its hyphenated string form. Collisions are
/// treated as impossible, so callers do not retry.
///
/// # Example
/// ```rust
/// use nonce_auth::crypto::nonce::generate_nonce;
///
/// let nonce = generate_nonce();
/// assert_eq!(nonce.len(), 36);
/// ```
pub fn generate_nonce() -> String {
    Uuid::new_v4().to_string()
}

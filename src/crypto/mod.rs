pub mod codec;
pub mod ecdsa;
pub mod jwt;
pub mod nonce;

#[cfg(test)]
pub(crate) mod fixtures;

pub use codec::{decode_public_key, encode};

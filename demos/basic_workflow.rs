// demos/basic_workflow.rs

use chrono::Utc;
use nonce_auth::{
    crypto::{codec, ecdsa::generate_key_pair, jwt::create_token},
    ChallengeConfig, ChallengeService, MemoryChallengeStore,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("nonce-auth Basic Usage Example");

    // 1. Setup challenge service (in a real app, back it with your database)
    let service =
        ChallengeService::with_system_clock(MemoryChallengeStore::new(), ChallengeConfig::default())?;

    // 2. Client generates a key pair and encodes its public key
    let pair = generate_key_pair()?;
    let encoded_key = codec::encode(pair.public_key_pem.as_bytes())?;
    println!("Encoded public key: {}...", &encoded_key[..32]);

    // 3. Request a challenge
    let challenge = service.create_challenge(&encoded_key)?;
    println!("Nonce: {}", challenge.nonce);
    println!("Expires at: {}", challenge.expires_at);

    // 4. Client signs a token carrying the nonce
    let token = create_token(
        &challenge.nonce,
        &pair.private_key_pem,
        &pair.public_key_pem,
        Utc::now().timestamp(),
        service.config(),
    )?;
    println!("\nSigned token: {}...", &token[..50]);

    // 5. Verify
    let result = service.verify_challenge(&token)?;
    println!("Valid: {}", result.valid);

    // 6. A token answering a nonce that was never issued
    let stray = create_token(
        "00000000-0000-4000-8000-000000000000",
        &pair.private_key_pem,
        &pair.public_key_pem,
        Utc::now().timestamp(),
        service.config(),
    )?;
    let result = service.verify_challenge(&stray)?;
    println!("Stray token valid: {} ({})", result.valid, result.validation_error);

    Ok(())
}

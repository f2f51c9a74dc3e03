// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Small cryptographic helpers: random tokens, key derivation, MAC signatures
//! and PKCE challenges.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// HKDF info label for the client cookie MAC key.
pub const COOKIE_KEY_INFO: &[u8] = b"founder-connect client cookie v1";
/// HKDF info label for the direct-auth token signing key.
pub const TOKEN_KEY_INFO: &[u8] = b"founder-connect direct auth token v1";

/// Generate `len` random bytes encoded as URL-safe base64 (no padding).
pub fn random_token(len: usize) -> anyhow::Result<String> {
    let mut bytes = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| anyhow::anyhow!("system randomness unavailable"))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Derive a 32-byte subkey from the master signing key.
pub fn derive_key(master: &[u8], info: &[u8]) -> anyhow::Result<Vec<u8>> {
    let hk = Hkdf::<Sha256>::new(None, master);
    let mut okm = vec![0u8; 32];
    hk.expand(info, &mut okm)
        .map_err(|e| anyhow::anyhow!("HKDF expand failed: {:?}", e))?;
    Ok(okm)
}

/// Hex-encoded HMAC-SHA256 of `payload`.
pub fn sign(key: &[u8], payload: &str) -> anyhow::Result<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature produced by [`sign`].
pub fn verify(key: &[u8], payload: &str, signature_hex: &str) -> bool {
    let Ok(expected) = sign(key, payload) else {
        return false;
    };
    expected.as_bytes().ct_eq(signature_hex.as_bytes()).into()
}

/// New PKCE code verifier (43 URL-safe characters).
pub fn pkce_verifier() -> anyhow::Result<String> {
    random_token(32)
}

/// S256 PKCE challenge for a verifier.
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

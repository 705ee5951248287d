/// OAuth PKCE (Proof Key for Code Exchange), RFC 7636
///
/// Kick requires PKCE with the S256 method:
/// 1. generate a code_verifier (43-128 chars of [A-Za-z0-9-._~])
/// 2. send code_challenge = BASE64URL(SHA256(code_verifier)) with the authorize redirect
/// 3. send the code_verifier with the token exchange; the provider checks the pair
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// PKCE errors
#[derive(Debug, Error)]
pub enum PkceError {
    #[error("Invalid code verifier: {0}")]
    InvalidVerifier(String),
}

pub const CHALLENGE_METHOD: &str = "S256";

/// RFC 7636 §4.1 verifier shape.
pub fn is_valid_code_verifier(verifier: &str) -> bool {
    let len = verifier.len();
    (43..=128).contains(&len)
        && verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}

/// 32 random bytes, base64url without padding (43 chars).
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Base64url SHA-256 of the verifier.
pub fn generate_code_challenge(code_verifier: &str) -> Result<String, PkceError> {
    if !is_valid_code_verifier(code_verifier) {
        return Err(PkceError::InvalidVerifier(format!(
            "Code verifier must be 43-128 characters, got {}",
            code_verifier.len()
        )));
    }

    let hash = Sha256::digest(code_verifier.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_length_bounds() {
        assert!(is_valid_code_verifier(&"a".repeat(43)));
        assert!(is_valid_code_verifier(&"a".repeat(128)));
        assert!(!is_valid_code_verifier(&"a".repeat(42)));
        assert!(!is_valid_code_verifier(&"a".repeat(129)));
        assert!(!is_valid_code_verifier(&format!("{}@", "a".repeat(43))));
    }

    #[test]
    fn generated_verifier_is_valid() {
        let verifier = generate_code_verifier();
        assert_eq!(verifier.len(), 43);
        assert!(is_valid_code_verifier(&verifier));
        assert_ne!(verifier, generate_code_verifier());
    }

    #[test]
    fn s256_challenge_known_value() {
        let challenge = generate_code_challenge("dBjftJeZ4CVP-mJ92K9CIOdRLp7kBMZ3rDtWrdyuRg0").unwrap();
        assert_eq!(challenge, "nJHeDvAHjNbMz8y2p1dYaALgY1JM4Jm5d1H-rTeu4Ko");
        assert!(!challenge.contains('='));
    }
}

//! PKCE (Proof Key for Code Exchange) verification.
//!
//! Implements the RFC 7636 token-endpoint side: given the challenge stored
//! with the authorization code and the `code_verifier` submitted at
//! exchange, transform the verifier with the recorded method and compare.
//! Both `plain` (the default when no method was recorded) and `S256` are
//! accepted; any other method is rejected before comparison.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Errors that can occur during PKCE verification.
#[derive(Debug, thiserror::Error)]
pub enum PkceError {
    /// The recorded challenge method is not `plain` or `S256`.
    #[error("code_challenge_method transform algorithm not supported: {0}")]
    UnsupportedMethod(String),

    /// The transformed verifier does not match the stored challenge.
    #[error("code_verifier does not match code_challenge")]
    VerificationFailed,
}

impl From<PkceError> for AuthError {
    fn from(error: PkceError) -> Self {
        match &error {
            PkceError::UnsupportedMethod(_) => AuthError::invalid_request(error.to_string()),
            PkceError::VerificationFailed => AuthError::invalid_grant(error.to_string()),
        }
    }
}

/// PKCE challenge method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodeChallengeMethod {
    /// The verifier is compared to the challenge as-is.
    #[default]
    Plain,

    /// The challenge is `BASE64URL(SHA256(ASCII(code_verifier)))`.
    S256,
}

impl CodeChallengeMethod {
    /// Parses the method recorded with the authorization code. An empty
    /// string means `plain`.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::UnsupportedMethod` for anything else.
    pub fn parse(method: &str) -> Result<Self, PkceError> {
        match method {
            "" | "plain" => Ok(Self::Plain),
            "S256" => Ok(Self::S256),
            other => Err(PkceError::UnsupportedMethod(other.to_string())),
        }
    }

    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }

    /// Applies the method's transform to a verifier.
    #[must_use]
    pub fn transform(&self, verifier: &str) -> String {
        match self {
            Self::Plain => verifier.to_string(),
            Self::S256 => URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())),
        }
    }
}

impl std::fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verifies a submitted `code_verifier` against the stored challenge.
///
/// The transformed verifier must match the challenge byte for byte.
///
/// # Errors
///
/// Returns `PkceError::UnsupportedMethod` when the recorded method is
/// unknown, `PkceError::VerificationFailed` on mismatch.
pub fn verify_challenge(challenge: &str, method: &str, verifier: &str) -> Result<(), PkceError> {
    let method = CodeChallengeMethod::parse(method)?;
    if method.transform(verifier) == challenge {
        Ok(())
    } else {
        Err(PkceError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc7636_appendix_b_test_vector() {
        // https://tools.ietf.org/html/rfc7636#appendix-B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

        assert_eq!(CodeChallengeMethod::S256.transform(verifier), challenge);
        assert!(verify_challenge(challenge, "S256", verifier).is_ok());
    }

    #[test]
    fn test_s256_short_verifier() {
        let challenge = "ungWv48Bz-pBQUDeXa4iI7ADYaOWF3qctBD_YfIAFa0";
        assert!(verify_challenge(challenge, "S256", "abc").is_ok());
        assert!(matches!(
            verify_challenge(challenge, "S256", "abd"),
            Err(PkceError::VerificationFailed)
        ));
    }

    #[test]
    fn test_plain_method() {
        assert!(verify_challenge("verifier-value", "plain", "verifier-value").is_ok());
        assert!(matches!(
            verify_challenge("verifier-value", "plain", "other"),
            Err(PkceError::VerificationFailed)
        ));
    }

    #[test]
    fn test_empty_method_means_plain() {
        assert!(verify_challenge("verifier-value", "", "verifier-value").is_ok());
    }

    #[test]
    fn test_unsupported_method() {
        let result = verify_challenge("challenge", "S512", "verifier");
        assert!(matches!(result, Err(PkceError::UnsupportedMethod(_))));
    }

    #[test]
    fn test_single_bit_flip_rejected() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = CodeChallengeMethod::S256.transform(verifier);

        // Flip one bit of the verifier and every variant must be rejected.
        let mut bytes = verifier.as_bytes().to_vec();
        bytes[0] ^= 0x01;
        let flipped = String::from_utf8(bytes).expect("still ascii");
        assert!(matches!(
            verify_challenge(&challenge, "S256", &flipped),
            Err(PkceError::VerificationFailed)
        ));
    }

    #[test]
    fn test_error_mapping_to_auth_error() {
        let err: AuthError = PkceError::UnsupportedMethod("S512".to_string()).into();
        assert_eq!(err.oauth_error_code(), "invalid_request");

        let err: AuthError = PkceError::VerificationFailed.into();
        assert_eq!(err.oauth_error_code(), "invalid_grant");
    }

    #[test]
    fn test_method_parse_and_display() {
        assert_eq!(
            CodeChallengeMethod::parse("S256").expect("valid method"),
            CodeChallengeMethod::S256
        );
        assert_eq!(
            CodeChallengeMethod::parse("plain").expect("valid method"),
            CodeChallengeMethod::Plain
        );
        assert_eq!(CodeChallengeMethod::S256.to_string(), "S256");
        assert_eq!(CodeChallengeMethod::default(), CodeChallengeMethod::Plain);
    }
}

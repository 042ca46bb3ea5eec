//! Bearer tokens: base64url JSON claims + HMAC-SHA256 signature.
//!
//! Claims carry `email` and `role` as two explicit fields rather than a
//! delimited string, so issuance and every consumer share one parser.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::AuthError;
use crate::models::Role;

type HmacSha256 = Hmac<Sha256>;

/// Verified token contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub role: Role,
}

/// Signs and verifies bearer tokens with a process-wide secret.
pub struct TokenSigner {
    secret: [u8; 32],
}

impl TokenSigner {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Issue a token for the given identity: `b64(claims).b64(mac)`.
    pub fn issue(&self, email: &str, role: Role) -> String {
        let claims = Claims {
            email: email.to_string(),
            role,
        };
        // Claims serialization cannot fail: plain strings and a unit enum.
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let tag = self.sign(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(tag),
        )
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (payload, tag) = token.split_once('.').ok_or(AuthError::MalformedToken)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::MalformedToken)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| AuthError::MalformedToken)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| AuthError::BadSignature)?;
        mac.update(&payload);
        // verify_slice is constant-time.
        mac.verify_slice(&tag).map_err(|_| AuthError::BadSignature)?;

        serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedToken)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new([7u8; 32])
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let token = signer().issue("a@x.com", Role::Patient);
        let claims = signer().verify(&token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Patient);
    }

    #[test]
    fn role_is_a_structured_claim() {
        let token = signer().issue("d@y.com", Role::Doctor);
        let payload = token.split('.').next().unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(json["email"], "d@y.com");
        assert_eq!(json["role"], "doctor");
    }

    #[test]
    fn tampered_payload_rejected() {
        let token = signer().issue("a@x.com", Role::Patient);
        let (_, tag) = token.split_once('.').unwrap();
        let forged_claims = serde_json::json!({"email": "a@x.com", "role": "doctor"});
        let forged = format!(
            "{}.{tag}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap()),
        );
        assert!(matches!(signer().verify(&forged), Err(AuthError::BadSignature)));
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let token = TokenSigner::new([1u8; 32]).issue("a@x.com", Role::Patient);
        assert!(signer().verify(&token).is_err());
    }

    #[test]
    fn garbage_tokens_rejected() {
        assert!(matches!(signer().verify(""), Err(AuthError::MalformedToken)));
        assert!(matches!(signer().verify("no-dot"), Err(AuthError::MalformedToken)));
        assert!(signer().verify("!!!.$$$").is_err());
    }
}

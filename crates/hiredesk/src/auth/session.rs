use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::Principal;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside a session token. `exp` is a unix timestamp in
/// seconds; a token is rejected once `now >= exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

/// Error enumeration for session token handling.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token is malformed")]
    Malformed,
    #[error("session token signature mismatch")]
    Signature,
    #[error("session token has expired")]
    Expired,
    #[error("could not encode session claims: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("session secret was rejected by the mac")]
    Key,
}

/// Issues and verifies `claims.tag` session tokens, both halves url-safe
/// base64 without padding and the tag an HMAC-SHA256 over the encoded
/// claims. The signing secret stays on the server; tokens carry no secret
/// material.
pub struct SessionSigner {
    secret: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| SessionError::Key)
    }

    pub fn issue(
        &self,
        principal: &Principal,
        expires_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let claims = SessionClaims {
            sub: principal.id.clone(),
            name: principal.name.clone(),
            email: principal.email.clone(),
            role: principal.role.label().to_string(),
            exp: expires_at.timestamp(),
        };
        let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{encoded}.{tag}"))
    }

    /// Check the signature before reading anything out of the token. Claims
    /// are only parsed once the tag has verified.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let (encoded, tag) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag.as_bytes())
            .map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&tag).map_err(|_| SessionError::Signature)?;

        let claims_json = URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .map_err(|_| SessionError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&claims_json).map_err(|_| SessionError::Malformed)?;
        if now.timestamp() >= claims.exp {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::super::Role;
    use super::*;

    fn principal() -> Principal {
        Principal {
            id: "usr-0001".to_string(),
            name: "Morgan Reyes".to_string(),
            email: "morgan.reyes@example.com".to_string(),
            role: Role::Admin,
        }
    }

    fn signer() -> SessionSigner {
        SessionSigner::new("a-local-test-secret")
    }

    #[test]
    fn issued_token_verifies_and_carries_the_principal() {
        let now = Utc::now();
        let token = signer()
            .issue(&principal(), now + Duration::minutes(30))
            .unwrap();

        let claims = signer().verify(&token, now).unwrap();
        assert_eq!(claims.sub, "usr-0001");
        assert_eq!(claims.email, "morgan.reyes@example.com");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn tampered_claims_fail_the_signature_check() {
        let now = Utc::now();
        let token = signer()
            .issue(&principal(), now + Duration::minutes(30))
            .unwrap();
        let (_, tag) = token.split_once('.').unwrap();

        let forged_claims = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "sub": "usr-0001",
                "name": "Morgan Reyes",
                "email": "morgan.reyes@example.com",
                "role": "admin",
                "exp": (now + Duration::days(365)).timestamp(),
            })
            .to_string(),
        );
        let forged = format!("{forged_claims}.{tag}");

        let error = signer().verify(&forged, now).unwrap_err();
        assert!(matches!(error, SessionError::Signature));
    }

    #[test]
    fn a_different_secret_rejects_the_token() {
        let now = Utc::now();
        let token = signer()
            .issue(&principal(), now + Duration::minutes(30))
            .unwrap();

        let other = SessionSigner::new("another-secret");
        let error = other.verify(&token, now).unwrap_err();
        assert!(matches!(error, SessionError::Signature));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let now = Utc::now();
        let token = signer().issue(&principal(), now).unwrap();

        let error = signer().verify(&token, now).unwrap_err();
        assert!(matches!(error, SessionError::Expired));
    }

    #[test]
    fn tokens_without_a_separator_are_malformed() {
        let error = signer().verify("not-a-token", Utc::now()).unwrap_err();
        assert!(matches!(error, SessionError::Malformed));
    }
}

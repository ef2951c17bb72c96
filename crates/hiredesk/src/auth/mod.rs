//! Admin authentication for the review console.
//!
//! Credentials are checked against an [`IdentityProvider`]; a successful
//! login yields a signed session token ([`session::SessionSigner`]) that the
//! console endpoints verify on every request.

pub mod router;
pub mod session;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use router::auth_router;
pub use session::{SessionClaims, SessionError, SessionSigner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// Unknown labels read as `Member`, never as an escalation.
    pub fn from_label(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            _ => Role::Member,
        }
    }
}

/// An authenticated account as the directory reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Directory seam the console authenticates against.
pub trait IdentityProvider: Send + Sync {
    /// Check a credential pair. `Ok(None)` means the directory answered and
    /// rejected it.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Principal>, IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("access denied")]
    Denied,
    #[error(transparent)]
    Directory(#[from] IdentityError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// A freshly issued console session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

/// Issues console sessions and checks tokens presented by console requests.
pub struct AuthService<I> {
    directory: Arc<I>,
    signer: SessionSigner,
    session_ttl: Duration,
}

impl<I> AuthService<I>
where
    I: IdentityProvider,
{
    pub fn new(directory: Arc<I>, signer: SessionSigner, session_ttl: Duration) -> Self {
        Self {
            directory,
            signer,
            session_ttl,
        }
    }

    /// Authenticate and issue a session. Bad credentials and a non-admin
    /// account produce the same `Denied`, so the response does not reveal
    /// which check failed.
    pub fn login(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        let principal = self
            .directory
            .authenticate(email, password)?
            .ok_or(AuthError::Denied)?;
        if principal.role != Role::Admin {
            return Err(AuthError::Denied);
        }

        let expires_at = Utc::now() + self.session_ttl;
        let token = self.signer.issue(&principal, expires_at)?;
        info!(email = %principal.email, "admin session issued");
        Ok(AdminSession {
            token,
            principal,
            expires_at,
        })
    }

    /// Verify a bearer token and require the admin role. Every verification
    /// failure collapses to `Denied`.
    pub fn authorize(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .signer
            .verify(token, Utc::now())
            .map_err(|_| AuthError::Denied)?;
        let role = Role::from_label(&claims.role);
        if role != Role::Admin {
            return Err(AuthError::Denied);
        }
        Ok(Principal {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SingleAccountDirectory {
        principal: Principal,
        password: String,
    }

    impl IdentityProvider for SingleAccountDirectory {
        fn authenticate(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Option<Principal>, IdentityError> {
            if email == self.principal.email && password == self.password {
                Ok(Some(self.principal.clone()))
            } else {
                Ok(None)
            }
        }
    }

    fn service(role: Role) -> AuthService<SingleAccountDirectory> {
        let directory = SingleAccountDirectory {
            principal: Principal {
                id: "usr-0001".to_string(),
                name: "Morgan Reyes".to_string(),
                email: "morgan.reyes@example.com".to_string(),
                role,
            },
            password: "correct-horse".to_string(),
        };
        AuthService::new(
            Arc::new(directory),
            SessionSigner::new("a-local-test-secret"),
            Duration::minutes(30),
        )
    }

    #[test]
    fn login_issues_a_token_the_service_accepts() {
        let auth = service(Role::Admin);
        let session = auth
            .login("morgan.reyes@example.com", "correct-horse")
            .unwrap();

        let principal = auth.authorize(&session.token).unwrap();
        assert_eq!(principal.email, "morgan.reyes@example.com");
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn wrong_password_and_member_account_are_indistinguishable() {
        let wrong_password = service(Role::Admin)
            .login("morgan.reyes@example.com", "guess")
            .unwrap_err();
        let member_account = service(Role::Member)
            .login("morgan.reyes@example.com", "correct-horse")
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), member_account.to_string());
        assert!(matches!(wrong_password, AuthError::Denied));
        assert!(matches!(member_account, AuthError::Denied));
    }

    #[test]
    fn member_tokens_do_not_authorize() {
        let auth = service(Role::Admin);
        let member = Principal {
            id: "usr-0002".to_string(),
            name: "Jamie Cole".to_string(),
            email: "jamie.cole@example.com".to_string(),
            role: Role::Member,
        };
        let token = SessionSigner::new("a-local-test-secret")
            .issue(&member, Utc::now() + Duration::minutes(30))
            .unwrap();

        let error = auth.authorize(&token).unwrap_err();
        assert!(matches!(error, AuthError::Denied));
    }
}

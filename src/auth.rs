use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::errors::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }

    pub fn basic_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.email.trim(), self.password));
        format!("Basic {token}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Signed-in user plus the `Authorization` value echoed on mutating requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: UserRecord,
    auth_header: String,
}

impl Session {
    pub fn new(user: UserRecord, auth_header: String) -> Self {
        Self { user, auth_header }
    }

    // Offline mode has nobody to ask, so the local user administers its own cache.
    pub fn offline(credentials: &Credentials) -> Self {
        Self {
            user: UserRecord {
                email: credentials.email.trim().to_string(),
                is_admin: true,
            },
            auth_header: credentials.basic_header(),
        }
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }

    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }
}

/// Client-side guard run before any mutating request is fired.
pub fn require_admin(session: Option<&Session>) -> Result<&Session, StoreError> {
    let session = session.ok_or(StoreError::Unauthorized)?;
    if session.auth_header().trim().is_empty() {
        return Err(StoreError::Unauthorized);
    }
    if !session.is_admin() {
        return Err(StoreError::Forbidden);
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_encodes_email_and_password() {
        let creds = Credentials::new("admin@lafe.edu", "secret");
        assert_eq!(creds.basic_header(), "Basic YWRtaW5AbGFmZS5lZHU6c2VjcmV0");
    }

    #[test]
    fn guard_rejects_missing_and_non_admin_sessions() {
        assert!(matches!(require_admin(None), Err(StoreError::Unauthorized)));

        let viewer = Session::new(
            UserRecord {
                email: "fan@lafe.edu".to_string(),
                is_admin: false,
            },
            "Basic Zm9vOmJhcg==".to_string(),
        );
        assert!(matches!(
            require_admin(Some(&viewer)),
            Err(StoreError::Forbidden)
        ));

        let blank = Session::new(
            UserRecord {
                email: "admin@lafe.edu".to_string(),
                is_admin: true,
            },
            String::new(),
        );
        assert!(matches!(
            require_admin(Some(&blank)),
            Err(StoreError::Unauthorized)
        ));
    }
}

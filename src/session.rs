use crate::error::AppError;
use crate::model::{Role, User};
use actix_identity::Identity;
use serde::{Deserialize, Serialize};

/// Authenticated identity carried in the signed session cookie.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

pub fn sign_in(id: &Identity, user_id: u64, user: &User) {
    let session = SessionUser {
        user_id,
        username: user.username.clone(),
        role: user.role,
    };
    id.remember(serde_json::to_string(&session).unwrap());
}

pub fn sign_out(id: &Identity) {
    id.forget();
}

/// The current session, if the cookie is present and decodes.
pub fn current_user(id: &Identity) -> Option<SessionUser> {
    id.identity()
        .and_then(|raw| serde_json::from_str(&raw).ok())
}

pub fn require_authenticated(id: &Identity) -> Result<SessionUser, AppError> {
    current_user(id).ok_or(AppError::Unauthorized)
}

pub fn require_role(id: &Identity, role: Role) -> Result<SessionUser, AppError> {
    let user = require_authenticated(id)?;
    if user.role != role {
        return Err(AppError::Unauthorized);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips_through_json() {
        let session = SessionUser {
            user_id: 7,
            username: "Admin".to_owned(),
            role: Role::Admin,
        };
        let raw = serde_json::to_string(&session).unwrap();
        let back: SessionUser = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}

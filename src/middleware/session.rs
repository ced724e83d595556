//! Session-backed authentication context.
//!
//! The session cookie is an opaque token into the process-local session
//! store; the session itself carries only the username and role, never the
//! stored credential record.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::Role;

pub const SESSION_USERNAME_KEY: &str = "username";
pub const SESSION_ROLE_KEY: &str = "role";

/// Authenticated caller extracted from the session. Missing or anonymous
/// sessions are rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// 403 unless the caller holds one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Role '{}' may not perform this operation",
                self.role.as_str()
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| {
                AppError::InternalError(anyhow::anyhow!("Failed to extract session: {}", message))
            })?;

        let username: Option<String> = session.get(SESSION_USERNAME_KEY).await.unwrap_or(None);
        let role: Option<Role> = session.get(SESSION_ROLE_KEY).await.unwrap_or(None);

        match (username, role) {
            (Some(username), Some(role)) => Ok(CurrentUser { username, role }),
            _ => Err(AppError::Unauthorized(anyhow::anyhow!("Unauthorized"))),
        }
    }
}

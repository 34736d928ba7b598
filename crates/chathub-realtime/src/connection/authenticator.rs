//! WebSocket authentication: validates the JWT passed in the upgrade query.

use std::sync::Arc;

use tracing::debug;

use chathub_core::error::AppError;
use chathub_core::traits::TokenValidator;
use chathub_core::types::UserId;

/// Authenticates WebSocket upgrade attempts.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// Token validator.
    validator: Arc<dyn TokenValidator>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    /// Resolves the token to the owning user.
    ///
    /// Runs before any registry mutation. The client only ever sees one of
    /// two messages; the validator's detail is logged.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<UserId, AppError> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AppError::authentication("JWT token is missing")),
        };

        self.validator.validate_token(token).await.map_err(|e| {
            debug!(error = %e, "WebSocket token rejected");
            AppError::authentication("Invalid JWT token")
        })
    }
}

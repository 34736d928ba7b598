//! Bearer credential validation.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserId;

/// Validates the credential presented when a connection is opened.
///
/// Implementations must be free of side effects. Any failure (absent,
/// malformed, bad signature, expired) is an `Authentication` error.
#[async_trait]
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the user id it was issued to.
    async fn validate_token(&self, token: &str) -> AppResult<UserId>;
}

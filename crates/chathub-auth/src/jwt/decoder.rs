//! JWT token validation, the connection-time auth gate.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use chathub_core::config::AuthConfig;
use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::traits::TokenValidator;
use chathub_core::types::UserId;

use super::claims::Claims;

/// Validates HS256 access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks:
    /// 1. Presence
    /// 2. Format and signature
    /// 3. Expiration
    /// 4. A usable `user_id` claim
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::authentication("JWT token is missing"));
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!(error = %e, "Token validation failed");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::Base64(_)
                    | jsonwebtoken::errors::ErrorKind::Json(_)
                    | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                        AppError::authentication("Invalid token format")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        if token_data.claims.user_id <= 0 {
            return Err(AppError::authentication("Token carries no user"));
        }

        Ok(token_data.claims)
    }
}

#[async_trait]
impl TokenValidator for JwtDecoder {
    async fn validate_token(&self, token: &str) -> AppResult<UserId> {
        self.decode_access_token(token).map(|claims| claims.user_id())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use chathub_core::error::ErrorKind;

    use super::*;
    use crate::jwt::encoder::JwtEncoder;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            jwt_ttl_hours: 24,
            leeway_seconds: 0,
        }
    }

    #[tokio::test]
    async fn test_valid_token_yields_user_id() {
        let cfg = config("secret");
        let token = JwtEncoder::new(&cfg).generate_token(UserId(7)).unwrap();
        let user_id = JwtDecoder::new(&cfg).validate_token(&token).await.unwrap();
        assert_eq!(user_id, UserId(7));
    }

    #[test]
    fn test_missing_token_rejected() {
        let err = JwtDecoder::new(&config("secret"))
            .decode_access_token("")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "JWT token is missing");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = JwtDecoder::new(&config("secret"))
            .decode_access_token("not-a-jwt")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtEncoder::new(&config("one"))
            .generate_token(UserId(1))
            .unwrap();
        let err = JwtDecoder::new(&config("two"))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Invalid token signature");
    }

    #[test]
    fn test_expired_token_rejected() {
        let cfg = config("secret");
        let past = Utc::now().timestamp() - 3600;
        let token = JwtEncoder::new(&cfg)
            .encode_claims(&Claims {
                user_id: 3,
                exp: past,
                iat: past - 60,
            })
            .unwrap();
        let err = JwtDecoder::new(&cfg).decode_access_token(&token).unwrap_err();
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_zero_user_rejected() {
        let cfg = config("secret");
        let token = JwtEncoder::new(&cfg)
            .encode_claims(&Claims {
                user_id: 0,
                exp: Utc::now().timestamp() + 600,
                iat: Utc::now().timestamp(),
            })
            .unwrap();
        assert!(JwtDecoder::new(&cfg).decode_access_token(&token).is_err());
    }
}

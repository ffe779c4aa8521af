use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorMessage, HttpError},
    models::{UserRole, UserType},
};

/// Claims carried by both the access and the refresh token: the caller's
/// identity plus the tier/role the guards check against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
    pub uid: String,
    #[serde(rename = "userType")]
    pub user_type: UserType,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    email: &str,
    uid: &str,
    user_type: UserType,
    role: UserRole,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::seconds(expires_in_seconds)).timestamp() as usize;
    let claims = TokenClaims {
        email: email.to_string(),
        uid: uid.to_string(),
        user_type,
        role,
        iat,
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Decode and verify a token (signature + expiry). A bad or expired token
/// is a 403, matching the verification gate's contract.
pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<TokenClaims, HttpError> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    );

    match decoded {
        Ok(token) => Ok(token.claims),
        Err(_) => Err(HttpError::forbidden(ErrorMessage::InvalidToken.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn token_round_trips_the_full_claim_set() {
        let token = create_token(
            "amina@example.com",
            "uid-42",
            UserType::Premium,
            UserRole::Admin,
            SECRET,
            900,
        )
        .unwrap();

        let claims = decode_token(token, SECRET).unwrap();
        assert_eq!(claims.email, "amina@example.com");
        assert_eq!(claims.uid, "uid-42");
        assert_eq!(claims.user_type, UserType::Premium);
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn wrong_secret_is_rejected_with_403() {
        let token = create_token(
            "amina@example.com",
            "uid-42",
            UserType::Basic,
            UserRole::User,
            SECRET,
            900,
        )
        .unwrap();

        let err = decode_token(token, b"other-secret").unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.message, ErrorMessage::InvalidToken.to_string());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s validation leeway.
        let token = create_token(
            "amina@example.com",
            "uid-42",
            UserType::Basic,
            UserRole::User,
            SECRET,
            -120,
        )
        .unwrap();

        assert!(decode_token(token, SECRET).is_err());
    }
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};

use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    error::{ErrorMessage, HttpError},
    models::UserRole,
    utils::token::{self, TokenClaims},
};

/// Authenticated caller, inserted into request extensions by [`auth`].
///
/// The claims are taken from the verified access token and trusted directly;
/// protected handlers extract this instead of re-reading cookies.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: TokenClaims,
}

/// Authentication middleware: verifies the `accessToken` cookie.
///
/// # Errors
/// - 401 when no cookie is present
/// - 403 when the token is invalid or expired
pub async fn auth(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = cookie_jar
        .get("accessToken")
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let claims = token::decode_token(token, app_state.env.access_token_secret.as_bytes())?;

    req.extensions_mut().insert(AuthUser { claims });

    Ok(next.run(req).await)
}

/// Decode the access cookie without failing the request. Public routes that
/// reveal more to entitled callers use this instead of the [`auth`] gate.
pub fn optional_claims(cookie_jar: &CookieJar, secret: &[u8]) -> Option<TokenClaims> {
    let token = cookie_jar.get("accessToken")?.value().to_string();
    token::decode_token(token, secret).ok()
}

/// Role gate applied after [`auth`]; rejects callers whose role is not in
/// `required_roles` with 403.
pub async fn role_check(
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserContextMissing.to_string()))?;

    if !required_roles.contains(&user.claims.role) {
        return Err(HttpError::forbidden(ErrorMessage::Forbidden.to_string()));
    }

    Ok(next.run(req).await)
}

/// Owner-or-admin predicate guarding owner-scoped resources.
pub fn ensure_owner_or_admin(auth: &AuthUser, uid: &str) -> Result<(), HttpError> {
    if auth.claims.role == UserRole::Admin {
        return Ok(());
    }
    if !auth.claims.uid.is_empty() && auth.claims.uid == uid {
        return Ok(());
    }
    Err(HttpError::forbidden(ErrorMessage::Forbidden.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;
    use axum::http::StatusCode;

    fn auth_user(uid: &str, role: UserRole) -> AuthUser {
        AuthUser {
            claims: TokenClaims {
                email: "caller@example.com".to_string(),
                uid: uid.to_string(),
                user_type: UserType::Basic,
                role,
                iat: 0,
                exp: 0,
            },
        }
    }

    #[test]
    fn owner_passes_the_guard() {
        let caller = auth_user("uid-1", UserRole::User);
        assert!(ensure_owner_or_admin(&caller, "uid-1").is_ok());
    }

    #[test]
    fn admin_passes_for_any_owner() {
        let caller = auth_user("uid-1", UserRole::Admin);
        assert!(ensure_owner_or_admin(&caller, "uid-2").is_ok());
    }

    #[test]
    fn foreign_caller_gets_403() {
        let caller = auth_user("uid-1", UserRole::User);
        let err = ensure_owner_or_admin(&caller, "uid-2").unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn empty_uid_never_matches() {
        let caller = auth_user("", UserRole::User);
        assert!(ensure_owner_or_admin(&caller, "").is_err());
    }
}

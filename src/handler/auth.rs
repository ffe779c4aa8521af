use crate::{
    AppState,
    db::UserExt,
    dtos::{IssueTokenDto, SuccessDto},
    error::{ErrorMessage, HttpError},
    models::{UserRole, UserType},
    utils::token,
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;
use validator::Validate;

/// Router for the cookie-issuing endpoints.
pub fn auth_handler() -> Router<AppState> {
    Router::new()
        .route("/jwt", post(issue_tokens))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// The access cookie stays same-site; the refresh cookie is the one the
/// client apps send cross-site in production.
fn auth_cookie(name: &'static str, value: String, production: bool, cross_site: bool) -> Cookie<'static> {
    let same_site = if cross_site && production {
        SameSite::None
    } else {
        SameSite::Strict
    };

    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(same_site)
        .build()
}

fn expired_cookie(name: &'static str, production: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}

fn set_cookie_headers(cookies: &[Cookie<'static>]) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        let value = cookie.to_string().parse().map_err(|_| {
            tracing::error!("Failed to encode Set-Cookie header");
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
        headers.append(header::SET_COOKIE, value);
    }
    Ok(headers)
}

/// Issue the access/refresh cookie pair for a known email.
///
/// Claims fall back to an empty uid and the basic tier when no account
/// exists yet; registration fills them in on the next sign-in.
#[instrument(skip(app_state, body), fields(email = %body.email))]
pub async fn issue_tokens(
    State(app_state): State<AppState>,
    Json(body): Json<IssueTokenDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid jwt input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let user = app_state
        .db_client
        .get_user_by_email(&body.email)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user by email: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let (uid, user_type, role) = match &user {
        Some(user) => (user.uid.clone(), user.user_type, user.role),
        None => (String::new(), UserType::Basic, UserRole::User),
    };

    let access_token = token::create_token(
        &body.email,
        &uid,
        user_type,
        role,
        app_state.env.access_token_secret.as_bytes(),
        app_state.env.access_token_maxage,
    )
    .map_err(|e| {
        tracing::error!("Access token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let refresh_token = token::create_token(
        &body.email,
        &uid,
        user_type,
        role,
        app_state.env.refresh_token_secret.as_bytes(),
        app_state.env.refresh_token_maxage,
    )
    .map_err(|e| {
        tracing::error!("Refresh token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let production = app_state.env.production;
    let headers = set_cookie_headers(&[
        auth_cookie("accessToken", access_token, production, false),
        auth_cookie("refreshToken", refresh_token, production, true),
    ])?;

    let mut response = Json(SuccessDto { success: true }).into_response();
    response.headers_mut().extend(headers);
    tracing::info!("Tokens issued");
    Ok(response)
}

/// Exchange a valid refresh cookie for a fresh access cookie.
#[instrument(skip(app_state, cookie_jar))]
pub async fn refresh(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let refresh_token = cookie_jar
        .get("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| {
            tracing::error!("Refresh token not provided");
            HttpError::unauthorized(ErrorMessage::RefreshTokenNotProvided.to_string())
        })?;

    let claims = token::decode_token(
        refresh_token,
        app_state.env.refresh_token_secret.as_bytes(),
    )
    .map_err(|_| {
        tracing::error!("Invalid refresh token");
        HttpError::forbidden(ErrorMessage::InvalidRefreshToken.to_string())
    })?;

    let access_token = token::create_token(
        &claims.email,
        &claims.uid,
        claims.user_type,
        claims.role,
        app_state.env.access_token_secret.as_bytes(),
        app_state.env.access_token_maxage,
    )
    .map_err(|e| {
        tracing::error!("Access token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let headers = set_cookie_headers(&[auth_cookie(
        "accessToken",
        access_token,
        app_state.env.production,
        false,
    )])?;

    let mut response = Json(SuccessDto { success: true }).into_response();
    response.headers_mut().extend(headers);
    tracing::info!("Access token refreshed");
    Ok(response)
}

/// Clear both cookies.
#[instrument(skip(app_state))]
pub async fn logout(State(app_state): State<AppState>) -> Result<impl IntoResponse, HttpError> {
    let production = app_state.env.production;
    let headers = set_cookie_headers(&[
        expired_cookie("accessToken", production),
        expired_cookie("refreshToken", production),
    ])?;

    let mut response = Json(SuccessDto { success: true }).into_response();
    response.headers_mut().extend(headers);
    tracing::info!("Logout successful");
    Ok(response)
}

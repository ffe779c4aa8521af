use crate::{
    AppState,
    db::UserExt,
    dtos::{
        PremiumRequestDto, ProfileUpsertDto, RegisterResponse, RegisterUserDto, RegisteredUserDto,
        Response, UserDto, first_validation_message,
    },
    error::{ErrorMessage, HttpError},
    middleware::{AuthUser, auth, ensure_owner_or_admin},
    models::{PremiumRequestOutcome, UserRole, UserType, USER_PREMIUM_FEE, normalize_card_last4},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::instrument;
use validator::Validate;

/// Router for registration, public user lookup and the protected profile
/// and premium routes.
pub fn users_handler(app_state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/users/{uid}", get(get_user));

    let protected = Router::new()
        .route("/users/profile", put(update_profile).post(save_profile))
        .route("/users/premium-request", post(request_user_premium))
        .layer(middleware::from_fn_with_state(app_state, auth));

    public.merge(protected)
}

/// Create an account record for an externally-authenticated identity.
#[instrument(skip(app_state, body), fields(email = %body.email, uid = %body.uid))]
pub async fn register(
    State(app_state): State<AppState>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid register input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    let existing = app_state
        .db_client
        .get_user_by_email(&body.email)
        .await
        .map_err(|e| {
            tracing::error!("DB error, checking existing user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    if existing.is_some() {
        return Err(HttpError::bad_request("User already exists"));
    }

    let role = body.role.unwrap_or(UserRole::User);
    let user_type = body.user_type.unwrap_or(UserType::Basic);

    let user = app_state
        .db_client
        .save_user(&body.email, &body.uid, role, user_type)
        .await
        .map_err(|e| {
            tracing::error!("DB error, saving user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(uid = %user.uid, "Register successful");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user: RegisteredUserDto {
                email: user.email,
                uid: user.uid,
                user_type: user.user_type,
                role: user.role,
            },
        }),
    ))
}

/// Public user lookup, favorites id list included.
#[instrument(skip(app_state))]
pub async fn get_user(
    Path(uid): Path<String>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    if uid.is_empty() {
        return Err(HttpError::bad_request("UID is required"));
    }

    let user = app_state
        .db_client
        .get_user_by_uid(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user by uid: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let favorites = app_state
        .db_client
        .get_favorite_ids(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting favorites: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(UserDto::from_user(&user, favorites)))
}

fn normalized_email(candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .find_map(|c| {
            let trimmed = c.unwrap_or("").trim();
            (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
        })
        .unwrap_or_default()
}

fn required_display_name(value: Option<&str>) -> Result<String, HttpError> {
    let trimmed = value.unwrap_or("").trim();
    if trimmed.is_empty() {
        return Err(HttpError::bad_request("Display name is required"));
    }
    Ok(trimmed.to_string())
}

fn trimmed(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_string()
}

/// Update an existing profile. The body names the target uid; only the
/// owner or an admin may write it.
#[instrument(skip(app_state, auth_user, body), fields(uid = %body.uid))]
pub async fn update_profile(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ProfileUpsertDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid profile input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    if ensure_owner_or_admin(&auth_user, &body.uid).is_err() {
        return Err(HttpError::forbidden("You can only update your own profile"));
    }

    let existing = app_state
        .db_client
        .get_user_by_uid(&body.uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let display_name = required_display_name(body.display_name.as_deref())?;
    let email = normalized_email(&[body.email.as_deref(), Some(&existing.email)]);

    app_state
        .db_client
        .update_profile(
            &body.uid,
            &email,
            &display_name,
            &trimmed(body.photo_url.as_deref()),
            &trimmed(body.phone_number.as_deref()),
            &trimmed(body.address.as_deref()),
            &trimmed(body.bio.as_deref()),
        )
        .await
        .map_err(|e| {
            tracing::error!("DB error, updating profile: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!("Profile updated");
    Ok(Json(Response {
        success: true,
        message: "Profile updated successfully".to_string(),
    }))
}

/// Create-or-update the profile. On first write the account row is created
/// with the role/tier from the token claims.
#[instrument(skip(app_state, auth_user, body), fields(uid = %body.uid))]
pub async fn save_profile(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ProfileUpsertDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid profile input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    if ensure_owner_or_admin(&auth_user, &body.uid).is_err() {
        return Err(HttpError::forbidden("You can only update your own profile"));
    }

    let display_name = required_display_name(body.display_name.as_deref())?;

    let existing = app_state
        .db_client
        .get_user_by_uid(&body.uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let email = normalized_email(&[
        body.email.as_deref(),
        existing.as_ref().map(|u| u.email.as_str()),
        Some(&auth_user.claims.email),
    ]);

    let photo_url = trimmed(body.photo_url.as_deref());
    let phone_number = trimmed(body.phone_number.as_deref());
    let address = trimmed(body.address.as_deref());
    let bio = trimmed(body.bio.as_deref());

    let (status, message) = match existing {
        Some(_) => {
            app_state
                .db_client
                .update_profile(
                    &body.uid,
                    &email,
                    &display_name,
                    &photo_url,
                    &phone_number,
                    &address,
                    &bio,
                )
                .await
                .map_err(|e| {
                    tracing::error!("DB error, updating profile: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?;
            (StatusCode::OK, "Profile saved successfully")
        }
        None => {
            app_state
                .db_client
                .insert_profile(
                    &body.uid,
                    &email,
                    &display_name,
                    &photo_url,
                    &phone_number,
                    &address,
                    &bio,
                    UserRole::User,
                    auth_user.claims.user_type,
                )
                .await
                .map_err(|e| {
                    tracing::error!("DB error, creating profile: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?;
            (StatusCode::CREATED, "Profile created successfully")
        }
    };

    tracing::info!("Profile saved");
    Ok((
        status,
        Json(Response {
            success: true,
            message: message.to_string(),
        }),
    ))
}

/// Move the caller's account into the premium-pending state against the
/// fixed upgrade fee. Requesting again while pending or approved succeeds
/// without writing a second payment.
#[instrument(skip(app_state, auth_user, body), fields(uid = %auth_user.claims.uid))]
pub async fn request_user_premium(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<PremiumRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    let uid = auth_user.claims.uid.clone();
    if uid.is_empty() {
        return Err(HttpError::forbidden(
            ErrorMessage::UserContextMissing.to_string(),
        ));
    }

    let user = app_state
        .db_client
        .get_user_by_uid(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let message = match user.premium_user_status.request_outcome() {
        PremiumRequestOutcome::AlreadyApproved => "You are already a premium user",
        PremiumRequestOutcome::AlreadyPending => "Premium request already pending review",
        PremiumRequestOutcome::Accepted => {
            if body.amount != USER_PREMIUM_FEE {
                return Err(HttpError::bad_request(
                    "amount must equal the premium upgrade fee",
                ));
            }
            let card_last4 = normalize_card_last4(&body.card_last4).ok_or_else(|| {
                HttpError::bad_request("cardLast4 must contain the last four digits of the card")
            })?;
            let currency = body.currency.as_deref().unwrap_or("USD");

            app_state
                .db_client
                .request_user_premium(&uid, body.amount, currency, &card_last4)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, requesting user premium: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?;
            "Premium request submitted for review"
        }
    };

    tracing::info!("User premium request handled");
    Ok(Json(Response {
        success: true,
        message: message.to_string(),
    }))
}

use crate::{
    AppState,
    db::{BiodataExt, UserExt},
    dtos::{FavoriteDto, Response, first_validation_message},
    error::HttpError,
    middleware::{AuthUser, auth, ensure_owner_or_admin},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::instrument;
use validator::Validate;

/// Router for the favorites set; everything here requires the caller's
/// own credentials.
pub fn favorites_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/favorites", post(add_favorite).delete(remove_favorite))
        .route("/favorites/{uid}", get(get_favorites))
        .layer(middleware::from_fn_with_state(app_state, auth))
}

fn ensure_self(auth_user: &AuthUser, uid: &str) -> Result<(), HttpError> {
    if auth_user.claims.uid.is_empty() || auth_user.claims.uid != uid {
        return Err(HttpError::forbidden(
            "You can only modify your own favorites",
        ));
    }
    Ok(())
}

/// Add a biodata to the caller's favorites set. Adding twice is a no-op.
#[instrument(skip(app_state, auth_user, body), fields(uid = %body.uid, biodata_id = %body.biodata_id))]
pub async fn add_favorite(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<FavoriteDto>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_self(&auth_user, &body.uid)?;

    body.validate().map_err(|e| {
        tracing::error!("Invalid favorite input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    let user = app_state
        .db_client
        .get_user_by_uid(&body.uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error("Failed to add favorite")
        })?;
    if user.is_none() {
        return Err(HttpError::not_found("User not found"));
    }

    let biodata = app_state
        .db_client
        .get_biodata_by_public_id(&body.biodata_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting biodata: {}", e);
            HttpError::server_error("Failed to add favorite")
        })?;
    if biodata.is_none() {
        return Err(HttpError::not_found("Biodata not found"));
    }

    let inserted = app_state
        .db_client
        .add_favorite(&body.uid, &body.biodata_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, adding favorite: {}", e);
            HttpError::server_error("Failed to add favorite")
        })?;

    let message = if inserted {
        "Biodata added to favorites"
    } else {
        "Biodata already present in favorites"
    };

    tracing::info!("Favorite add handled");
    Ok(Json(Response {
        success: true,
        message: message.to_string(),
    }))
}

/// Card projection of the caller's favorite biodata.
#[instrument(skip(app_state, auth_user))]
pub async fn get_favorites(
    Path(uid): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_owner_or_admin(&auth_user, &uid)?;

    let user = app_state
        .db_client
        .get_user_by_uid(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error("Failed to fetch favorites")
        })?;
    if user.is_none() {
        return Err(HttpError::not_found("User not found"));
    }

    let favorite_ids = app_state
        .db_client
        .get_favorite_ids(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting favorite ids: {}", e);
            HttpError::server_error("Failed to fetch favorites")
        })?;

    if favorite_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let favorites = app_state
        .db_client
        .get_favorite_biodata(&favorite_ids)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting favorite biodata: {}", e);
            HttpError::server_error("Failed to fetch favorites")
        })?;

    Ok(Json(favorites))
}

/// Remove a biodata from the caller's favorites set.
#[instrument(skip(app_state, auth_user, body), fields(uid = %body.uid, biodata_id = %body.biodata_id))]
pub async fn remove_favorite(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<FavoriteDto>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_self(&auth_user, &body.uid)?;

    body.validate().map_err(|e| {
        tracing::error!("Invalid favorite input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    let user = app_state
        .db_client
        .get_user_by_uid(&body.uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error("Failed to remove favorite")
        })?;
    if user.is_none() {
        return Err(HttpError::not_found("User not found"));
    }

    let removed = app_state
        .db_client
        .remove_favorite(&body.uid, &body.biodata_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, removing favorite: {}", e);
            HttpError::server_error("Failed to remove favorite")
        })?;

    let message = if removed {
        "Biodata removed from favorites"
    } else {
        "Biodata was not in favorites"
    };

    tracing::info!("Favorite remove handled");
    Ok(Json(Response {
        success: true,
        message: message.to_string(),
    }))
}

use crate::{
    AppState,
    db::{BiodataExt, BiodataFilter, ContactRequestExt},
    dtos::{
        BiodataDto, BiodataInputDto, BiodataListQuery, BiodataSaveResponse, PagedResponse,
        PremiumBiodataQuery, PremiumRequestDto, Response, first_validation_message,
    },
    error::{ErrorMessage, HttpError},
    middleware::{AuthUser, auth, ensure_owner_or_admin, optional_claims},
    models::{BIODATA_PREMIUM_FEE, PremiumRequestOutcome, UserRole, UserType, normalize_card_last4},
    utils::pagination::{clamp_page_params, paginate},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;
use validator::Validate;

/// Router for the public biodata browse routes and the protected
/// owner/premium routes.
pub fn biodata_handler(app_state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/biodata", get(list_biodata))
        .route("/biodata/premium", get(list_premium_biodata))
        .route("/biodata/{id}", get(get_biodata));

    let protected = Router::new()
        .route("/biodata", post(save_biodata))
        .route("/biodata/user/{uid}", get(get_own_biodata))
        .route("/biodata/{id}/premium-request", post(request_biodata_premium))
        .layer(middleware::from_fn_with_state(app_state, auth));

    public.merge(protected)
}

/// An "all" selector means no filter; everything else matches the whole
/// string case-insensitively.
fn selector(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v.to_lowercase() != "all")
}

/// Public listing with filters and clamped pagination.
#[instrument(skip(app_state))]
pub async fn list_biodata(
    Query(query): Query<BiodataListQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let filter = BiodataFilter {
        biodata_type: selector(query.biodata_type),
        min_age: query.min_age,
        max_age: query.max_age,
        division: selector(query.division),
        search_id: query.search_id.filter(|s| !s.is_empty()),
    };

    let (page, limit) = clamp_page_params(query.page, query.limit);

    let total = app_state
        .db_client
        .count_biodata(&filter)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting biodata: {}", e);
            HttpError::server_error("Failed to fetch biodata")
        })?;

    let (pagination, offset) = paginate(total, page, limit);

    let records = app_state
        .db_client
        .list_biodata(&filter, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing biodata: {}", e);
            HttpError::server_error("Failed to fetch biodata")
        })?;

    Ok(Json(PagedResponse {
        data: BiodataDto::sanitize_all(&records, false),
        pagination,
    }))
}

/// Approved-premium carousel for the landing page.
#[instrument(skip(app_state))]
pub async fn list_premium_biodata(
    Query(query): Query<PremiumBiodataQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let ascending = query
        .sort
        .as_deref()
        .is_some_and(|sort| sort.eq_ignore_ascii_case("asc"));
    let limit = query.limit.unwrap_or(8).clamp(1, 20);

    let records = app_state
        .db_client
        .list_premium_biodata(ascending, limit)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing premium biodata: {}", e);
            HttpError::server_error("Failed to fetch premium biodata")
        })?;

    Ok(Json(BiodataDto::sanitize_all(&records, false)))
}

/// Biodata detail page. Contact fields stay hidden unless the caller is
/// the owner, an admin, a premium user, or holds an approved contact
/// request for this biodata.
#[instrument(skip(app_state, cookie_jar))]
pub async fn get_biodata(
    Path(id): Path<String>,
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let biodata = app_state
        .db_client
        .get_biodata_by_public_id(&id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting biodata by id: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Biodata not found"))?;

    let claims = optional_claims(&cookie_jar, app_state.env.access_token_secret.as_bytes());

    let include_contact = match &claims {
        Some(claims) => {
            if claims.role == UserRole::Admin
                || (!claims.uid.is_empty() && claims.uid == biodata.uid)
                || claims.user_type == UserType::Premium
            {
                true
            } else if claims.uid.is_empty() {
                false
            } else {
                app_state
                    .db_client
                    .has_approved_request(&claims.uid, &biodata.biodata_id)
                    .await
                    .map_err(|e| {
                        tracing::error!("DB error, checking approved request: {}", e);
                        HttpError::server_error(ErrorMessage::ServerError.to_string())
                    })?
            }
        }
        None => false,
    };

    Ok(Json(BiodataDto::sanitize(&biodata, include_contact)))
}

/// The caller's own biodata (or any, for admins).
#[instrument(skip(app_state, auth_user))]
pub async fn get_own_biodata(
    Path(uid): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_owner_or_admin(&auth_user, &uid)?;

    let biodata = app_state
        .db_client
        .get_biodata_by_uid(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting biodata by uid: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Biodata not found"))?;

    Ok(Json(BiodataDto::sanitize(&biodata, true)))
}

/// Create-or-update the caller's biodata. The public identifier is
/// assigned once on first creation and survives every later submission,
/// as does the premium state.
#[instrument(skip(app_state, auth_user, body), fields(uid = %auth_user.claims.uid))]
pub async fn save_biodata(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<BiodataInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    let uid = auth_user.claims.uid.clone();
    let email = auth_user.claims.email.to_lowercase();
    if uid.is_empty() || email.is_empty() {
        return Err(HttpError::forbidden(
            ErrorMessage::UserContextMissing.to_string(),
        ));
    }

    body.validate().map_err(|e| {
        tracing::error!("Invalid biodata input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    let existing = app_state
        .db_client
        .get_biodata_by_uid(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting biodata: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    if existing.is_some() {
        let updated = app_state
            .db_client
            .update_biodata(&uid, &email, &body)
            .await
            .map_err(|e| {
                tracing::error!("DB error, updating biodata: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?
            .ok_or_else(|| {
                tracing::error!("Biodata disappeared during update");
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?;

        tracing::info!(biodata_id = %updated.biodata_id, "Biodata updated");
        return Ok((
            StatusCode::OK,
            Json(BiodataSaveResponse {
                success: true,
                message: "Biodata updated successfully".to_string(),
                biodata: BiodataDto::sanitize(&updated, true),
            }),
        ));
    }

    let created = app_state
        .db_client
        .insert_biodata(&uid, &email, &body)
        .await
        .map_err(|e| {
            tracing::error!("DB error, creating biodata: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(biodata_id = %created.biodata_id, "Biodata created");
    Ok((
        StatusCode::CREATED,
        Json(BiodataSaveResponse {
            success: true,
            message: "Biodata created successfully".to_string(),
            biodata: BiodataDto::sanitize(&created, true),
        }),
    ))
}

/// Enter the biodata premium workflow against the fixed fee. Idempotent
/// once pending or approved.
#[instrument(skip(app_state, auth_user, body))]
pub async fn request_biodata_premium(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<PremiumRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    let biodata = app_state
        .db_client
        .get_biodata_by_public_id(&id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting biodata: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Biodata not found"))?;

    ensure_owner_or_admin(&auth_user, &biodata.uid)?;

    let message = match biodata.premium_status.request_outcome() {
        PremiumRequestOutcome::AlreadyApproved => "This biodata is already premium",
        PremiumRequestOutcome::AlreadyPending => "Premium request already pending review",
        PremiumRequestOutcome::Accepted => {
            if body.amount != BIODATA_PREMIUM_FEE {
                return Err(HttpError::bad_request(
                    "amount must equal the biodata premium fee",
                ));
            }
            let card_last4 = normalize_card_last4(&body.card_last4).ok_or_else(|| {
                HttpError::bad_request("cardLast4 must contain the last four digits of the card")
            })?;
            let currency = body.currency.as_deref().unwrap_or("USD");

            app_state
                .db_client
                .request_biodata_premium(&biodata.biodata_id, body.amount, currency, &card_last4)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, requesting biodata premium: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?;
            "Premium request submitted for review"
        }
    };

    tracing::info!(biodata_id = %biodata.biodata_id, "Biodata premium request handled");
    Ok(Json(Response {
        success: true,
        message: message.to_string(),
    }))
}

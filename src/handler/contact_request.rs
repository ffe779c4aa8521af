use crate::{
    AppState,
    db::{BiodataExt, ContactRequestExt},
    dtos::{
        ContactRequestCreatedResponse, ContactRequestDto, ContactRequestInputDto,
        ContactRequestListQuery, Response, first_validation_message,
    },
    error::{ErrorMessage, HttpError},
    middleware::{AuthUser, auth, ensure_owner_or_admin},
    models::{RequestStatus, UserRole, normalize_card_last4},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, post},
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Router for the paid contact-unlock workflow.
pub fn contact_requests_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/contact-requests", post(create_contact_request).get(list_contact_requests))
        .route("/contact-requests/{id}", delete(delete_contact_request))
        .layer(middleware::from_fn_with_state(app_state, auth))
}

/// Pay to unlock a biodata owner's contact details. At most one active
/// request per (requester, biodata) pair.
#[instrument(skip(app_state, auth_user, body), fields(uid = %auth_user.claims.uid))]
pub async fn create_contact_request(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ContactRequestInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    let uid = auth_user.claims.uid.clone();
    let requester_email = auth_user.claims.email.to_lowercase();
    if uid.is_empty() || requester_email.is_empty() {
        return Err(HttpError::forbidden(
            "User context missing for contact request",
        ));
    }

    body.validate().map_err(|e| {
        tracing::error!("Invalid contact request input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    if !body.amount.is_finite() || body.amount <= 0.0 {
        return Err(HttpError::bad_request("amount must be a positive number"));
    }

    let card_last4 = normalize_card_last4(&body.card_last4).ok_or_else(|| {
        HttpError::bad_request("cardLast4 must contain the last four digits of the card")
    })?;

    let biodata = app_state
        .db_client
        .get_biodata_by_public_id(&body.biodata_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting biodata: {}", e);
            HttpError::server_error("Failed to submit contact request")
        })?
        .ok_or_else(|| HttpError::not_found("Referenced biodata not found"))?;

    let existing = app_state
        .db_client
        .find_active_request(&uid, &body.biodata_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, checking active request: {}", e);
            HttpError::server_error("Failed to submit contact request")
        })?;

    if existing.is_some() {
        return Err(HttpError::conflict(
            "A pending or approved request already exists for this biodata",
        ));
    }

    let created = app_state
        .db_client
        .create_contact_request(
            &body.biodata_id,
            Some(&biodata.name),
            &uid,
            &requester_email,
            body.amount,
            body.currency.as_deref().unwrap_or("USD"),
            body.payment_provider.as_deref().unwrap_or("stripe"),
            body.payment_method.as_deref().unwrap_or("card"),
            &card_last4,
            body.status.unwrap_or(RequestStatus::Pending),
        )
        .await
        .map_err(|e| {
            tracing::error!("DB error, creating contact request: {}", e);
            HttpError::server_error("Failed to submit contact request")
        })?;

    tracing::info!(request_id = %created.id, "Contact request created");
    Ok((
        StatusCode::CREATED,
        Json(ContactRequestCreatedResponse {
            success: true,
            request_id: created.id,
            message: "Contact request submitted successfully".to_string(),
        }),
    ))
}

/// The caller's requests, newest first. Admins may inspect any
/// requester's list via `requesterUid`.
#[instrument(skip(app_state, auth_user))]
pub async fn list_contact_requests(
    Query(query): Query<ContactRequestListQuery>,
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let is_admin = auth_user.claims.role == UserRole::Admin;

    let target_uid = match query.requester_uid {
        Some(requested) if is_admin => requested,
        Some(requested) if requested != auth_user.claims.uid => {
            return Err(HttpError::forbidden(
                "You can only view your own contact requests",
            ));
        }
        _ => auth_user.claims.uid.clone(),
    };

    let records = app_state
        .db_client
        .list_requests_for_uid(&target_uid, query.status)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing contact requests: {}", e);
            HttpError::server_error("Failed to fetch contact requests")
        })?;

    let payload: Vec<ContactRequestDto> =
        records.into_iter().map(ContactRequestDto::redact).collect();

    Ok(Json(payload))
}

/// Withdraw a request; owner or admin only.
#[instrument(skip(app_state, auth_user))]
pub async fn delete_contact_request(
    Path(id): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let request_id =
        Uuid::parse_str(&id).map_err(|_| HttpError::bad_request("Invalid request id"))?;

    let request = app_state
        .db_client
        .get_contact_request(request_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting contact request: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Contact request not found"))?;

    ensure_owner_or_admin(&auth_user, &request.requester_uid)?;

    app_state
        .db_client
        .delete_contact_request(request_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, deleting contact request: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(request_id = %request_id, "Contact request removed");
    Ok(Json(Response {
        success: true,
        message: "Contact request removed".to_string(),
    }))
}

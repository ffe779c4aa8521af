use crate::{
    AppState,
    db::{BiodataExt, ContactRequestExt, MessageExt, ReportingExt, StoryExt, UserExt},
    dtos::{
        AdminContactRequestsQuery, AdminMessagesQuery, AdminOverviewDto, AdminStoriesQuery,
        AdminUsersQuery, BiodataDto, ContactRequestDto, MessageStatusUpdateDto, PagedResponse,
        PageQuery, Response, RevenueDto, StoryStatusUpdateDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::{auth, role_check},
    models::{ApprovalOutcome, UserRole},
    utils::pagination::{clamp_page_params, paginate},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use tracing::instrument;
use uuid::Uuid;

/// Router for the admin dashboard; every route requires the admin role.
pub fn admin_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/overview", get(overview))
        .route("/admin/users", get(list_users))
        .route("/admin/premium-requests", get(list_biodata_premium_requests))
        .route(
            "/admin/biodata/{id}/premium/approve",
            post(approve_biodata_premium),
        )
        .route(
            "/admin/users/premium-requests",
            get(list_user_premium_requests),
        )
        .route("/admin/users/{uid}/premium/approve", post(approve_user_premium))
        .route("/admin/contact-requests", get(list_contact_requests))
        .route(
            "/admin/contact-requests/{id}/approve",
            post(approve_contact_request),
        )
        .route("/admin/success-stories", get(list_stories))
        .route("/admin/success-stories/{id}/status", patch(update_story_status))
        .route("/admin/contact-messages", get(list_messages))
        .route("/admin/contact-messages/{id}/status", patch(update_message_status))
        .layer(middleware::from_fn(|req, next| {
            role_check(req, next, vec![UserRole::Admin])
        }))
        .layer(middleware::from_fn_with_state(app_state, auth))
}

/// Dashboard counters and revenue, aggregated across the collections.
#[instrument(skip(app_state))]
pub async fn overview(State(app_state): State<AppState>) -> Result<impl IntoResponse, HttpError> {
    let biodata = app_state.db_client.biodata_counts().await.map_err(|e| {
        tracing::error!("DB error, biodata counts: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let users = app_state.db_client.user_counts().await.map_err(|e| {
        tracing::error!("DB error, user counts: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let moderation = app_state.db_client.moderation_counts().await.map_err(|e| {
        tracing::error!("DB error, moderation counts: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let revenue = app_state.db_client.revenue_sums().await.map_err(|e| {
        tracing::error!("DB error, revenue sums: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let total = revenue.contact_requests + revenue.biodata_premium + revenue.user_premium;

    Ok(Json(AdminOverviewDto {
        biodata_total: biodata.total,
        biodata_male: biodata.male,
        biodata_female: biodata.female,
        biodata_premium: biodata.premium,
        biodata_premium_pending: biodata.premium_pending,
        users_total: users.total,
        premium_users: users.premium,
        premium_users_pending: users.premium_pending,
        contact_requests_pending: moderation.contact_requests_pending,
        contact_messages_new: moderation.contact_messages_new,
        success_stories_pending: moderation.success_stories_pending,
        revenue: RevenueDto {
            contact_requests: revenue.contact_requests,
            biodata_premium: revenue.biodata_premium,
            user_premium: revenue.user_premium,
            total,
        },
    }))
}

/// Paginated account listing with an email/name search.
#[instrument(skip(app_state))]
pub async fn list_users(
    Query(query): Query<AdminUsersQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (page, limit) = clamp_page_params(query.page, query.limit);
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let total = app_state.db_client.count_users(search).await.map_err(|e| {
        tracing::error!("DB error, counting users: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let (pagination, offset) = paginate(total, page, limit);

    let users = app_state
        .db_client
        .list_users(search, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing users: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(PagedResponse {
        data: users,
        pagination,
    }))
}

/// Pending biodata premium requests awaiting review.
#[instrument(skip(app_state))]
pub async fn list_biodata_premium_requests(
    Query(query): Query<PageQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (page, limit) = clamp_page_params(query.page, query.limit);

    let total = app_state
        .db_client
        .count_biodata_premium_requests()
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting premium requests: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let (pagination, offset) = paginate(total, page, limit);

    let records = app_state
        .db_client
        .list_biodata_premium_requests(limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing premium requests: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(PagedResponse {
        data: BiodataDto::sanitize_all(&records, true),
        pagination,
    }))
}

/// Approve a biodata premium request. Approving twice is an idempotent
/// success; there is no reject transition.
#[instrument(skip(app_state))]
pub async fn approve_biodata_premium(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
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

    let message = match biodata.premium_status.approve_outcome() {
        ApprovalOutcome::Approve => {
            app_state
                .db_client
                .approve_biodata_premium(&biodata.biodata_id)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, approving biodata premium: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?;
            "Biodata premium approved"
        }
        ApprovalOutcome::AlreadyApproved => "already approved",
        ApprovalOutcome::NotPending => {
            return Err(HttpError::bad_request(
                "No pending premium request for this biodata",
            ));
        }
    };

    tracing::info!(biodata_id = %biodata.biodata_id, "Biodata premium approval handled");
    Ok(Json(Response {
        success: true,
        message: message.to_string(),
    }))
}

/// Pending user premium requests awaiting review.
#[instrument(skip(app_state))]
pub async fn list_user_premium_requests(
    Query(query): Query<PageQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (page, limit) = clamp_page_params(query.page, query.limit);

    let total = app_state
        .db_client
        .count_user_premium_requests()
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting user premium requests: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let (pagination, offset) = paginate(total, page, limit);

    let users = app_state
        .db_client
        .list_user_premium_requests(limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing user premium requests: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(PagedResponse {
        data: users,
        pagination,
    }))
}

/// Approve a user premium request; the account tier flips alongside.
#[instrument(skip(app_state))]
pub async fn approve_user_premium(
    Path(uid): Path<String>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user_by_uid(&uid)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let message = match user.premium_user_status.approve_outcome() {
        ApprovalOutcome::Approve => {
            app_state
                .db_client
                .approve_user_premium(&uid)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, approving user premium: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?;
            "User premium approved"
        }
        ApprovalOutcome::AlreadyApproved => "already approved",
        ApprovalOutcome::NotPending => {
            return Err(HttpError::bad_request(
                "No pending premium request for this user",
            ));
        }
    };

    tracing::info!(uid = %uid, "User premium approval handled");
    Ok(Json(Response {
        success: true,
        message: message.to_string(),
    }))
}

/// All contact requests, optionally filtered by status.
#[instrument(skip(app_state))]
pub async fn list_contact_requests(
    Query(query): Query<AdminContactRequestsQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (page, limit) = clamp_page_params(query.page, query.limit);

    let total = app_state
        .db_client
        .count_all_requests(query.status)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting contact requests: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let (pagination, offset) = paginate(total, page, limit);

    let records = app_state
        .db_client
        .list_all_requests(query.status, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing contact requests: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let data: Vec<ContactRequestDto> =
        records.into_iter().map(ContactRequestDto::redact).collect();

    Ok(Json(PagedResponse { data, pagination }))
}

/// One-way approval of a contact request; the second call is an
/// idempotent success and a rejected request stays rejected.
#[instrument(skip(app_state))]
pub async fn approve_contact_request(
    Path(id): Path<String>,
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

    let message = match request.status.approve_outcome() {
        ApprovalOutcome::Approve => {
            app_state
                .db_client
                .approve_contact_request(request_id)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, approving contact request: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?;
            "Contact request approved"
        }
        ApprovalOutcome::AlreadyApproved => "already approved",
        ApprovalOutcome::NotPending => {
            return Err(HttpError::bad_request(
                "Only pending requests can be approved",
            ));
        }
    };

    tracing::info!(request_id = %request_id, "Contact request approval handled");
    Ok(Json(Response {
        success: true,
        message: message.to_string(),
    }))
}

/// All story submissions for moderation.
#[instrument(skip(app_state))]
pub async fn list_stories(
    Query(query): Query<AdminStoriesQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (page, limit) = clamp_page_params(query.page, query.limit);

    let total = app_state
        .db_client
        .count_stories(query.status)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting stories: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let (pagination, offset) = paginate(total, page, limit);

    let stories = app_state
        .db_client
        .list_stories(query.status, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing stories: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(PagedResponse {
        data: stories,
        pagination,
    }))
}

/// Set a story's moderation status; stamps the approval time when
/// approving and keeps the previous note unless a new one is supplied.
#[instrument(skip(app_state, body))]
pub async fn update_story_status(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(body): Json<StoryStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let story_id = Uuid::parse_str(&id).map_err(|_| HttpError::bad_request("Invalid story id"))?;

    let story = app_state
        .db_client
        .update_story_status(story_id, body.status, body.admin_note.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("DB error, updating story status: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Success story not found"))?;

    tracing::info!(story_id = %story_id, "Story status updated");
    Ok(Json(story))
}

/// All contact messages for moderation.
#[instrument(skip(app_state))]
pub async fn list_messages(
    Query(query): Query<AdminMessagesQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (page, limit) = clamp_page_params(query.page, query.limit);

    let total = app_state
        .db_client
        .count_messages(query.status)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting messages: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let (pagination, offset) = paginate(total, page, limit);

    let messages = app_state
        .db_client
        .list_messages(query.status, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing messages: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(PagedResponse {
        data: messages,
        pagination,
    }))
}

/// Set a message's moderation status; stamps the resolution time when
/// resolving.
#[instrument(skip(app_state, body))]
pub async fn update_message_status(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(body): Json<MessageStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let message_id =
        Uuid::parse_str(&id).map_err(|_| HttpError::bad_request("Invalid message id"))?;

    let message = app_state
        .db_client
        .update_message_status(message_id, body.status, body.admin_note.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("DB error, updating message status: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Contact message not found"))?;

    tracing::info!(message_id = %message_id, "Message status updated");
    Ok(Json(message))
}

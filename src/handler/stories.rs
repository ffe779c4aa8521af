use crate::{
    AppState,
    db::StoryExt,
    dtos::{PagedResponse, PageQuery, Response, SuccessStoryInputDto, first_validation_message},
    error::HttpError,
    utils::pagination::{clamp_page_params, paginate},
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::instrument;
use validator::Validate;

/// Router for the public success-story routes; moderation lives under
/// the admin router.
pub fn stories_handler() -> Router<AppState> {
    Router::new().route("/success-stories", post(submit_story).get(list_stories))
}

/// Public story submission; enters moderation as pending.
#[instrument(skip(app_state, body), fields(couple = %body.couple_names))]
pub async fn submit_story(
    State(app_state): State<AppState>,
    Json(body): Json<SuccessStoryInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid story input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    app_state.db_client.create_story(&body).await.map_err(|e| {
        tracing::error!("DB error, creating story: {}", e);
        HttpError::server_error("Failed to submit story")
    })?;

    tracing::info!("Story submitted");
    Ok((
        StatusCode::CREATED,
        Json(Response {
            success: true,
            message: "Story submitted for review".to_string(),
        }),
    ))
}

/// Approved stories for the public site, newest marriage first.
#[instrument(skip(app_state))]
pub async fn list_stories(
    Query(query): Query<PageQuery>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (page, limit) = clamp_page_params(query.page, query.limit);

    let total = app_state.db_client.count_public_stories().await.map_err(|e| {
        tracing::error!("DB error, counting stories: {}", e);
        HttpError::server_error("Failed to fetch stories")
    })?;

    let (pagination, offset) = paginate(total, page, limit);

    let stories = app_state
        .db_client
        .list_public_stories(limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing stories: {}", e);
            HttpError::server_error("Failed to fetch stories")
        })?;

    Ok(Json(PagedResponse {
        data: stories,
        pagination,
    }))
}

use crate::{
    AppState,
    db::MessageExt,
    dtos::{ContactMessageInputDto, Response, first_validation_message},
    error::HttpError,
};
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use tracing::instrument;
use validator::Validate;

/// Router for the public contact-us inbox.
pub fn messages_handler() -> Router<AppState> {
    Router::new().route("/contact-messages", post(submit_message))
}

/// Public contact-us submission; enters the inbox as new.
#[instrument(skip(app_state, body), fields(email = %body.email))]
pub async fn submit_message(
    State(app_state): State<AppState>,
    Json(body): Json<ContactMessageInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid message input: {}", e);
        HttpError::bad_request(first_validation_message(&e))
    })?;

    app_state.db_client.create_message(&body).await.map_err(|e| {
        tracing::error!("DB error, creating message: {}", e);
        HttpError::server_error("Failed to submit message")
    })?;

    tracing::info!("Contact message received");
    Ok((
        StatusCode::CREATED,
        Json(Response {
            success: true,
            message: "Message received".to_string(),
        }),
    ))
}

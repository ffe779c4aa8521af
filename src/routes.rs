use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    handler::{
        admin::admin_handler, auth::auth_handler, biodata::biodata_handler,
        contact_request::contact_requests_handler, favorites::favorites_handler,
        messages::messages_handler, stories::stories_handler, users::users_handler,
    },
};

async fn root() -> &'static str {
    "Porinity server is running"
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(auth_handler())
        .merge(users_handler(app_state.clone()))
        .merge(biodata_handler(app_state.clone()))
        .merge(favorites_handler(app_state.clone()))
        .merge(contact_requests_handler(app_state.clone()))
        .merge(stories_handler())
        .merge(messages_handler())
        .merge(admin_handler(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub mod admin;
pub mod auth;
pub mod biodata;
pub mod contact_request;
pub mod favorites;
pub mod messages;
pub mod stories;
pub mod users;

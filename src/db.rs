use sqlx::{Pool, Postgres};

mod user;
pub use user::UserExt;

mod biodata;
pub use biodata::{BiodataExt, BiodataFilter};

mod contact_request;
pub use contact_request::ContactRequestExt;

mod story;
pub use story::StoryExt;

mod message;
pub use message::MessageExt;

mod reporting;
pub use reporting::ReportingExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}
impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

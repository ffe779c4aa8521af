use super::DBClient;

/// Biodata counters for the dashboard, computed in one aggregate pass.
#[derive(Debug, sqlx::FromRow)]
pub struct BiodataCounts {
    pub total: i64,
    pub male: i64,
    pub female: i64,
    pub premium: i64,
    pub premium_pending: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserCounts {
    pub total: i64,
    pub premium: i64,
    pub premium_pending: i64,
}

/// Pending moderation work across the three inbox-like collections.
#[derive(Debug, sqlx::FromRow)]
pub struct ModerationCounts {
    pub contact_requests_pending: i64,
    pub contact_messages_new: i64,
    pub success_stories_pending: i64,
}

/// Settled revenue per source. A NULL payment status on an approved row is
/// treated as legacy-approved and counted.
#[derive(Debug, sqlx::FromRow)]
pub struct RevenueSums {
    pub contact_requests: f64,
    pub biodata_premium: f64,
    pub user_premium: f64,
}

/// Admin-dashboard aggregation queries.
pub trait ReportingExt {
    async fn biodata_counts(&self) -> Result<BiodataCounts, sqlx::Error>;
    async fn user_counts(&self) -> Result<UserCounts, sqlx::Error>;
    async fn moderation_counts(&self) -> Result<ModerationCounts, sqlx::Error>;
    async fn revenue_sums(&self) -> Result<RevenueSums, sqlx::Error>;
}

impl ReportingExt for DBClient {
    async fn biodata_counts(&self) -> Result<BiodataCounts, sqlx::Error> {
        sqlx::query_as::<_, BiodataCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE lower(biodata_type) = 'male') AS male,
                   COUNT(*) FILTER (WHERE lower(biodata_type) = 'female') AS female,
                   COUNT(*) FILTER (WHERE premium_status = 'approved') AS premium,
                   COUNT(*) FILTER (WHERE premium_status = 'pending') AS premium_pending
            FROM biodata
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn user_counts(&self) -> Result<UserCounts, sqlx::Error> {
        sqlx::query_as::<_, UserCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE premium_user_status = 'approved') AS premium,
                   COUNT(*) FILTER (WHERE premium_user_status = 'pending') AS premium_pending
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn moderation_counts(&self) -> Result<ModerationCounts, sqlx::Error> {
        sqlx::query_as::<_, ModerationCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM contact_requests
                  WHERE status = 'pending') AS contact_requests_pending,
                (SELECT COUNT(*) FROM contact_messages
                  WHERE status = 'new') AS contact_messages_new,
                (SELECT COUNT(*) FROM success_stories
                  WHERE status = 'pending') AS success_stories_pending
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn revenue_sums(&self) -> Result<RevenueSums, sqlx::Error> {
        sqlx::query_as::<_, RevenueSums>(
            r#"
            SELECT
                COALESCE((SELECT SUM(amount) FROM contact_requests
                           WHERE status = 'approved'
                             AND (payment_status = 'approved' OR payment_status IS NULL)),
                         0) AS contact_requests,
                COALESCE((SELECT SUM(premium_amount) FROM biodata
                           WHERE premium_status = 'approved'
                             AND (premium_payment_status = 'approved'
                                  OR premium_payment_status IS NULL)),
                         0) AS biodata_premium,
                COALESCE((SELECT SUM(premium_amount) FROM users
                           WHERE premium_user_status = 'approved'
                             AND (premium_payment_status = 'approved'
                                  OR premium_payment_status IS NULL)),
                         0) AS user_premium
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }
}

use super::DBClient;
use crate::dtos::ContactMessageInputDto;
use crate::models::{ContactMessage, MessageStatus};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Contact-us inbox persistence.
pub trait MessageExt {
    async fn create_message(
        &self,
        input: &ContactMessageInputDto,
    ) -> Result<ContactMessage, sqlx::Error>;

    async fn list_messages(
        &self,
        status: Option<MessageStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactMessage>, sqlx::Error>;

    async fn count_messages(&self, status: Option<MessageStatus>) -> Result<i64, sqlx::Error>;

    /// Set the moderation status, stamping `resolved_at` on resolution.
    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
        admin_note: Option<&str>,
    ) -> Result<Option<ContactMessage>, sqlx::Error>;
}

impl MessageExt for DBClient {
    async fn create_message(
        &self,
        input: &ContactMessageInputDto,
    ) -> Result<ContactMessage, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, channel, message)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.channel.as_deref().unwrap_or("web"))
        .bind(&input.message)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_messages(
        &self,
        status: Option<MessageStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM contact_messages");
        if let Some(status) = status {
            qb.push(" WHERE status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<ContactMessage>().fetch_all(&self.pool).await
    }

    async fn count_messages(&self, status: Option<MessageStatus>) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contact_messages");
        if let Some(status) = status {
            qb.push(" WHERE status = ").push_bind(status);
        }

        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
        admin_note: Option<&str>,
    ) -> Result<Option<ContactMessage>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(
            r#"
            UPDATE contact_messages
            SET status = $2,
                admin_note = COALESCE($3, admin_note),
                resolved_at = CASE WHEN $2 = 'resolved' THEN now() ELSE resolved_at END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(admin_note)
        .fetch_optional(&self.pool)
        .await
    }
}

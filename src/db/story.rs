use super::DBClient;
use crate::dtos::{StoryDto, SuccessStoryInputDto};
use crate::models::{StoryStatus, SuccessStory};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Success-story persistence: public submission, admin moderation.
pub trait StoryExt {
    async fn create_story(&self, input: &SuccessStoryInputDto)
    -> Result<SuccessStory, sqlx::Error>;

    /// Approved stories for the public site, newest marriage first.
    async fn list_public_stories(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoryDto>, sqlx::Error>;

    async fn count_public_stories(&self) -> Result<i64, sqlx::Error>;

    async fn list_stories(
        &self,
        status: Option<StoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SuccessStory>, sqlx::Error>;

    async fn count_stories(&self, status: Option<StoryStatus>) -> Result<i64, sqlx::Error>;

    /// Set the moderation status, stamping `approved_at` on approval and
    /// keeping any previous admin note unless a new one is supplied.
    async fn update_story_status(
        &self,
        id: Uuid,
        status: StoryStatus,
        admin_note: Option<&str>,
    ) -> Result<Option<SuccessStory>, sqlx::Error>;
}

impl StoryExt for DBClient {
    async fn create_story(
        &self,
        input: &SuccessStoryInputDto,
    ) -> Result<SuccessStory, sqlx::Error> {
        sqlx::query_as::<_, SuccessStory>(
            r#"
            INSERT INTO success_stories
                (couple_names, story, rating, marriage_date,
                 submitted_name, submitted_email, submitted_phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.couple_names)
        .bind(&input.story)
        .bind(input.rating)
        .bind(input.marriage_date)
        .bind(&input.submitted_by.name)
        .bind(&input.submitted_by.email)
        .bind(input.submitted_by.phone.as_deref().unwrap_or(""))
        .fetch_one(&self.pool)
        .await
    }

    async fn list_public_stories(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoryDto>, sqlx::Error> {
        sqlx::query_as::<_, StoryDto>(
            r#"
            SELECT id, couple_names, story, rating, marriage_date, created_at
            FROM success_stories
            WHERE status = 'approved'
            ORDER BY marriage_date DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_public_stories(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM success_stories WHERE status = 'approved'",
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn list_stories(
        &self,
        status: Option<StoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SuccessStory>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM success_stories");
        if let Some(status) = status {
            qb.push(" WHERE status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<SuccessStory>().fetch_all(&self.pool).await
    }

    async fn count_stories(&self, status: Option<StoryStatus>) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM success_stories");
        if let Some(status) = status {
            qb.push(" WHERE status = ").push_bind(status);
        }

        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    async fn update_story_status(
        &self,
        id: Uuid,
        status: StoryStatus,
        admin_note: Option<&str>,
    ) -> Result<Option<SuccessStory>, sqlx::Error> {
        sqlx::query_as::<_, SuccessStory>(
            r#"
            UPDATE success_stories
            SET status = $2,
                admin_note = COALESCE($3, admin_note),
                approved_at = CASE WHEN $2 = 'approved' THEN now() ELSE approved_at END,
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

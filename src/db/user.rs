use super::DBClient;
use crate::models::{User, UserRole, UserType};
use sqlx::{Postgres, QueryBuilder};

/// User and favorites persistence.
pub trait UserExt {
    async fn get_user_by_uid(&self, uid: &str) -> Result<Option<User>, sqlx::Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;

    /// Create a bare account record (registration).
    async fn save_user(
        &self,
        email: &str,
        uid: &str,
        role: UserRole,
        user_type: UserType,
    ) -> Result<User, sqlx::Error>;

    /// Overwrite the profile fields of an existing account.
    /// Returns None when no account matches the uid.
    async fn update_profile(
        &self,
        uid: &str,
        email: &str,
        display_name: &str,
        photo_url: &str,
        phone_number: &str,
        address: &str,
        bio: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Create an account carrying profile fields in one step (profile POST
    /// for a uid that has no account yet).
    #[allow(clippy::too_many_arguments)]
    async fn insert_profile(
        &self,
        uid: &str,
        email: &str,
        display_name: &str,
        photo_url: &str,
        phone_number: &str,
        address: &str,
        bio: &str,
        role: UserRole,
        user_type: UserType,
    ) -> Result<User, sqlx::Error>;

    /// Move the account's premium workflow to pending and store the payment.
    async fn request_user_premium(
        &self,
        uid: &str,
        amount: f64,
        currency: &str,
        card_last4: &str,
    ) -> Result<(), sqlx::Error>;

    /// Admin approval: premium status, payment status and account tier flip
    /// together, stamped with the approval time.
    async fn approve_user_premium(&self, uid: &str) -> Result<(), sqlx::Error>;

    async fn list_users(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error>;

    async fn count_users(&self, search: Option<&str>) -> Result<i64, sqlx::Error>;

    async fn list_user_premium_requests(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error>;

    async fn count_user_premium_requests(&self) -> Result<i64, sqlx::Error>;

    /// Add to the favorites set; false when it was already present.
    async fn add_favorite(&self, uid: &str, biodata_id: &str) -> Result<bool, sqlx::Error>;

    /// Remove from the favorites set; false when it was not present.
    async fn remove_favorite(&self, uid: &str, biodata_id: &str) -> Result<bool, sqlx::Error>;

    async fn get_favorite_ids(&self, uid: &str) -> Result<Vec<String>, sqlx::Error>;
}

fn push_user_search(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(term) = search {
        let pattern = format!("%{}%", term);
        qb.push(" WHERE (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR display_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl UserExt for DBClient {
    async fn get_user_by_uid(&self, uid: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn save_user(
        &self,
        email: &str,
        uid: &str,
        role: UserRole,
        user_type: UserType,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, uid, role, user_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(uid)
        .bind(role)
        .bind(user_type)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_profile(
        &self,
        uid: &str,
        email: &str,
        display_name: &str,
        photo_url: &str,
        phone_number: &str,
        address: &str,
        bio: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2,
                display_name = $3,
                photo_url = $4,
                phone_number = $5,
                address = $6,
                bio = $7,
                updated_at = now(),
                profile_updated_at = now()
            WHERE uid = $1
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(email)
        .bind(display_name)
        .bind(photo_url)
        .bind(phone_number)
        .bind(address)
        .bind(bio)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_profile(
        &self,
        uid: &str,
        email: &str,
        display_name: &str,
        photo_url: &str,
        phone_number: &str,
        address: &str,
        bio: &str,
        role: UserRole,
        user_type: UserType,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (uid, email, display_name, photo_url, phone_number, address, bio,
                 role, user_type, updated_at, profile_updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(email)
        .bind(display_name)
        .bind(photo_url)
        .bind(phone_number)
        .bind(address)
        .bind(bio)
        .bind(role)
        .bind(user_type)
        .fetch_one(&self.pool)
        .await
    }

    async fn request_user_premium(
        &self,
        uid: &str,
        amount: f64,
        currency: &str,
        card_last4: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET premium_user_status = 'pending',
                premium_amount = $2,
                premium_currency = $3,
                premium_card_last4 = $4,
                premium_payment_status = 'pending',
                premium_requested_at = now(),
                premium_approved_at = NULL,
                updated_at = now()
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .bind(amount)
        .bind(currency)
        .bind(card_last4)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn approve_user_premium(&self, uid: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET premium_user_status = 'approved',
                user_type = 'premium',
                premium_payment_status = 'approved',
                premium_approved_at = now(),
                updated_at = now()
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_user_search(&mut qb, search);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<User>().fetch_all(&self.pool).await
    }

    async fn count_users(&self, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_user_search(&mut qb, search);

        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    async fn list_user_premium_requests(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE premium_user_status = 'pending'
            ORDER BY premium_requested_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_user_premium_requests(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE premium_user_status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn add_favorite(&self, uid: &str, biodata_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (uid, biodata_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(uid)
        .bind(biodata_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_favorite(&self, uid: &str, biodata_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE uid = $1 AND biodata_id = $2")
            .bind(uid)
            .bind(biodata_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_favorite_ids(&self, uid: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT biodata_id FROM favorites WHERE uid = $1 ORDER BY created_at DESC",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await
    }
}

use super::DBClient;
use crate::dtos::ContactRequestRecord;
use crate::models::{ContactRequest, RequestStatus};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

const REQUEST_WITH_CONTACT: &str = r#"
SELECT cr.id, cr.biodata_id, cr.biodata_name, cr.requester_uid, cr.requester_email,
       cr.amount, cr.currency, cr.payment_provider, cr.payment_method, cr.card_last4,
       cr.status, cr.created_at, cr.updated_at,
       b.name AS name, b.contact_email AS contact_email, b.mobile_number AS mobile_number
FROM contact_requests cr
LEFT JOIN biodata b ON b.biodata_id = cr.biodata_id
"#;

/// Contact-request persistence. Reads join the target biodata so the caller
/// sees the unlocked contact details once approved.
pub trait ContactRequestExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_contact_request(
        &self,
        biodata_id: &str,
        biodata_name: Option<&str>,
        requester_uid: &str,
        requester_email: &str,
        amount: f64,
        currency: &str,
        payment_provider: &str,
        payment_method: &str,
        card_last4: &str,
        status: RequestStatus,
    ) -> Result<ContactRequest, sqlx::Error>;

    /// The pending/approved request blocking a duplicate, if any.
    async fn find_active_request(
        &self,
        requester_uid: &str,
        biodata_id: &str,
    ) -> Result<Option<ContactRequest>, sqlx::Error>;

    async fn get_contact_request(&self, id: Uuid) -> Result<Option<ContactRequest>, sqlx::Error>;

    /// Whether the requester holds an approved unlock for this biodata.
    async fn has_approved_request(
        &self,
        requester_uid: &str,
        biodata_id: &str,
    ) -> Result<bool, sqlx::Error>;

    async fn list_requests_for_uid(
        &self,
        requester_uid: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ContactRequestRecord>, sqlx::Error>;

    async fn delete_contact_request(&self, id: Uuid) -> Result<(), sqlx::Error>;

    /// One-way pending -> approved transition; also settles the payment.
    async fn approve_contact_request(&self, id: Uuid) -> Result<(), sqlx::Error>;

    async fn list_all_requests(
        &self,
        status: Option<RequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactRequestRecord>, sqlx::Error>;

    async fn count_all_requests(&self, status: Option<RequestStatus>) -> Result<i64, sqlx::Error>;
}

impl ContactRequestExt for DBClient {
    async fn create_contact_request(
        &self,
        biodata_id: &str,
        biodata_name: Option<&str>,
        requester_uid: &str,
        requester_email: &str,
        amount: f64,
        currency: &str,
        payment_provider: &str,
        payment_method: &str,
        card_last4: &str,
        status: RequestStatus,
    ) -> Result<ContactRequest, sqlx::Error> {
        sqlx::query_as::<_, ContactRequest>(
            r#"
            INSERT INTO contact_requests
                (biodata_id, biodata_name, requester_uid, requester_email, amount,
                 currency, payment_provider, payment_method, card_last4,
                 payment_status, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10)
            RETURNING *
            "#,
        )
        .bind(biodata_id)
        .bind(biodata_name)
        .bind(requester_uid)
        .bind(requester_email)
        .bind(amount)
        .bind(currency)
        .bind(payment_provider)
        .bind(payment_method)
        .bind(card_last4)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_active_request(
        &self,
        requester_uid: &str,
        biodata_id: &str,
    ) -> Result<Option<ContactRequest>, sqlx::Error> {
        sqlx::query_as::<_, ContactRequest>(
            r#"
            SELECT * FROM contact_requests
            WHERE requester_uid = $1
              AND biodata_id = $2
              AND status IN ('pending', 'approved')
            "#,
        )
        .bind(requester_uid)
        .bind(biodata_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_contact_request(&self, id: Uuid) -> Result<Option<ContactRequest>, sqlx::Error> {
        sqlx::query_as::<_, ContactRequest>("SELECT * FROM contact_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn has_approved_request(
        &self,
        requester_uid: &str,
        biodata_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM contact_requests
                WHERE requester_uid = $1 AND biodata_id = $2 AND status = 'approved'
            )
            "#,
        )
        .bind(requester_uid)
        .bind(biodata_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_requests_for_uid(
        &self,
        requester_uid: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ContactRequestRecord>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(REQUEST_WITH_CONTACT);
        qb.push(" WHERE cr.requester_uid = ").push_bind(requester_uid.to_string());
        if let Some(status) = status {
            qb.push(" AND cr.status = ").push_bind(status);
        }
        qb.push(" ORDER BY cr.created_at DESC");

        qb.build_query_as::<ContactRequestRecord>()
            .fetch_all(&self.pool)
            .await
    }

    async fn delete_contact_request(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn approve_contact_request(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE contact_requests
            SET status = 'approved',
                payment_status = 'approved',
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all_requests(
        &self,
        status: Option<RequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactRequestRecord>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(REQUEST_WITH_CONTACT);
        if let Some(status) = status {
            qb.push(" WHERE cr.status = ").push_bind(status);
        }
        qb.push(" ORDER BY cr.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<ContactRequestRecord>()
            .fetch_all(&self.pool)
            .await
    }

    async fn count_all_requests(&self, status: Option<RequestStatus>) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contact_requests");
        if let Some(status) = status {
            qb.push(" WHERE status = ").push_bind(status);
        }

        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }
}

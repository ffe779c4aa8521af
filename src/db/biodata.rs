use super::DBClient;
use crate::dtos::{BiodataInputDto, FavoriteBiodataDto};
use crate::models::Biodata;
use sqlx::{Postgres, QueryBuilder};

/// Public-listing filter. `biodata_type` and `division` match the whole
/// string case-insensitively, `search_id` is a substring match on the
/// public identifier; the "all" sentinel is resolved before this layer.
#[derive(Debug, Default, Clone)]
pub struct BiodataFilter {
    pub biodata_type: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub division: Option<String>,
    pub search_id: Option<String>,
}

fn push_biodata_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BiodataFilter) {
    qb.push(" WHERE is_published = TRUE");

    if let Some(biodata_type) = &filter.biodata_type {
        qb.push(" AND lower(biodata_type) = lower(")
            .push_bind(biodata_type.clone())
            .push(")");
    }
    if let Some(min_age) = filter.min_age {
        qb.push(" AND age >= ").push_bind(min_age);
    }
    if let Some(max_age) = filter.max_age {
        qb.push(" AND age <= ").push_bind(max_age);
    }
    if let Some(division) = &filter.division {
        qb.push(" AND lower(permanent_division) = lower(")
            .push_bind(division.clone())
            .push(")");
    }
    if let Some(search_id) = &filter.search_id {
        qb.push(" AND biodata_id ILIKE ")
            .push_bind(format!("%{}%", search_id));
    }
}

/// Biodata persistence. The numeric identifier comes from the
/// `biodata_numeric_id_seq` sequence and `biodata_id` is generated from it,
/// so inserts never race on the counter and updates cannot change either.
pub trait BiodataExt {
    async fn get_biodata_by_uid(&self, uid: &str) -> Result<Option<Biodata>, sqlx::Error>;

    async fn get_biodata_by_public_id(
        &self,
        biodata_id: &str,
    ) -> Result<Option<Biodata>, sqlx::Error>;

    async fn list_biodata(
        &self,
        filter: &BiodataFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Biodata>, sqlx::Error>;

    async fn count_biodata(&self, filter: &BiodataFilter) -> Result<i64, sqlx::Error>;

    /// Approved-premium published rows, sorted by age.
    async fn list_premium_biodata(
        &self,
        ascending: bool,
        limit: i64,
    ) -> Result<Vec<Biodata>, sqlx::Error>;

    async fn insert_biodata(
        &self,
        uid: &str,
        contact_email: &str,
        input: &BiodataInputDto,
    ) -> Result<Biodata, sqlx::Error>;

    /// Rewrite the profile fields of the caller's biodata in place, keeping
    /// identifiers, premium state and created_at. None when the uid owns no
    /// biodata.
    async fn update_biodata(
        &self,
        uid: &str,
        contact_email: &str,
        input: &BiodataInputDto,
    ) -> Result<Option<Biodata>, sqlx::Error>;

    async fn request_biodata_premium(
        &self,
        biodata_id: &str,
        amount: f64,
        currency: &str,
        card_last4: &str,
    ) -> Result<(), sqlx::Error>;

    async fn approve_biodata_premium(&self, biodata_id: &str) -> Result<(), sqlx::Error>;

    async fn list_biodata_premium_requests(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Biodata>, sqlx::Error>;

    async fn count_biodata_premium_requests(&self) -> Result<i64, sqlx::Error>;

    /// Card projection for the favorites screen.
    async fn get_favorite_biodata(
        &self,
        biodata_ids: &[String],
    ) -> Result<Vec<FavoriteBiodataDto>, sqlx::Error>;
}

impl BiodataExt for DBClient {
    async fn get_biodata_by_uid(&self, uid: &str) -> Result<Option<Biodata>, sqlx::Error> {
        sqlx::query_as::<_, Biodata>("SELECT * FROM biodata WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_biodata_by_public_id(
        &self,
        biodata_id: &str,
    ) -> Result<Option<Biodata>, sqlx::Error> {
        sqlx::query_as::<_, Biodata>("SELECT * FROM biodata WHERE biodata_id = $1")
            .bind(biodata_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_biodata(
        &self,
        filter: &BiodataFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Biodata>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM biodata");
        push_biodata_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, numeric_biodata_id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<Biodata>().fetch_all(&self.pool).await
    }

    async fn count_biodata(&self, filter: &BiodataFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM biodata");
        push_biodata_filters(&mut qb, filter);

        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    async fn list_premium_biodata(
        &self,
        ascending: bool,
        limit: i64,
    ) -> Result<Vec<Biodata>, sqlx::Error> {
        let order = if ascending { "ASC" } else { "DESC" };
        let sql = format!(
            r#"
            SELECT * FROM biodata
            WHERE premium_status = 'approved' AND is_published = TRUE
            ORDER BY age {}
            LIMIT $1
            "#,
            order
        );

        sqlx::query_as::<_, Biodata>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    async fn insert_biodata(
        &self,
        uid: &str,
        contact_email: &str,
        input: &BiodataInputDto,
    ) -> Result<Biodata, sqlx::Error> {
        sqlx::query_as::<_, Biodata>(
            r#"
            INSERT INTO biodata
                (uid, biodata_type, name, profile_image, date_of_birth, height, weight,
                 age, occupation, race, father_name, mother_name, permanent_division,
                 permanent_address, present_division, expected_partner_age,
                 expected_partner_height, expected_partner_weight, contact_email,
                 mobile_number, about, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, TRUE)
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(&input.biodata_type)
        .bind(&input.name)
        .bind(input.profile_image.as_deref().unwrap_or(""))
        .bind(&input.date_of_birth)
        .bind(&input.height)
        .bind(&input.weight)
        .bind(input.age)
        .bind(&input.occupation)
        .bind(&input.race)
        .bind(input.father_name.as_deref().unwrap_or(""))
        .bind(input.mother_name.as_deref().unwrap_or(""))
        .bind(&input.permanent_division)
        // Permanent address mirrors the permanent division.
        .bind(&input.permanent_division)
        .bind(&input.present_division)
        .bind(input.expected_partner_age.as_deref().unwrap_or(""))
        .bind(&input.expected_partner_height)
        .bind(&input.expected_partner_weight)
        .bind(contact_email)
        .bind(&input.mobile_number)
        .bind(input.about.as_deref().unwrap_or(""))
        .fetch_one(&self.pool)
        .await
    }

    async fn update_biodata(
        &self,
        uid: &str,
        contact_email: &str,
        input: &BiodataInputDto,
    ) -> Result<Option<Biodata>, sqlx::Error> {
        sqlx::query_as::<_, Biodata>(
            r#"
            UPDATE biodata
            SET biodata_type = $2,
                name = $3,
                profile_image = $4,
                date_of_birth = $5,
                height = $6,
                weight = $7,
                age = $8,
                occupation = $9,
                race = $10,
                father_name = $11,
                mother_name = $12,
                permanent_division = $13,
                permanent_address = $13,
                present_division = $14,
                expected_partner_age = $15,
                expected_partner_height = $16,
                expected_partner_weight = $17,
                contact_email = $18,
                mobile_number = $19,
                about = $20,
                is_published = TRUE,
                updated_at = now()
            WHERE uid = $1
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(&input.biodata_type)
        .bind(&input.name)
        .bind(input.profile_image.as_deref().unwrap_or(""))
        .bind(&input.date_of_birth)
        .bind(&input.height)
        .bind(&input.weight)
        .bind(input.age)
        .bind(&input.occupation)
        .bind(&input.race)
        .bind(input.father_name.as_deref().unwrap_or(""))
        .bind(input.mother_name.as_deref().unwrap_or(""))
        .bind(&input.permanent_division)
        .bind(&input.present_division)
        .bind(input.expected_partner_age.as_deref().unwrap_or(""))
        .bind(&input.expected_partner_height)
        .bind(&input.expected_partner_weight)
        .bind(contact_email)
        .bind(&input.mobile_number)
        .bind(input.about.as_deref().unwrap_or(""))
        .fetch_optional(&self.pool)
        .await
    }

    async fn request_biodata_premium(
        &self,
        biodata_id: &str,
        amount: f64,
        currency: &str,
        card_last4: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE biodata
            SET premium_status = 'pending',
                premium_amount = $2,
                premium_currency = $3,
                premium_card_last4 = $4,
                premium_payment_status = 'pending',
                premium_requested_at = now(),
                premium_reviewed_at = NULL,
                updated_at = now()
            WHERE biodata_id = $1
            "#,
        )
        .bind(biodata_id)
        .bind(amount)
        .bind(currency)
        .bind(card_last4)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn approve_biodata_premium(&self, biodata_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE biodata
            SET premium_status = 'approved',
                premium_payment_status = 'approved',
                premium_reviewed_at = now(),
                updated_at = now()
            WHERE biodata_id = $1
            "#,
        )
        .bind(biodata_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_biodata_premium_requests(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Biodata>, sqlx::Error> {
        sqlx::query_as::<_, Biodata>(
            r#"
            SELECT * FROM biodata
            WHERE premium_status = 'pending'
            ORDER BY premium_requested_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_biodata_premium_requests(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM biodata WHERE premium_status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn get_favorite_biodata(
        &self,
        biodata_ids: &[String],
    ) -> Result<Vec<FavoriteBiodataDto>, sqlx::Error> {
        sqlx::query_as::<_, FavoriteBiodataDto>(
            r#"
            SELECT biodata_id, name, permanent_address, occupation
            FROM biodata
            WHERE biodata_id = ANY($1)
            ORDER BY numeric_biodata_id
            "#,
        )
        .bind(biodata_ids.to_vec())
        .fetch_all(&self.pool)
        .await
    }
}

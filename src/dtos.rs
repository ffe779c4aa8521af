use crate::models::{
    Biodata, MessageStatus, PaymentStatus, PremiumStatus, RequestStatus, StoryStatus, User,
    UserRole, UserType,
};
use crate::utils::pagination::Pagination;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// DTOs define the JSON exchanged with the client apps; field names stay
// camelCase to match them. Database models never cross the wire unfiltered.

// ============================================================================
// Generic responses
// ============================================================================

/// `{"success": true, "message": ...}` envelope used by mutation endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub message: String,
}

/// Bare `{"success": true}` used by the cookie endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessDto {
    pub success: bool,
}

/// Paginated listing envelope shared by every list endpoint.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

// ============================================================================
// Auth DTOs
// ============================================================================

/// `POST /jwt` body: cookies are issued for a known email.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct IssueTokenDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
}

// ============================================================================
// Pagination & query DTOs
// ============================================================================

/// Raw pagination query parameters; clamping happens in utils::pagination,
/// out-of-range values are corrected rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// `GET /biodata` filters.
#[derive(Debug, Default, Deserialize)]
pub struct BiodataListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub biodata_type: Option<String>,
    #[serde(rename = "minAge")]
    pub min_age: Option<i32>,
    #[serde(rename = "maxAge")]
    pub max_age: Option<i32>,
    pub division: Option<String>,
    #[serde(rename = "searchId")]
    pub search_id: Option<String>,
}

/// `GET /biodata/premium` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PremiumBiodataQuery {
    /// Age sort order: "asc" or "desc" (default).
    pub sort: Option<String>,
    pub limit: Option<i64>,
}

// ============================================================================
// Biodata DTOs
// ============================================================================

/// `POST /biodata` body. Field messages match the client-side form copy.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataInputDto {
    #[validate(length(min = 1, message = "Biodata type is required"))]
    pub biodata_type: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub profile_image: Option<String>,

    #[validate(length(min = 1, message = "Date of birth is required"))]
    pub date_of_birth: String,

    #[validate(length(min = 1, message = "Height is required"))]
    pub height: String,

    #[validate(length(min = 1, message = "Weight is required"))]
    pub weight: String,

    #[validate(range(min = 18, message = "Age must be a number and at least 18"))]
    pub age: i32,

    #[validate(length(min = 1, message = "Occupation is required"))]
    pub occupation: String,

    #[validate(length(min = 1, message = "Race/complexion is required"))]
    pub race: String,

    pub father_name: Option<String>,
    pub mother_name: Option<String>,

    #[validate(length(min = 1, message = "Permanent division is required"))]
    pub permanent_division: String,

    #[validate(length(min = 1, message = "Present division is required"))]
    pub present_division: String,

    pub expected_partner_age: Option<String>,

    #[validate(length(min = 1, message = "Expected partner height is required"))]
    pub expected_partner_height: String,

    #[validate(length(min = 1, message = "Expected partner weight is required"))]
    pub expected_partner_weight: String,

    #[validate(length(min = 1, message = "Mobile number is required"))]
    pub mobile_number: String,

    pub about: Option<String>,
}

/// Client-facing biodata document: internal row id and the raw numeric
/// counter stay server-side; contact fields are present only when the
/// caller is entitled to them.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BiodataDto {
    pub biodata_id: String,
    pub uid: String,
    pub biodata_type: String,
    pub name: String,
    pub profile_image: String,
    pub date_of_birth: String,
    pub height: String,
    pub weight: String,
    pub age: i32,
    pub occupation: String,
    pub race: String,
    pub father_name: String,
    pub mother_name: String,
    pub permanent_division: String,
    pub permanent_address: String,
    pub present_division: String,
    pub expected_partner_age: String,
    pub expected_partner_height: String,
    pub expected_partner_weight: String,
    pub contact_email: Option<String>,
    pub mobile_number: Option<String>,
    pub about: String,
    pub premium_status: PremiumStatus,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BiodataDto {
    /// Strip server-side fields; `include_contact` gates the private
    /// contact details (owner, admin, premium caller, approved request).
    pub fn sanitize(biodata: &Biodata, include_contact: bool) -> Self {
        BiodataDto {
            biodata_id: biodata.biodata_id.clone(),
            uid: biodata.uid.clone(),
            biodata_type: biodata.biodata_type.clone(),
            name: biodata.name.clone(),
            profile_image: biodata.profile_image.clone(),
            date_of_birth: biodata.date_of_birth.clone(),
            height: biodata.height.clone(),
            weight: biodata.weight.clone(),
            age: biodata.age,
            occupation: biodata.occupation.clone(),
            race: biodata.race.clone(),
            father_name: biodata.father_name.clone(),
            mother_name: biodata.mother_name.clone(),
            permanent_division: biodata.permanent_division.clone(),
            permanent_address: biodata.permanent_address.clone(),
            present_division: biodata.present_division.clone(),
            expected_partner_age: biodata.expected_partner_age.clone(),
            expected_partner_height: biodata.expected_partner_height.clone(),
            expected_partner_weight: biodata.expected_partner_weight.clone(),
            contact_email: include_contact.then(|| biodata.contact_email.clone()),
            mobile_number: include_contact.then(|| biodata.mobile_number.clone()),
            about: biodata.about.clone(),
            premium_status: biodata.premium_status,
            is_published: biodata.is_published,
            created_at: biodata.created_at,
            updated_at: biodata.updated_at,
        }
    }

    pub fn sanitize_all(biodata: &[Biodata], include_contact: bool) -> Vec<BiodataDto> {
        biodata
            .iter()
            .map(|b| BiodataDto::sanitize(b, include_contact))
            .collect()
    }
}

/// Upsert response carrying the sanitized record.
#[derive(Debug, Serialize)]
pub struct BiodataSaveResponse {
    pub success: bool,
    pub message: String,
    pub biodata: BiodataDto,
}

// ============================================================================
// Premium payment DTOs
// ============================================================================

/// Payment submitted with a premium request (biodata or user variant).
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumRequestDto {
    pub amount: f64,
    pub currency: Option<String>,
    #[validate(length(min = 1, message = "cardLast4 is required"))]
    pub card_last4: String,
}

// ============================================================================
// User DTOs
// ============================================================================

/// `POST /register` body.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,

    pub role: Option<UserRole>,
    pub user_type: Option<UserType>,
}

/// Echo of the registered account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserDto {
    pub email: String,
    pub uid: String,
    pub user_type: UserType,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user: RegisteredUserDto,
}

/// `PUT|POST /users/profile` body. `uid` names the profile being written;
/// the ownership guard compares it against the caller.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpsertDto {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,

    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
}

/// Client-facing user document, favorites id list included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub role: UserRole,
    pub user_type: UserType,
    pub premium_user_status: PremiumStatus,
    pub premium_amount: Option<f64>,
    pub premium_currency: Option<String>,
    pub premium_card_last4: Option<String>,
    pub premium_payment_status: Option<PaymentStatus>,
    pub premium_requested_at: Option<DateTime<Utc>>,
    pub premium_approved_at: Option<DateTime<Utc>>,
    pub favorites: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserDto {
    pub fn from_user(user: &User, favorites: Vec<String>) -> Self {
        UserDto {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
            bio: user.bio.clone(),
            role: user.role,
            user_type: user.user_type,
            premium_user_status: user.premium_user_status,
            premium_amount: user.premium_amount,
            premium_currency: user.premium_currency.clone(),
            premium_card_last4: user.premium_card_last4.clone(),
            premium_payment_status: user.premium_payment_status,
            premium_requested_at: user.premium_requested_at,
            premium_approved_at: user.premium_approved_at,
            favorites,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Favorites DTOs
// ============================================================================

/// `POST|DELETE /favorites` body.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDto {
    #[validate(length(min = 1, message = "uid and biodataId are required"))]
    pub uid: String,

    #[validate(length(min = 1, message = "uid and biodataId are required"))]
    pub biodata_id: String,
}

/// Projection returned by `GET /favorites/{uid}`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteBiodataDto {
    pub biodata_id: String,
    pub name: String,
    pub permanent_address: String,
    pub occupation: String,
}

// ============================================================================
// Contact request DTOs
// ============================================================================

/// `POST /contact-requests` body.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestInputDto {
    #[validate(length(min = 1, message = "biodataId is required"))]
    pub biodata_id: String,

    pub amount: f64,
    pub currency: Option<String>,
    pub payment_provider: Option<String>,
    pub payment_method: Option<String>,

    #[validate(length(min = 1, message = "cardLast4 must contain the last four digits of the card"))]
    pub card_last4: String,

    pub status: Option<RequestStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestCreatedResponse {
    pub success: bool,
    pub request_id: Uuid,
    pub message: String,
}

/// `GET /contact-requests` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestListQuery {
    pub requester_uid: Option<String>,
    pub status: Option<RequestStatus>,
}

/// Contact request joined with the target biodata's contact fields, as read
/// from the database. Contact fields are raw here; redaction happens in
/// [`ContactRequestDto::redact`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRequestRecord {
    pub id: Uuid,
    pub biodata_id: String,
    pub biodata_name: Option<String>,
    pub requester_uid: String,
    pub requester_email: String,
    pub amount: f64,
    pub currency: String,
    pub payment_provider: String,
    pub payment_method: String,
    pub card_last4: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub mobile_number: Option<String>,
}

/// Contact request as shown to the requester (and admins). The unlocked
/// contact details appear only once the request is approved.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestDto {
    pub id: Uuid,
    pub biodata_id: String,
    pub requester_uid: String,
    pub requester_email: String,
    pub status: RequestStatus,
    pub amount: f64,
    pub currency: String,
    pub payment_provider: String,
    pub payment_method: String,
    pub card_last4: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub mobile_number: Option<String>,
}

impl ContactRequestDto {
    pub fn redact(record: ContactRequestRecord) -> Self {
        let approved = record.status == RequestStatus::Approved;
        ContactRequestDto {
            id: record.id,
            biodata_id: record.biodata_id,
            requester_uid: record.requester_uid,
            requester_email: record.requester_email,
            status: record.status,
            amount: record.amount,
            currency: record.currency,
            payment_provider: record.payment_provider,
            payment_method: record.payment_method,
            card_last4: record.card_last4,
            created_at: record.created_at,
            updated_at: record.updated_at,
            name: record.biodata_name.or(record.name),
            contact_email: if approved { record.contact_email } else { None },
            mobile_number: if approved { record.mobile_number } else { None },
        }
    }
}

// ============================================================================
// Success story DTOs
// ============================================================================

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedByDto {
    #[validate(length(min = 1, message = "Submitter name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Submitter email is required"),
        email(message = "Submitter email is invalid")
    )]
    pub email: String,

    pub phone: Option<String>,
}

/// `POST /success-stories` body.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessStoryInputDto {
    #[validate(length(min = 1, message = "Couple names are required"))]
    pub couple_names: String,

    #[validate(length(min = 1, message = "Story is required"))]
    pub story: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    pub marriage_date: NaiveDate,

    #[validate(nested)]
    pub submitted_by: SubmittedByDto,
}

/// Public story view: the submitter's contact details stay private.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoryDto {
    pub id: Uuid,
    pub couple_names: String,
    pub story: String,
    pub rating: i32,
    pub marriage_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// `PATCH /admin/success-stories/{id}/status` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStatusUpdateDto {
    pub status: StoryStatus,
    pub admin_note: Option<String>,
}

// ============================================================================
// Contact message DTOs
// ============================================================================

/// `POST /contact-messages` body.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessageInputDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    pub channel: Option<String>,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

/// `PATCH /admin/contact-messages/{id}/status` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStatusUpdateDto {
    pub status: MessageStatus,
    pub admin_note: Option<String>,
}

// ============================================================================
// Admin DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AdminUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring over email and display name.
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminContactRequestsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminStoriesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<StoryStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminMessagesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<MessageStatus>,
}

/// Revenue summed per source over settled payments.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueDto {
    pub contact_requests: f64,
    pub biodata_premium: f64,
    pub user_premium: f64,
    pub total: f64,
}

/// `GET /admin/overview` payload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverviewDto {
    pub biodata_total: i64,
    pub biodata_male: i64,
    pub biodata_female: i64,
    pub biodata_premium: i64,
    pub biodata_premium_pending: i64,
    pub users_total: i64,
    pub premium_users: i64,
    pub premium_users_pending: i64,
    pub contact_requests_pending: i64,
    pub contact_messages_new: i64,
    pub success_stories_pending: i64,
    pub revenue: RevenueDto,
}

/// First declared message out of a validation failure, so clients get the
/// same one-line field errors the forms show ("Age must be a number and at
/// least 18"), not the full multi-field dump.
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    for errs in errors.field_errors().values() {
        if let Some(message) = errs.first().and_then(|e| e.message.as_ref()) {
            return message.to_string();
        }
    }
    errors.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_biodata_input() -> BiodataInputDto {
        BiodataInputDto {
            biodata_type: "Male".to_string(),
            name: "Rahim Uddin".to_string(),
            profile_image: None,
            date_of_birth: "1998-04-12".to_string(),
            height: "5'8\"".to_string(),
            weight: "70kg".to_string(),
            age: 25,
            occupation: "Engineer".to_string(),
            race: "Fair".to_string(),
            father_name: None,
            mother_name: None,
            permanent_division: "Dhaka".to_string(),
            present_division: "Chattogram".to_string(),
            expected_partner_age: None,
            expected_partner_height: "5'2\"".to_string(),
            expected_partner_weight: "55kg".to_string(),
            mobile_number: "01712345678".to_string(),
            about: None,
        }
    }

    #[test]
    fn biodata_input_accepts_an_adult() {
        assert!(valid_biodata_input().validate().is_ok());
    }

    #[test]
    fn biodata_input_rejects_minors_with_the_exact_message() {
        let mut input = valid_biodata_input();
        input.age = 17;

        let err = input.validate().unwrap_err();
        let field_errors = err.field_errors();
        let age_errors = field_errors.get("age").expect("age error expected");
        assert_eq!(
            age_errors[0].message.as_deref(),
            Some("Age must be a number and at least 18")
        );
    }

    #[test]
    fn biodata_input_requires_every_mandatory_field() {
        let mut input = valid_biodata_input();
        input.permanent_division = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn story_rating_must_stay_within_range() {
        let story = SuccessStoryInputDto {
            couple_names: "A & B".to_string(),
            story: "We met here.".to_string(),
            rating: 6,
            marriage_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            submitted_by: SubmittedByDto {
                name: "A".to_string(),
                email: "a@example.com".to_string(),
                phone: None,
            },
        };
        assert!(story.validate().is_err());
    }

    #[test]
    fn sanitize_redacts_contact_fields_when_not_entitled() {
        let biodata = Biodata {
            id: Uuid::new_v4(),
            uid: "owner-1".to_string(),
            numeric_biodata_id: 7,
            biodata_id: "PRNT-7".to_string(),
            biodata_type: "Female".to_string(),
            name: "N".to_string(),
            profile_image: String::new(),
            date_of_birth: "2000-01-01".to_string(),
            height: "5'2\"".to_string(),
            weight: "52kg".to_string(),
            age: 24,
            occupation: "Teacher".to_string(),
            race: "Fair".to_string(),
            father_name: String::new(),
            mother_name: String::new(),
            permanent_division: "Sylhet".to_string(),
            permanent_address: "Sylhet".to_string(),
            present_division: "Sylhet".to_string(),
            expected_partner_age: String::new(),
            expected_partner_height: "5'6\"".to_string(),
            expected_partner_weight: "65kg".to_string(),
            contact_email: "private@example.com".to_string(),
            mobile_number: "01800000000".to_string(),
            about: String::new(),
            premium_status: PremiumStatus::None,
            premium_amount: None,
            premium_currency: None,
            premium_card_last4: None,
            premium_payment_status: None,
            premium_requested_at: None,
            premium_reviewed_at: None,
            is_published: true,
            created_at: Utc::now(),
            updated_at: None,
        };

        let hidden = BiodataDto::sanitize(&biodata, false);
        assert_eq!(hidden.contact_email, None);
        assert_eq!(hidden.mobile_number, None);

        let shown = BiodataDto::sanitize(&biodata, true);
        assert_eq!(shown.contact_email.as_deref(), Some("private@example.com"));
        assert_eq!(shown.mobile_number.as_deref(), Some("01800000000"));
    }

    fn record_with_status(status: RequestStatus) -> ContactRequestRecord {
        ContactRequestRecord {
            id: Uuid::new_v4(),
            biodata_id: "PRNT-3".to_string(),
            biodata_name: Some("N".to_string()),
            requester_uid: "uid-9".to_string(),
            requester_email: "r@example.com".to_string(),
            amount: 5.0,
            currency: "USD".to_string(),
            payment_provider: "stripe".to_string(),
            payment_method: "card".to_string(),
            card_last4: "4242".to_string(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            name: Some("N".to_string()),
            contact_email: Some("private@example.com".to_string()),
            mobile_number: Some("01800000000".to_string()),
        }
    }

    #[test]
    fn contact_details_unlock_only_on_approval() {
        let pending = ContactRequestDto::redact(record_with_status(RequestStatus::Pending));
        assert_eq!(pending.contact_email, None);
        assert_eq!(pending.mobile_number, None);

        let approved = ContactRequestDto::redact(record_with_status(RequestStatus::Approved));
        assert_eq!(
            approved.contact_email.as_deref(),
            Some("private@example.com")
        );
        assert_eq!(approved.mobile_number.as_deref(), Some("01800000000"));
    }
}

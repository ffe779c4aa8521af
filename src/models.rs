use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fee charged to move a biodata into the premium tier.
pub const BIODATA_PREMIUM_FEE: f64 = 20.0;
/// Fee charged to upgrade a user account to the premium tier.
pub const USER_PREMIUM_FEE: f64 = 25.0;

/// Role stored in the "user_role" Postgres ENUM.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// Account tier stored in the "user_type" Postgres ENUM.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Basic,
    Premium,
}

impl UserType {
    pub fn to_str(&self) -> &str {
        match self {
            UserType::Basic => "basic",
            UserType::Premium => "premium",
        }
    }
}

/// Premium-upgrade workflow state, tracked independently for a user account
/// and for a biodata record.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "premium_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PremiumStatus {
    None,
    Pending,
    Approved,
}

/// What a fresh premium request should do given the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PremiumRequestOutcome {
    /// No request on file: accept the payment and move to pending.
    Accepted,
    /// Already pending review: succeed without touching the stored payment.
    AlreadyPending,
    /// Already premium: succeed without touching the stored payment.
    AlreadyApproved,
}

impl PremiumStatus {
    /// Requesting while pending or approved is an idempotent success and
    /// never creates a second payment record.
    pub fn request_outcome(&self) -> PremiumRequestOutcome {
        match self {
            PremiumStatus::None => PremiumRequestOutcome::Accepted,
            PremiumStatus::Pending => PremiumRequestOutcome::AlreadyPending,
            PremiumStatus::Approved => PremiumRequestOutcome::AlreadyApproved,
        }
    }

    pub fn approve_outcome(&self) -> ApprovalOutcome {
        match self {
            PremiumStatus::Pending => ApprovalOutcome::Approve,
            PremiumStatus::Approved => ApprovalOutcome::AlreadyApproved,
            PremiumStatus::None => ApprovalOutcome::NotPending,
        }
    }
}

/// Contact-request workflow state.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Outcome of an admin approval against the current workflow state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApprovalOutcome {
    /// Pending: perform the one-way transition and stamp the timestamp.
    Approve,
    /// Approving twice is an idempotent success, no state change.
    AlreadyApproved,
    /// Nothing to approve (never requested, or already rejected).
    NotPending,
}

impl RequestStatus {
    pub fn approve_outcome(&self) -> ApprovalOutcome {
        match self {
            RequestStatus::Pending => ApprovalOutcome::Approve,
            RequestStatus::Approved => ApprovalOutcome::AlreadyApproved,
            RequestStatus::Rejected => ApprovalOutcome::NotPending,
        }
    }

    /// Active requests block a second request for the same biodata.
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

/// Payment settlement state. A NULL column is treated as legacy-approved
/// when aggregating revenue.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
}

/// Moderation state of a success-story submission.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "story_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

/// Moderation state of a contact-us message.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    New,
    InProgress,
    Resolved,
}

/// Strip non-digits and keep the last four. Returns None when fewer than
/// four digits were supplied.
pub fn normalize_card_last4(value: &str) -> Option<String> {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }
    Some(digits[digits.len() - 4..].iter().collect())
}

/// Account row for the users table. `uid` is the external identity-provider
/// subject; one account per uid.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub profile_updated_at: Option<DateTime<Utc>>,
}

/// Matrimonial profile row. One biodata per uid; `numeric_biodata_id` is
/// assigned once from a database sequence and `biodata_id` ("PRNT-<n>") is
/// generated from it, so both are immutable across re-submissions.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Biodata {
    pub id: Uuid,
    pub uid: String,
    pub numeric_biodata_id: i64,
    pub biodata_id: String,
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
    pub contact_email: String,
    pub mobile_number: String,
    pub about: String,
    pub premium_status: PremiumStatus,
    pub premium_amount: Option<f64>,
    pub premium_currency: Option<String>,
    pub premium_card_last4: Option<String>,
    pub premium_payment_status: Option<PaymentStatus>,
    pub premium_requested_at: Option<DateTime<Utc>>,
    pub premium_reviewed_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Paid unlock of a biodata owner's contact details.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct ContactRequest {
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
    pub payment_status: Option<PaymentStatus>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Publicly submitted, admin-moderated success story.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct SuccessStory {
    pub id: Uuid,
    pub couple_names: String,
    pub story: String,
    pub rating: i32,
    pub marriage_date: NaiveDate,
    pub submitted_name: String,
    pub submitted_email: String,
    pub submitted_phone: String,
    pub status: StoryStatus,
    pub admin_note: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public "contact us" inbox entry.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub channel: String,
    pub message: String,
    pub status: MessageStatus,
    pub admin_note: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_request_is_idempotent_once_pending_or_approved() {
        assert_eq!(
            PremiumStatus::None.request_outcome(),
            PremiumRequestOutcome::Accepted
        );
        assert_eq!(
            PremiumStatus::Pending.request_outcome(),
            PremiumRequestOutcome::AlreadyPending
        );
        assert_eq!(
            PremiumStatus::Approved.request_outcome(),
            PremiumRequestOutcome::AlreadyApproved
        );
    }

    #[test]
    fn premium_approval_only_moves_forward() {
        assert_eq!(
            PremiumStatus::Pending.approve_outcome(),
            ApprovalOutcome::Approve
        );
        assert_eq!(
            PremiumStatus::Approved.approve_outcome(),
            ApprovalOutcome::AlreadyApproved
        );
        assert_eq!(
            PremiumStatus::None.approve_outcome(),
            ApprovalOutcome::NotPending
        );
    }

    #[test]
    fn contact_request_approval_is_one_way() {
        assert_eq!(
            RequestStatus::Pending.approve_outcome(),
            ApprovalOutcome::Approve
        );
        assert_eq!(
            RequestStatus::Approved.approve_outcome(),
            ApprovalOutcome::AlreadyApproved
        );
        assert_eq!(
            RequestStatus::Rejected.approve_outcome(),
            ApprovalOutcome::NotPending
        );
    }

    #[test]
    fn pending_and_approved_requests_are_active() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Approved.is_active());
        assert!(!RequestStatus::Rejected.is_active());
    }

    #[test]
    fn card_last4_keeps_the_trailing_digits() {
        assert_eq!(normalize_card_last4("4242").as_deref(), Some("4242"));
        assert_eq!(
            normalize_card_last4("4111 1111 1111 1234").as_deref(),
            Some("1234")
        );
        assert_eq!(normalize_card_last4("**** 9876").as_deref(), Some("9876"));
    }

    #[test]
    fn card_last4_rejects_short_input() {
        assert_eq!(normalize_card_last4(""), None);
        assert_eq!(normalize_card_last4("123"), None);
        assert_eq!(normalize_card_last4("12-3"), None);
    }
}

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ghs,
}

/// Derived display status of a session.
///
/// Priority: cancelled > completed > in_progress > paid_pending > unpaid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Cancelled,
    Completed,
    InProgress,
    PaidPending,
    Unpaid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    BankTransfer,
}

pub mod center {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CenterNew {
        pub name: String,
        pub currency: Option<Currency>,
        /// Percentage (0..=100) applied to eligible loyalty customers.
        pub loyalty_discount_percent: Option<u8>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CenterCreated {
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CenterDiscountUpdate {
        /// Percentage (0..=100) applied to eligible loyalty customers.
        pub loyalty_discount_percent: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CenterView {
        pub id: String,
        pub name: String,
        pub currency: Currency,
        pub loyalty_discount_percent: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CentersResponse {
        pub centers: Vec<CenterView>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServiceTypeNew {
        pub center_id: String,
        pub name: String,
        pub base_price_minor: i64,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleTypeNew {
        pub center_id: String,
        pub name: String,
        pub multiplier: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CatalogEntryCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CatalogGet {
        pub center_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServiceTypeView {
        pub id: Uuid,
        pub name: String,
        pub base_price_minor: i64,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleTypeView {
        pub id: Uuid,
        pub name: String,
        pub multiplier: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CatalogResponse {
        pub services: Vec<ServiceTypeView>,
        pub vehicle_types: Vec<VehicleTypeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServicePriceUpdate {
        pub center_id: String,
        pub base_price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleMultiplierUpdate {
        pub center_id: String,
        pub multiplier: f64,
    }
}

pub mod booking {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingNew {
        pub center_id: String,
        pub service_id: Uuid,
        pub vehicle_type_id: Uuid,
        pub customer_phone: String,
        pub customer_name: Option<String>,
        pub plate: String,
        pub brand: Option<String>,
        pub color: Option<String>,
        /// Request the loyalty discount; applied only when the customer is
        /// eligible.
        pub apply_loyalty_discount: Option<bool>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub scheduled_start: DateTime<FixedOffset>,
    }

    /// Echo of the price derivation for the created session.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteView {
        pub base_price_minor: i64,
        pub vehicle_multiplier: f64,
        pub sub_total_minor: i64,
        pub loyalty_discount_minor: i64,
        pub final_price_minor: i64,
        pub loyalty_discount_applied: bool,
        pub customer_wash_count: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingCreated {
        pub id: Uuid,
        pub quote: QuoteView,
    }
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionGet {
        pub center_id: String,
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionList {
        pub center_id: String,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination on the scheduled start.
        pub cursor: Option<String>,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        pub include_cancelled: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionView {
        pub id: Uuid,
        pub status: SessionStatus,
        pub customer_phone: String,
        pub plate: String,
        pub price_minor: i64,
        pub loyalty_discount_minor: i64,
        pub amount_paid_minor: i64,
        pub is_paid: bool,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub scheduled_start: DateTime<FixedOffset>,
        pub actual_start: Option<DateTime<FixedOffset>>,
        pub actual_end: Option<DateTime<FixedOffset>>,
        pub duration_minutes: Option<i64>,
        pub rating: Option<u8>,
        pub cancellation_reason: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionListResponse {
        pub sessions: Vec<SessionView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionStart {
        pub center_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionComplete {
        pub center_id: String,
        pub duration_minutes: Option<i64>,
        /// Rating 1..=5.
        pub rating: Option<u8>,
        pub feedback: Option<String>,
    }

    /// Completion response: the closed session plus the customer's loyalty
    /// position after the counters moved.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCompleted {
        pub session: SessionView,
        pub loyalty_tier: u8,
        pub total_completed_bookings: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCancel {
        pub center_id: String,
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCancelled {
        pub session: SessionView,
        /// For a never-started session, signed minutes between the
        /// cancellation and the scheduled start; negative when cancelled
        /// ahead of schedule. Diagnostic only.
        pub lost_minutes: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DiscountUpdate {
        pub center_id: String,
        pub apply: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeedbackUpdate {
        pub center_id: String,
        /// Rating 1..=5.
        pub rating: Option<u8>,
        pub feedback: Option<String>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub center_id: String,
        pub amount_minor: i64,
        pub method: PaymentMethod,
        /// Required for electronic methods.
        pub transaction_ref: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentVerify {
        pub center_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub session_id: Uuid,
        pub amount_minor: i64,
        pub method: PaymentMethod,
        pub transaction_ref: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub paid_at: DateTime<FixedOffset>,
        pub received_by: String,
        pub is_verified: bool,
        pub currency: Currency,
    }
}

pub mod customer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerGet {
        pub phone: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerDeactivate {
        pub phone: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoyaltyView {
        pub tier: u8,
        pub is_vip: bool,
        pub is_discount_eligible: bool,
        pub average_spend_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerView {
        pub phone: String,
        pub name: Option<String>,
        pub email: Option<String>,
        pub total_completed_bookings: i64,
        pub total_amount_spent_minor: i64,
        pub is_active: bool,
        pub vehicle_plates: Vec<String>,
        pub last_visit: Option<DateTime<FixedOffset>>,
        pub loyalty: LoyaltyView,
    }
}

//! Customer aggregate: contact data plus the loyalty counters that drive
//! discount eligibility.
//!
//! Customers are keyed by normalized phone number, created on first booking,
//! and never deleted (only soft-deactivated). The counters move exactly once
//! per completed session.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

/// Loyalty tier as a pure function of the completed-booking count.
///
/// 0 (<5), 1 (5–9), 2 (10–19), 3 (20–29), 4 (30–49), 5 (≥50).
#[must_use]
pub fn loyalty_tier(total_completed_bookings: i64) -> u8 {
    match total_completed_bookings {
        i64::MIN..5 => 0,
        5..10 => 1,
        10..20 => 2,
        20..30 => 3,
        30..50 => 4,
        _ => 5,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_visit: Option<DateTime<Utc>>,
    pub total_completed_bookings: i64,
    pub total_amount_spent: MoneyCents,
    pub is_active: bool,
    /// Plates seen for this customer, no duplicates.
    pub vehicle_plates: Vec<String>,
}

impl Customer {
    pub fn new(phone: String, name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            phone,
            name,
            email: None,
            created_at: now,
            last_visit: None,
            total_completed_bookings: 0,
            total_amount_spent: MoneyCents::ZERO,
            is_active: true,
            vehicle_plates: Vec::new(),
        }
    }

    #[must_use]
    pub fn loyalty_tier(&self) -> u8 {
        loyalty_tier(self.total_completed_bookings)
    }

    /// VIP = loyalty tier 4 or above.
    #[must_use]
    pub fn is_vip(&self) -> bool {
        self.loyalty_tier() >= 4
    }

    /// Discount eligibility: any tier above the base one (five completed
    /// bookings).
    #[must_use]
    pub fn is_discount_eligible(&self) -> bool {
        self.loyalty_tier() >= 1
    }

    /// Average spend per visit; 0 when there are no completed bookings.
    #[must_use]
    pub fn average_spending_per_visit(&self) -> MoneyCents {
        if self.total_completed_bookings == 0 {
            MoneyCents::ZERO
        } else {
            MoneyCents::new(self.total_amount_spent.cents() / self.total_completed_bookings)
        }
    }

    /// Moves the loyalty counters for one completed session.
    pub fn increment_bookings(&mut self, amount_paid: MoneyCents, now: DateTime<Utc>) {
        self.total_completed_bookings += 1;
        self.total_amount_spent += amount_paid;
        self.last_visit = Some(now);
    }

    /// Registers a plate, ignoring duplicates.
    pub fn register_plate(&mut self, plate: String) {
        if !self.vehicle_plates.iter().any(|p| *p == plate) {
            self.vehicle_plates.push(plate);
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTimeUtc,
    pub last_visit: Option<DateTimeUtc>,
    pub total_completed_bookings: i64,
    pub total_amount_spent_minor: i64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customer_vehicles::Entity")]
    Vehicles,
}

impl Related<super::customer_vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Customer> for ActiveModel {
    fn from(customer: &Customer) -> Self {
        Self {
            phone: ActiveValue::Set(customer.phone.clone()),
            name: ActiveValue::Set(customer.name.clone()),
            email: ActiveValue::Set(customer.email.clone()),
            created_at: ActiveValue::Set(customer.created_at),
            last_visit: ActiveValue::Set(customer.last_visit),
            total_completed_bookings: ActiveValue::Set(customer.total_completed_bookings),
            total_amount_spent_minor: ActiveValue::Set(customer.total_amount_spent.cents()),
            is_active: ActiveValue::Set(customer.is_active),
        }
    }
}

impl From<(Model, Vec<super::customer_vehicles::Model>)> for Customer {
    fn from((model, vehicles): (Model, Vec<super::customer_vehicles::Model>)) -> Self {
        Self {
            phone: model.phone,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
            last_visit: model.last_visit,
            total_completed_bookings: model.total_completed_bookings,
            total_amount_spent: MoneyCents::new(model.total_amount_spent_minor),
            is_active: model.is_active,
            vehicle_plates: vehicles.into_iter().map(|v| v.plate).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_with_bookings(count: i64) -> Customer {
        let mut customer = Customer::new("+233200000001".to_string(), None, Utc::now());
        customer.total_completed_bookings = count;
        customer
    }

    #[test]
    fn tier_ladder() {
        assert_eq!(loyalty_tier(0), 0);
        assert_eq!(loyalty_tier(4), 0);
        assert_eq!(loyalty_tier(5), 1);
        assert_eq!(loyalty_tier(9), 1);
        assert_eq!(loyalty_tier(10), 2);
        assert_eq!(loyalty_tier(19), 2);
        assert_eq!(loyalty_tier(20), 3);
        assert_eq!(loyalty_tier(29), 3);
        assert_eq!(loyalty_tier(30), 4);
        assert_eq!(loyalty_tier(49), 4);
        assert_eq!(loyalty_tier(50), 5);
        assert_eq!(loyalty_tier(500), 5);
    }

    #[test]
    fn vip_starts_at_tier_four() {
        assert!(customer_with_bookings(30).is_vip());
        assert!(!customer_with_bookings(4).is_vip());
        assert_eq!(customer_with_bookings(30).loyalty_tier(), 4);
        assert_eq!(customer_with_bookings(4).loyalty_tier(), 0);
    }

    #[test]
    fn eligibility_starts_at_five_bookings() {
        assert!(!customer_with_bookings(4).is_discount_eligible());
        assert!(customer_with_bookings(5).is_discount_eligible());
    }

    #[test]
    fn average_spend_handles_zero_bookings() {
        let mut customer = customer_with_bookings(0);
        assert_eq!(customer.average_spending_per_visit(), MoneyCents::ZERO);

        customer.increment_bookings(MoneyCents::new(1000), Utc::now());
        customer.increment_bookings(MoneyCents::new(2000), Utc::now());
        assert_eq!(customer.average_spending_per_visit().cents(), 1500);
        assert!(customer.last_visit.is_some());
    }

    #[test]
    fn plates_stay_unique() {
        let mut customer = customer_with_bookings(0);
        customer.register_plate("GR1234-20".to_string());
        customer.register_plate("GR1234-20".to_string());
        customer.register_plate("AS555-21".to_string());
        assert_eq!(customer.vehicle_plates.len(), 2);
    }
}

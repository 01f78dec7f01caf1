//! Per-center reference data: service catalog and vehicle-type multipliers.
//!
//! Booking-time lookups go through [`CatalogCache`], an explicit TTL cache
//! with caller-supplied timestamps and explicit invalidation. No ambient
//! clock, no module-level mutable state.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{Currency, MoneyCents};

/// A service offered by a center (basic wash, full detail, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceType {
    pub id: Uuid,
    pub center_id: String,
    pub name: String,
    pub base_price: MoneyCents,
    pub currency: Currency,
    pub active: bool,
}

impl ServiceType {
    pub fn new(center_id: String, name: String, base_price: MoneyCents, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4(),
            center_id,
            name,
            base_price,
            currency,
            active: true,
        }
    }
}

/// A vehicle-size class and the scalar it applies to the base price.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleType {
    pub id: Uuid,
    pub center_id: String,
    pub name: String,
    pub multiplier: f64,
    pub active: bool,
}

impl VehicleType {
    pub fn new(center_id: String, name: String, multiplier: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center_id,
            name,
            multiplier,
            active: true,
        }
    }
}

/// Vehicle types seeded when a center is created, so bookings work
/// immediately: (name, multiplier).
pub const DEFAULT_VEHICLE_TYPES: [(&str, f64); 4] = [
    ("sedan", 1.0),
    ("suv", 1.3),
    ("pickup", 1.5),
    ("motorcycle", 0.7),
];

#[derive(Clone, Debug)]
struct CacheSlot<T> {
    value: T,
    center_id: String,
    stored_at: DateTime<Utc>,
}

/// TTL cache for catalog lookups.
///
/// Entries expire `ttl` after they were stored; catalog writes call
/// [`invalidate_center`](CatalogCache::invalidate_center). All methods take
/// `now` from the caller.
#[derive(Debug)]
pub struct CatalogCache {
    ttl: Duration,
    prices: HashMap<Uuid, CacheSlot<MoneyCents>>,
    multipliers: HashMap<Uuid, CacheSlot<f64>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            prices: HashMap::new(),
            multipliers: HashMap::new(),
        }
    }

    fn fresh<T: Copy>(&self, slot: Option<&CacheSlot<T>>, now: DateTime<Utc>) -> Option<T> {
        slot.filter(|s| now - s.stored_at < self.ttl).map(|s| s.value)
    }

    /// Cached base price for a service, `None` when absent or expired.
    #[must_use]
    pub fn base_price(&self, service_id: Uuid, now: DateTime<Utc>) -> Option<MoneyCents> {
        self.fresh(self.prices.get(&service_id), now)
    }

    /// Cached multiplier for a vehicle type, `None` when absent or expired.
    #[must_use]
    pub fn multiplier(&self, vehicle_type_id: Uuid, now: DateTime<Utc>) -> Option<f64> {
        self.fresh(self.multipliers.get(&vehicle_type_id), now)
    }

    pub fn store_price(
        &mut self,
        center_id: &str,
        service_id: Uuid,
        value: MoneyCents,
        now: DateTime<Utc>,
    ) {
        self.prices.insert(
            service_id,
            CacheSlot {
                value,
                center_id: center_id.to_string(),
                stored_at: now,
            },
        );
    }

    pub fn store_multiplier(
        &mut self,
        center_id: &str,
        vehicle_type_id: Uuid,
        value: f64,
        now: DateTime<Utc>,
    ) {
        self.multipliers.insert(
            vehicle_type_id,
            CacheSlot {
                value,
                center_id: center_id.to_string(),
                stored_at: now,
            },
        );
    }

    /// Drops every cached entry belonging to a center.
    pub fn invalidate_center(&mut self, center_id: &str) {
        self.prices.retain(|_, slot| slot.center_id != center_id);
        self.multipliers.retain(|_, slot| slot.center_id != center_id);
    }
}

pub mod service_types {
    use sea_orm::{ActiveValue, entity::prelude::*};

    use crate::{Currency, EngineError, MoneyCents};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "service_types")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub center_id: String,
        pub name: String,
        pub base_price_minor: i64,
        pub currency: String,
        pub active: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::centers::Entity",
            from = "Column::CenterId",
            to = "crate::centers::Column::Id",
            on_update = "NoAction",
            on_delete = "Cascade"
        )]
        Centers,
    }

    impl Related<crate::centers::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Centers.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<&super::ServiceType> for ActiveModel {
        fn from(service: &super::ServiceType) -> Self {
            Self {
                id: ActiveValue::Set(service.id.to_string()),
                center_id: ActiveValue::Set(service.center_id.clone()),
                name: ActiveValue::Set(service.name.clone()),
                base_price_minor: ActiveValue::Set(service.base_price.cents()),
                currency: ActiveValue::Set(service.currency.code().to_string()),
                active: ActiveValue::Set(service.active),
            }
        }
    }

    impl TryFrom<Model> for super::ServiceType {
        type Error = EngineError;

        fn try_from(model: Model) -> Result<Self, Self::Error> {
            Ok(Self {
                id: crate::util::parse_uuid(&model.id, "service")?,
                center_id: model.center_id,
                name: model.name,
                base_price: MoneyCents::new(model.base_price_minor),
                currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
                active: model.active,
            })
        }
    }
}

pub mod vehicle_types {
    use sea_orm::{ActiveValue, entity::prelude::*};

    use crate::EngineError;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "vehicle_types")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub center_id: String,
        pub name: String,
        pub multiplier: f64,
        pub active: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::centers::Entity",
            from = "Column::CenterId",
            to = "crate::centers::Column::Id",
            on_update = "NoAction",
            on_delete = "Cascade"
        )]
        Centers,
    }

    impl Related<crate::centers::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Centers.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<&super::VehicleType> for ActiveModel {
        fn from(vehicle: &super::VehicleType) -> Self {
            Self {
                id: ActiveValue::Set(vehicle.id.to_string()),
                center_id: ActiveValue::Set(vehicle.center_id.clone()),
                name: ActiveValue::Set(vehicle.name.clone()),
                multiplier: ActiveValue::Set(vehicle.multiplier),
                active: ActiveValue::Set(vehicle.active),
            }
        }
    }

    impl TryFrom<Model> for super::VehicleType {
        type Error = EngineError;

        fn try_from(model: Model) -> Result<Self, Self::Error> {
            Ok(Self {
                id: crate::util::parse_uuid(&model.id, "vehicle type")?,
                center_id: model.center_id,
                name: model.name,
                multiplier: model.multiplier,
                active: model.active,
            })
        }
    }
}

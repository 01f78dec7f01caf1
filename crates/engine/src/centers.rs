//! A `Center` is one wash location. It owns sessions and its own service and
//! vehicle-type catalogs, and carries the loyalty discount percentage applied
//! to eligible customers.

use sea_orm::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::Currency;

#[derive(Clone, Debug, PartialEq)]
pub struct Center {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub currency: Currency,
    /// Percentage (0..=100) applied when a booking requests the loyalty
    /// discount and the customer is eligible. Validated at creation; the
    /// pricing engine itself never clamps.
    pub loyalty_discount_percent: u8,
}

impl Center {
    pub fn new(name: String, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            user_id: user_id.to_string(),
            currency: Currency::Ghs,
            loyalty_discount_percent: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "centers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub currency: String,
    pub loyalty_discount_percent: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sessions::Entity")]
    Sessions,
    #[sea_orm(has_many = "super::catalog::service_types::Entity")]
    ServiceTypes,
    #[sea_orm(has_many = "super::catalog::vehicle_types::Entity")]
    VehicleTypes,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::catalog::service_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceTypes.def()
    }
}

impl Related<super::catalog::vehicle_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Center> for ActiveModel {
    fn from(center: &Center) -> Self {
        Self {
            id: ActiveValue::Set(center.id.clone()),
            name: ActiveValue::Set(center.name.clone()),
            user_id: ActiveValue::Set(center.user_id.clone()),
            currency: ActiveValue::Set(center.currency.code().to_string()),
            loyalty_discount_percent: ActiveValue::Set(i32::from(center.loyalty_discount_percent)),
        }
    }
}

impl From<Model> for Center {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            user_id: model.user_id,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            loyalty_discount_percent: u8::try_from(model.loyalty_discount_percent).unwrap_or(0),
        }
    }
}

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Currency, EngineError, MoneyCents, ResultEngine, ServiceType, VehicleType,
    catalog::{service_types, vehicle_types},
};

use super::{Engine, normalize_required_name, with_tx};

/// Read-only view of a center's catalog.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    pub services: Vec<ServiceType>,
    pub vehicle_types: Vec<VehicleType>,
}

impl Engine {
    /// Add a service to a center's catalog.
    pub async fn new_service_type(
        &self,
        center_id: &str,
        user_id: &str,
        name: &str,
        base_price: MoneyCents,
        currency: Option<Currency>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "service")?;
        if !base_price.is_positive() {
            return Err(EngineError::InvalidAmount(
                "base price must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let center = self.require_center(&db_tx, center_id, user_id).await?;
            let currency = currency.unwrap_or(Currency::try_from(center.currency.as_str())?);

            let exists = service_types::Entity::find()
                .filter(service_types::Column::CenterId.eq(center_id.to_string()))
                .filter(service_types::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let service = ServiceType::new(center_id.to_string(), name, base_price, currency);
            let service_id = service.id;
            let model: service_types::ActiveModel = (&service).into();
            model.insert(&db_tx).await?;
            Ok(service_id)
        })
    }

    /// Add a vehicle-size class to a center's catalog.
    ///
    /// The multiplier must be positive here: the pricing engine itself does
    /// not validate it, so the catalog is the guard.
    pub async fn new_vehicle_type(
        &self,
        center_id: &str,
        user_id: &str,
        name: &str,
        multiplier: f64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "vehicle type")?;
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(EngineError::InvalidAmount(
                "multiplier must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;

            let exists = vehicle_types::Entity::find()
                .filter(vehicle_types::Column::CenterId.eq(center_id.to_string()))
                .filter(vehicle_types::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let vehicle = VehicleType::new(center_id.to_string(), name, multiplier);
            let vehicle_id = vehicle.id;
            let model: vehicle_types::ActiveModel = (&vehicle).into();
            model.insert(&db_tx).await?;
            Ok(vehicle_id)
        })
    }

    /// Change a service's base price. Invalidates the center's cached
    /// catalog entries.
    pub async fn update_service_price(
        &self,
        center_id: &str,
        user_id: &str,
        service_id: Uuid,
        base_price: MoneyCents,
    ) -> ResultEngine<()> {
        if !base_price.is_positive() {
            return Err(EngineError::InvalidAmount(
                "base price must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            self.require_service_type(&db_tx, center_id, service_id)
                .await?;
            let model = service_types::ActiveModel {
                id: ActiveValue::Set(service_id.to_string()),
                base_price_minor: ActiveValue::Set(base_price.cents()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;
        self.cache().invalidate_center(center_id);
        Ok(())
    }

    /// Change a vehicle type's multiplier. Invalidates the center's cached
    /// catalog entries.
    pub async fn update_vehicle_multiplier(
        &self,
        center_id: &str,
        user_id: &str,
        vehicle_type_id: Uuid,
        multiplier: f64,
    ) -> ResultEngine<()> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(EngineError::InvalidAmount(
                "multiplier must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            self.require_vehicle_type(&db_tx, center_id, vehicle_type_id)
                .await?;
            let model = vehicle_types::ActiveModel {
                id: ActiveValue::Set(vehicle_type_id.to_string()),
                multiplier: ActiveValue::Set(multiplier),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;
        self.cache().invalidate_center(center_id);
        Ok(())
    }

    /// Snapshot of a center's active catalog.
    pub async fn catalog(&self, center_id: &str, user_id: &str) -> ResultEngine<CatalogSnapshot> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;

            let service_models = service_types::Entity::find()
                .filter(service_types::Column::CenterId.eq(center_id.to_string()))
                .filter(service_types::Column::Active.eq(true))
                .all(&db_tx)
                .await?;
            let vehicle_models = vehicle_types::Entity::find()
                .filter(vehicle_types::Column::CenterId.eq(center_id.to_string()))
                .filter(vehicle_types::Column::Active.eq(true))
                .all(&db_tx)
                .await?;

            let mut services = Vec::with_capacity(service_models.len());
            for model in service_models {
                services.push(ServiceType::try_from(model)?);
            }
            let mut vehicles = Vec::with_capacity(vehicle_models.len());
            for model in vehicle_models {
                vehicles.push(VehicleType::try_from(model)?);
            }

            Ok(CatalogSnapshot {
                services,
                vehicle_types: vehicles,
            })
        })
    }

    /// Base price for a service, served from the TTL cache when fresh.
    pub(super) async fn base_price_for(
        &self,
        db: &DatabaseTransaction,
        center_id: &str,
        service_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        if let Some(price) = self.cache().base_price(service_id, now) {
            return Ok(price);
        }
        let model = self.require_service_type(db, center_id, service_id).await?;
        if !model.active {
            return Err(EngineError::KeyNotFound("service not exists".to_string()));
        }
        let price = MoneyCents::new(model.base_price_minor);
        self.cache().store_price(center_id, service_id, price, now);
        Ok(price)
    }

    /// Vehicle multiplier, served from the TTL cache when fresh.
    pub(super) async fn multiplier_for(
        &self,
        db: &DatabaseTransaction,
        center_id: &str,
        vehicle_type_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<f64> {
        if let Some(multiplier) = self.cache().multiplier(vehicle_type_id, now) {
            return Ok(multiplier);
        }
        let model = self
            .require_vehicle_type(db, center_id, vehicle_type_id)
            .await?;
        if !model.active {
            return Err(EngineError::KeyNotFound(
                "vehicle type not exists".to_string(),
            ));
        }
        self.cache()
            .store_multiplier(center_id, vehicle_type_id, model.multiplier, now);
        Ok(model.multiplier)
    }
}

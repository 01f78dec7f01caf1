use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    Center, Currency, EngineError, ResultEngine, VehicleType, catalog, centers,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new center.
    ///
    /// Seeds the default vehicle-type catalog so bookings work immediately.
    pub async fn new_center(
        &self,
        name: &str,
        user_id: &str,
        currency: Option<Currency>,
        loyalty_discount_percent: Option<u8>,
    ) -> ResultEngine<String> {
        let name = normalize_required_name(name, "center")?;
        if let Some(pct) = loyalty_discount_percent
            && pct > 100
        {
            return Err(EngineError::InvalidAmount(
                "loyalty discount percent must be within 0..=100".to_string(),
            ));
        }

        let mut center = Center::new(name.clone(), user_id);
        center.currency = currency.unwrap_or_default();
        if let Some(pct) = loyalty_discount_percent {
            center.loyalty_discount_percent = pct;
        }
        let center_id = center.id.clone();
        let center_entry: centers::ActiveModel = (&center).into();

        with_tx!(self, |db_tx| {
            // Enforce unique center names per owner (case-insensitive) to
            // avoid ambiguous name lookups.
            let exists = centers::Entity::find()
                .filter(centers::Column::UserId.eq(user_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            center_entry.insert(&db_tx).await?;

            for (vehicle_name, multiplier) in catalog::DEFAULT_VEHICLE_TYPES {
                let vehicle = VehicleType::new(
                    center_id.clone(),
                    vehicle_name.to_string(),
                    multiplier,
                );
                let model: catalog::vehicle_types::ActiveModel = (&vehicle).into();
                model.insert(&db_tx).await?;
            }

            Ok(center_id)
        })
    }

    /// Return one center owned by the user.
    pub async fn center(&self, center_id: &str, user_id: &str) -> ResultEngine<Center> {
        with_tx!(self, |db_tx| {
            let model = self.require_center(&db_tx, center_id, user_id).await?;
            Ok(Center::from(model))
        })
    }

    /// List the user's centers.
    pub async fn centers(&self, user_id: &str) -> ResultEngine<Vec<Center>> {
        let models = centers::Entity::find()
            .filter(centers::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Center::from).collect())
    }

    /// Update the loyalty discount percentage applied by a center.
    pub async fn set_center_discount_percent(
        &self,
        center_id: &str,
        user_id: &str,
        percent: u8,
    ) -> ResultEngine<()> {
        if percent > 100 {
            return Err(EngineError::InvalidAmount(
                "loyalty discount percent must be within 0..=100".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            let model = centers::ActiveModel {
                id: ActiveValue::Set(center_id.to_string()),
                loyalty_discount_percent: ActiveValue::Set(i32::from(percent)),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }
}

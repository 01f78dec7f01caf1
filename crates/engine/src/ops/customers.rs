use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{Customer, EngineError, ResultEngine, customer_vehicles, customers};

use super::{Engine, with_tx};

impl Engine {
    /// Return a customer with their registered plates.
    ///
    /// The phone is normalized before lookup, so any spelling of the same
    /// number resolves to the same customer.
    pub async fn customer(&self, phone: &str) -> ResultEngine<Customer> {
        let phone = crate::util::normalize_phone(phone)?;
        with_tx!(self, |db_tx| {
            self.require_customer(&db_tx, &phone).await
        })
    }

    /// Soft-deactivate a customer. Customers are never deleted.
    pub async fn deactivate_customer(&self, phone: &str) -> ResultEngine<()> {
        let phone = crate::util::normalize_phone(phone)?;
        with_tx!(self, |db_tx| {
            self.require_customer(&db_tx, &phone).await?;
            let model = customers::ActiveModel {
                phone: ActiveValue::Set(phone.clone()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn require_customer(
        &self,
        db: &DatabaseTransaction,
        phone: &str,
    ) -> ResultEngine<Customer> {
        let model = customers::Entity::find_by_id(phone.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))?;
        let vehicles = customer_vehicles::Entity::find()
            .filter(customer_vehicles::Column::Phone.eq(phone.to_string()))
            .all(db)
            .await?;
        Ok(Customer::from((model, vehicles)))
    }

    /// Find a customer without treating absence as an error (used by
    /// booking, where the first contact creates the record).
    pub(super) async fn find_customer(
        &self,
        db: &DatabaseTransaction,
        phone: &str,
    ) -> ResultEngine<Option<Customer>> {
        let Some(model) = customers::Entity::find_by_id(phone.to_string())
            .one(db)
            .await?
        else {
            return Ok(None);
        };
        let vehicles = customer_vehicles::Entity::find()
            .filter(customer_vehicles::Column::Phone.eq(phone.to_string()))
            .all(db)
            .await?;
        Ok(Some(Customer::from((model, vehicles))))
    }

    /// Create the customer on first contact and register the plate.
    ///
    /// Existing customers only gain the plate (if unseen) and a name when
    /// they had none.
    pub(super) async fn ensure_customer(
        &self,
        db: &DatabaseTransaction,
        phone: &str,
        name: Option<&str>,
        plate: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        match customers::Entity::find_by_id(phone.to_string()).one(db).await? {
            Some(existing) => {
                if existing.name.is_none()
                    && let Some(name) = name
                {
                    let model = customers::ActiveModel {
                        phone: ActiveValue::Set(phone.to_string()),
                        name: ActiveValue::Set(Some(name.to_string())),
                        ..Default::default()
                    };
                    model.update(db).await?;
                }
            }
            None => {
                let customer = Customer::new(
                    phone.to_string(),
                    name.map(|n| n.to_string()),
                    now,
                );
                let model: customers::ActiveModel = (&customer).into();
                model.insert(db).await?;
            }
        }

        let seen = customer_vehicles::Entity::find_by_id((phone.to_string(), plate.to_string()))
            .one(db)
            .await?
            .is_some();
        if !seen {
            let vehicle = customer_vehicles::ActiveModel {
                phone: ActiveValue::Set(phone.to_string()),
                plate: ActiveValue::Set(plate.to_string()),
            };
            vehicle.insert(db).await?;
        }
        Ok(())
    }
}

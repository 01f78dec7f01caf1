//! Ownership checks shared by the operations.
//!
//! Centers are owned by the user that created them. A center that exists but
//! belongs to someone else is reported as `Forbidden`; a missing one as
//! `KeyNotFound`.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, catalog, centers, sessions};

use super::Engine;

impl Engine {
    pub(super) async fn require_center(
        &self,
        db: &DatabaseTransaction,
        center_id: &str,
        user_id: &str,
    ) -> ResultEngine<centers::Model> {
        let model = centers::Entity::find_by_id(center_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("center not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::Forbidden(
                "center belongs to another user".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_session(
        &self,
        db: &DatabaseTransaction,
        center_id: &str,
        session_id: Uuid,
    ) -> ResultEngine<sessions::Model> {
        sessions::Entity::find_by_id(session_id.to_string())
            .filter(sessions::Column::CenterId.eq(center_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("session not exists".to_string()))
    }

    pub(super) async fn require_service_type(
        &self,
        db: &DatabaseTransaction,
        center_id: &str,
        service_id: Uuid,
    ) -> ResultEngine<catalog::service_types::Model> {
        catalog::service_types::Entity::find_by_id(service_id.to_string())
            .filter(catalog::service_types::Column::CenterId.eq(center_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("service not exists".to_string()))
    }

    pub(super) async fn require_vehicle_type(
        &self,
        db: &DatabaseTransaction,
        center_id: &str,
        vehicle_type_id: Uuid,
    ) -> ResultEngine<catalog::vehicle_types::Model> {
        catalog::vehicle_types::Entity::find_by_id(vehicle_type_id.to_string())
            .filter(catalog::vehicle_types::Column::CenterId.eq(center_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("vehicle type not exists".to_string()))
    }
}

use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{ResultEngine, WashSession};

use super::{Engine, with_tx};

mod list;
mod payment;
mod write;

pub use list::SessionListFilter;

impl Engine {
    /// Return a session snapshot.
    pub async fn session(
        &self,
        center_id: &str,
        session_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<WashSession> {
        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;
            let model = self.require_session(&db_tx, center_id, session_id).await?;
            WashSession::try_from(model)
        })
    }
}

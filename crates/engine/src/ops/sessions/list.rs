use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, WashSession, sessions};

use super::super::{Engine, with_tx};

/// Filters for listing sessions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both on the
/// scheduled start, in UTC.
#[derive(Clone, Debug, Default)]
pub struct SessionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If true, includes cancelled sessions (default: false).
    pub include_cancelled: bool,
}

fn validate_list_filter(filter: &SessionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SessionsCursor {
    scheduled_start: DateTime<Utc>,
    session_id: String,
}

fn encode_cursor(cursor: &SessionsCursor) -> ResultEngine<String> {
    let bytes = serde_json::to_vec(cursor)
        .map_err(|_| EngineError::InvalidId("invalid cursor".to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn decode_cursor(cursor: &str) -> ResultEngine<SessionsCursor> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| EngineError::InvalidId("invalid cursor".to_string()))?;
    serde_json::from_slice(&bytes).map_err(|_| EngineError::InvalidId("invalid cursor".to_string()))
}

impl Engine {
    /// Lists a center's sessions, newest scheduled first, with an opaque
    /// keyset cursor for fetching older pages.
    pub async fn list_sessions(
        &self,
        center_id: &str,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &SessionListFilter,
    ) -> ResultEngine<(Vec<WashSession>, Option<String>)> {
        validate_list_filter(filter)?;
        let cursor = cursor.map(decode_cursor).transpose()?;

        with_tx!(self, |db_tx| {
            self.require_center(&db_tx, center_id, user_id).await?;

            let mut query = sessions::Entity::find()
                .filter(sessions::Column::CenterId.eq(center_id.to_string()))
                .order_by_desc(sessions::Column::ScheduledStart)
                .order_by_desc(sessions::Column::Id)
                .limit(limit + 1);

            if let Some(from) = filter.from {
                query = query.filter(sessions::Column::ScheduledStart.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(sessions::Column::ScheduledStart.lt(to));
            }
            if !filter.include_cancelled {
                query = query.filter(sessions::Column::IsCancelled.eq(false));
            }
            if let Some(cursor) = &cursor {
                query = query.filter(
                    Condition::any()
                        .add(sessions::Column::ScheduledStart.lt(cursor.scheduled_start))
                        .add(
                            Condition::all()
                                .add(sessions::Column::ScheduledStart.eq(cursor.scheduled_start))
                                .add(sessions::Column::Id.lt(cursor.session_id.clone())),
                        ),
                );
            }

            let mut models = query.all(&db_tx).await?;
            let has_more = models.len() as u64 > limit;
            if has_more {
                models.truncate(limit as usize);
            }

            let next_cursor = if has_more {
                match models.last() {
                    Some(last) => Some(encode_cursor(&SessionsCursor {
                        scheduled_start: last.scheduled_start,
                        session_id: last.id.clone(),
                    })?),
                    None => None,
                }
            } else {
                None
            };

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(WashSession::try_from(model)?);
            }
            Ok((out, next_cursor))
        })
    }
}

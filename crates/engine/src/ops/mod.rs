use std::sync::{Mutex, PoisonError};

use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, catalog::CatalogCache};

mod access;
mod catalog;
mod centers;
mod customers;
mod sessions;

pub use catalog::CatalogSnapshot;
pub use sessions::SessionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    catalog_cache: Mutex<CatalogCache>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn cache(&self) -> std::sync::MutexGuard<'_, CatalogCache> {
        self.catalog_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    catalog_ttl: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            catalog_ttl: Duration::seconds(60),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the catalog-cache TTL (default 60 seconds).
    pub fn catalog_ttl(mut self, ttl: Duration) -> EngineBuilder {
        self.catalog_ttl = ttl;
        self
    }

    /// Construct `Engine`, verifying the database connection.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
            catalog_cache: Mutex::new(CatalogCache::new(self.catalog_ttl)),
        })
    }
}

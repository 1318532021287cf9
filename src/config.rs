use std::fmt;
use std::sync::Arc;

use crate::handle::D1Database;

/// Connection options for the D1 driver.
///
/// The only required field is the `database` binding itself; the rest are
/// the generic knobs a host ORM forwards (entity list, synchronize flag,
/// logging flag, migration paths).
#[derive(Clone, Default)]
pub struct D1ConnectionOptions {
    /// The remote database binding supplied by the hosting runtime.
    pub database: Option<Arc<dyn D1Database>>,
    pub entities: Vec<String>,
    pub synchronize: bool,
    pub logging: bool,
    pub migrations: Vec<String>,
}

impl D1ConnectionOptions {
    #[must_use]
    pub fn new(database: Arc<dyn D1Database>) -> Self {
        D1ConnectionOptions {
            database: Some(database),
            ..D1ConnectionOptions::default()
        }
    }

    #[must_use]
    pub fn with_entities(mut self, entities: Vec<String>) -> Self {
        self.entities = entities;
        self
    }

    #[must_use]
    pub fn with_synchronize(mut self, synchronize: bool) -> Self {
        self.synchronize = synchronize;
        self
    }

    #[must_use]
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    #[must_use]
    pub fn with_migrations(mut self, migrations: Vec<String>) -> Self {
        self.migrations = migrations;
        self
    }
}

impl fmt::Debug for D1ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("D1ConnectionOptions")
            .field("database", &self.database.as_ref().map(|_| "<binding>"))
            .field("entities", &self.entities)
            .field("synchronize", &self.synchronize)
            .field("logging", &self.logging)
            .field("migrations", &self.migrations)
            .finish()
    }
}

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;

// Connection to the on-device SQLite database + type definitions for database types.

pub type DbError = sqlx::Error;
pub type DbPool = sqlx::SqlitePool;

pub type DatabaseConnectionRef = Arc<DatabaseConnection>;

pub struct DatabaseConnection {
    pool: DbPool,
}

impl DatabaseConnection {
    pub fn connect(url: &str) -> Result<Self, DbError> {
        Ok(Self {
            pool: SqlitePoolOptions::new().connect_lazy(url)?,
        })
    }

    #[cfg(test)]
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn as_pool(&self) -> &DbPool {
        &self.pool
    }
}

//! # mainote-db
//!
//! PostgreSQL storage layer for mainote.
//!
//! This crate provides:
//! - Connection pool management
//! - Parameterized SQL construction for the `notes` table
//! - The PostgreSQL [`NoteRepository`] implementation
//! - An in-memory repository behind the `mock` feature
//!
//! ## Example
//!
//! ```rust,ignore
//! use mainote_db::{Database, Note, NoteCategory, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/mainote").await?;
//!
//!     let mut note = Note::new("123456", "Buy milk", NoteCategory::Task);
//!     db.notes.create(&mut note).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod notes;
pub mod pool;
pub mod query;

#[cfg(feature = "mock")]
pub mod mock;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

use std::time::Duration;

// Re-export core types
pub use mainote_core::*;

pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Database handle bundling the pool and the repositories built on it.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for CRUD operations.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Override the per-call time budget of every repository.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.notes = PgNoteRepository::with_query_timeout(self.pool.clone(), timeout);
        self
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::store("run migrations", sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Round-trip a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("ping database", e))?;
        Ok(())
    }
}

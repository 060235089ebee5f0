//! Repository layer for database operations

pub mod visitors;

use std::sync::Arc;

use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::visitor::{NewVisitor, Visitor},
};

/// Persistence operations the visitor service depends on.
///
/// The exit operations return the number of rows they moved from `active`
/// to `exited`; zero means nothing matched.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VisitorStore: Send + Sync {
    /// Insert a new active record. A duplicate active entry code yields `AppError::Conflict`.
    async fn insert(&self, visitor: &NewVisitor) -> AppResult<()>;

    /// Active records, most recent `time_of_visit` first
    async fn list_active(&self) -> AppResult<Vec<Visitor>>;

    async fn exit_by_id(&self, id: Uuid, exit_time: NaiveDateTime) -> AppResult<u64>;

    async fn exit_by_credentials(
        &self,
        mobile_number: &str,
        entry_code: &str,
        exit_time: NaiveDateTime,
    ) -> AppResult<u64>;

    /// Round-trip to the store (readiness probe)
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the per-domain stores
#[derive(Clone)]
pub struct Repository {
    pub visitors: Arc<dyn VisitorStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            visitors: Arc::new(visitors::VisitorsRepository::new(pool)),
        }
    }
}

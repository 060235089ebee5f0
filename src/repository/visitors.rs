//! Visitors repository

use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::VisitorStore;
use crate::{
    error::{AppError, AppResult},
    models::visitor::{NewVisitor, Visitor},
};

#[derive(Clone)]
pub struct VisitorsRepository {
    pool: Pool<Postgres>,
}

impl VisitorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VisitorStore for VisitorsRepository {
    async fn insert(&self, visitor: &NewVisitor) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO visitors
                (id, visitor_name, mobile_number, apartment_number, vehicle_type,
                 vehicle_number, purpose, duration, time_of_visit, entry_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(visitor.id)
        .bind(&visitor.visitor_name)
        .bind(&visitor.mobile_number)
        .bind(&visitor.apartment_number)
        .bind(visitor.vehicle_type)
        .bind(&visitor.vehicle_number)
        .bind(&visitor.purpose)
        .bind(&visitor.duration)
        .bind(visitor.time_of_visit)
        .bind(&visitor.entry_code)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                "Entry code is already in use".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_active(&self) -> AppResult<Vec<Visitor>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT id, visitor_name, mobile_number, apartment_number, vehicle_type,
                   vehicle_number, purpose, duration, time_of_visit, entry_code,
                   exit_time, status
            FROM visitors
            WHERE status = 'active'
            ORDER BY time_of_visit DESC, id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    async fn exit_by_id(&self, id: Uuid, exit_time: NaiveDateTime) -> AppResult<u64> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            "UPDATE visitors SET status = 'exited', exit_time = $1 WHERE id = $2 AND status = 'active'",
        )
        .bind(exit_time)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    async fn exit_by_credentials(
        &self,
        mobile_number: &str,
        entry_code: &str,
        exit_time: NaiveDateTime,
    ) -> AppResult<u64> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            UPDATE visitors SET status = 'exited', exit_time = $1
            WHERE mobile_number = $2 AND entry_code = $3 AND status = 'active'
            "#,
        )
        .bind(exit_time)
        .bind(mobile_number)
        .bind(entry_code)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }
}

// src/db/stock_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stock::{StockBalance, StockMovement, StockMovementType},
};

#[derive(Clone, Default)]
pub struct StockRepository;

impl StockRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  MOVIMENTAÇÕES
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        movement_type: StockMovementType,
        egg_count: i32,
        movement_date: NaiveDate,
        financial_movement_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (user_id, movement_type, egg_count, movement_date, financial_movement_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(movement_type)
        .bind(egg_count)
        .bind(movement_date)
        .bind(financial_movement_id)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }

    pub async fn find_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(movement)
    }

    pub async fn delete_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM stock_movements WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::StockMovementNotFound);
        }
        Ok(())
    }

    pub async fn list_recent<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE user_id = $1
            ORDER BY movement_date DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(movements)
    }

    /// Entradas e saídas de um dia: `(in, out)`.
    pub async fn totals_on<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COALESCE(SUM(egg_count) FILTER (WHERE movement_type = 'in'), 0)::BIGINT,
                COALESCE(SUM(egg_count) FILTER (WHERE movement_type = 'out'), 0)::BIGINT
            FROM stock_movements
            WHERE user_id = $1 AND movement_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(executor)
        .await?;

        Ok(totals)
    }

    // =========================================================================
    //  SALDO
    // =========================================================================

    pub async fn get_balance<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<StockBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, StockBalance>(
            "SELECT * FROM stock_balance WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(balance)
    }

    /// Lê o saldo travando a linha até o fim da transação.
    pub async fn lock_balance<'e, E>(&self, executor: E, user_id: Uuid) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let egg_count = sqlx::query_scalar::<_, i32>(
            "SELECT egg_count FROM stock_balance WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(egg_count.unwrap_or(0))
    }

    // UPSERT atômico: soma o delta no próprio banco, sem ler antes
    pub async fn apply_delta<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        delta: i32,
    ) -> Result<StockBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, StockBalance>(
            r#"
            INSERT INTO stock_balance (user_id, egg_count)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
                SET egg_count = stock_balance.egg_count + EXCLUDED.egg_count,
                    updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(balance)
    }
}

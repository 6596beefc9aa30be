// src/db/finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{EGG_SALE_CATEGORY, FinancialBalance, FinancialMovement, FinancialMovementType},
};

/// Campos gravados de uma movimentação financeira (criação e atualização).
#[derive(Debug, Clone)]
pub struct FinancialMovementRecord<'a> {
    pub movement_type: FinancialMovementType,
    pub category: &'a str,
    pub amount: Decimal,
    pub movement_date: NaiveDate,
    pub payment_method: Option<&'a str>,
    pub contact: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  MOVIMENTAÇÕES
    // =========================================================================

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        record: &FinancialMovementRecord<'_>,
    ) -> Result<FinancialMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, FinancialMovement>(
            r#"
            INSERT INTO financial_movements
                (user_id, movement_type, category, amount, movement_date, payment_method, contact, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(record.movement_type)
        .bind(record.category)
        .bind(record.amount)
        .bind(record.movement_date)
        .bind(record.payment_method)
        .bind(record.contact)
        .bind(record.notes)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }

    pub async fn find_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<FinancialMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, FinancialMovement>(
            "SELECT * FROM financial_movements WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(movement)
    }

    pub async fn update_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
        record: &FinancialMovementRecord<'_>,
    ) -> Result<FinancialMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, FinancialMovement>(
            r#"
            UPDATE financial_movements
            SET movement_type = $3, category = $4, amount = $5, movement_date = $6,
                payment_method = $7, contact = $8, notes = $9
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(record.movement_type)
        .bind(record.category)
        .bind(record.amount)
        .bind(record.movement_date)
        .bind(record.payment_method)
        .bind(record.contact)
        .bind(record.notes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::FinancialMovementNotFound)
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
        let result = sqlx::query("DELETE FROM financial_movements WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::FinancialMovementNotFound);
        }
        Ok(())
    }

    pub async fn list_recent<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<FinancialMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, FinancialMovement>(
            r#"
            SELECT * FROM financial_movements
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

    // =========================================================================
    //  RELATÓRIOS (intervalo [start, end))
    // =========================================================================

    /// Receitas e despesas do período: `(incomes, expenses)`.
    pub async fn totals_between<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(Decimal, Decimal), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE movement_type = 'income'), 0),
                COALESCE(SUM(amount) FILTER (WHERE movement_type = 'expense'), 0)
            FROM financial_movements
            WHERE user_id = $1 AND movement_date >= $2 AND movement_date < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(executor)
        .await?;

        Ok(totals)
    }

    /// Vendas de ovos do período: valor total e ovos das saídas de estoque vinculadas.
    pub async fn egg_sales_between<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(Decimal, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, (Decimal, i64)>(
            r#"
            SELECT
                COALESCE(SUM(fm.amount), 0),
                COALESCE(SUM(linked.egg_count), 0)::BIGINT
            FROM financial_movements fm
            LEFT JOIN LATERAL (
                SELECT SUM(sm.egg_count) AS egg_count
                FROM stock_movements sm
                WHERE sm.financial_movement_id = fm.id
            ) linked ON TRUE
            WHERE fm.user_id = $1
              AND fm.movement_type = 'income'
              AND fm.category = $2
              AND fm.movement_date >= $3 AND fm.movement_date < $4
            "#,
        )
        .bind(user_id)
        .bind(EGG_SALE_CATEGORY)
        .bind(start)
        .bind(end)
        .fetch_one(executor)
        .await?;

        Ok(sales)
    }

    // =========================================================================
    //  SALDO
    // =========================================================================

    pub async fn get_balance<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<FinancialBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, FinancialBalance>(
            "SELECT * FROM financial_balance WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(balance)
    }

    pub async fn apply_delta<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        delta: Decimal,
    ) -> Result<FinancialBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, FinancialBalance>(
            r#"
            INSERT INTO financial_balance (user_id, balance)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
                SET balance = financial_balance.balance + EXCLUDED.balance,
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

// src/services/finance_service.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, FinancialMovementRecord},
    models::{
        finance::{
            CreateFinancialMovementPayload, EggSalesSummary, FinancialBalance, FinancialMovement,
            FinancialSummary, UpdateFinancialMovementPayload,
        },
        patched,
    },
};

/// Primeiro dia do mês e primeiro dia do mês seguinte (intervalo semiaberto).
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::InvalidPeriod(format!("{}-{:02}", year, month)))?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| AppError::InvalidPeriod(format!("{}-{:02}", year, month)))?;
    Ok((start, end))
}

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    pub async fn get_balance<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<FinancialBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Ok(self
            .repo
            .get_balance(executor, user_id)
            .await?
            .unwrap_or_else(|| FinancialBalance::empty(user_id)))
    }

    /// Usado no cadastro: garante a linha de saldo zerada.
    pub async fn init_balance<'e, E>(&self, executor: E, user_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.apply_delta(executor, user_id, Decimal::ZERO).await?;
        Ok(())
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<FinancialMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_recent(executor, user_id, limit).await
    }

    /// Grava a movimentação e aplica o valor com sinal no saldo, na mesma transação.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        record: &FinancialMovementRecord<'_>,
    ) -> Result<FinancialMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let movement = self.repo.insert_movement(&mut *tx, user_id, record).await?;
        self.repo
            .apply_delta(&mut *tx, user_id, movement.movement_type.signed(movement.amount))
            .await?;

        tx.commit().await?;

        Ok(movement)
    }

    pub async fn create_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: &CreateFinancialMovementPayload,
    ) -> Result<FinancialMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let record = FinancialMovementRecord {
            movement_type: payload.movement_type,
            category: &payload.category,
            amount: payload.amount,
            movement_date: payload.movement_date,
            payment_method: payload.payment_method.as_deref(),
            contact: payload.contact.as_deref(),
            notes: payload.notes.as_deref(),
        };
        self.record_movement(executor, user_id, &record).await
    }

    /// Atualiza e aplica no saldo só a diferença entre o valor novo e o antigo.
    pub async fn update_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
        payload: &UpdateFinancialMovementPayload,
    ) -> Result<FinancialMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let old = self
            .repo
            .find_movement(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::FinancialMovementNotFound)?;

        let record = FinancialMovementRecord {
            movement_type: payload.movement_type.unwrap_or(old.movement_type),
            category: payload.category.as_deref().unwrap_or(&old.category),
            amount: payload.amount.unwrap_or(old.amount),
            movement_date: payload.movement_date.unwrap_or(old.movement_date),
            payment_method: patched(&payload.payment_method, &old.payment_method),
            contact: patched(&payload.contact, &old.contact),
            notes: patched(&payload.notes, &old.notes),
        };

        let updated = self.repo.update_movement(&mut *tx, user_id, id, &record).await?;

        let delta = updated.movement_type.signed(updated.amount) - old.movement_type.signed(old.amount);
        if !delta.is_zero() {
            self.repo.apply_delta(&mut *tx, user_id, delta).await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    /// Remove e desfaz o efeito no saldo. Uma saída de estoque vinculada perde o vínculo (FK).
    pub async fn delete_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<FinancialMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let old = self
            .repo
            .find_movement(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::FinancialMovementNotFound)?;

        self.repo.delete_movement(&mut *tx, user_id, id).await?;
        self.repo
            .apply_delta(&mut *tx, user_id, -old.movement_type.signed(old.amount))
            .await?;

        tx.commit().await?;

        Ok(old)
    }

    pub async fn monthly_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<FinancialSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (start, end) = month_bounds(year, month)?;

        let mut tx = executor.begin().await?;
        let (incomes, expenses) = self.repo.totals_between(&mut *tx, user_id, start, end).await?;
        let (sales_total, egg_count) = self
            .repo
            .egg_sales_between(&mut *tx, user_id, start, end)
            .await?;
        tx.commit().await?;

        Ok(FinancialSummary {
            year: start.year(),
            month: start.month(),
            incomes,
            expenses,
            net: incomes - expenses,
            egg_sales: EggSalesSummary {
                total: sales_total,
                egg_count,
            },
        })
    }

    /// Receitas e despesas do mês de `date` (usado no dashboard).
    pub async fn month_totals<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<(Decimal, Decimal), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (start, end) = month_bounds(date.year(), date.month())?;
        self.repo.totals_between(executor, user_id, start, end).await
    }
}

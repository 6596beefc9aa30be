// src/services/stock_service.rs

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinancialMovementRecord, StockRepository},
    models::{
        auth::User,
        MAX_AMOUNT,
        finance::{DEFAULT_PAYMENT_METHOD, EGG_SALE_CATEGORY, FinancialMovementType},
        stock::{CreateStockMovementPayload, StockBalance, StockMovement, StockMovementType},
    },
    services::finance_service::FinanceService,
};

/// Valor de uma venda: o preço é por dúzia. Arredonda em 2 casas (metade para longe do zero).
pub fn calculate_egg_sale_amount(egg_count: i32, egg_price_per_dozen: Decimal) -> Decimal {
    (Decimal::from(egg_count) * egg_price_per_dozen / Decimal::from(12))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Valor da venda, recusado se não cabe numa movimentação financeira.
fn egg_sale_amount(egg_count: i32, egg_price_per_dozen: Decimal) -> Result<Decimal, AppError> {
    let amount = calculate_egg_sale_amount(egg_count, egg_price_per_dozen);
    if amount > MAX_AMOUNT {
        let mut err = validator::ValidationError::new("range");
        err.message = Some("Valor da venda passa do limite de uma movimentação.".into());
        let mut errors = validator::ValidationErrors::new();
        errors.add("egg_count", err);
        return Err(AppError::ValidationError(errors));
    }
    Ok(amount)
}

#[derive(Clone)]
pub struct StockService {
    repo: StockRepository,
    finance_service: FinanceService,
}

impl StockService {
    pub fn new(repo: StockRepository, finance_service: FinanceService) -> Self {
        Self {
            repo,
            finance_service,
        }
    }

    pub async fn get_balance<'e, E>(&self, executor: E, user_id: Uuid) -> Result<StockBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Ok(self
            .repo
            .get_balance(executor, user_id)
            .await?
            .unwrap_or_else(|| StockBalance::empty(user_id)))
    }

    pub async fn init_balance<'e, E>(&self, executor: E, user_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.apply_delta(executor, user_id, 0).await?;
        Ok(())
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_recent(executor, user_id, limit).await
    }

    pub async fn totals_on<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.totals_on(executor, user_id, date).await
    }

    /// Grava a movimentação e aplica o delta no saldo.
    ///
    /// Com `enforce_available`, uma saída maior que o saldo falha com
    /// `InsufficientStock` (o saldo é lido com `FOR UPDATE`). As movimentações
    /// compensatórias de coletas passam `false`: precisam entrar sempre.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        movement_type: StockMovementType,
        egg_count: i32,
        movement_date: NaiveDate,
        financial_movement_id: Option<Uuid>,
        notes: Option<&str>,
        enforce_available: bool,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if enforce_available && movement_type == StockMovementType::Out {
            let available = self.repo.lock_balance(&mut *tx, user_id).await?;
            if egg_count > available {
                return Err(AppError::InsufficientStock {
                    available,
                    requested: egg_count,
                });
            }
        }

        let movement = self
            .repo
            .insert_movement(
                &mut *tx,
                user_id,
                movement_type,
                egg_count,
                movement_date,
                financial_movement_id,
                notes,
            )
            .await?;

        self.repo
            .apply_delta(&mut *tx, user_id, movement_type.signed(egg_count))
            .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Movimentação manual (POST /api/stock/movements). Uma saída com
    /// `createFinancialRecord` gera antes a receita "Venda de ovos" e guarda o vínculo.
    pub async fn create_movement<'e, E>(
        &self,
        executor: E,
        user: &User,
        payload: &CreateStockMovementPayload,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Checa o saldo antes de lançar a receita; a trava vale até o commit
        if payload.movement_type == StockMovementType::Out {
            let available = self.repo.lock_balance(&mut *tx, user.id).await?;
            if payload.egg_count > available {
                return Err(AppError::InsufficientStock {
                    available,
                    requested: payload.egg_count,
                });
            }
        }

        let financial_movement_id =
            if payload.movement_type == StockMovementType::Out && payload.create_financial_record {
                let notes = format!("{} ovos", payload.egg_count);
                let record = FinancialMovementRecord {
                    movement_type: FinancialMovementType::Income,
                    category: EGG_SALE_CATEGORY,
                    amount: egg_sale_amount(payload.egg_count, user.egg_price)?,
                    movement_date: payload.movement_date,
                    payment_method: Some(
                        payload
                            .payment_method
                            .as_deref()
                            .unwrap_or(DEFAULT_PAYMENT_METHOD),
                    ),
                    contact: payload.contact.as_deref(),
                    notes: Some(&notes),
                };
                let income = self
                    .finance_service
                    .record_movement(&mut *tx, user.id, &record)
                    .await?;
                tracing::info!(
                    "Venda de {} ovos registrada como receita {}",
                    payload.egg_count,
                    income.id
                );
                Some(income.id)
            } else {
                None
            };

        let movement = self
            .record_movement(
                &mut *tx,
                user.id,
                payload.movement_type,
                payload.egg_count,
                payload.movement_date,
                financial_movement_id,
                payload.notes.as_deref(),
                false,
            )
            .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Remove a movimentação e desfaz o efeito no saldo. A receita vinculada sai junto.
    pub async fn delete_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let movement = self
            .repo
            .find_movement(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::StockMovementNotFound)?;

        self.repo.delete_movement(&mut *tx, user_id, id).await?;
        self.repo
            .apply_delta(&mut *tx, user_id, -movement.movement_type.signed(movement.egg_count))
            .await?;

        if let Some(financial_movement_id) = movement.financial_movement_id {
            self.finance_service
                .delete_movement(&mut *tx, user_id, financial_movement_id)
                .await?;
        }

        tx.commit().await?;

        Ok(movement)
    }
}

// src/services/farm_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FarmRepository, UserRepository},
    models::farm::{FarmInfo, HenCountHistory, HenCountUpdateResponse},
};

pub const DEFAULT_HEN_COUNT_REASON: &str = "Atualização manual";

#[derive(Clone)]
pub struct FarmService {
    repo: FarmRepository,
    user_repo: UserRepository,
}

impl FarmService {
    pub fn new(repo: FarmRepository, user_repo: UserRepository) -> Self {
        Self { repo, user_repo }
    }

    /// Troca o plantel e registra a foto no histórico, na mesma transação.
    pub async fn update_hen_count<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        hen_count: i32,
        reason: Option<&str>,
    ) -> Result<HenCountUpdateResponse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let user = self.user_repo.update_hen_count(&mut *tx, user_id, hen_count).await?;
        let history = self
            .repo
            .insert_hen_count_history(
                &mut *tx,
                user_id,
                hen_count,
                Some(reason.unwrap_or(DEFAULT_HEN_COUNT_REASON)),
            )
            .await?;

        tx.commit().await?;

        Ok(HenCountUpdateResponse {
            history,
            current_hen_count: user.hen_count,
        })
    }

    pub async fn update_egg_price<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        egg_price: Decimal,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = self.user_repo.update_egg_price(executor, user_id, egg_price).await?;
        Ok(user.egg_price)
    }

    pub async fn update_farm_name<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        farm_name: &str,
    ) -> Result<FarmInfo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = self.user_repo.update_farm_name(executor, user_id, farm_name).await?;
        Ok(FarmInfo::from(&user))
    }

    pub async fn hen_count_history<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<HenCountHistory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_hen_count_history(executor, user_id, limit).await
    }
}

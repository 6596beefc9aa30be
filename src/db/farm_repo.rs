// src/db/farm_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::farm::HenCountHistory};

// Histórico do plantel. Os dados "vivos" da granja ficam na tabela users.
#[derive(Clone, Default)]
pub struct FarmRepository;

impl FarmRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_hen_count_history<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        hen_count: i32,
        reason: Option<&str>,
    ) -> Result<HenCountHistory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let history = sqlx::query_as::<_, HenCountHistory>(
            r#"
            INSERT INTO hen_count_history (user_id, hen_count, reason)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(hen_count)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(history)
    }

    pub async fn list_hen_count_history<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<HenCountHistory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let history = sqlx::query_as::<_, HenCountHistory>(
            r#"
            SELECT * FROM hen_count_history
            WHERE user_id = $1
            ORDER BY change_date DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(history)
    }
}

// src/db/collection_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::collection::{CollectionPeriod, EggCollection},
};

#[derive(Clone, Default)]
pub struct CollectionRepository;

impl CollectionRepository {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        collection_date: NaiveDate,
        period: CollectionPeriod,
        egg_count: i32,
        posture_percentage: Decimal,
        notes: Option<&str>,
    ) -> Result<EggCollection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let collection = sqlx::query_as::<_, EggCollection>(
            r#"
            INSERT INTO egg_collections
                (user_id, collection_date, period, egg_count, posture_percentage, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(collection_date)
        .bind(period)
        .bind(egg_count)
        .bind(posture_percentage)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(collection)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<EggCollection>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let collection = sqlx::query_as::<_, EggCollection>(
            "SELECT * FROM egg_collections WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(collection)
    }

    // Grava a linha inteira; quem decide os valores finais é o service
    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
        collection_date: NaiveDate,
        period: CollectionPeriod,
        egg_count: i32,
        posture_percentage: Option<Decimal>,
        notes: Option<&str>,
    ) -> Result<EggCollection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EggCollection>(
            r#"
            UPDATE egg_collections
            SET collection_date = $3, period = $4, egg_count = $5,
                posture_percentage = $6, notes = $7, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(collection_date)
        .bind(period)
        .bind(egg_count)
        .bind(posture_percentage)
        .bind(notes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::CollectionNotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM egg_collections WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CollectionNotFound);
        }
        Ok(())
    }

    pub async fn list_recent<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<EggCollection>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let collections = sqlx::query_as::<_, EggCollection>(
            r#"
            SELECT * FROM egg_collections
            WHERE user_id = $1
            ORDER BY collection_date DESC, period DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(collections)
    }

    pub async fn list_by_date<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<EggCollection>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let collections = sqlx::query_as::<_, EggCollection>(
            r#"
            SELECT * FROM egg_collections
            WHERE user_id = $1 AND collection_date = $2
            ORDER BY period ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(executor)
        .await?;

        Ok(collections)
    }
}

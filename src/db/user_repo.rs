// src/db/user_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

// Nome da constraint UNIQUE da coluna username (ver migrations)
const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'.
// A tabela não tem RLS: as buscas do login e do middleware usam a pool direto.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário, com tratamento específico para username duplicado
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        password_hash: &str,
        name: &str,
        farm_name: &str,
        hen_count: i32,
        egg_price: Decimal,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, name, farm_name, hen_count, egg_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(name)
        .bind(farm_name)
        .bind(hen_count)
        .bind(egg_price)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        username: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET name = $2, username = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(username)
        .fetch_optional(executor)
        .await
        .map_err(map_unique_violation)?
        .ok_or(AppError::UserNotFound)
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    pub async fn update_hen_count<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        hen_count: i32,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            "UPDATE users SET hen_count = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(hen_count)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::UserNotFound)
    }

    pub async fn update_egg_price<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        egg_price: Decimal,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            "UPDATE users SET egg_price = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(egg_price)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::UserNotFound)
    }

    pub async fn update_farm_name<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        farm_name: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            "UPDATE users SET farm_name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(farm_name)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::UserNotFound)
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_UNIQUE_CONSTRAINT) {
            return AppError::UsernameAlreadyExists;
        }
    }
    e.into()
}

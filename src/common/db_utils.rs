use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define `app.user_id` (a "chave" das políticas RLS).
/// O `set_config(..., true)` vale só até o commit/rollback, então a conexão
/// volta limpa para a pool.
pub(crate) async fn get_rls_transaction(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = app_state.db_pool.begin().await?;

    set_rls_user(&mut *tx, user.0.id).await?;

    Ok(tx)
}

/// Define o usuário da transação corrente. Usado também no registro, antes
/// de existir um `AuthenticatedUser`.
pub(crate) async fn set_rls_user(
    conn: &mut sqlx::PgConnection,
    user_id: uuid::Uuid,
) -> Result<(), AppError> {
    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user_id.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

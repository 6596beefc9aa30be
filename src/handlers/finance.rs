// src/handlers/finance.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Datelike;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_transaction,
        error::{ApiError, AppError},
        extract::{Json, Path, Query},
    },
    config::AppState,
    handlers::today,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        ListQuery,
        finance::{
            CreateFinancialMovementPayload, FinancialBalance, FinancialMovement, FinancialSummary,
            SummaryQuery, UpdateFinancialMovementPayload,
        },
    },
};

// GET /api/financial/balance
#[utoipa::path(
    get,
    path = "/api/financial/balance",
    tag = "Financial",
    responses(
        (status = 200, description = "Saldo financeiro atual", body = FinancialBalance)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_balance(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let balance = app_state
        .finance_service
        .get_balance(&mut *tx, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(balance)))
}

// GET /api/financial/movements
#[utoipa::path(
    get,
    path = "/api/financial/movements",
    tag = "Financial",
    params(ListQuery),
    responses(
        (status = 200, description = "Movimentações mais recentes", body = Vec<FinancialMovement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movements = app_state
        .finance_service
        .list_movements(&mut *tx, user.0.id, query.limit())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movements)))
}

// POST /api/financial/movements
#[utoipa::path(
    post,
    path = "/api/financial/movements",
    tag = "Financial",
    request_body = CreateFinancialMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada e saldo atualizado", body = FinancialMovement),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateFinancialMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .finance_service
        .create_movement(&mut *tx, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// PUT /api/financial/movements/{id}
#[utoipa::path(
    put,
    path = "/api/financial/movements/{id}",
    tag = "Financial",
    request_body = UpdateFinancialMovementPayload,
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Movimentação atualizada", body = FinancialMovement),
        (status = 404, description = "Movimentação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFinancialMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .finance_service
        .update_movement(&mut *tx, user.0.id, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movement)))
}

// DELETE /api/financial/movements/{id}
#[utoipa::path(
    delete,
    path = "/api/financial/movements/{id}",
    tag = "Financial",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 204, description = "Movimentação removida e saldo revertido"),
        (status = 404, description = "Movimentação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .finance_service
        .delete_movement(&mut *tx, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/financial/summary?year=2025&month=3
#[utoipa::path(
    get,
    path = "/api/financial/summary",
    tag = "Financial",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Resumo do mês (padrão: mês atual)", body = FinancialSummary),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let now = today();
    let year = query.year.unwrap_or(now.year());
    let month = query.month.unwrap_or(now.month());

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .finance_service
        .monthly_summary(&mut *tx, user.0.id, year, month)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

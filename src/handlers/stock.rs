// src/handlers/stock.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_transaction,
        error::{ApiError, AppError},
        extract::{Json, Path, Query},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        ListQuery,
        stock::{CreateStockMovementPayload, StockBalance, StockMovement},
    },
};

// GET /api/stock/balance
#[utoipa::path(
    get,
    path = "/api/stock/balance",
    tag = "Stock",
    responses(
        (status = 200, description = "Saldo atual de ovos", body = StockBalance)
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
        .stock_service
        .get_balance(&mut *tx, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(balance)))
}

// GET /api/stock/movements
#[utoipa::path(
    get,
    path = "/api/stock/movements",
    tag = "Stock",
    params(ListQuery),
    responses(
        (status = 200, description = "Movimentações mais recentes", body = Vec<StockMovement>)
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
        .stock_service
        .list_movements(&mut *tx, user.0.id, query.limit())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movements)))
}

// POST /api/stock/movements
#[utoipa::path(
    post,
    path = "/api/stock/movements",
    tag = "Stock",
    request_body = CreateStockMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = StockMovement),
        (status = 400, description = "Dados inválidos ou estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateStockMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .stock_service
        .create_movement(&mut *tx, &user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// DELETE /api/stock/movements/{id}
#[utoipa::path(
    delete,
    path = "/api/stock/movements/{id}",
    tag = "Stock",
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
        .stock_service
        .delete_movement(&mut *tx, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

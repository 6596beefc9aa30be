// src/handlers/farm.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_transaction,
        error::{ApiError, AppError},
        extract::{Json, Query},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        ListQuery,
        farm::{
            EggPriceResponse, FarmInfo, HenCountHistory, HenCountUpdateResponse,
            UpdateEggPricePayload, UpdateFarmPayload, UpdateHenCountPayload,
        },
    },
};

// GET /api/farm
#[utoipa::path(
    get,
    path = "/api/farm",
    tag = "Farm",
    responses(
        (status = 200, description = "Dados da granja", body = FarmInfo)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_farm(AuthenticatedUser(user): AuthenticatedUser) -> Json<FarmInfo> {
    Json(FarmInfo::from(&user))
}

// PUT /api/farm
#[utoipa::path(
    put,
    path = "/api/farm",
    tag = "Farm",
    request_body = UpdateFarmPayload,
    responses(
        (status = 200, description = "Nome da granja atualizado", body = FarmInfo),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_farm(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateFarmPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let farm = app_state
        .farm_service
        .update_farm_name(&mut *tx, user.0.id, &payload.farm_name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(farm)))
}

// PUT /api/farm/hen-count
#[utoipa::path(
    put,
    path = "/api/farm/hen-count",
    tag = "Farm",
    request_body = UpdateHenCountPayload,
    responses(
        (status = 200, description = "Plantel atualizado e registrado no histórico", body = HenCountUpdateResponse),
        (status = 400, description = "Número de galinhas inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_hen_count(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateHenCountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .farm_service
        .update_hen_count(&mut *tx, user.0.id, payload.hen_count, payload.reason.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(response)))
}

// PUT /api/farm/egg-price
#[utoipa::path(
    put,
    path = "/api/farm/egg-price",
    tag = "Farm",
    request_body = UpdateEggPricePayload,
    responses(
        (status = 200, description = "Preço da dúzia atualizado", body = EggPriceResponse),
        (status = 400, description = "Preço inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_egg_price(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateEggPricePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let egg_price = app_state
        .farm_service
        .update_egg_price(&mut *tx, user.0.id, payload.egg_price)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(EggPriceResponse { egg_price })))
}

// GET /api/hen-count-history
#[utoipa::path(
    get,
    path = "/api/hen-count-history",
    tag = "Farm",
    params(ListQuery),
    responses(
        (status = 200, description = "Alterações do plantel, mais recentes primeiro", body = Vec<HenCountHistory>)
    ),
    security(("api_jwt" = []))
)]
pub async fn hen_count_history(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let history = app_state
        .farm_service
        .hen_count_history(&mut *tx, user.0.id, query.limit())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(history)))
}

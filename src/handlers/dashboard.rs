// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        db_utils::get_rls_transaction,
        error::{ApiError, AppError},
        extract::{Json, Query},
    },
    config::AppState,
    handlers::today,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{collection::DateQuery, dashboard::DashboardStats},
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    params(DateQuery),
    responses(
        (status = 200, description = "Coleta do dia, estoque, financeiro do mês e granja", body = DashboardStats),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let date = query.date.unwrap_or_else(today);

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let stats = app_state
        .dashboard_service
        .get_stats(&mut *tx, &user.0, date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}

// src/handlers/collections.rs

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
    handlers::today,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        ListQuery,
        collection::{
            CreateCollectionPayload, DateQuery, EggCollection, TodayCollectionsResponse,
            UpdateCollectionPayload,
        },
    },
};

// GET /api/collections
#[utoipa::path(
    get,
    path = "/api/collections",
    tag = "Collections",
    params(ListQuery),
    responses(
        (status = 200, description = "Coletas mais recentes", body = Vec<EggCollection>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_collections(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let collections = app_state
        .collection_service
        .list(&mut *tx, user.0.id, query.limit())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(collections)))
}

// GET /api/collections/today
#[utoipa::path(
    get,
    path = "/api/collections/today",
    tag = "Collections",
    params(DateQuery),
    responses(
        (status = 200, description = "Coletas do dia e totais por turno", body = TodayCollectionsResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn today_collections(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let date = query.date.unwrap_or_else(today);

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (collections, summary) = app_state
        .collection_service
        .for_day(&mut *tx, &user.0, date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(TodayCollectionsResponse {
            collections,
            summary,
        }),
    ))
}

// POST /api/collections
#[utoipa::path(
    post,
    path = "/api/collections",
    tag = "Collections",
    request_body = CreateCollectionPayload,
    responses(
        (status = 201, description = "Coleta registrada e ovos lançados no estoque", body = EggCollection),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_collection(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCollectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let collection = app_state
        .collection_service
        .create(&mut *tx, &user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(collection)))
}

// PUT /api/collections/{id}
#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    tag = "Collections",
    request_body = UpdateCollectionPayload,
    params(("id" = Uuid, Path, description = "ID da coleta")),
    responses(
        (status = 200, description = "Coleta atualizada (diferença lançada no estoque)", body = EggCollection),
        (status = 404, description = "Coleta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_collection(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCollectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let collection = app_state
        .collection_service
        .update(&mut *tx, &user.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(collection)))
}

// DELETE /api/collections/{id}
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    tag = "Collections",
    params(("id" = Uuid, Path, description = "ID da coleta")),
    responses(
        (status = 204, description = "Coleta excluída (ovos retirados do estoque)"),
        (status = 404, description = "Coleta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_collection(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .collection_service
        .delete(&mut *tx, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

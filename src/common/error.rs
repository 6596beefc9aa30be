// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio e de infraestrutura. Os handlers convertem para ApiError
// com `to_api_error`, que escolhe o status HTTP e traduz a mensagem.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Coleta não encontrada")]
    CollectionNotFound,

    #[error("Movimentação de estoque não encontrada")]
    StockMovementNotFound,

    #[error("Movimentação financeira não encontrada")]
    FinancialMovementNotFound,

    #[error("Estoque insuficiente ({available} disponíveis, {requested} solicitados)")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Período inválido: {0}")]
    InvalidPeriod(String),

    // Corpo, query ou path que nem chegou a ser desserializado
    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` carrega o contexto de falhas inesperadas.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Corpo de erro devolvido ao cliente: `{ "message": ..., "errors": { campo: [..] } }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl AppError {
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        let (status, message) = match &self {
            AppError::ValidationError(errors) => {
                let mut details = BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    message: i18n.translate(lang, "validation_failed"),
                    errors: Some(details),
                };
            }
            AppError::UsernameAlreadyExists => {
                (StatusCode::CONFLICT, i18n.translate(lang, "username_taken"))
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                i18n.translate(lang, "invalid_credentials"),
            ),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, i18n.translate(lang, "unauthorized")),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, i18n.translate(lang, "user_not_found")),
            AppError::CollectionNotFound => (
                StatusCode::NOT_FOUND,
                i18n.translate(lang, "collection_not_found"),
            ),
            AppError::StockMovementNotFound => (
                StatusCode::NOT_FOUND,
                i18n.translate(lang, "stock_movement_not_found"),
            ),
            AppError::FinancialMovementNotFound => (
                StatusCode::NOT_FOUND,
                i18n.translate(lang, "financial_movement_not_found"),
            ),
            AppError::InsufficientStock { available, requested } => (
                StatusCode::BAD_REQUEST,
                i18n.translate_with(
                    lang,
                    "insufficient_stock",
                    &[
                        ("available", available.to_string()),
                        ("requested", requested.to_string()),
                    ],
                ),
            ),
            AppError::InvalidPeriod(detail) => (
                StatusCode::BAD_REQUEST,
                i18n.translate_with(lang, "invalid_period", &[("detail", detail.clone())]),
            ),
            AppError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                i18n.translate_with(lang, "invalid_request", &[("detail", detail.clone())]),
            ),

            // Estouro de INTEGER/NUMERIC no banco (SQLSTATE 22003), ex.: saldo acumulado
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("22003") =>
            {
                tracing::warn!("Valor fora do limite da coluna: {}", db_err.message());
                (
                    StatusCode::BAD_REQUEST,
                    i18n.translate(lang, "value_out_of_range"),
                )
            }

            // Todo o resto (banco, bcrypt, jwt, anyhow) vira 500 com mensagem genérica.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    i18n.translate(lang, "internal_error"),
                )
            }
        };

        ApiError::new(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::{ValidationError, ValidationErrors};

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn not_found_variants_map_to_404() {
        let store = I18nStore::load().unwrap();
        for err in [
            AppError::UserNotFound,
            AppError::CollectionNotFound,
            AppError::StockMovementNotFound,
            AppError::FinancialMovementNotFound,
        ] {
            assert_eq!(err.to_api_error(&pt(), &store).status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn auth_failures_map_to_401() {
        let store = I18nStore::load().unwrap();
        let api = AppError::InvalidToken.to_api_error(&pt(), &store);
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api.message, "Não autorizado");

        let api = AppError::InvalidCredentials.to_api_error(&pt(), &store);
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn duplicate_username_is_409() {
        let store = I18nStore::load().unwrap();
        let api = AppError::UsernameAlreadyExists.to_api_error(&pt(), &store);
        assert_eq!(api.status, StatusCode::CONFLICT);
    }

    #[test]
    fn database_errors_hide_details() {
        let store = I18nStore::load().unwrap();
        let api = AppError::DatabaseError(sqlx::Error::RowNotFound)
            .to_api_error(&Locale("en".to_string()), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Internal server error");
        assert!(api.errors.is_none());
    }

    #[test]
    fn insufficient_stock_is_400_with_counts() {
        let store = I18nStore::load().unwrap();
        let api = AppError::InsufficientStock {
            available: 5,
            requested: 12,
        }
        .to_api_error(&pt(), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.message.contains("5 ovos disponíveis"));
        assert!(api.message.contains("12 solicitados"));
    }

    #[test]
    fn malformed_requests_are_400() {
        let store = I18nStore::load().unwrap();
        let api = AppError::BadRequest("expected i32".to_string())
            .to_api_error(&Locale("en".to_string()), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Invalid request: expected i32");
    }

    #[tokio::test]
    async fn validation_errors_list_every_field() {
        let store = I18nStore::load().unwrap();
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("Senha deve ter pelo menos 6 caracteres".into());
        errors.add("password", err);
        errors.add("username", ValidationError::new("length"));

        let response = AppError::ValidationError(errors)
            .to_api_error(&pt(), &store)
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Um ou mais campos são inválidos.");
        assert_eq!(
            json["errors"]["password"][0],
            "Senha deve ter pelo menos 6 caracteres"
        );
        assert_eq!(json["errors"]["username"][0], "length");
    }
}

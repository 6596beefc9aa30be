// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

/// Cookie HttpOnly com o mesmo JWT devolvido no login.
pub const SESSION_COOKIE: &str = "avicultura_session";

// Só "Bearer <token>" conta; outros esquemas caem no cookie
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// O guardião das rotas protegidas: aceita "Authorization: Bearer" ou o cookie de sessão
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .map(str::to_owned)
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()))
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .auth_service
        .validate_token(&token)
        .await
        .map_err(|e| match e {
            // Token válido de um usuário que não existe mais
            AppError::UserNotFound => AppError::InvalidToken,
            other => other,
        })
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            // Rota protegida montada sem o auth_guard
            .ok_or_else(|| {
                let locale = Locale::from_headers(&parts.headers);
                AppError::InvalidToken.to_api_error(&locale, &state.i18n_store)
            })
    }
}

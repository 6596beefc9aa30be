// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_transaction,
        error::{ApiError, AppError},
        extract::Json,
    },
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, SESSION_COOKIE},
        i18n::Locale,
    },
    models::auth::{
        AuthResponse, ChangePasswordPayload, LoginUserPayload, MessageResponse,
        RegisterUserPayload, UpdateProfilePayload, User,
    },
};

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

// POST /api/register
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado (também define o cookie de sessão)", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome de usuário já existe")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (token, user) = app_state
        .auth_service
        .register_user(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let jar = jar.add(session_cookie(
        token.clone(),
        app_state.config.session_cookie_secure,
    ));

    Ok((StatusCode::CREATED, jar, Json(AuthResponse { token, user })))
}

// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado (também define o cookie de sessão)", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let jar = jar.add(session_cookie(
        token.clone(),
        app_state.config.session_cookie_secure,
    ));

    Ok((StatusCode::OK, jar, Json(AuthResponse { token, user })))
}

// POST /api/logout
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Cookie de sessão removido")
    )
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    // Sempre devolve o cookie expirado, mesmo que o cliente não tenha mandado o original
    let mut expired = Cookie::build((SESSION_COOKIE, "")).path("/").http_only(true).build();
    expired.make_removal();
    (StatusCode::NO_CONTENT, jar.add(expired))
}

// GET /api/user
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário logado", body = User),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// PUT /api/user
#[utoipa::path(
    put,
    path = "/api/user",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome de usuário já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .auth_service
        .update_profile(&mut *tx, user.0.id, &payload.name, &payload.username)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

// PUT /api/user/password
#[utoipa::path(
    put,
    path = "/api/user/password",
    tag = "Users",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada", body = MessageResponse),
        (status = 400, description = "Senha atual incorreta ou nova senha inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = get_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .change_password(&mut *tx, &user.0, &payload.current_password, &payload.new_password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "password_updated");
    Ok((StatusCode::OK, Json(MessageResponse { message })))
}

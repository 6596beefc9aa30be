// src/routes.rs

use axum::{
    Json, Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    // Rotas protegidas pelo middleware (Bearer ou cookie de sessão)
    let protected_routes = Router::new()
        .route(
            "/user",
            get(handlers::auth::get_me).put(handlers::auth::update_me),
        )
        .route("/user/password", put(handlers::auth::change_password))
        .route(
            "/collections",
            get(handlers::collections::list_collections)
                .post(handlers::collections::create_collection),
        )
        .route(
            "/collections/today",
            get(handlers::collections::today_collections),
        )
        .route(
            "/collections/{id}",
            put(handlers::collections::update_collection)
                .delete(handlers::collections::delete_collection),
        )
        .route("/stock/balance", get(handlers::stock::get_balance))
        .route(
            "/stock/movements",
            get(handlers::stock::list_movements).post(handlers::stock::create_movement),
        )
        .route(
            "/stock/movements/{id}",
            delete(handlers::stock::delete_movement),
        )
        .route("/financial/balance", get(handlers::finance::get_balance))
        .route(
            "/financial/movements",
            get(handlers::finance::list_movements).post(handlers::finance::create_movement),
        )
        .route(
            "/financial/movements/{id}",
            put(handlers::finance::update_movement).delete(handlers::finance::delete_movement),
        )
        .route("/financial/summary", get(handlers::finance::get_summary))
        .route(
            "/farm",
            get(handlers::farm::get_farm).put(handlers::farm::update_farm),
        )
        .route("/farm/hen-count", put(handlers::farm::update_hen_count))
        .route("/farm/egg-price", put(handlers::farm::update_egg_price))
        .route("/hen-count-history", get(handlers::farm::hen_count_history))
        .route("/dashboard/stats", get(handlers::dashboard::get_stats))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api", auth_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lazy_state;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    // Pool preguiçosa: nenhuma destas rotas chega a abrir conexão
    fn app() -> Router {
        build_router(lazy_state())
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_without_token_is_401() {
        let response = app()
            .oneshot(Request::get("/api/dashboard/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Não autorizado");
    }

    #[tokio::test]
    async fn garbage_bearer_token_is_401_in_english() {
        let request = Request::get("/api/collections")
            .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn garbage_session_cookie_is_401() {
        let request = Request::get("/api/stock/balance")
            .header(header::COOKIE, "avicultura_session=lixo")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_register_payload_is_400_with_field_errors() {
        let request = Request::post("/api/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username":"ab","password":"123","name":"Jo","farmName":"Granja"}"#,
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["errors"]["username"].is_array());
        assert!(body["errors"]["password"].is_array());
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_400_json() {
        let request = Request::post("/api/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username":"maria","password":"123456","name":"Maria","farmName":"Granja","henCount":"muitas","eggPrice":10}"#,
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"));
        let body = json_body(response).await;
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|m| m.starts_with("Requisição inválida"))
        );
    }

    #[tokio::test]
    async fn broken_json_is_400_in_english() {
        let request = Request::post("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, "en")
            .body(Body::from(r#"{"username": "#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|m| m.starts_with("Invalid request"))
        );
    }

    #[tokio::test]
    async fn basic_authorization_without_cookie_is_401_json() {
        let request = Request::get("/api/farm")
            .header(header::AUTHORIZATION, "Basic ZGVtbzoxMjM0NTY=")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Não autorizado");
    }

    #[tokio::test]
    async fn logout_clears_the_session_cookie() {
        let response = app()
            .oneshot(Request::post("/api/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.starts_with("avicultura_session="));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = app()
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["paths"]["/api/financial/summary"].is_object());
    }
}

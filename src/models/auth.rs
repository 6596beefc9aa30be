// src/models/auth.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{farm::SubscriptionStatus, validate_egg_price};

// Representa um usuário (e a sua granja) vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "demo")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "João da Silva")]
    pub name: String,

    #[schema(example = "Granja Feliz")]
    pub farm_name: String,

    #[schema(example = 120)]
    pub hen_count: i32,

    // Preço da dúzia
    #[schema(example = 10.0)]
    pub egg_price: Decimal,

    pub subscription_status: SubscriptionStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, message = "Nome de usuário deve ter pelo menos 3 caracteres"))]
    pub username: String,

    #[validate(length(min = 6, message = "Senha deve ter pelo menos 6 caracteres"))]
    pub password: String,

    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub name: String,

    #[validate(length(min = 2, message = "Nome da granja deve ter pelo menos 2 caracteres"))]
    pub farm_name: String,

    #[serde(default)]
    #[validate(range(min = 0, max = 10_000_000, message = "Número de galinhas inválido"))]
    pub hen_count: i32,

    #[serde(default)]
    #[validate(custom(function = "validate_egg_price"))]
    pub egg_price: Decimal,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "Nome de usuário é obrigatório"))]
    pub username: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

// Resposta de autenticação com o token (também enviado como cookie de sessão)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub name: String,

    #[validate(length(min = 3, message = "Nome de usuário deve ter pelo menos 3 caracteres"))]
    pub username: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "Senha atual é obrigatória"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "Nova senha deve ter pelo menos 6 caracteres"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn register_payload_accepts_camel_case_and_defaults() {
        let payload: RegisterUserPayload = serde_json::from_value(json!({
            "username": "demo",
            "password": "123456",
            "name": "João",
            "farmName": "Granja Feliz"
        }))
        .unwrap();
        assert_eq!(payload.hen_count, 0);
        assert_eq!(payload.egg_price, dec!(0));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn register_payload_rejects_short_fields_and_negative_values() {
        let payload: RegisterUserPayload = serde_json::from_value(json!({
            "username": "de",
            "password": "123",
            "name": "J",
            "farmName": "G",
            "henCount": -1,
            "eggPrice": -2.5
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["username", "password", "name", "farm_name", "hen_count", "egg_price"] {
            assert!(fields.contains_key(field), "esperava erro em {}", field);
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "demo".into(),
            password_hash: "$2b$12$segredo".into(),
            name: "João".into(),
            farm_name: "Granja Feliz".into(),
            hen_count: 120,
            egg_price: dec!(10.00),
            subscription_status: SubscriptionStatus::Free,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["farmName"], "Granja Feliz");
        assert_eq!(value["subscriptionStatus"], "free");
    }
}

// src/models/farm.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{auth::User, validate_egg_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Free,
    Premium,
}

// Foto do plantel em um momento (cada alteração do número de galinhas)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HenCountHistory {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = 150)]
    pub hen_count: i32,

    pub change_date: DateTime<Utc>,

    #[schema(example = "Compra de lote novo")]
    pub reason: Option<String>,

    pub created_at: DateTime<Utc>,
}

// Resposta de GET /api/farm
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmInfo {
    #[schema(example = "Granja Feliz")]
    pub name: String,
    #[schema(example = 120)]
    pub hen_count: i32,
    #[schema(example = 10.0)]
    pub egg_price: Decimal,
    pub subscription_status: SubscriptionStatus,
}

impl From<&User> for FarmInfo {
    fn from(user: &User) -> Self {
        Self {
            name: user.farm_name.clone(),
            hen_count: user.hen_count,
            egg_price: user.egg_price,
            subscription_status: user.subscription_status,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHenCountPayload {
    #[validate(range(min = 0, max = 10_000_000, message = "Número de galinhas inválido"))]
    pub hen_count: i32,

    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HenCountUpdateResponse {
    pub history: HenCountHistory,
    pub current_hen_count: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEggPricePayload {
    #[validate(custom(function = "validate_egg_price"))]
    #[schema(example = 12.5)]
    pub egg_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EggPriceResponse {
    pub egg_price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarmPayload {
    #[validate(length(min = 2, message = "Nome da granja deve ter pelo menos 2 caracteres"))]
    pub farm_name: String,
}

// src/models/collection.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::nullable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "collection_period", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CollectionPeriod {
    Morning,
    Afternoon,
}

impl CollectionPeriod {
    /// Nome do turno como aparece nas observações das movimentações.
    pub fn label(self) -> &'static str {
        match self {
            CollectionPeriod::Morning => "manhã",
            CollectionPeriod::Afternoon => "tarde",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EggCollection {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub collection_date: NaiveDate,

    pub period: CollectionPeriod,

    #[schema(example = 95)]
    pub egg_count: i32,

    // eggCount / galinhas * 100, calculado com o plantel atual
    #[schema(example = 79.17)]
    pub posture_percentage: Option<Decimal>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionPayload {
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub collection_date: NaiveDate,

    pub period: CollectionPeriod,

    #[validate(range(min = 0, max = 1_000_000, message = "Quantidade de ovos inválida"))]
    #[schema(example = 95)]
    pub egg_count: i32,

    pub notes: Option<String>,
}

// Todos os campos são opcionais: só o que vier é alterado
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionPayload {
    #[schema(value_type = Option<String>, format = Date)]
    pub collection_date: Option<NaiveDate>,

    pub period: Option<CollectionPeriod>,

    #[validate(range(min = 0, max = 1_000_000, message = "Quantidade de ovos inválida"))]
    pub egg_count: Option<i32>,

    // Ausente: mantém. `null`: apaga.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Dia de referência (YYYY-MM-DD). Padrão: hoje.
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

/// Totais de um dia, por turno.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub total: i64,
    pub morning: i64,
    pub afternoon: i64,
    pub posture_percentage: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayCollectionsResponse {
    pub collections: Vec<EggCollection>,
    pub summary: CollectionSummary,
}

// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{nullable, validate_amount};

/// Categoria usada nas receitas geradas por saída de estoque.
pub const EGG_SALE_CATEGORY: &str = "Venda de ovos";
pub const DEFAULT_PAYMENT_METHOD: &str = "Dinheiro";

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "financial_movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FinancialMovementType {
    Income,  // Receita
    Expense, // Despesa
}

impl FinancialMovementType {
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            FinancialMovementType::Income => amount,
            FinancialMovementType::Expense => -amount,
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMovement {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    pub movement_type: FinancialMovementType,

    #[schema(example = "Venda de ovos")]
    pub category: String,

    #[schema(example = 25.0)]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub movement_date: NaiveDate,

    #[schema(example = "Dinheiro")]
    pub payment_method: Option<String>,

    pub contact: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialBalance {
    pub user_id: Uuid,
    #[schema(example = 2450.0)]
    pub balance: Decimal,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FinancialBalance {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            balance: Decimal::ZERO,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFinancialMovementPayload {
    pub movement_type: FinancialMovementType,

    #[validate(length(min = 1, message = "Categoria é obrigatória"))]
    pub category: String,

    #[validate(custom(function = "validate_amount"))]
    #[schema(example = 150.0)]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub movement_date: NaiveDate,

    pub payment_method: Option<String>,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFinancialMovementPayload {
    pub movement_type: Option<FinancialMovementType>,

    #[validate(length(min = 1, message = "Categoria é obrigatória"))]
    pub category: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    pub amount: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub movement_date: Option<NaiveDate>,

    // Ausente: mantém. `null`: apaga.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub payment_method: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub contact: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EggSalesSummary {
    pub total: Decimal,
    pub egg_count: i64,
}

// Resumo mensal (GET /api/financial/summary)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub year: i32,
    pub month: u32,
    pub incomes: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub egg_sales: EggSalesSummary,
}

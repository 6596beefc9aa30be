// src/models/stock.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StockMovementType {
    In,
    Out,
}

impl StockMovementType {
    /// Efeito da movimentação sobre o saldo: entrada soma, saída subtrai.
    pub fn signed(self, egg_count: i32) -> i32 {
        match self {
            StockMovementType::In => egg_count,
            StockMovementType::Out => -egg_count,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            StockMovementType::In => StockMovementType::Out,
            StockMovementType::Out => StockMovementType::In,
        }
    }
}

// --- STOCK MOVEMENT (Histórico) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    pub movement_type: StockMovementType,

    #[schema(example = 30)]
    pub egg_count: i32,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub movement_date: NaiveDate,

    // Venda com lançamento financeiro vinculado
    pub financial_movement_id: Option<Uuid>,

    #[schema(example = "Coleta de manhã")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

// Saldo corrente de ovos (uma linha por usuário)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockBalance {
    pub user_id: Uuid,
    #[schema(example = 546)]
    pub egg_count: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockBalance {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            egg_count: 0,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockMovementPayload {
    pub movement_type: StockMovementType,

    #[validate(range(min = 1, max = 1_000_000, message = "Quantidade de ovos inválida"))]
    #[schema(example = 30)]
    pub egg_count: i32,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub movement_date: NaiveDate,

    pub notes: Option<String>,

    // Só vale para saídas: gera a receita "Venda de ovos" vinculada
    #[serde(default)]
    pub create_financial_record: bool,

    #[schema(example = "Pix")]
    pub payment_method: Option<String>,

    #[schema(example = "Mercado do Zé")]
    pub contact: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_count_follows_direction() {
        assert_eq!(StockMovementType::In.signed(30), 30);
        assert_eq!(StockMovementType::Out.signed(30), -30);
    }

    #[test]
    fn reversing_an_entry_cancels_it() {
        let kind = StockMovementType::In;
        assert_eq!(kind.signed(12) + kind.reversed().signed(12), 0);
        assert_eq!(StockMovementType::Out.reversed(), StockMovementType::In);
    }

    #[test]
    fn create_payload_defaults_financial_record_to_false() {
        let payload: CreateStockMovementPayload = serde_json::from_value(serde_json::json!({
            "movementType": "out",
            "eggCount": 24,
            "movementDate": "2025-03-01"
        }))
        .unwrap();
        assert_eq!(payload.movement_type, StockMovementType::Out);
        assert!(!payload.create_financial_record);
        assert!(payload.validate().is_ok());
    }
}

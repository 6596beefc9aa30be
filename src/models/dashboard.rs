// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::farm::FarmInfo;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayCollectionStats {
    pub total: i64,
    pub morning: i64,
    pub afternoon: i64,
    #[schema(example = 79.17)]
    pub posture_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockStats {
    pub current_stock: i32,
    pub today_in: i64,
    pub today_out: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    pub balance: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
}

// Resposta de GET /api/dashboard/stats
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_collection: TodayCollectionStats,
    pub stock: StockStats,
    pub financial: FinancialStats,
    pub farm: FarmInfo,
}

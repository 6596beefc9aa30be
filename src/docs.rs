// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Avicultura Dia a Dia", description = "Coletas, estoque e financeiro da granja"),
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,
        handlers::auth::change_password,

        // --- Collections ---
        handlers::collections::list_collections,
        handlers::collections::today_collections,
        handlers::collections::create_collection,
        handlers::collections::update_collection,
        handlers::collections::delete_collection,

        // --- Stock ---
        handlers::stock::get_balance,
        handlers::stock::list_movements,
        handlers::stock::create_movement,
        handlers::stock::delete_movement,

        // --- Financial ---
        handlers::finance::get_balance,
        handlers::finance::list_movements,
        handlers::finance::create_movement,
        handlers::finance::update_movement,
        handlers::finance::delete_movement,
        handlers::finance::get_summary,

        // --- Farm ---
        handlers::farm::get_farm,
        handlers::farm::update_farm,
        handlers::farm::update_hen_count,
        handlers::farm::update_egg_price,
        handlers::farm::hen_count_history,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::UpdateProfilePayload,
            models::auth::ChangePasswordPayload,
            models::auth::MessageResponse,

            // --- Farm ---
            models::farm::SubscriptionStatus,
            models::farm::FarmInfo,
            models::farm::HenCountHistory,
            models::farm::UpdateHenCountPayload,
            models::farm::HenCountUpdateResponse,
            models::farm::UpdateEggPricePayload,
            models::farm::EggPriceResponse,
            models::farm::UpdateFarmPayload,

            // --- Collections ---
            models::collection::CollectionPeriod,
            models::collection::EggCollection,
            models::collection::CreateCollectionPayload,
            models::collection::UpdateCollectionPayload,
            models::collection::CollectionSummary,
            models::collection::TodayCollectionsResponse,

            // --- Stock ---
            models::stock::StockMovementType,
            models::stock::StockMovement,
            models::stock::StockBalance,
            models::stock::CreateStockMovementPayload,

            // --- Financial ---
            models::finance::FinancialMovementType,
            models::finance::FinancialMovement,
            models::finance::FinancialBalance,
            models::finance::CreateFinancialMovementPayload,
            models::finance::UpdateFinancialMovementPayload,
            models::finance::EggSalesSummary,
            models::finance::FinancialSummary,

            // --- Dashboard ---
            models::dashboard::TodayCollectionStats,
            models::dashboard::StockStats,
            models::dashboard::FinancialStats,
            models::dashboard::DashboardStats,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro, login e sessão"),
        (name = "Users", description = "Dados do usuário e senha"),
        (name = "Collections", description = "Coletas de ovos por turno"),
        (name = "Stock", description = "Estoque de ovos e movimentações"),
        (name = "Financial", description = "Receitas, despesas e saldo"),
        (name = "Farm", description = "Granja, plantel e preço da dúzia"),
        (name = "Dashboard", description = "Resumo do dia")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    common::i18n::I18nStore,
    db::{CollectionRepository, FarmRepository, FinanceRepository, StockRepository, UserRepository},
    services::{
        auth::AuthService, collection_service::CollectionService,
        dashboard_service::DashboardService, farm_service::FarmService,
        finance_service::FinanceService, stock_service::StockService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub token_ttl_days: i64,
    pub session_cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {}", raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let token_ttl_days = match lookup("TOKEN_TTL_DAYS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("TOKEN_TTL_DAYS inválido: {}", raw))?,
            None => DEFAULT_TOKEN_TTL_DAYS,
        };

        let session_cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            database_max_connections,
            token_ttl_days,
            session_cookie_secure,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub farm_service: FarmService,
    pub collection_service: CollectionService,
    pub stock_service: StockService,
    pub finance_service: FinanceService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_parts(db_pool, config)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let user_repo = UserRepository::new(db_pool.clone());
        let farm_repo = FarmRepository::new();

        let finance_service = FinanceService::new(FinanceRepository::new());
        let stock_service = StockService::new(StockRepository::new(), finance_service.clone());
        let collection_service =
            CollectionService::new(CollectionRepository::new(), stock_service.clone());
        let farm_service = FarmService::new(farm_repo.clone(), user_repo.clone());
        let dashboard_service = DashboardService::new(
            collection_service.clone(),
            stock_service.clone(),
            finance_service.clone(),
        );
        let auth_service = AuthService::new(
            user_repo,
            farm_repo,
            stock_service.clone(),
            finance_service.clone(),
            config.jwt_secret.clone(),
            config.token_ttl_days,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            farm_service,
            collection_service,
            stock_service,
            finance_service,
            dashboard_service,
        })
    }
}

/// Estado com pool preguiçosa, para testes que não chegam ao banco.
#[cfg(test)]
pub(crate) fn lazy_state() -> AppState {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://avicultura@localhost/avicultura".to_string()),
        "JWT_SECRET" => Some("segredo".to_string()),
        _ => None,
    })
    .unwrap();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();
    AppState::from_parts(pool, config).unwrap()
}

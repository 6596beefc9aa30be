pub mod auth;
pub mod collection_service;
pub mod dashboard_service;
pub mod farm_service;
pub mod finance_service;
pub mod stock_service;

pub mod collection_repo;
pub mod farm_repo;
pub mod finance_repo;
pub mod stock_repo;
pub mod user_repo;

pub use collection_repo::CollectionRepository;
pub use farm_repo::FarmRepository;
pub use finance_repo::{FinanceRepository, FinancialMovementRecord};
pub use stock_repo::StockRepository;
pub use user_repo::UserRepository;

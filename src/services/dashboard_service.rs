// src/services/dashboard_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        dashboard::{DashboardStats, FinancialStats, StockStats, TodayCollectionStats},
        farm::FarmInfo,
    },
    services::{
        collection_service::CollectionService, finance_service::FinanceService,
        stock_service::StockService,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    collection_service: CollectionService,
    stock_service: StockService,
    finance_service: FinanceService,
}

impl DashboardService {
    pub fn new(
        collection_service: CollectionService,
        stock_service: StockService,
        finance_service: FinanceService,
    ) -> Self {
        Self {
            collection_service,
            stock_service,
            finance_service,
        }
    }

    /// Painel do dia `date`; o financeiro mensal usa o mês de `date`.
    pub async fn get_stats<'e, E>(
        &self,
        executor: E,
        user: &User,
        date: NaiveDate,
    ) -> Result<DashboardStats, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Tudo na mesma transação: os números batem entre si
        let mut tx = executor.begin().await?;

        let (_, today) = self.collection_service.for_day(&mut *tx, user, date).await?;
        let stock = self.stock_service.get_balance(&mut *tx, user.id).await?;
        let (today_in, today_out) = self.stock_service.totals_on(&mut *tx, user.id, date).await?;
        let balance = self.finance_service.get_balance(&mut *tx, user.id).await?;
        let (monthly_income, monthly_expenses) = self
            .finance_service
            .month_totals(&mut *tx, user.id, date)
            .await?;

        tx.commit().await?;

        Ok(DashboardStats {
            today_collection: TodayCollectionStats {
                total: today.total,
                morning: today.morning,
                afternoon: today.afternoon,
                posture_percentage: today.posture_percentage,
            },
            stock: StockStats {
                current_stock: stock.egg_count,
                today_in,
                today_out,
            },
            financial: FinancialStats {
                balance: balance.balance,
                monthly_income,
                monthly_expenses,
            },
            farm: FarmInfo::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::db_utils::set_rls_user,
        db::{CollectionRepository, FinanceRepository, StockRepository, UserRepository},
        models::{
            collection::{CollectionPeriod, CreateCollectionPayload},
            stock::{CreateStockMovementPayload, StockMovementType},
        },
    };
    use rust_decimal_macros::dec;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires database"]
    async fn stats_reflect_the_day(pool: PgPool) {
        let finance = FinanceService::new(FinanceRepository::new());
        let stock = StockService::new(StockRepository::new(), finance.clone());
        let collections = CollectionService::new(CollectionRepository::new(), stock.clone());
        let dashboard = DashboardService::new(collections.clone(), stock.clone(), finance);

        let mut tx = pool.begin().await.unwrap();
        let user = UserRepository::new(pool.clone())
            .create_user(&mut *tx, "painel", "hash", "Lia", "Granja", 100, dec!(12))
            .await
            .unwrap();
        set_rls_user(&mut *tx, user.id).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        for (period, egg_count) in [(CollectionPeriod::Morning, 50), (CollectionPeriod::Afternoon, 40)] {
            collections
                .create(
                    &mut *tx,
                    &user,
                    &CreateCollectionPayload {
                        collection_date: date,
                        period,
                        egg_count,
                        notes: None,
                    },
                )
                .await
                .unwrap();
        }
        stock
            .create_movement(
                &mut *tx,
                &user,
                &CreateStockMovementPayload {
                    movement_type: StockMovementType::Out,
                    egg_count: 24,
                    movement_date: date,
                    notes: None,
                    create_financial_record: true,
                    payment_method: Some("Pix".into()),
                    contact: None,
                },
            )
            .await
            .unwrap();

        let stats = dashboard.get_stats(&mut *tx, &user, date).await.unwrap();
        assert_eq!(stats.today_collection.total, 90);
        assert_eq!(stats.today_collection.posture_percentage, dec!(90));
        assert_eq!(stats.stock.current_stock, 66);
        assert_eq!(stats.stock.today_in, 90);
        assert_eq!(stats.stock.today_out, 24);
        assert_eq!(stats.financial.balance, dec!(24));
        assert_eq!(stats.financial.monthly_income, dec!(24));
        assert_eq!(stats.financial.monthly_expenses, dec!(0));
        assert_eq!(stats.farm.hen_count, 100);
    }
}

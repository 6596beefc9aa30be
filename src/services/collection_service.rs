// src/services/collection_service.rs

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CollectionRepository,
    models::{
        auth::User,
        patched,
        collection::{
            CollectionPeriod, CollectionSummary, CreateCollectionPayload, EggCollection,
            UpdateCollectionPayload,
        },
        stock::StockMovementType,
    },
    services::stock_service::StockService,
};

/// Ovos / galinhas * 100, em 2 casas. Sem galinhas, 0.
pub fn calculate_posture_percentage(egg_count: i64, hen_count: i32) -> Decimal {
    if hen_count <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(egg_count) * Decimal::ONE_HUNDRED / Decimal::from(hen_count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Movimentação compensatória para uma troca de quantidade: `None` se nada mudou.
pub fn adjustment_for(old_count: i32, new_count: i32) -> Option<(StockMovementType, i32)> {
    let diff = new_count - old_count;
    match diff {
        0 => None,
        d if d > 0 => Some((StockMovementType::In, d)),
        d => Some((StockMovementType::Out, -d)),
    }
}

/// Totais do dia por turno, em i64; a postura usa o plantel atual.
pub fn summarize(date: NaiveDate, collections: &[EggCollection], hen_count: i32) -> CollectionSummary {
    let sum_of = |period: CollectionPeriod| -> i64 {
        collections
            .iter()
            .filter(|c| c.period == period)
            .map(|c| i64::from(c.egg_count))
            .sum()
    };
    let morning = sum_of(CollectionPeriod::Morning);
    let afternoon = sum_of(CollectionPeriod::Afternoon);
    let total = morning + afternoon;

    CollectionSummary {
        date,
        total,
        morning,
        afternoon,
        posture_percentage: calculate_posture_percentage(total, hen_count),
    }
}

#[derive(Clone)]
pub struct CollectionService {
    repo: CollectionRepository,
    stock_service: StockService,
}

impl CollectionService {
    pub fn new(repo: CollectionRepository, stock_service: StockService) -> Self {
        Self {
            repo,
            stock_service,
        }
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<EggCollection>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_recent(executor, user_id, limit).await
    }

    pub async fn for_day<'e, E>(
        &self,
        executor: E,
        user: &User,
        date: NaiveDate,
    ) -> Result<(Vec<EggCollection>, CollectionSummary), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let collections = self.repo.list_by_date(executor, user.id, date).await?;
        let summary = summarize(date, &collections, user.hen_count);
        Ok((collections, summary))
    }

    /// Registra a coleta e dá entrada dos ovos no estoque.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        user: &User,
        payload: &CreateCollectionPayload,
    ) -> Result<EggCollection, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let posture = calculate_posture_percentage(payload.egg_count.into(), user.hen_count);
        let collection = self
            .repo
            .create(
                &mut *tx,
                user.id,
                payload.collection_date,
                payload.period,
                payload.egg_count,
                posture,
                payload.notes.as_deref(),
            )
            .await?;

        let notes = format!("Coleta de {}", collection.period.label());
        self.stock_service
            .record_movement(
                &mut *tx,
                user.id,
                StockMovementType::In,
                collection.egg_count,
                collection.collection_date,
                None,
                Some(&notes),
                false,
            )
            .await?;

        tx.commit().await?;

        Ok(collection)
    }

    /// Atualiza a coleta. Mudou a quantidade? Lança a diferença no estoque,
    /// datada no dia original da coleta.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user: &User,
        id: Uuid,
        payload: &UpdateCollectionPayload,
    ) -> Result<EggCollection, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let old = self
            .repo
            .find_by_id(&mut *tx, user.id, id)
            .await?
            .ok_or(AppError::CollectionNotFound)?;

        let egg_count = payload.egg_count.unwrap_or(old.egg_count);

        if let Some((movement_type, delta)) = adjustment_for(old.egg_count, egg_count) {
            let notes = format!("Ajuste de coleta {}", old.period.label());
            self.stock_service
                .record_movement(
                    &mut *tx,
                    user.id,
                    movement_type,
                    delta,
                    old.collection_date,
                    None,
                    Some(&notes),
                    false,
                )
                .await?;
        }

        let posture = match payload.egg_count {
            Some(count) => Some(calculate_posture_percentage(count.into(), user.hen_count)),
            None => old.posture_percentage,
        };

        let updated = self
            .repo
            .update(
                &mut *tx,
                user.id,
                id,
                payload.collection_date.unwrap_or(old.collection_date),
                payload.period.unwrap_or(old.period),
                egg_count,
                posture,
                patched(&payload.notes, &old.notes),
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Exclui a coleta, tirando do estoque os ovos que ela tinha lançado.
    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let collection = self
            .repo
            .find_by_id(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::CollectionNotFound)?;

        let notes = format!("Exclusão de coleta {}", collection.period.label());
        self.stock_service
            .record_movement(
                &mut *tx,
                user_id,
                StockMovementType::Out,
                collection.egg_count,
                collection.collection_date,
                None,
                Some(&notes),
                false,
            )
            .await?;

        self.repo.delete(&mut *tx, user_id, id).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::db_utils::set_rls_user,
        db::{FinanceRepository, StockRepository, UserRepository},
        models::{
            finance::{CreateFinancialMovementPayload, FinancialMovementType, UpdateFinancialMovementPayload},
            stock::CreateStockMovementPayload,
        },
        services::finance_service::FinanceService,
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sqlx::PgPool;

    #[test]
    fn posture_is_eggs_over_hens() {
        assert_eq!(calculate_posture_percentage(95, 120), dec!(79.17));
        assert_eq!(calculate_posture_percentage(100, 100), dec!(100));
        assert_eq!(calculate_posture_percentage(1, 3), dec!(33.33));
        assert_eq!(calculate_posture_percentage(2, 3), dec!(66.67));
    }

    #[test]
    fn posture_without_hens_is_zero() {
        assert_eq!(calculate_posture_percentage(50, 0), Decimal::ZERO);
    }

    #[test]
    fn posture_rounds_half_away_from_zero() {
        // 3,125 e 0,625: o arredondamento bancário daria 3,12 e 0,62
        assert_eq!(calculate_posture_percentage(1, 32), dec!(3.13));
        assert_eq!(calculate_posture_percentage(1, 160), dec!(0.63));
    }

    #[test]
    fn adjustment_follows_the_difference() {
        assert_eq!(adjustment_for(100, 100), None);
        assert_eq!(adjustment_for(100, 120), Some((StockMovementType::In, 20)));
        assert_eq!(adjustment_for(100, 70), Some((StockMovementType::Out, 30)));
    }

    fn collection(period: CollectionPeriod, egg_count: i32) -> EggCollection {
        EggCollection {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            collection_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            period,
            egg_count,
            posture_percentage: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn summary_sums_every_row_of_each_period() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let rows = vec![
            collection(CollectionPeriod::Morning, 50),
            collection(CollectionPeriod::Morning, 10),
            collection(CollectionPeriod::Afternoon, 36),
        ];
        let summary = summarize(date, &rows, 120);
        assert_eq!(summary.morning, 60);
        assert_eq!(summary.afternoon, 36);
        assert_eq!(summary.total, 96);
        assert_eq!(summary.posture_percentage, dec!(80));
    }

    #[test]
    fn summary_of_huge_counts_does_not_overflow() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let rows = vec![
            collection(CollectionPeriod::Morning, 2_000_000_000),
            collection(CollectionPeriod::Morning, 2_000_000_000),
            collection(CollectionPeriod::Afternoon, i32::MAX),
        ];
        let summary = summarize(date, &rows, 100);
        assert_eq!(summary.morning, 4_000_000_000);
        assert_eq!(summary.total, 4_000_000_000 + i64::from(i32::MAX));
    }

    #[test]
    fn egg_count_above_the_cap_is_rejected() {
        use validator::Validate;
        let payload = CreateCollectionPayload {
            collection_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            period: CollectionPeriod::Morning,
            egg_count: 2_000_000_000,
            notes: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("egg_count"));

        let change = UpdateCollectionPayload {
            egg_count: Some(1_000_001),
            ..Default::default()
        };
        assert!(change.validate().is_err());
    }

    #[test]
    fn empty_day_summary_is_all_zero() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let summary = summarize(date, &[], 0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.posture_percentage, Decimal::ZERO);
    }

    fn service() -> CollectionService {
        CollectionService::new(
            CollectionRepository::new(),
            StockService::new(
                StockRepository::new(),
                FinanceService::new(FinanceRepository::new()),
            ),
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires database"]
    async fn stock_follows_collection_edits_and_deletes(pool: PgPool) {
        let collections = service();
        let stock = StockRepository::new();
        let mut tx = pool.begin().await.unwrap();
        let user = UserRepository::new(pool.clone())
            .create_user(&mut *tx, "coletor", "hash", "Maria", "Granja", 120, dec!(10))
            .await
            .unwrap();
        set_rls_user(&mut *tx, user.id).await.unwrap();

        let created = collections
            .create(
                &mut *tx,
                &user,
                &CreateCollectionPayload {
                    collection_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    period: CollectionPeriod::Morning,
                    egg_count: 95,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.posture_percentage, Some(dec!(79.17)));
        let balance = stock.get_balance(&mut *tx, user.id).await.unwrap().unwrap();
        assert_eq!(balance.egg_count, 95);

        let change = UpdateCollectionPayload {
            egg_count: Some(80),
            ..Default::default()
        };
        collections.update(&mut *tx, &user, created.id, &change).await.unwrap();
        let balance = stock.get_balance(&mut *tx, user.id).await.unwrap().unwrap();
        assert_eq!(balance.egg_count, 80);

        let movements = stock.list_recent(&mut *tx, user.id, 10).await.unwrap();
        let adjustment = movements
            .iter()
            .find(|m| m.notes.as_deref() == Some("Ajuste de coleta manhã"))
            .expect("ajuste não registrado");
        assert_eq!(adjustment.movement_type, StockMovementType::Out);
        assert_eq!(adjustment.egg_count, 15);

        collections.delete(&mut *tx, user.id, created.id).await.unwrap();
        let balance = stock.get_balance(&mut *tx, user.id).await.unwrap().unwrap();
        assert_eq!(balance.egg_count, 0);

        let missing = collections.delete(&mut *tx, user.id, created.id).await;
        assert!(matches!(missing, Err(AppError::CollectionNotFound)));
    }

    fn new_collection(period: CollectionPeriod, egg_count: i32) -> CreateCollectionPayload {
        CreateCollectionPayload {
            collection_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            period,
            egg_count,
            notes: Some("galpão 1".into()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires database"]
    async fn zero_egg_collection_still_leaves_a_stock_trail(pool: PgPool) {
        let collections = service();
        let stock = StockRepository::new();
        let mut tx = pool.begin().await.unwrap();
        let user = UserRepository::new(pool.clone())
            .create_user(&mut *tx, "sem_ovos", "hash", "Maria", "Granja", 50, dec!(10))
            .await
            .unwrap();
        set_rls_user(&mut *tx, user.id).await.unwrap();

        let created = collections
            .create(&mut *tx, &user, &new_collection(CollectionPeriod::Afternoon, 0))
            .await
            .unwrap();
        assert_eq!(created.posture_percentage, Some(Decimal::ZERO));
        collections.delete(&mut *tx, user.id, created.id).await.unwrap();

        let movements = stock.list_recent(&mut *tx, user.id, 10).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert!(movements.iter().all(|m| m.egg_count == 0));
        assert!(
            movements
                .iter()
                .any(|m| m.movement_type == StockMovementType::In
                    && m.notes.as_deref() == Some("Coleta de tarde"))
        );
        assert!(
            movements
                .iter()
                .any(|m| m.movement_type == StockMovementType::Out
                    && m.notes.as_deref() == Some("Exclusão de coleta tarde"))
        );
        let balance = stock.get_balance(&mut *tx, user.id).await.unwrap().unwrap();
        assert_eq!(balance.egg_count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires database"]
    async fn editing_only_metadata_writes_no_adjustment(pool: PgPool) {
        let collections = service();
        let stock = StockRepository::new();
        let mut tx = pool.begin().await.unwrap();
        let user = UserRepository::new(pool.clone())
            .create_user(&mut *tx, "so_datas", "hash", "Maria", "Granja", 100, dec!(10))
            .await
            .unwrap();
        set_rls_user(&mut *tx, user.id).await.unwrap();

        let created = collections
            .create(&mut *tx, &user, &new_collection(CollectionPeriod::Morning, 40))
            .await
            .unwrap();

        let change = UpdateCollectionPayload {
            collection_date: NaiveDate::from_ymd_opt(2025, 3, 2),
            period: Some(CollectionPeriod::Afternoon),
            notes: Some(None),
            ..Default::default()
        };
        let updated = collections.update(&mut *tx, &user, created.id, &change).await.unwrap();
        assert_eq!(updated.collection_date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(updated.period, CollectionPeriod::Afternoon);
        assert_eq!(updated.notes, None);
        assert_eq!(updated.egg_count, 40);
        assert_eq!(updated.posture_percentage, created.posture_percentage);

        // Só a entrada da coleta; nenhum ajuste
        let movements = stock.list_recent(&mut *tx, user.id, 10).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(stock.get_balance(&mut *tx, user.id).await.unwrap().unwrap().egg_count, 40);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires database"]
    async fn another_users_collection_is_not_found(pool: PgPool) {
        let collections = service();
        let users = UserRepository::new(pool.clone());
        let mut tx = pool.begin().await.unwrap();
        let owner = users
            .create_user(&mut *tx, "dona", "hash", "Ana", "Granja A", 100, dec!(10))
            .await
            .unwrap();
        let intruder = users
            .create_user(&mut *tx, "vizinho", "hash", "Beto", "Granja B", 100, dec!(10))
            .await
            .unwrap();

        set_rls_user(&mut *tx, owner.id).await.unwrap();
        let created = collections
            .create(&mut *tx, &owner, &new_collection(CollectionPeriod::Morning, 30))
            .await
            .unwrap();

        set_rls_user(&mut *tx, intruder.id).await.unwrap();
        let change = UpdateCollectionPayload {
            egg_count: Some(1),
            ..Default::default()
        };
        let updated = collections.update(&mut *tx, &intruder, created.id, &change).await;
        assert!(matches!(updated, Err(AppError::CollectionNotFound)));
        let deleted = collections.delete(&mut *tx, intruder.id, created.id).await;
        assert!(matches!(deleted, Err(AppError::CollectionNotFound)));

        set_rls_user(&mut *tx, owner.id).await.unwrap();
        let still_there = CollectionRepository::new()
            .find_by_id(&mut *tx, owner.id, created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(still_there.egg_count, 30);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires database"]
    async fn balances_equal_the_signed_sum_of_movements(pool: PgPool) {
        let finance = FinanceService::new(FinanceRepository::new());
        let stock = StockService::new(StockRepository::new(), finance.clone());
        let collections = CollectionService::new(CollectionRepository::new(), stock.clone());
        let mut tx = pool.begin().await.unwrap();
        let user = UserRepository::new(pool.clone())
            .create_user(&mut *tx, "invariante", "hash", "Maria", "Granja", 100, dec!(12))
            .await
            .unwrap();
        set_rls_user(&mut *tx, user.id).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let morning = collections
            .create(&mut *tx, &user, &new_collection(CollectionPeriod::Morning, 90))
            .await
            .unwrap();
        let afternoon = collections
            .create(&mut *tx, &user, &new_collection(CollectionPeriod::Afternoon, 45))
            .await
            .unwrap();
        collections
            .update(
                &mut *tx,
                &user,
                morning.id,
                &UpdateCollectionPayload {
                    egg_count: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let sale = |egg_count| CreateStockMovementPayload {
            movement_type: StockMovementType::Out,
            egg_count,
            movement_date: date,
            notes: None,
            create_financial_record: true,
            payment_method: Some("Pix".into()),
            contact: None,
        };
        let first_sale = stock.create_movement(&mut *tx, &user, &sale(24)).await.unwrap();
        stock.create_movement(&mut *tx, &user, &sale(36)).await.unwrap();
        stock.delete_movement(&mut *tx, user.id, first_sale.id).await.unwrap();
        collections.delete(&mut *tx, user.id, afternoon.id).await.unwrap();

        let feed = finance
            .create_movement(
                &mut *tx,
                user.id,
                &CreateFinancialMovementPayload {
                    movement_type: FinancialMovementType::Expense,
                    category: "Ração".into(),
                    amount: dec!(80.40),
                    movement_date: date,
                    payment_method: None,
                    contact: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        finance
            .update_movement(
                &mut *tx,
                user.id,
                feed.id,
                &UpdateFinancialMovementPayload {
                    amount: Some(dec!(75.10)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let movement_sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE WHEN movement_type = 'in' THEN egg_count ELSE -egg_count END), 0)::BIGINT
             FROM stock_movements WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
        let egg_balance = stock.get_balance(&mut *tx, user.id).await.unwrap().egg_count;
        assert_eq!(i64::from(egg_balance), movement_sum);
        assert_eq!(egg_balance, 100 - 36);

        let money_sum: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE WHEN movement_type = 'income' THEN amount ELSE -amount END), 0)
             FROM financial_movements WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
        let money_balance = finance.get_balance(&mut *tx, user.id).await.unwrap().balance;
        assert_eq!(money_balance, money_sum);
        // 36 ovos a 12 a dúzia, menos a ração
        assert_eq!(money_balance, dec!(36) - dec!(75.10));
    }
}

// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{db_utils::set_rls_user, error::AppError},
    db::{FarmRepository, UserRepository},
    models::auth::{Claims, RegisterUserPayload, User},
    services::{finance_service::FinanceService, stock_service::StockService},
};

const INITIAL_HEN_COUNT_REASON: &str = "Plantel inicial";

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    // Executa a verificação em um thread separado
    let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    farm_repo: FarmRepository,
    stock_service: StockService,
    finance_service: FinanceService,
    jwt_secret: String,
    token_ttl_days: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        farm_repo: FarmRepository,
        stock_service: StockService,
        finance_service: FinanceService,
        jwt_secret: String,
        token_ttl_days: i64,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            farm_repo,
            stock_service,
            finance_service,
            jwt_secret,
            token_ttl_days,
            pool,
        }
    }

    /// Cria o usuário, os saldos zerados e o histórico inicial do plantel.
    pub async fn register_user(
        &self,
        payload: &RegisterUserPayload,
    ) -> Result<(String, User), AppError> {
        // Hashing fora da transação: não toca no banco
        let hashed_password = hash_password(&payload.password).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.username,
                &hashed_password,
                &payload.name,
                &payload.farm_name,
                payload.hen_count,
                payload.egg_price,
            )
            .await?;

        // Daqui em diante as tabelas com RLS precisam saber quem é o dono
        set_rls_user(&mut *tx, new_user.id).await?;

        self.stock_service.init_balance(&mut *tx, new_user.id).await?;
        self.finance_service.init_balance(&mut *tx, new_user.id).await?;

        if new_user.hen_count > 0 {
            self.farm_repo
                .insert_hen_count_history(
                    &mut *tx,
                    new_user.id,
                    new_user.hen_count,
                    Some(INITIAL_HEN_COUNT_REASON),
                )
                .await?;
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("Novo usuário cadastrado: {}", new_user.username);

        let token = self.create_token(new_user.id)?;
        Ok((token, new_user))
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok((token, user))
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        name: &str,
        username: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.user_repo.update_profile(executor, user_id, name, username).await
    }

    /// Troca a senha conferindo a atual. Senha atual errada é erro de validação do campo.
    pub async fn change_password<'e, E>(
        &self,
        executor: E,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !verify_password(current_password, &user.password_hash).await? {
            let mut err = ValidationError::new("invalid");
            err.message = Some("Senha atual incorreta".into());
            let mut errors = ValidationErrors::new();
            errors.add("current_password", err);
            return Err(AppError::ValidationError(errors));
        }

        let hashed_password = hash_password(new_password).await?;
        self.user_repo
            .update_password(executor, user.id, &hashed_password)
            .await
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.token_ttl_days);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FinanceRepository, StockRepository};
    use rust_decimal_macros::dec;
    use sqlx::postgres::PgPoolOptions;

    fn service_with(pool: PgPool, secret: &str) -> AuthService {
        let finance_service = FinanceService::new(FinanceRepository::new());
        AuthService::new(
            UserRepository::new(pool.clone()),
            FarmRepository::new(),
            StockService::new(StockRepository::new(), finance_service.clone()),
            finance_service,
            secret.to_string(),
            7,
            pool,
        )
    }

    fn lazy_service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://avicultura@localhost/avicultura")
            .unwrap();
        service_with(pool, secret)
    }

    #[tokio::test]
    async fn token_round_trip_keeps_the_subject() {
        let service = lazy_service("segredo");
        let user_id = Uuid::new_v4();
        let token = service.create_token(user_id).unwrap();
        let claims = service.decode_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let token = lazy_service("outro").create_token(Uuid::new_v4()).unwrap();
        let result = lazy_service("segredo").decode_token(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let service = lazy_service("segredo");
        let past = Utc::now() - chrono::Duration::days(1);
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: past.timestamp() as usize,
            iat: (past - chrono::Duration::days(7)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("segredo".as_ref()),
        )
        .unwrap();
        assert!(matches!(service.decode_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hashed = hash_password("123456").await.unwrap();
        assert!(verify_password("123456", &hashed).await.unwrap());
        assert!(!verify_password("654321", &hashed).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires database"]
    async fn register_then_login(pool: PgPool) {
        let service = service_with(pool.clone(), "segredo");
        let payload = RegisterUserPayload {
            username: "demo".into(),
            password: "123456".into(),
            name: "João".into(),
            farm_name: "Granja Feliz".into(),
            hen_count: 120,
            egg_price: dec!(10),
        };

        let (token, user) = service.register_user(&payload).await.unwrap();
        assert_eq!(service.validate_token(&token).await.unwrap().id, user.id);

        let duplicate = service.register_user(&payload).await;
        assert!(matches!(duplicate, Err(AppError::UsernameAlreadyExists)));

        let (_, logged) = service.login_user("demo", "123456").await.unwrap();
        assert_eq!(logged.id, user.id);
        let wrong = service.login_user("demo", "errada").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
        let unknown = service.login_user("ninguem", "123456").await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }
}

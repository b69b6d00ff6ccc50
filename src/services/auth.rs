// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    async fn hash_password(password: &str) -> Result<String, AppError> {
        // Hashing fora do runtime assíncrono
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
            ?;
        Ok(hashed_password)
    }

    // Cadastro público, válido apenas enquanto não há nenhum administrador
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<String, AppError> {
        let hashed_password = Self::hash_password(password).await?;

        let first_user = self.user_repo
            .create_first_user(email, &hashed_password)
            .await?
            .ok_or(AppError::AdminAlreadyExists)?;
        tracing::info!("👑 Primeiro administrador criado: {}", first_user.email);

        self.create_token(first_user.id)
    }

    // Novos administradores só entram pelas mãos de um já autenticado
    pub async fn register_user(&self, created_by: &User, email: &str, password: &str) -> Result<User, AppError> {
        let hashed_password = Self::hash_password(password).await?;

        let new_user = self.user_repo.create_user(email, &hashed_password).await?;
        tracing::info!("👤 Administrador {} registrado por {}", new_user.email, created_by.email);

        Ok(new_user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
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
        let expires_at = now + chrono::Duration::days(7);

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
    use sqlx::postgres::PgPoolOptions;

    // Pool preguiçoso: nenhum teste aqui toca o banco
    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/barbearia_test")
            .unwrap();
        AuthService::new(UserRepository::new(pool), secret.to_string())
    }

    #[tokio::test]
    async fn issued_token_decodes_to_same_user() {
        let auth = service("segredo");
        let user_id = Uuid::new_v4();
        let token = auth.create_token(user_id).unwrap();

        let claims = auth.decode_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service("um").create_token(Uuid::new_v4()).unwrap();
        let err = service("outro").decode_token(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}

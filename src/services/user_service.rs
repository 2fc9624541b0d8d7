use sqlx::PgPool;

use crate::auth::{hash_password, verify_password};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("name and either email or phone are required")]
    MissingContact,
    #[error("user already exists")]
    AlreadyExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UnknownUser,
    #[error("hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for UserError {
    fn from(e: sqlx::Error) -> Self {
        UserError::Database(DatabaseError::Sqlx(e))
    }
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, UserError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Register a user with email+password, phone, or both. The password is
    /// bcrypt-hashed when given; phone-only users carry no hash.
    pub async fn register(
        &self,
        name: &str,
        email: Option<&str>,
        password: Option<&str>,
        phone: Option<&str>,
    ) -> Result<User, UserError> {
        let email = email.map(str::trim).filter(|s| !s.is_empty());
        let phone = phone.map(str::trim).filter(|s| !s.is_empty());

        if name.trim().is_empty() || (email.is_none() && phone.is_none()) {
            return Err(UserError::MissingContact);
        }

        // Check both contact channels; either match counts as existing.
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE (email IS NOT NULL AND email = $1) OR (phone IS NOT NULL AND phone = $2)",
        )
        .bind(email)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        if existing > 0 {
            return Err(UserError::AlreadyExists);
        }

        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(p) => Some(hash_password(p)?),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, phone, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(name.trim())
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // Concurrent registration can slip past the count check above;
            // the unique indexes still hold, so report it as a duplicate.
            sqlx::Error::Database(db) if db.is_unique_violation() => UserError::AlreadyExists,
            _ => e.into(),
        })?;

        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Email+password login. Unknown email and wrong password produce the
    /// same error so responses do not leak which part failed.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, UserError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Phone login. OTP verification is out of scope; a known phone number
    /// is sufficient.
    pub async fn login_phone(&self, phone: &str) -> Result<User, UserError> {
        self.find_by_phone(phone).await?.ok_or(UserError::UnknownUser)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

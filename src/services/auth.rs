use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{AdminSummary, AdminUser, CurrentAdmin, LoginRequest, LoginResponse};
use crate::policy::Role;
use crate::validation;

const TOKEN_NAME: &str = "admin-token";
const TOKEN_SECRET_LEN: usize = 40;

/// Verified against when the email is unknown, so both login paths run argon2
static DUMMY_PASSWORD_HASH: OnceLock<String> = OnceLock::new();

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Check credentials and issue a new bearer token
    pub async fn login(db: &Database, req: LoginRequest) -> Result<LoginResponse> {
        let email = validation::required("email", &req.email)?;
        validation::email("email", email)?;
        validation::required("password", &req.password)?;

        let admin: Option<AdminUser> = sqlx::query_as("SELECT * FROM admin_users WHERE email = ?")
            .bind(email)
            .fetch_optional(db.pool())
            .await?;

        let admin = match admin {
            Some(admin) if Self::verify_password(&req.password, &admin.password)? => admin,
            Some(_) => return Err(Self::rejected(email)),
            None => {
                Self::verify_password(&req.password, Self::dummy_hash()?)?;
                return Err(Self::rejected(email));
            }
        };

        let token = Self::issue_token(db, admin.id).await?;
        tracing::info!("Admin {} logged in", admin.id);

        Ok(LoginResponse {
            token,
            user: AdminSummary::from(admin),
        })
    }

    fn rejected(email: &str) -> AppError {
        tracing::info!("Rejected admin login for {}", email);
        AppError::validation("email", "The provided credentials are incorrect.")
    }

    fn dummy_hash() -> Result<&'static str> {
        if let Some(hash) = DUMMY_PASSWORD_HASH.get() {
            return Ok(hash);
        }
        let hash = Self::hash_password("revenge-web-unknown-admin")?;
        Ok(DUMMY_PASSWORD_HASH.get_or_init(|| hash))
    }

    /// Issue an opaque token of the form `<row id>|<secret>`.
    /// Only the SHA-256 of the secret is stored.
    pub async fn issue_token(db: &Database, admin_id: i64) -> Result<String> {
        let secret: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_SECRET_LEN)
            .map(char::from)
            .collect();
        let now = Utc::now().to_rfc3339();

        let token_id = sqlx::query(
            r#"
            INSERT INTO personal_access_tokens (admin_user_id, name, token, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(admin_id)
        .bind(TOKEN_NAME)
        .bind(Self::hash_token(&secret))
        .bind(&now)
        .execute(db.pool())
        .await?
        .last_insert_rowid();

        Ok(format!("{}|{}", token_id, secret))
    }

    /// Resolve a presented bearer token to its admin
    pub async fn authenticate(db: &Database, token: &str) -> Result<CurrentAdmin> {
        let unauthenticated = || AppError::Unauthorized("Unauthenticated.".to_string());

        let (id_part, secret) = token.split_once('|').ok_or_else(unauthenticated)?;
        let token_id: i64 = id_part.parse().map_err(|_| unauthenticated())?;

        let row: Option<(String, i64, String, String, String)> = sqlx::query_as(
            r#"
            SELECT t.token, a.id, a.name, a.email, a.role
            FROM personal_access_tokens t
            JOIN admin_users a ON a.id = t.admin_user_id
            WHERE t.id = ?
            "#,
        )
        .bind(token_id)
        .fetch_optional(db.pool())
        .await?;

        let (stored_hash, id, name, email, role) = row.ok_or_else(unauthenticated)?;
        let matches: bool = stored_hash
            .as_bytes()
            .ct_eq(Self::hash_token(secret).as_bytes())
            .into();
        if !matches {
            return Err(unauthenticated());
        }

        sqlx::query("UPDATE personal_access_tokens SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(token_id)
            .execute(db.pool())
            .await?;

        Ok(CurrentAdmin {
            id,
            name,
            email,
            role: Role::from_stored(&role),
            token_id,
        })
    }

    /// Revoke the token used for the current request. Other tokens of the
    /// same admin stay valid.
    pub async fn logout(db: &Database, token_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM personal_access_tokens WHERE id = ?")
            .bind(token_id)
            .execute(db.pool())
            .await?;
        Ok(())
    }

    /// Hash password using Argon2
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify password against hash
    fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash token for storage
    fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

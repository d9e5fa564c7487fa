use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

pub use crate::auth::repo_types::User;
use crate::error::AppError;

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    ///
    /// A concurrent registration that wins the `users.email` unique constraint
    /// makes this fail with `Conflict`, same as the pre-insert lookup.
    pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            RETURNING id, email, password
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(insert_error)?;
        Ok(user)
    }
}

fn insert_error(err: sqlx::Error) -> AppError {
    let duplicate = err
        .as_database_error()
        .map_or(false, |d| d.is_unique_violation());
    if duplicate {
        AppError::Conflict("Email already registered".into())
    } else {
        AppError::Internal(anyhow::Error::new(err).context("insert user"))
    }
}

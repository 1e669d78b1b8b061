//! # User Repository
//!
//! Users and the credential store. The password hash column is only read by
//! [`find_credentials_by_name`]; every other query selects [`USER_COLUMNS`].

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use petro_core::{Role, User};

const USER_COLUMNS: &str =
    "id, employee_id, name, role, station_id, area_manager_id, created_at";

/// A user row together with its stored password hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        get(&mut conn, id).await
    }

    pub async fn get_by_employee_id(&self, employee_id: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE employee_id = ?1"
        ))
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Lists users, optionally restricted to one role.
    pub async fn list(&self, role: Option<Role>) -> DbResult<Vec<User>> {
        let users = match role {
            Some(role) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY name"
                ))
                .bind(role)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY name"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(users)
    }
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    user: &User,
    password_hash: &str,
) -> DbResult<()> {
    debug!(id = %user.id, employee_id = %user.employee_id, role = %user.role, "Inserting user");

    sqlx::query(
        r#"
        INSERT INTO users (
            id, employee_id, name, password_hash, role,
            station_id, area_manager_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&user.id)
    .bind(&user.employee_id)
    .bind(&user.name)
    .bind(password_hash)
    .bind(user.role)
    .bind(&user.station_id)
    .bind(&user.area_manager_id)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(user)
}

/// All users with this display name, with their hashes (names are not unique).
pub(crate) async fn find_credentials_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Vec<UserCredentials>> {
    let rows = sqlx::query_as::<_, UserCredentials>(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE name = ?1 ORDER BY created_at"
    ))
    .bind(name)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

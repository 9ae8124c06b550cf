//! Postgres-backed user store.
//!
//! Reads the relational RBAC graph (`users`, `roles`, `permissions`,
//! `user_roles`, `role_permissions`; see `migrations/0001_rbac.sql`).
//! `users.password` holds the argon2 PHC string used at login.
//!
//! ## Error Mapping
//!
//! Every SQLx failure (connection, pool closed, query error) becomes
//! `StoreError::Unavailable`; a row that cannot be decoded becomes
//! `StoreError::InvalidData`. The gate reports both as a failed check, never
//! as a denial.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use roombook_auth::{
    CredentialStore, Permission, Role, StoreError, StoredCredentials, UserRecord, UserStore,
};
use roombook_core::UserId;

/// DDL for the tables this store reads.
pub const SCHEMA: &str = include_str!("../../migrations/0001_rbac.sql");

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the RBAC tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn find_user_with_roles(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                u.id,
                u.username,
                u.is_frozen,
                u.is_admin,
                r.name AS role_name
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            WHERE u.id = $1
            ORDER BY ur.role_id ASC
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_with_roles", e))?;

        user_from_rows(&rows)
    }

    #[instrument(skip(self, roles), fields(role_count = roles.len()), err)]
    async fn expand_permissions(&self, roles: &[Role]) -> Result<HashSet<Permission>, StoreError> {
        if roles.is_empty() {
            return Ok(HashSet::new());
        }

        let names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT p.code
            FROM roles r
            JOIN role_permissions rp ON rp.role_id = r.id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE r.name = ANY($1)
            "#,
        )
        .bind(&names)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("expand_permissions", e))?;

        rows.iter()
            .map(|row| decode::<String>(row, "code").map(Permission::new))
            .collect()
    }
}

#[async_trait]
impl CredentialStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                u.id,
                u.username,
                u.password,
                u.is_frozen,
                u.is_admin,
                r.name AS role_name
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            WHERE u.username = $1
            ORDER BY ur.role_id ASC
            "#,
        )
        .bind(username)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_credentials", e))?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let password_hash: String = decode(first, "password")?;

        Ok(user_from_rows(&rows)?.map(|user| StoredCredentials {
            user,
            password_hash,
        }))
    }
}

/// Fold the one-row-per-role join into a single account.
fn user_from_rows(rows: &[sqlx::postgres::PgRow]) -> Result<Option<UserRecord>, StoreError> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut user = UserRecord {
        id: UserId::new(decode(first, "id")?),
        username: decode(first, "username")?,
        roles: Vec::with_capacity(rows.len()),
        is_frozen: decode(first, "is_frozen")?,
        is_admin: decode(first, "is_admin")?,
    };

    for row in rows {
        // LEFT JOIN yields a single NULL row for users without roles.
        if let Some(name) = decode::<Option<String>>(row, "role_name")? {
            user.roles.push(Role::new(name));
        }
    }

    Ok(Some(user))
}

fn decode<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::InvalidData(format!("column {column}: {e}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Unavailable(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::InvalidData(format!("decode error in {}: {}", operation, err))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}

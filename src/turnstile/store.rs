//! Credential storage behind the registration and login handlers.
//!
//! Handlers talk to a `CredentialStore` trait object so the validation and
//! lookup logic can run against the in-memory store in tests while the
//! server wires in Postgres. Each Postgres call acquires its own pooled
//! connection and releases it when the call returns, on every exit path.

use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{info_span, Instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("credential store query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// A credential record as submitted by a valid registration.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

/// Persistence contract for credential records.
///
/// Records are created by registration, read by login and never mutated
/// afterwards. `username` carries no uniqueness guarantee; when duplicate
/// username/password pairs exist, `find_id_by_credentials` returns whichever
/// row the store yields first.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Connectivity probe used by the startup check and `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert a new record and return its store-assigned id.
    async fn insert_credential(&self, credential: &NewCredential) -> Result<i64, StoreError>;

    /// Exact match on username and password, case-sensitive.
    async fn find_id_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<i64>, StoreError>;
}

/// Postgres-backed store, see sql/schema.sql for the table layout.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(StoreError::Unavailable)?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .map_err(StoreError::Unavailable)
    }

    async fn insert_credential(&self, credential: &NewCredential) -> Result<i64, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::Unavailable)?;

        let query = r"
            INSERT INTO users
                (first_name, last_name, username, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&credential.first_name)
            .bind(&credential.last_name)
            .bind(&credential.username)
            .bind(&credential.password)
            .fetch_one(&mut *conn)
            .instrument(span)
            .await
            .map_err(StoreError::Query)?;

        Ok(row.get("id"))
    }

    async fn find_id_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<i64>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::Unavailable)?;

        let query = "SELECT id FROM users WHERE username = $1 AND password = $2";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .bind(password)
            .fetch_optional(&mut *conn)
            .instrument(span)
            .await
            .map_err(StoreError::Query)?;

        Ok(row.map(|row| row.get("id")))
    }
}

#[derive(Debug, Clone)]
struct StoredCredential {
    id: i64,
    username: String,
    password: String,
}

/// In-memory store for unit tests and local development.
///
/// Ids are assigned sequentially from 1 and lookups scan in insertion
/// order, which makes duplicate-credential behavior deterministic in tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: Mutex<Vec<StoredCredential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_credential(&self, credential: &NewCredential) -> Result<i64, StoreError> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = records.len() as i64 + 1;
        records.push(StoredCredential {
            id,
            username: credential.username.clone(),
            password: credential.password.clone(),
        });

        Ok(id)
    }

    async fn find_id_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<i64>, StoreError> {
        let records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(records
            .iter()
            .find(|record| record.username == username && record.password == password)
            .map(|record| record.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(username: &str, password: &str) -> NewCredential {
        NewCredential {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn memory_store_assigns_sequential_ids() -> Result<(), StoreError> {
        let store = MemoryCredentialStore::new();

        let first = store.insert_credential(&credential("ann1", "secret1")).await?;
        let second = store.insert_credential(&credential("bob1", "secret2")).await?;

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_lookup_is_exact_and_case_sensitive() -> Result<(), StoreError> {
        let store = MemoryCredentialStore::new();
        store.insert_credential(&credential("ann1", "secret1")).await?;

        assert_eq!(store.find_id_by_credentials("ann1", "secret1").await?, Some(1));
        assert_eq!(store.find_id_by_credentials("Ann1", "secret1").await?, None);
        assert_eq!(store.find_id_by_credentials("ann1", "Secret1").await?, None);
        assert_eq!(store.find_id_by_credentials("ann1", "secret").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_duplicates_resolve_to_first_insert() -> Result<(), StoreError> {
        let store = MemoryCredentialStore::new();
        store.insert_credential(&credential("ann1", "secret1")).await?;
        store.insert_credential(&credential("ann1", "secret1")).await?;

        assert_eq!(store.find_id_by_credentials("ann1", "secret1").await?, Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_ping_is_healthy() -> Result<(), StoreError> {
        let store = MemoryCredentialStore::new();
        store.ping().await
    }
}

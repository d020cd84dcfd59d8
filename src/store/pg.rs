// Postgres-backed stores for groups, contacts, and account lookup

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::{FromRow, PgPool};
use std::time::Duration;

use crate::api::{AccountStore, ContactStore, GroupStore};
use crate::core::errors::ServiceError;
use crate::core::models::{CallerIdentity, Contact, Group, NewGroup};

/// Database row structure for group records
#[derive(FromRow)]
struct GroupRow {
    id: i64,
    owner_id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Database row structure for contact records
#[derive(FromRow)]
struct ContactRow {
    id: i64,
    group_id: i64,
    name: String,
    phone: Option<String>,
    email: Option<String>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
        }
    }
}

/// Postgres-backed group store
pub struct PgGroupStore {
    pool: PgPool,
}

impl PgGroupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for PgGroupStore {
    async fn insert(&self, group: NewGroup, owner_id: i64) -> Result<Group, ServiceError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "INSERT INTO groups (owner_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING id, owner_id, name, description, created_at",
        )
        .bind(owner_id)
        .bind(&group.name)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(row.into())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Group>, ServiceError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, owner_id, name, description, created_at
             FROM groups
             WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Group>, ServiceError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, owner_id, name, description, created_at
             FROM groups
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(row.map(Group::from))
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

/// Postgres-backed contact store
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn list_by_group(&self, group_id: i64) -> Result<Vec<Contact>, ServiceError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            "SELECT id, group_id, name, phone, email
             FROM contacts
             WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }
}

/// Database row structure for account lookup
#[derive(FromRow)]
struct AccountRow {
    account_id: i64,
}

/// Postgres-backed account store with in-memory caching
///
/// Token hashes resolve to the same account for their whole lifetime, so
/// lookups are cached with a TTL to keep one auth query per key per
/// window instead of one per request.
pub struct PgAccountStore {
    pool: PgPool,
    cache: Cache<String, CallerIdentity>,
}

impl PgAccountStore {
    pub fn new(pool: PgPool, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(cache_ttl)
            .max_capacity(1000)
            .build();

        Self { pool, cache }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn lookup_account(
        &self,
        token_hash: &str,
    ) -> Result<Option<CallerIdentity>, ServiceError> {
        // Check cache first
        if let Some(cached) = self.cache.get(token_hash).await {
            return Ok(Some(cached));
        }

        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT account_id
             FROM api_keys
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        let caller = row.map(|r| CallerIdentity {
            account_id: r.account_id,
        });

        // Cache if found
        if let Some(caller) = caller {
            self.cache.insert(token_hash.to_string(), caller).await;
        }

        Ok(caller)
    }
}

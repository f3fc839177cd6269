//! Redis-backed key-value store
//!
//! Hashes map to Redis hashes and ordered sets to sorted sets, so the data layout is the
//! one other tools built on the same keyspace expect.

use std::collections::HashMap;

use async_trait::async_trait;
use forum_core::{DomainError, KeyValueStore, RepoResult};
use redis::AsyncCommands;

use crate::pool::{RedisPool, RedisPoolError};

fn storage_err(err: impl Into<RedisPoolError>) -> DomainError {
    let err = err.into();
    tracing::warn!(error = %err, "Redis operation failed");
    DomainError::storage(err)
}

/// [`KeyValueStore`] over a Redis connection pool
#[derive(Debug, Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    async fn conn(&self) -> RepoResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(storage_err)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_object(&self, key: &str, fields: &[(String, String)]) -> RepoResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        conn.hset_multiple::<_, _, _, ()>(key, fields)
            .await
            .map_err(storage_err)
    }

    async fn get_object(&self, key: &str) -> RepoResult<Option<HashMap<String, String>>> {
        let mut conn = self.conn().await?;
        let hash: HashMap<String, String> = conn.hgetall(key).await.map_err(storage_err)?;
        // HGETALL on a missing key is an empty reply
        Ok(Some(hash).filter(|h| !h.is_empty()))
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key).await.map_err(storage_err)
    }

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> RepoResult<()> {
        let mut conn = self.conn().await?;
        conn.hset::<_, _, _, ()>(key, field, value)
            .await
            .map_err(storage_err)
    }

    async fn set_object_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> RepoResult<bool> {
        let mut conn = self.conn().await?;
        conn.hset_nx(key, field, value).await.map_err(storage_err)
    }

    async fn get_object_field(&self, key: &str, field: &str) -> RepoResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.hget(key, field).await.map_err(storage_err)
    }

    async fn is_object_field(&self, key: &str, field: &str) -> RepoResult<bool> {
        let mut conn = self.conn().await?;
        conn.hexists(key, field).await.map_err(storage_err)
    }

    async fn delete_object_field(&self, key: &str, field: &str) -> RepoResult<()> {
        let mut conn = self.conn().await?;
        conn.hdel::<_, _, ()>(key, field).await.map_err(storage_err)
    }

    async fn increment_object_field(&self, key: &str, field: &str) -> RepoResult<i64> {
        let mut conn = self.conn().await?;
        conn.hincr(key, field, 1_i64).await.map_err(storage_err)
    }

    async fn sorted_set_add(&self, key: &str, score: f64, member: &str) -> RepoResult<bool> {
        let mut conn = self.conn().await?;
        let added: i64 = conn.zadd(key, member, score).await.map_err(storage_err)?;
        Ok(added > 0)
    }

    async fn sorted_set_remove(&self, key: &str, member: &str) -> RepoResult<()> {
        let mut conn = self.conn().await?;
        conn.zrem::<_, _, ()>(key, member).await.map_err(storage_err)
    }

    async fn sorted_set_score(&self, key: &str, member: &str) -> RepoResult<Option<f64>> {
        let mut conn = self.conn().await?;
        conn.zscore(key, member).await.map_err(storage_err)
    }

    async fn sorted_set_card(&self, key: &str) -> RepoResult<u64> {
        let mut conn = self.conn().await?;
        conn.zcard(key).await.map_err(storage_err)
    }

    async fn sorted_set_range(&self, key: &str, start: i64, stop: i64) -> RepoResult<Vec<String>> {
        let mut conn = self.conn().await?;
        redis::cmd("ZRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await
            .map_err(storage_err)
    }

    async fn ping(&self) -> RepoResult<()> {
        self.pool.health_check().await.map_err(storage_err)
    }
}

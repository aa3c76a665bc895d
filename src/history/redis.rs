use super::FingerprintHistory;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;

/// Check-and-store as a single server-side step. Returns 1 when stored.
const INSERT_IF_ABSENT_SCRIPT: &str = r#"
local existing = redis.call('LRANGE', KEYS[1], 0, -1)
for _, value in ipairs(existing) do
    if value == ARGV[1] then
        return 0
    end
end
redis.call('RPUSH', KEYS[1], ARGV[1])
redis.call('LTRIM', KEYS[1], -tonumber(ARGV[2]), -1)
return 1
"#;

/// Redis list-backed history, shared across server instances.
/// `ConnectionManager` is cheap to clone, so all methods take `&self`.
pub struct RedisHistory {
    connection: ConnectionManager,
    key: String,
    capacity: usize,
    insert_script: redis::Script,
}

impl RedisHistory {
    pub async fn new(redis_url: &str, key: &str, capacity: usize) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::History(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::History(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Redis history connection established (key {})", key);

        Ok(RedisHistory {
            connection,
            key: key.to_string(),
            capacity,
            insert_script: redis::Script::new(INSERT_IF_ABSENT_SCRIPT),
        })
    }

    /// LTRIM start index keeping the newest `capacity` entries
    fn trim_start(&self) -> isize {
        -(self.capacity as isize)
    }
}

fn history_error(context: &str, e: redis::RedisError) -> AppError {
    AppError::History(format!("{}: {}", context, e))
}

#[async_trait]
impl FingerprintHistory for RedisHistory {
    async fn fingerprints(&self) -> Result<Vec<String>> {
        let mut conn = self.connection.clone();
        redis::cmd("LRANGE")
            .arg(&self.key)
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await
            .map_err(|e| history_error("Failed to read history", e))
    }

    async fn contains(&self, fingerprint: &str) -> Result<bool> {
        Ok(self
            .fingerprints()
            .await?
            .iter()
            .any(|fp| fp == fingerprint))
    }

    async fn append(&self, fingerprint: &str) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }

        let mut conn = self.connection.clone();
        redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(&self.key)
            .arg(fingerprint)
            .ignore()
            .cmd("LTRIM")
            .arg(&self.key)
            .arg(self.trim_start())
            .arg(-1)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| history_error("Failed to append fingerprint", e))?;

        tracing::debug!("Stored fingerprint {} in Redis history", fingerprint);
        Ok(())
    }

    async fn insert_if_absent(&self, fingerprint: &str) -> Result<bool> {
        if self.capacity == 0 {
            return Ok(true);
        }

        let mut conn = self.connection.clone();
        let stored: i64 = self
            .insert_script
            .key(&self.key)
            .arg(fingerprint)
            .arg(self.capacity)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| history_error("Failed to record fingerprint", e))?;

        Ok(stored == 1)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

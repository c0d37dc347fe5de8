//! Redis-backed `DedupStore`, grounded byte-for-byte in
//! `original_source/common/duplicate_prevention.py`'s
//! `DuplicatePreventionService`: an atomic "GET if exists else SET EX"
//! Lua script keyed by `dedup:{SHA-256(video_url)}:{language}`.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::repositories::{DedupStore, DuplicateCheckResult};

/// `GET key; if it exists, return it unchanged (duplicate); otherwise
/// `SET key value EX ttl` and return nil (original).` Mirrors the
/// original's `CHECK_AND_REGISTER_SCRIPT` exactly.
const CHECK_AND_REGISTER_SCRIPT: &str = r#"
local existing = redis.call('GET', KEYS[1])
if existing then
    return existing
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
return false
"#;

pub struct RedisDedupStore {
    conn: Option<ConnectionManager>,
    window: Duration,
}

impl RedisDedupStore {
    pub async fn connect(redis_url: &str, window: Duration) -> Self {
        match redis::Client::open(redis_url) {
            Ok(client) => match client.get_connection_manager().await {
                Ok(conn) => Self {
                    conn: Some(conn),
                    window,
                },
                Err(err) => {
                    tracing::warn!(error = %err, "dedup store could not connect, degrading to no-op");
                    Self { conn: None, window }
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "invalid redis url for dedup store, degrading to no-op");
                Self { conn: None, window }
            }
        }
    }

    fn dedup_key(video_url: &str, language: &str) -> String {
        let digest = Sha256::digest(video_url.as_bytes());
        format!("dedup:{}:{language}", hex::encode(digest))
    }
}

#[async_trait]
impl DedupStore for RedisDedupStore {
    async fn check_and_register(
        &self,
        video_url: &str,
        language: &str,
        candidate_job_id: Uuid,
    ) -> DuplicateCheckResult {
        let Some(conn) = &self.conn else {
            return DuplicateCheckResult {
                is_duplicate: false,
                existing_job_id: None,
                message: "dedup store unavailable, proceeding without suppression".to_string(),
            };
        };

        let key = Self::dedup_key(video_url, language);
        let mut conn = conn.clone();
        let script = Script::new(CHECK_AND_REGISTER_SCRIPT);
        let result: redis::RedisResult<Option<String>> = script
            .key(&key)
            .arg(candidate_job_id.to_string())
            .arg(self.window.as_secs())
            .invoke_async(&mut conn)
            .await;

        match result {
            Ok(Some(existing)) => match existing.parse::<Uuid>() {
                Ok(existing_id) => DuplicateCheckResult {
                    is_duplicate: true,
                    existing_job_id: Some(existing_id),
                    message: format!("duplicate request, already processed as job {existing_id}"),
                },
                Err(_) => {
                    // Malformed stored value: overwrite and proceed as original.
                    let _: redis::RedisResult<()> = conn
                        .set_ex(&key, candidate_job_id.to_string(), self.window.as_secs())
                        .await
                        .map(|()| ());
                    DuplicateCheckResult {
                        is_duplicate: false,
                        existing_job_id: Some(candidate_job_id),
                        message: "corrected malformed dedup entry".to_string(),
                    }
                }
            },
            Ok(None) => DuplicateCheckResult {
                is_duplicate: false,
                existing_job_id: Some(candidate_job_id),
                message: "registered as original".to_string(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "dedup check failed, degrading to not-a-duplicate");
                DuplicateCheckResult {
                    is_duplicate: false,
                    existing_job_id: None,
                    message: "dedup check failed, proceeding without suppression".to_string(),
                }
            }
        }
    }
}

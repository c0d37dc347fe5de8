//! Redis-backed `JobRepository`. Each job is a hash at `job:{id}`; a
//! side-set `jobs:index` tracks all known ids for `list()`; each job's
//! event log is a list at `job:{id}:events`, appended with `RPUSH` and
//! read back reversed for the LIFO contract of §3. TTL is applied to
//! the hash (and its event list) when a terminal status lands, per the
//! policy of §4.1.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::domain::entities::{Job, JobEvent};
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::{is_valid_transition, JobStatus};
use crate::shared::error::StoreError;

#[derive(Debug, Clone)]
pub struct TtlPolicy {
    pub done: Duration,
    pub failed: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            done: Duration::from_secs(24 * 3600),
            failed: Duration::from_secs(3600),
        }
    }
}

pub struct RedisJobStore {
    conn: ConnectionManager,
    ttl: TtlPolicy,
}

impl RedisJobStore {
    pub async fn connect(redis_url: &str, ttl: TtlPolicy) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn, ttl })
    }

    fn job_key(job_id: Uuid) -> String {
        format!("job:{job_id}")
    }

    fn events_key(job_id: Uuid) -> String {
        format!("job:{job_id}:events")
    }

    fn job_to_fields(job: &Job) -> Vec<(&'static str, String)> {
        vec![
            ("id", job.id.to_string()),
            ("video_url", job.video_url.clone()),
            ("video_title", job.video_title.clone()),
            ("language", job.language.clone()),
            (
                "target_language",
                job.target_language.clone().unwrap_or_default(),
            ),
            ("status", job.status.as_str().to_string()),
            ("created_at", job.created_at.to_rfc3339()),
            ("updated_at", job.updated_at.to_rfc3339()),
            ("error_message", job.error_message.clone().unwrap_or_default()),
            ("result_url", job.result_url.clone().unwrap_or_default()),
        ]
    }

    fn fields_to_job(fields: HashMap<String, String>) -> Result<Job, StoreError> {
        let get = |k: &str| fields.get(k).cloned().unwrap_or_default();
        let id = Uuid::from_str(&get("id"))
            .map_err(|e| StoreError::Unavailable(format!("corrupt job id: {e}")))?;
        let status = job_status_from_str(&get("status"))
            .ok_or_else(|| StoreError::Unavailable("corrupt job status".into()))?;
        let created_at = parse_timestamp(&get("created_at"))?;
        let updated_at = parse_timestamp(&get("updated_at"))?;
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        Ok(Job {
            id,
            video_url: get("video_url"),
            video_title: get("video_title"),
            language: get("language"),
            target_language: non_empty(get("target_language")),
            status,
            created_at,
            updated_at,
            error_message: non_empty(get("error_message")),
            result_url: non_empty(get("result_url")),
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Unavailable(format!("corrupt timestamp: {e}")))
}

fn job_status_from_str(s: &str) -> Option<JobStatus> {
    Some(match s {
        "PENDING" => JobStatus::Pending,
        "DOWNLOAD_QUEUED" => JobStatus::DownloadQueued,
        "DOWNLOAD_IN_PROGRESS" => JobStatus::DownloadInProgress,
        "TRANSLATE_QUEUED" => JobStatus::TranslateQueued,
        "TRANSLATE_IN_PROGRESS" => JobStatus::TranslateInProgress,
        "DONE" => JobStatus::Done,
        "SUBTITLE_MISSING" => JobStatus::SubtitleMissing,
        "FAILED" => JobStatus::Failed,
        _ => return None,
    })
}

#[async_trait]
impl JobRepository for RedisJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let key = Self::job_key(job.id);
        let fields = Self::job_to_fields(job);
        let _: () = conn.hset_multiple(&key, &fields).await?;
        let _: () = conn.sadd("jobs:index", job.id.to_string()).await?;
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(Self::job_key(job_id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::fields_to_job(fields)?))
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers("jobs:index").await?;
        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            let Ok(job_id) = Uuid::from_str(&id) else {
                continue;
            };
            if let Some(job) = self.get(job_id).await? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    async fn update_status(
        &self,
        job_id: Uuid,
        new_status: JobStatus,
        error_message: Option<String>,
    ) -> Result<(), StoreError> {
        let Some(current) = self.get(job_id).await? else {
            return Err(StoreError::JobNotFound(job_id.to_string()));
        };
        if !is_valid_transition(current.status, new_status) {
            tracing::debug!(%job_id, from = ?current.status, to = ?new_status, "ignoring invalid transition, treating as idempotent no-op");
            return Ok(());
        }

        let mut conn = self.conn.clone();
        let key = Self::job_key(job_id);
        let now = Utc::now().to_rfc3339();
        let mut fields = vec![("status", new_status.as_str().to_string()), ("updated_at", now)];
        if let Some(msg) = &error_message {
            fields.push(("error_message", msg.clone()));
        }
        let _: () = conn.hset_multiple(&key, &fields).await?;

        if new_status.is_terminal() {
            let ttl = if new_status == JobStatus::Done {
                self.ttl.done
            } else {
                self.ttl.failed
            };
            let _: () = conn.expire(&key, ttl.as_secs() as i64).await?;
            let _: () = conn.expire(Self::events_key(job_id), ttl.as_secs() as i64).await?;
        }
        Ok(())
    }

    async fn set_result_url(&self, job_id: Uuid, result_url: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let key = Self::job_key(job_id);
        let now = Utc::now().to_rfc3339();
        let fields = vec![("result_url", result_url), ("updated_at", now)];
        let _: () = conn.hset_multiple(&key, &fields).await?;
        Ok(())
    }

    async fn append_event(&self, job_id: Uuid, event: JobEvent) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(&event)?;
        let _: () = conn.rpush(Self::events_key(job_id), payload).await?;
        Ok(())
    }

    async fn list_events(&self, job_id: Uuid) -> Result<Vec<JobEvent>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(Self::events_key(job_id), 0, -1).await?;
        let mut events: Vec<JobEvent> = raw
            .into_iter()
            .filter_map(|s| serde_json::from_str(&s).ok())
            .collect();
        events.reverse();
        Ok(events)
    }
}

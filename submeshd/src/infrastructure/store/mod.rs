pub mod redis_dedup;
pub mod redis_job_store;

pub use redis_dedup::RedisDedupStore;
pub use redis_job_store::{RedisJobStore, TtlPolicy};

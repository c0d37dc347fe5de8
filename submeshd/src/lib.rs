//! Library crate backing the `scanner`, `manager`, `downloader`,
//! `translator` and `consumer` binaries: a distributed, event-driven
//! subtitle acquisition pipeline built from a Redis-backed job store,
//! a topic-exchange event bus, and per-service use cases layered in
//! domain, application, infrastructure, presentation and shared
//! modules.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;

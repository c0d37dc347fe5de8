pub mod client;

pub use client::{parse_chunk_response, HttpLlmClient, TranslationClient};

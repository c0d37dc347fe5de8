//! The LLM translation client contract (§1 "out of scope", §9): a
//! numbered-prompt request and tolerant response parsing, built around
//! the `[{"id":i,"text":…}]` chunk protocol and its own recovery rules
//! (§4.5 step 4b).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::shared::error::TranslationError;

#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// Translates one chunk of texts at once; the returned vector has
    /// the same length and order as `texts`, or this call fails.
    async fn translate_chunk(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError>;
}

pub struct HttpLlmClient {
    base_url: String,
    model: String,
    http: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client builds with a fixed timeout"),
        }
    }

    pub fn build_prompt(texts: &[String], source_language: &str, target_language: &str) -> String {
        let numbered = texts
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{}. {}", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Translate the following {source_language} subtitle lines into {target_language}. \
             Preserve the exact numbering. Respond with a JSON array only, of the form \
             [{{\"id\":1,\"text\":\"...\"}}, {{\"id\":2,\"text\":\"...\"}}, ...], with no \
             commentary before or after the array.\n\n{numbered}"
        )
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    response: String,
}

#[async_trait]
impl TranslationClient for HttpLlmClient {
    async fn translate_chunk(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        let prompt = Self::build_prompt(texts, source_language, target_language);
        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::Timeout
                } else {
                    TranslationError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(TranslationError::Api(format!("llm returned {}", response.status())));
        }

        let completion: CompletionResponse = response.json().await?;
        parse_chunk_response(&completion.response, texts.len())
    }
}

#[derive(Debug, Deserialize)]
struct ChunkItem {
    id: usize,
    text: String,
}

/// Robustly parses a chunk response of the form
/// `[{"id":i,"text":…}, …]`, tolerating trailing garbage after the
/// valid JSON, duplicated closing braces, and mid-stream truncation, by
/// scanning for complete `{...}` object boundaries and recovering the
/// longest valid prefix of objects (§4.5 step 4b). Fails the chunk if
/// fewer objects were recovered than texts were sent.
pub fn parse_chunk_response(raw: &str, expected_len: usize) -> Result<Vec<String>, TranslationError> {
    let mut items: Vec<ChunkItem> = Vec::new();
    let bytes = raw.as_bytes();
    let mut depth: i32 = 0;
    let mut object_start: Option<usize> = None;
    let mut in_string = false;
    let mut escape = false;

    for (i, &byte) in bytes.iter().enumerate() {
        let ch = byte as char;
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    object_start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(start) = object_start.take() {
                        let candidate = &raw[start..=i];
                        match serde_json::from_str::<ChunkItem>(candidate) {
                            Ok(item) => items.push(item),
                            Err(_) => break,
                        }
                    }
                } else if depth < 0 {
                    // Double/unbalanced closing brace: stop, keep what we have.
                    break;
                }
            }
            _ => {}
        }
    }

    if items.len() < expected_len {
        return Err(TranslationError::ChunkParse(format!(
            "recovered {} of {expected_len} expected translations",
            items.len()
        )));
    }

    items.sort_by_key(|i| i.id);
    Ok(items.into_iter().map(|i| i.text.trim().to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_array() {
        let raw = r#"[{"id":1,"text":"Hello "},{"id":2,"text":" World"}]"#;
        let out = parse_chunk_response(raw, 2).unwrap();
        assert_eq!(out, vec!["Hello", "World"]);
    }

    #[test]
    fn tolerates_trailing_garbage() {
        let raw = r#"[{"id":1,"text":"Hi"},{"id":2,"text":"There"}] some trailing commentary"#;
        let out = parse_chunk_response(raw, 2).unwrap();
        assert_eq!(out, vec!["Hi", "There"]);
    }

    #[test]
    fn tolerates_double_closing_brace() {
        let raw = r#"[{"id":1,"text":"Hi"}}]"#;
        let out = parse_chunk_response(raw, 1).unwrap();
        assert_eq!(out, vec!["Hi"]);
    }

    #[test]
    fn recovers_longest_valid_prefix_on_truncation() {
        let raw = r#"[{"id":1,"text":"Hi"},{"id":2,"text":"Trunc"#;
        let result = parse_chunk_response(raw, 2);
        assert!(result.is_err());
    }

    #[test]
    fn fails_when_recovered_set_is_shorter_than_expected() {
        let raw = r#"[{"id":1,"text":"only one"}]"#;
        assert!(parse_chunk_response(raw, 2).is_err());
    }

    #[test]
    fn reorders_by_id_regardless_of_array_order() {
        let raw = r#"[{"id":2,"text":"second"},{"id":1,"text":"first"}]"#;
        let out = parse_chunk_response(raw, 2).unwrap();
        assert_eq!(out, vec!["first", "second"]);
    }
}

use std::path::PathBuf;

use anyhow::Context;
use dashmap::DashMap;
use futures::StreamExt;
use html_escape::decode_html_entities;
use xxhash_rust::xxh3::xxh3_64;

/// How many translation requests to keep in flight.
const CONCURRENT_REQUESTS: usize = 16;

/// Word-list translation: order-preserving, one output per input word.
#[allow(async_fn_in_trait)]
pub trait Translator {
    async fn translate_words(&self, words: &[String]) -> anyhow::Result<Vec<String>>;
}

/// Google Translate v2 client with a persistent on-disk cache, so repeated
/// runs over the same book do not re-translate the same words.
pub struct GoogleTranslator {
    client: reqwest::Client,
    source_language: String,
    target_language: String,
    api_key: String,
    cache: DashMap<u64, String>, // hash -> translation
    cache_file: PathBuf,
}

impl GoogleTranslator {
    /// Reads the API key from `GOOGLE_TRANSLATE_API_KEY`.
    pub fn new(
        source_language: &str,
        target_language: &str,
        cache_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY")
            .context("GOOGLE_TRANSLATE_API_KEY not set")?;
        Self::with_api_key(source_language, target_language, cache_dir, api_key)
    }

    pub fn with_api_key(
        source_language: &str,
        target_language: &str,
        cache_dir: PathBuf,
        api_key: String,
    ) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory {}", cache_dir.display())
        })?;

        let cache_file = cache_dir.join("translations.json");
        let cache: DashMap<u64, String> = if cache_file.exists() {
            let content = std::fs::read_to_string(&cache_file)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            DashMap::new()
        };

        Ok(GoogleTranslator {
            client: reqwest::Client::new(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            api_key,
            cache,
            cache_file,
        })
    }

    fn cache_key(&self, word: &str) -> u64 {
        let input = format!("{}::{}::{word}", self.source_language, self.target_language);
        xxh3_64(input.as_bytes())
    }

    async fn translate_one(&self, word: &str) -> anyhow::Result<String> {
        let key = self.cache_key(word);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let url = format!(
            "https://translation.googleapis.com/language/translate/v2?key={}",
            self.api_key
        );
        let response = self
            .client
            .post(&url)
            .form(&[
                ("q", word),
                ("source", self.source_language.as_str()),
                ("target", self.target_language.as_str()),
                ("format", "text"),
            ])
            .send()
            .await
            .context("Failed to call the Google Translate API")?;
        let value: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse the Google Translate response")?;

        let translated = value["data"]["translations"][0]["translatedText"]
            .as_str()
            .with_context(|| format!("Google Translate returned no translation for {word:?}"))?;
        let translated = decode_html_entities(translated).to_string();

        self.cache.insert(key, translated.clone());
        Ok(translated)
    }

    /// Write the in-memory cache back to disk.
    fn save_cache(&self) {
        match serde_json::to_string_pretty(&self.cache) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.cache_file, json) {
                    log::warn!("Failed to write translation cache: {e}");
                }
            }
            Err(e) => log::warn!("Failed to serialize translation cache: {e}"),
        }
    }
}

impl Translator for GoogleTranslator {
    async fn translate_words(&self, words: &[String]) -> anyhow::Result<Vec<String>> {
        let results: Vec<anyhow::Result<String>> = futures::stream::iter(words)
            .map(|word| self.translate_one(word))
            .buffered(CONCURRENT_REQUESTS)
            .collect()
            .await;

        let translations = results
            .into_iter()
            .collect::<anyhow::Result<Vec<String>>>()?;
        self.save_cache();
        Ok(translations)
    }
}

impl Drop for GoogleTranslator {
    fn drop(&mut self) {
        self.save_cache();
    }
}

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::sentence::AnnotatedSentence;

/// Endpoint of the ailab.lv NLP service.
const NLP_ENDPOINT: &str = "https://nlp.ailab.lv/api/nlp";
/// Processing steps requested from the service.
const NLP_STEPS: [&str; 3] = ["tokenizer", "morpho", "ner"];

#[derive(Debug, Serialize)]
struct NlpRequest<'a> {
    steps: [&'a str; 3],
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct NlpResponse {
    data: NlpPayload,
}

#[derive(Debug, Deserialize)]
struct NlpPayload {
    #[serde(default)]
    sentences: Vec<AnnotatedSentence>,
}

/// The linguistic annotation service: raw text in, tokenized and NER-tagged
/// sentences out. Failures surface to the caller; retrying is not this
/// layer's job.
#[allow(async_fn_in_trait)]
pub trait Annotator {
    async fn annotate(&self, text: &str) -> anyhow::Result<Vec<AnnotatedSentence>>;
}

/// Client for the ailab.lv NLP API.
pub struct AilabAnnotator {
    client: reqwest::Client,
    endpoint: String,
}

impl AilabAnnotator {
    pub fn new() -> Self {
        Self::with_endpoint(NLP_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        AilabAnnotator {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for AilabAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for AilabAnnotator {
    async fn annotate(&self, text: &str) -> anyhow::Result<Vec<AnnotatedSentence>> {
        let request = NlpRequest {
            steps: NLP_STEPS,
            data: text,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to call the NLP annotation service")?
            .error_for_status()
            .context("NLP annotation service returned an error status")?;

        let response: NlpResponse = response
            .json()
            .await
            .context("Failed to parse the NLP annotation response")?;

        Ok(response.data.sentences)
    }
}

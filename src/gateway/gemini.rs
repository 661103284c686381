use async_stream::stream;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::SummaryApiConfig;
use crate::gateway::model::{GenerateContentRequest, GenerateContentResponse};
use crate::gateway::sse::SseDecoder;
use crate::gateway::{FragmentStream, GatewayError, SummaryGateway};

const FINISH_REASON_SAFETY: &str = "SAFETY";
const URL_RETRIEVAL_FAILURES: [&str; 2] = [
    "URL_RETRIEVAL_STATUS_ERROR",
    "URL_RETRIEVAL_STATUS_UNSAFE",
];

/// What a single server-sent event means for the summary stream
#[derive(Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Text(String),
    Skip,
    Fail(GatewayError),
}

/// Interpret one `data:` payload of the generation stream.
///
/// Payloads that are not valid JSON are skipped rather than failing the
/// whole stream.
pub fn interpret_event(data: &str) -> EventOutcome {
    if data.trim().is_empty() {
        return EventOutcome::Skip;
    }

    let response: GenerateContentResponse = match serde_json::from_str(data) {
        Ok(r) => r,
        Err(e) => {
            debug!("Skipping malformed stream event: {}", e);
            return EventOutcome::Skip;
        }
    };

    if let Some(error) = response.error {
        return EventOutcome::Fail(GatewayError::Api {
            code: error.code,
            message: error.message.unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    if let Some(candidate) = response.candidates.first() {
        if candidate.finish_reason.as_deref() == Some(FINISH_REASON_SAFETY) {
            return EventOutcome::Fail(GatewayError::ContentFiltered);
        }

        let failed_url = candidate
            .url_context_metadata
            .iter()
            .flat_map(|m| m.url_metadata.iter())
            .find(|m| {
                m.url_retrieval_status
                    .as_deref()
                    .is_some_and(|s| URL_RETRIEVAL_FAILURES.contains(&s))
            });
        if let Some(meta) = failed_url {
            let url = meta.retrieved_url.as_deref().unwrap_or("article URL");
            return EventOutcome::Fail(GatewayError::UrlRetrieval(format!(
                "Could not access {}",
                url
            )));
        }
    }

    match response.extract_text() {
        Some(text) if !text.is_empty() => EventOutcome::Text(text.to_string()),
        _ => EventOutcome::Skip,
    }
}

/// Streams summaries from the generative language API over server-sent events.
pub struct HttpSummaryGateway {
    client: Client,
    config: SummaryApiConfig,
}

impl HttpSummaryGateway {
    pub fn new(config: SummaryApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl SummaryGateway for HttpSummaryGateway {
    fn summarize(&self, url: &str) -> FragmentStream {
        let request = self
            .client
            .post(self.endpoint())
            .query(&[("alt", "sse"), ("key", self.config.api_key.as_str())])
            .json(&GenerateContentRequest::for_summarization(url));

        Box::pin(stream! {
            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    yield Err(GatewayError::from(e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GenerateContentResponse>(&body)
                    .ok()
                    .and_then(|r| r.error)
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
                warn!(status = %status, message = %message, "Summary API error");
                yield Err(GatewayError::Api {
                    code: Some(i64::from(status.as_u16())),
                    message,
                });
                return;
            }

            let mut decoder = SseDecoder::new();
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(GatewayError::from(e));
                        return;
                    }
                };
                for data in decoder.push(&chunk) {
                    match interpret_event(&data) {
                        EventOutcome::Text(text) => yield Ok(text),
                        EventOutcome::Skip => {}
                        EventOutcome::Fail(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            if let Some(data) = decoder.finish() {
                match interpret_event(&data) {
                    EventOutcome::Text(text) => yield Ok(text),
                    EventOutcome::Skip => {}
                    EventOutcome::Fail(e) => yield Err(e),
                }
            }
        })
    }
}

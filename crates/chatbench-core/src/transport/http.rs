use async_trait::async_trait;
use chatbench_ai::{SseDecoder, build_http_client, truncate_body};
use chatbench_models::CompletionRequest;
use futures::StreamExt;
use reqwest::{Client, Response, header};

use super::{ChunkStream, CompletionTransport, TransportError};

/// [`CompletionTransport`] over the chatbench server's HTTP interface.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(build_http_client(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body: truncate_body(body),
    })
}

fn decode_payload(data: &str) -> Result<String, TransportError> {
    Ok(serde_json::from_str::<String>(data)?)
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn open_channel(&self) -> Result<ChunkStream, TransportError> {
        let response = self
            .client
            .get(self.url("/events"))
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = ensure_success(response).await?;

        tracing::debug!(url = %self.url("/events"), "Push channel open");

        let mut body = response.bytes_stream();
        Ok(Box::pin(async_stream::stream! {
            let mut decoder = SseDecoder::new();
            while let Some(bytes) = body.next().await {
                let bytes = match bytes {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(TransportError::Http(e));
                        return;
                    }
                };
                for event in decoder.push(&bytes) {
                    yield decode_payload(&event.data);
                }
            }
            if let Some(event) = decoder.finish() {
                yield decode_payload(&event.data);
            }
        }))
    }

    async fn trigger(&self, request: &CompletionRequest) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url("/trigger"))
            .json(request)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn abort(&self) -> Result<(), TransportError> {
        let response = self.client.post(self.url("/abort")).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

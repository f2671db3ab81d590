//! Ollama NDJSON stream to [`GenerationEvent`] adapter.
//!
//! A streamed `/api/generate` response is one JSON object per line. Each
//! line carries a `response` text delta; the last one has `done: true`.
//! Lines may be split across body chunks, so bytes are buffered until a
//! newline arrives.

use std::fmt::Display;
use std::time::Duration;

use futures_util::{Stream, StreamExt};

use smartchat_core::inference::FragmentStream;
use smartchat_types::error::RelayError;
use smartchat_types::inference::GenerationEvent;

use super::types::{GenerateChunk, GenerateRequest};
use crate::http::{map_transport_error, status_error, transport_detail};

enum Line {
    Skip,
    Delta(String),
    Done(String),
}

fn parse_line(raw: &[u8]) -> Result<Line, RelayError> {
    let trimmed = raw.trim_ascii();
    if trimmed.is_empty() {
        return Ok(Line::Skip);
    }

    let chunk: GenerateChunk = match serde_json::from_slice(trimmed) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed generate line");
            return Ok(Line::Skip);
        }
    };

    if let Some(error) = chunk.error {
        return Err(RelayError::UpstreamUnavailable(error));
    }
    if chunk.done {
        Ok(Line::Done(chunk.response))
    } else {
        Ok(Line::Delta(chunk.response))
    }
}

/// Decode an NDJSON generate body into generation events.
///
/// Emits a `TextDelta` per non-empty `response` and a final `Done`. A body
/// that ends before a `done` line fails with `UpstreamUnavailable`.
pub fn decode_generate_stream<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    Box::pin(async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut buffer: Vec<u8> = Vec::new();
        let mut finished = false;

        'read: while let Some(chunk) = body.next().await {
            let chunk = chunk
                .map_err(|e| RelayError::UpstreamUnavailable(format!("response body read: {e}")))?;
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                match parse_line(&line)? {
                    Line::Skip => {}
                    Line::Delta(text) => {
                        if !text.is_empty() {
                            yield GenerationEvent::TextDelta(text);
                        }
                    }
                    Line::Done(text) => {
                        if !text.is_empty() {
                            yield GenerationEvent::TextDelta(text);
                        }
                        finished = true;
                        break 'read;
                    }
                }
            }
        }

        // Final line without a trailing newline.
        if !finished && !buffer.is_empty() {
            match parse_line(&buffer)? {
                Line::Skip => {}
                Line::Delta(text) => {
                    if !text.is_empty() {
                        yield GenerationEvent::TextDelta(text);
                    }
                }
                Line::Done(text) => {
                    if !text.is_empty() {
                        yield GenerationEvent::TextDelta(text);
                    }
                    finished = true;
                }
            }
        }

        if !finished {
            Err(RelayError::UpstreamUnavailable(
                "stream ended before completion".to_string(),
            ))?;
        }

        yield GenerationEvent::Done;
    })
}

async fn open_generate(
    client: &reqwest::Client,
    url: &str,
    body: &GenerateRequest<'_>,
    timeout: Duration,
) -> Result<reqwest::Response, RelayError> {
    let response = client
        .post(url)
        .timeout(timeout)
        .json(body)
        .send()
        .await
        .map_err(map_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let err = status_error(response).await;
        tracing::warn!(status = %status, error = %err, "Ollama generate stream rejected");
        return Err(err);
    }
    Ok(response)
}

/// Open a streamed generate call. Connection and status failures are the
/// first (and only) item of the returned stream.
pub fn create_generate_stream(
    client: &reqwest::Client,
    url: &str,
    model: &str,
    prompt: &str,
    timeout: Duration,
) -> FragmentStream {
    let client = client.clone();
    let url = url.to_string();
    let model = model.to_string();
    let prompt = prompt.to_string();

    Box::pin(async_stream::try_stream! {
        let body = GenerateRequest {
            model: &model,
            prompt: &prompt,
            stream: true,
        };
        let response = open_generate(&client, &url, &body, timeout).await?;

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| transport_detail(&e)));
        let mut events = decode_generate_stream(bytes);
        while let Some(event) = events.next().await {
            yield event?;
        }
    })
}

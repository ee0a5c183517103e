//! Blocking HTTP execution over ureq.
//!
//! ureq is built without its own decompression, so the `Accept-Encoding`
//! header the dispatcher sends is honoured here: gzip and deflate bodies are
//! inflated before classification, anything else is returned as received.
//! Bodies are read without a size cap.

use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};
use tracing::trace;
use ureq::Agent;

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request. Status codes are never turned into errors here;
/// only failures below HTTP are.
pub fn execute(agent: &Agent, request: &HttpRequest) -> Result<HttpResponse> {
    let url = request.url.as_str();
    let mut response = match request.method {
        HttpMethod::Get => {
            let mut builder = agent.get(url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if request.body.is_empty() {
                builder.call()?
            } else {
                builder.force_send_body().send(request.body.as_bytes())?
            }
        }
        HttpMethod::Delete => {
            let mut builder = agent.delete(url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if request.body.is_empty() {
                builder.call()?
            } else {
                builder.force_send_body().send(request.body.as_bytes())?
            }
        }
        HttpMethod::Post => {
            let mut builder = agent.post(url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.send(request.body.as_bytes())?
        }
        HttpMethod::Put => {
            let mut builder = agent.put(url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.send(request.body.as_bytes())?
        }
    };

    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let raw = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()?;

    let mut received = HttpResponse {
        status,
        headers,
        body: Vec::new(),
    };
    received.body = decode_body(received.header("Content-Encoding"), raw)?;
    trace!(status, bytes = received.body.len(), "response received");
    Ok(received)
}

/// Inflates a body according to its `Content-Encoding`.
pub fn decode_body(content_encoding: Option<&str>, raw: Vec<u8>) -> Result<Vec<u8>> {
    let encoding = content_encoding.map(|e| e.trim().to_ascii_lowercase());
    match encoding.as_deref() {
        Some("gzip") | Some("x-gzip") => {
            let mut decoded = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut decoded)
                .map_err(Error::Decompression)?;
            Ok(decoded)
        }
        Some("deflate") => {
            let mut decoded = Vec::new();
            ZlibDecoder::new(raw.as_slice())
                .read_to_end(&mut decoded)
                .map_err(Error::Decompression)?;
            Ok(decoded)
        }
        _ => Ok(raw),
    }
}

/// Agent that hands 3xx, 4xx and 5xx back as responses for the classifier.
/// Redirects are not followed, so one call is exactly one request.
pub fn default_agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(0)
        .build()
        .new_agent()
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire encoding and the HTTP transport.
//!
//! A payload travels as `GET {base_url}/{track|engage}?data=<b64>&verbose=<0|1>`,
//! where `<b64>` is the base64url encoding of the payload's UTF-8 JSON.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine};
use loom_analytics_core::Endpoint;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{AnalyticsError, Result};

/// Default ingestion host.
pub const DEFAULT_BASE_URL: &str = "https://api.mixpanel.com";

/// Performs one request against an ingestion endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Sends already-encoded `data` and returns the raw response body.
	async fn send(&self, endpoint: Endpoint, data: &str, verbose: bool) -> Result<String>;
}

/// Transport over HTTP GET.
pub struct HttpTransport {
	http: Client,
	base_url: String,
}

impl HttpTransport {
	/// Creates a transport for `base_url` with the given request timeout.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
		if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
			return Err(AnalyticsError::InvalidBaseUrl(base_url.to_string()));
		}

		let http = Client::builder()
			.user_agent(user_agent())
			.timeout(timeout)
			.build()?;

		Ok(Self {
			http,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(&self, endpoint: Endpoint, data: &str, verbose: bool) -> Result<String> {
		let url = format!("{}{}", self.base_url, endpoint.path());
		debug!(url = %url, verbose, "Sending analytics payload");

		let response = self
			.http
			.get(&url)
			.query(&[("data", data), ("verbose", if verbose { "1" } else { "0" })])
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			return Err(AnalyticsError::ServerError {
				status: status.as_u16(),
				message: body,
			});
		}

		Ok(body)
	}
}

/// Returns the User-Agent sent with every request: `loom-analytics/{version}`.
pub fn user_agent() -> String {
	format!("loom-analytics/{}", env!("CARGO_PKG_VERSION"))
}

/// Encodes a payload as base64url of its UTF-8 JSON.
pub fn encode_payload(payload: &Value) -> Result<String> {
	let json = serde_json::to_vec(payload)?;
	Ok(URL_SAFE.encode(json))
}

#[derive(Debug, Deserialize)]
struct VerboseResponse {
	status: i64,
	#[serde(default)]
	error: Option<String>,
}

/// Classifies a response body.
///
/// Verbose bodies are JSON with `status == 1` on success and an `error`
/// message otherwise. Non-verbose bodies must be exactly `1`.
pub fn classify_response(body: &str, verbose: bool) -> Result<()> {
	if verbose {
		let parsed: VerboseResponse =
			serde_json::from_str(body).map_err(AnalyticsError::MalformedResponse)?;
		if parsed.status == 1 {
			Ok(())
		} else {
			Err(AnalyticsError::Rejected {
				message: parsed
					.error
					.unwrap_or_else(|| format!("status {}", parsed.status)),
			})
		}
	} else if body == "1" {
		Ok(())
	} else {
		Err(AnalyticsError::UnexpectedResponse {
			body: body.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[test]
	fn test_encode_is_base64url_of_json() {
		let payload = json!({"event": "a?b>c", "properties": {}});
		let encoded = encode_payload(&payload).unwrap();
		assert!(!encoded.contains('+') && !encoded.contains('/'));

		let decoded = URL_SAFE.decode(encoded).unwrap();
		let back: Value = serde_json::from_slice(&decoded).unwrap();
		assert_eq!(back, payload);
	}

	#[test]
	fn test_non_verbose_accepts_only_literal_one() {
		assert!(classify_response("1", false).is_ok());
		assert!(matches!(
			classify_response("0", false),
			Err(AnalyticsError::UnexpectedResponse { .. })
		));
		assert!(matches!(
			classify_response("1\n", false),
			Err(AnalyticsError::UnexpectedResponse { .. })
		));
	}

	#[test]
	fn test_verbose_status_one_is_success() {
		assert!(classify_response(r#"{"status":1,"error":null}"#, true).is_ok());
	}

	#[test]
	fn test_verbose_failure_carries_error_message() {
		let err = classify_response(r#"{"status":0,"error":"token missing"}"#, true).unwrap_err();
		match err {
			AnalyticsError::Rejected { message } => assert_eq!(message, "token missing"),
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn test_verbose_garbage_is_malformed() {
		assert!(matches!(
			classify_response("1", true).unwrap_err(),
			AnalyticsError::MalformedResponse(_)
		));
	}

	#[test]
	fn test_rejects_non_http_base_url() {
		assert!(matches!(
			HttpTransport::new("api.example.com", Duration::from_secs(1)),
			Err(AnalyticsError::InvalidBaseUrl(_))
		));
	}

	#[test]
	fn test_normalizes_trailing_slash() {
		let transport = HttpTransport::new("https://example.com/", Duration::from_secs(1)).unwrap();
		assert_eq!(transport.base_url(), "https://example.com");
	}

	#[test]
	fn test_user_agent_names_sdk() {
		assert!(user_agent().starts_with("loom-analytics/"));
	}

	#[tokio::test]
	async fn test_http_transport_sends_data_and_verbose_params() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/engage"))
			.and(query_param("data", "e30="))
			.and(query_param("verbose", "1"))
			.respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":1}"#))
			.expect(1)
			.mount(&server)
			.await;

		let transport = HttpTransport::new(&server.uri(), Duration::from_secs(5)).unwrap();
		let body = transport.send(Endpoint::Engage, "e30=", true).await.unwrap();
		assert_eq!(body, r#"{"status":1}"#);
	}

	#[tokio::test]
	async fn test_http_transport_maps_error_status() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/track"))
			.respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
			.mount(&server)
			.await;

		let transport = HttpTransport::new(&server.uri(), Duration::from_secs(5)).unwrap();
		let err = transport.send(Endpoint::Track, "e30=", false).await.unwrap_err();
		assert!(matches!(
			err,
			AnalyticsError::ServerError { status: 503, ref message } if message == "unavailable"
		));
	}
}

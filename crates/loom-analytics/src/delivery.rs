// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-payload delivery pipeline.
//!
//! Each payload is sent once, immediately. There is no queue and no retry;
//! a failed delivery loses that payload unless the error handler acts on it.

use std::sync::Arc;

use loom_analytics_core::Endpoint;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::debug::DebugLog;
use crate::error::{AnalyticsError, Result};
use crate::handler::{capture_trace, DeliveryFailure, ErrorHandler};
use crate::transport::{classify_response, encode_payload, Transport};

/// Switches controlling what [`Delivery::send`] does with a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOptions {
	/// When false, nothing goes on the wire.
	pub enabled: bool,
	/// Ask the server for verbose JSON responses.
	pub verbose: bool,
	/// Log every attempted payload.
	pub debug_print: bool,
	/// Keep every attempted payload in the [`DebugLog`].
	pub debug_record: bool,
}

impl Default for DeliveryOptions {
	fn default() -> Self {
		Self {
			enabled: true,
			verbose: false,
			debug_print: false,
			debug_record: false,
		}
	}
}

pub struct Delivery {
	transport: Arc<dyn Transport>,
	token_configured: bool,
	options: DeliveryOptions,
	debug_log: DebugLog,
	error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl Delivery {
	pub fn new(
		transport: Arc<dyn Transport>,
		token_configured: bool,
		options: DeliveryOptions,
		error_handler: Option<Arc<dyn ErrorHandler>>,
	) -> Self {
		Self {
			transport,
			token_configured,
			options,
			debug_log: DebugLog::new(),
			error_handler,
		}
	}

	pub fn debug_log(&self) -> &DebugLog {
		&self.debug_log
	}

	/// Sends one payload.
	///
	/// Recording and printing happen before the enabled check, so a disabled
	/// client still shows what it would have sent. Failures go to the error
	/// handler when one is configured and are returned otherwise.
	pub async fn send(&self, endpoint: Endpoint, payload: Value) -> Result<()> {
		if self.options.debug_record {
			self.debug_log.record(endpoint, payload.clone());
		}
		if self.options.debug_print {
			info!(
				target: "loom_analytics::debug",
				endpoint = %endpoint,
				payload = %payload,
				"Analytics payload"
			);
		}

		if !self.options.enabled || !self.token_configured {
			debug!(
				endpoint = %endpoint,
				enabled = self.options.enabled,
				token_configured = self.token_configured,
				"Sending disabled, payload not delivered"
			);
			return Ok(());
		}

		match self.deliver(endpoint, &payload).await {
			Ok(()) => {
				debug!(endpoint = %endpoint, "Analytics payload delivered");
				Ok(())
			}
			Err(error) => self.fail(endpoint, &payload, error),
		}
	}

	async fn deliver(&self, endpoint: Endpoint, payload: &Value) -> Result<()> {
		let data = encode_payload(payload)?;
		let body = self
			.transport
			.send(endpoint, &data, self.options.verbose)
			.await?;
		classify_response(&body, self.options.verbose)
	}

	fn fail(&self, endpoint: Endpoint, payload: &Value, error: AnalyticsError) -> Result<()> {
		match &self.error_handler {
			Some(handler) => {
				warn!(endpoint = %endpoint, error = %error, "Analytics delivery failed, reported to handler");
				handler.on_error(&DeliveryFailure {
					error: &error,
					trace: capture_trace(),
					endpoint,
					payload,
				});
				Ok(())
			}
			None => {
				warn!(endpoint = %endpoint, error = %error, "Analytics delivery failed");
				Err(error)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use parking_lot::Mutex;
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};

	struct MockTransport {
		calls: AtomicUsize,
		requests: Mutex<Vec<(Endpoint, String, bool)>>,
		body: Mutex<String>,
	}

	impl MockTransport {
		fn replying(body: &str) -> Arc<Self> {
			Arc::new(Self {
				calls: AtomicUsize::new(0),
				requests: Mutex::new(Vec::new()),
				body: Mutex::new(body.to_string()),
			})
		}
	}

	#[async_trait]
	impl Transport for MockTransport {
		async fn send(&self, endpoint: Endpoint, data: &str, verbose: bool) -> Result<String> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.requests
				.lock()
				.push((endpoint, data.to_string(), verbose));
			Ok(self.body.lock().clone())
		}
	}

	fn options(enabled: bool) -> DeliveryOptions {
		DeliveryOptions {
			enabled,
			debug_record: true,
			..Default::default()
		}
	}

	#[tokio::test]
	async fn test_disabled_records_but_does_not_send() {
		let transport = MockTransport::replying("1");
		let delivery = Delivery::new(transport.clone(), true, options(false), None);

		delivery
			.send(Endpoint::Track, json!({"event": "a"}))
			.await
			.unwrap();

		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
		assert_eq!(delivery.debug_log().len(), 1);
	}

	#[tokio::test]
	async fn test_missing_token_does_not_send() {
		let transport = MockTransport::replying("1");
		let delivery = Delivery::new(transport.clone(), false, options(true), None);

		delivery.send(Endpoint::Track, json!({})).await.unwrap();

		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
		assert_eq!(delivery.debug_log().len(), 1);
	}

	#[tokio::test]
	async fn test_success_sends_encoded_payload_once() {
		let transport = MockTransport::replying("1");
		let delivery = Delivery::new(transport.clone(), true, options(true), None);

		delivery.send(Endpoint::Engage, json!({})).await.unwrap();

		let requests = transport.requests.lock();
		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0], (Endpoint::Engage, "e30=".to_string(), false));
	}

	#[tokio::test]
	async fn test_failure_without_handler_is_returned() {
		let transport = MockTransport::replying("0");
		let delivery = Delivery::new(transport, true, options(true), None);

		let err = delivery.send(Endpoint::Track, json!({})).await.unwrap_err();
		assert!(matches!(err, AnalyticsError::UnexpectedResponse { .. }));
		// Recorded even though it failed.
		assert_eq!(delivery.debug_log().len(), 1);
	}

	#[tokio::test]
	async fn test_failure_with_handler_is_swallowed() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		let handler: Arc<dyn ErrorHandler> = Arc::new(move |failure: &DeliveryFailure<'_>| {
			sink.lock().push((
				failure.endpoint,
				failure.payload.clone(),
				failure.error.to_string(),
			));
		});
		let transport = MockTransport::replying(r#"{"status":0,"error":"bad token"}"#);
		let delivery = Delivery::new(
			transport,
			true,
			DeliveryOptions {
				verbose: true,
				..Default::default()
			},
			Some(handler),
		);

		delivery
			.send(Endpoint::Track, json!({"event": "x"}))
			.await
			.unwrap();

		let seen = seen.lock();
		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].0, Endpoint::Track);
		assert_eq!(seen[0].1, json!({"event": "x"}));
		assert!(seen[0].2.contains("bad token"));
	}

	#[tokio::test]
	async fn test_debug_record_off_keeps_log_empty() {
		let transport = MockTransport::replying("1");
		let delivery = Delivery::new(transport, true, DeliveryOptions::default(), None);
		delivery.send(Endpoint::Track, json!({})).await.unwrap();
		assert!(delivery.debug_log().is_empty());
	}
}

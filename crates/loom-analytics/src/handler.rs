// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error-notification sink for delivery failures.

use loom_analytics_core::Endpoint;
use serde_json::Value;

use crate::error::AnalyticsError;

/// A failed delivery, as seen by an [`ErrorHandler`].
#[derive(Debug)]
pub struct DeliveryFailure<'a> {
	pub error: &'a AnalyticsError,
	/// Backtrace captured at the point the failure was routed.
	pub trace: String,
	pub endpoint: Endpoint,
	/// The payload exactly as it would have been sent.
	pub payload: &'a Value,
}

/// Receives delivery failures.
///
/// When a handler is configured, the failure is reported here and the
/// triggering call succeeds. Without one, the failure is returned to the caller.
pub trait ErrorHandler: Send + Sync {
	fn on_error(&self, failure: &DeliveryFailure<'_>);
}

impl<F> ErrorHandler for F
where
	F: Fn(&DeliveryFailure<'_>) + Send + Sync,
{
	fn on_error(&self, failure: &DeliveryFailure<'_>) {
		self(failure)
	}
}

pub(crate) fn capture_trace() -> String {
	format!("{:?}", backtrace::Backtrace::new())
}

#[cfg(test)]
mod tests {
	use super::*;
	use parking_lot::Mutex;
	use serde_json::json;
	use std::sync::Arc;

	#[test]
	fn test_closures_are_handlers() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		let handler = move |failure: &DeliveryFailure<'_>| {
			sink.lock().push((failure.endpoint, failure.error.to_string()));
		};

		let error = AnalyticsError::UnexpectedResponse {
			body: "0".to_string(),
		};
		let payload = json!({"event": "x"});
		handler.on_error(&DeliveryFailure {
			error: &error,
			trace: capture_trace(),
			endpoint: Endpoint::Track,
			payload: &payload,
		});

		let seen = seen.lock();
		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].0, Endpoint::Track);
		assert!(seen[0].1.contains("unexpected response body"));
	}

	#[test]
	fn test_trace_is_not_empty() {
		assert!(!capture_trace().is_empty());
	}
}

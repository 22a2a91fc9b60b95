// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the analytics SDK.
//!
//! Two families are kept apart:
//!
//! - [`InvariantViolation`]: the caller has a bug (timer started twice, alias
//!   without an identity). Always returned to the caller, never routed to the
//!   error handler.
//! - Delivery failures: network errors and rejected or malformed responses.
//!   Routed to the configured error handler when one exists, otherwise
//!   returned to the caller of the triggering operation.

use std::path::PathBuf;

use thiserror::Error;

/// Programmer errors detected by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
	/// A timer was started for an event that already has an open timer.
	#[error("timer already started for event '{event}'")]
	TimerAlreadyStarted { event: String },

	/// An alias was requested before any distinct id was set.
	#[error("alias requires a distinct id to be set first")]
	MissingDistinctId,
}

/// Analytics SDK errors.
#[derive(Debug, Error)]
pub enum AnalyticsError {
	/// Caller bug; see [`InvariantViolation`].
	#[error("invariant violation: {0}")]
	Invariant(#[from] InvariantViolation),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned a non-success status code.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Verbose response carried a status other than 1.
	#[error("ingestion rejected payload: {message}")]
	Rejected { message: String },

	/// Non-verbose response body was not the literal `1`.
	#[error("unexpected response body: {body:?}")]
	UnexpectedResponse { body: String },

	/// Verbose response body was not the expected JSON document.
	#[error("malformed response body: {0}")]
	MalformedResponse(#[source] serde_json::Error),

	/// Payload could not be encoded.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// Base URL is missing or invalid.
	#[error("invalid base URL: {0}")]
	InvalidBaseUrl(String),

	/// Request timeout was zero.
	#[error("request timeout must be greater than zero")]
	InvalidTimeout,

	/// The install-state storage failed.
	#[error("storage error: {0}")]
	Storage(#[from] StorageError),
}

/// Errors from an install-state storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("failed to access {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("corrupt state file {path}: {source}")]
	Corrupt {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
}

impl AnalyticsError {
	/// Returns true if this error reports a caller bug rather than an environment failure.
	pub fn is_invariant_violation(&self) -> bool {
		matches!(self, AnalyticsError::Invariant(_))
	}

	/// Returns true if this error came out of the delivery pipeline.
	pub fn is_delivery_failure(&self) -> bool {
		matches!(
			self,
			AnalyticsError::RequestFailed(_)
				| AnalyticsError::ServerError { .. }
				| AnalyticsError::Rejected { .. }
				| AnalyticsError::UnexpectedResponse { .. }
				| AnalyticsError::MalformedResponse(_)
				| AnalyticsError::Serialization(_)
		)
	}
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invariant_violations_are_not_delivery_failures() {
		let err = AnalyticsError::from(InvariantViolation::MissingDistinctId);
		assert!(err.is_invariant_violation());
		assert!(!err.is_delivery_failure());
	}

	#[test]
	fn test_rejected_is_delivery_failure() {
		let err = AnalyticsError::Rejected {
			message: "token invalid".to_string(),
		};
		assert!(err.is_delivery_failure());
		assert!(!err.is_invariant_violation());
		assert_eq!(err.to_string(), "ingestion rejected payload: token invalid");
	}

	#[test]
	fn test_unexpected_response_is_delivery_failure() {
		let err = AnalyticsError::UnexpectedResponse {
			body: "0".to_string(),
		};
		assert!(err.is_delivery_failure());
	}

	#[test]
	fn test_timer_violation_names_event() {
		let err = InvariantViolation::TimerAlreadyStarted {
			event: "checkout".to_string(),
		};
		assert_eq!(err.to_string(), "timer already started for event 'checkout'");
	}

	#[test]
	fn test_invalid_base_url_is_neither_family() {
		let err = AnalyticsError::InvalidBaseUrl("ftp://x".to_string());
		assert!(!err.is_delivery_failure());
		assert!(!err.is_invariant_violation());
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory record of attempted deliveries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use loom_analytics_core::Endpoint;
use parking_lot::Mutex;
use serde_json::Value;

/// One attempted delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugEntry {
	pub endpoint: Endpoint,
	pub payload: Value,
	pub recorded_at: DateTime<Utc>,
}

/// Append-only log of every payload the client attempted to send.
///
/// Entries are recorded whether or not sending is enabled and whatever the
/// outcome. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
	entries: Arc<Mutex<Vec<DebugEntry>>>,
}

impl DebugLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn record(&self, endpoint: Endpoint, payload: Value) {
		self.entries.lock().push(DebugEntry {
			endpoint,
			payload,
			recorded_at: Utc::now(),
		});
	}

	/// Returns a snapshot of all entries in send order.
	pub fn entries(&self) -> Vec<DebugEntry> {
		self.entries.lock().clone()
	}

	/// Returns the payloads sent to `endpoint`, in send order.
	pub fn payloads(&self, endpoint: Endpoint) -> Vec<Value> {
		self.entries
			.lock()
			.iter()
			.filter(|e| e.endpoint == endpoint)
			.map(|e| e.payload.clone())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}
}

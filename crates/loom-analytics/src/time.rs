// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Time source abstraction.
//!
//! Session lengths and timed-event durations are computed from a
//! [`TimeSource`] so tests can drive simulated time with [`FakeTimeSource`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait TimeSource: Send + Sync {
	fn now_ms(&self) -> u64;
}

/// Wall-clock time via `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
	fn now_ms(&self) -> u64 {
		chrono::Utc::now().timestamp_millis().max(0) as u64
	}
}

/// Manually driven time for tests.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct FakeTimeSource {
	ms: Arc<AtomicU64>,
}

impl FakeTimeSource {
	pub fn new(initial_ms: u64) -> Self {
		Self {
			ms: Arc::new(AtomicU64::new(initial_ms)),
		}
	}

	pub fn advance(&self, by: Duration) {
		self.ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
	}

	pub fn set(&self, ms: u64) {
		self.ms.store(ms, Ordering::SeqCst);
	}
}

impl Default for FakeTimeSource {
	fn default() -> Self {
		Self::new(1_700_000_000_000)
	}
}

impl TimeSource for FakeTimeSource {
	fn now_ms(&self) -> u64 {
		self.ms.load(Ordering::SeqCst)
	}
}

/// Time elapsed from `start_ms` to `now_ms`, zero if the clock went backwards.
pub(crate) fn elapsed(start_ms: u64, now_ms: u64) -> Duration {
	Duration::from_millis(now_ms.saturating_sub(start_ms))
}

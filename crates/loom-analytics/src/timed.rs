// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Timed-event registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::InvariantViolation;
use crate::time::{elapsed, TimeSource};

/// Open timers keyed by event name.
///
/// Each timer is consumed by the first track call for its event.
pub struct TimedEvents {
	time: Arc<dyn TimeSource>,
	timers: Mutex<HashMap<String, u64>>,
}

impl TimedEvents {
	pub fn new(time: Arc<dyn TimeSource>) -> Self {
		Self {
			time,
			timers: Mutex::new(HashMap::new()),
		}
	}

	/// Opens a timer for `event`.
	///
	/// Fails if a timer is already open for it; the existing start is kept.
	pub fn start(&self, event: &str) -> Result<(), InvariantViolation> {
		let mut timers = self.timers.lock();
		if timers.contains_key(event) {
			return Err(InvariantViolation::TimerAlreadyStarted {
				event: event.to_string(),
			});
		}
		timers.insert(event.to_string(), self.time.now_ms());
		debug!(event = %event, "Timer started");
		Ok(())
	}

	/// Closes the timer for `event`, returning whole seconds since it was opened.
	pub fn finish(&self, event: &str) -> Option<u64> {
		let start_ms = self.timers.lock().remove(event)?;
		Some(elapsed(start_ms, self.time.now_ms()).as_secs())
	}

	pub fn is_running(&self, event: &str) -> bool {
		self.timers.lock().contains_key(event)
	}
}

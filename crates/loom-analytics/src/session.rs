// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session tracking.
//!
//! One session is live at a time. It begins on a foreground transition
//! (construction counts as the first one) and ends on a background
//! transition. Ending a session yields a summary length only when the
//! session lasted between [`MIN_SESSION_LENGTH`] and [`MAX_SESSION_LENGTH`]
//! inclusive; shorter sessions are treated as accidental backgrounding and
//! longer ones as stale.

use std::sync::Arc;
use std::time::Duration;

use loom_analytics_core::SessionMetadata;
use parking_lot::Mutex;
use tracing::debug;

use crate::ids::random_token;
use crate::time::{elapsed, TimeSource};

/// Shortest session that produces a summary event.
pub const MIN_SESSION_LENGTH: Duration = Duration::from_secs(10);
/// Longest session that produces a summary event.
pub const MAX_SESSION_LENGTH: Duration = Duration::from_secs(4 * 60 * 60);

#[derive(Debug)]
struct SessionState {
	id: String,
	start_ms: u64,
	event_seq: u64,
	profile_seq: u64,
	active: bool,
}

impl SessionState {
	fn fresh(start_ms: u64) -> Self {
		Self {
			id: random_token(),
			start_ms,
			event_seq: 0,
			profile_seq: 0,
			active: true,
		}
	}
}

/// Tracks the live session and its per-session counters.
///
/// Counters are advanced under a lock before any await point in the caller,
/// so back-to-back calls always receive distinct, ordered sequence numbers.
pub struct SessionTracker {
	time: Arc<dyn TimeSource>,
	state: Mutex<SessionState>,
}

impl SessionTracker {
	/// Creates a tracker with an active session starting now.
	pub fn new(time: Arc<dyn TimeSource>) -> Self {
		let state = SessionState::fresh(time.now_ms());
		debug!(session_id = %state.id, "Session started");
		Self {
			time,
			state: Mutex::new(state),
		}
	}

	/// Starts a new session, replacing whatever session was live.
	pub fn begin(&self) {
		let fresh = SessionState::fresh(self.time.now_ms());
		debug!(session_id = %fresh.id, "Session started");
		*self.state.lock() = fresh;
	}

	/// Ends the live session.
	///
	/// Returns the session length in whole seconds when it falls inside the
	/// reportable range, `None` otherwise or when no session was live.
	pub fn end(&self) -> Option<u64> {
		let mut state = self.state.lock();
		if !state.active {
			return None;
		}
		state.active = false;

		let length = elapsed(state.start_ms, self.time.now_ms());
		if (MIN_SESSION_LENGTH..=MAX_SESSION_LENGTH).contains(&length) {
			debug!(session_id = %state.id, length_secs = length.as_secs(), "Session ended");
			Some(length.as_secs())
		} else {
			debug!(
				session_id = %state.id,
				length_ms = length.as_millis() as u64,
				"Session ended outside reportable range"
			);
			None
		}
	}

	/// Produces metadata for one outgoing call, advancing exactly one counter.
	pub fn prepare_event(&self, is_profile_update: bool) -> SessionMetadata {
		let mut state = self.state.lock();
		let counter = if is_profile_update {
			&mut state.profile_seq
		} else {
			&mut state.event_seq
		};
		let sequence = *counter;
		*counter += 1;

		SessionMetadata {
			event_id: random_token(),
			session_id: state.id.clone(),
			sequence,
			session_start_sec: (state.start_ms / 1000) as i64,
		}
	}

	pub fn session_id(&self) -> String {
		self.state.lock().id.clone()
	}

	pub fn is_active(&self) -> bool {
		self.state.lock().active
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::time::FakeTimeSource;
	use proptest::prelude::*;

	fn tracker() -> (SessionTracker, FakeTimeSource) {
		let time = FakeTimeSource::default();
		(SessionTracker::new(Arc::new(time.clone())), time)
	}

	#[test]
	fn test_short_session_is_not_reported() {
		let (tracker, time) = tracker();
		tracker.begin();
		time.advance(Duration::from_secs(5));
		assert_eq!(tracker.end(), None);
	}

	#[test]
	fn test_normal_session_reports_whole_seconds() {
		let (tracker, time) = tracker();
		tracker.begin();
		time.advance(Duration::from_millis(30_700));
		assert_eq!(tracker.end(), Some(30));
	}

	#[test]
	fn test_stale_session_is_not_reported() {
		let (tracker, time) = tracker();
		tracker.begin();
		time.advance(Duration::from_secs(5 * 60 * 60));
		assert_eq!(tracker.end(), None);
	}

	#[test]
	fn test_range_bounds_are_inclusive() {
		let (tracker, time) = tracker();
		tracker.begin();
		time.advance(MIN_SESSION_LENGTH);
		assert_eq!(tracker.end(), Some(10));

		tracker.begin();
		time.advance(MAX_SESSION_LENGTH);
		assert_eq!(tracker.end(), Some(4 * 60 * 60));
	}

	#[test]
	fn test_end_twice_reports_once() {
		let (tracker, time) = tracker();
		time.advance(Duration::from_secs(60));
		assert_eq!(tracker.end(), Some(60));
		assert!(!tracker.is_active());
		assert_eq!(tracker.end(), None);
	}

	#[test]
	fn test_begin_replaces_session_and_resets_counters() {
		let (tracker, _time) = tracker();
		let first_id = tracker.session_id();
		tracker.prepare_event(false);
		tracker.prepare_event(true);

		tracker.begin();
		assert_ne!(tracker.session_id(), first_id);
		assert_eq!(tracker.prepare_event(false).sequence, 0);
		assert_eq!(tracker.prepare_event(true).sequence, 0);
	}

	#[test]
	fn test_counters_are_independent() {
		let (tracker, _time) = tracker();
		assert_eq!(tracker.prepare_event(false).sequence, 0);
		assert_eq!(tracker.prepare_event(false).sequence, 1);
		assert_eq!(tracker.prepare_event(true).sequence, 0);
		assert_eq!(tracker.prepare_event(false).sequence, 2);
		assert_eq!(tracker.prepare_event(true).sequence, 1);
	}

	#[test]
	fn test_metadata_carries_session_identity() {
		let time = FakeTimeSource::new(1_700_000_123_456);
		let tracker = SessionTracker::new(Arc::new(time));
		let meta = tracker.prepare_event(false);
		assert_eq!(meta.session_id, tracker.session_id());
		assert_eq!(meta.session_start_sec, 1_700_000_123);
		assert_ne!(meta.event_id, tracker.prepare_event(false).event_id);
	}

	proptest! {
		#[test]
		fn event_sequence_is_strictly_increasing(calls in proptest::collection::vec(any::<bool>(), 1..50)) {
			let (tracker, _time) = tracker();
			let mut last_event: Option<u64> = None;
			let mut last_profile: Option<u64> = None;
			for is_profile in calls {
				let seq = tracker.prepare_event(is_profile).sequence;
				let last = if is_profile { &mut last_profile } else { &mut last_event };
				prop_assert_eq!(seq, last.map_or(0, |l| l + 1));
				*last = Some(seq);
			}
		}

		#[test]
		fn summary_emitted_only_inside_range(secs in 0u64..(6 * 60 * 60)) {
			let (tracker, time) = tracker();
			time.advance(Duration::from_secs(secs));
			let reported = tracker.end();
			if (10..=4 * 60 * 60).contains(&secs) {
				prop_assert_eq!(reported, Some(secs));
			} else {
				prop_assert_eq!(reported, None);
			}
		}
	}
}

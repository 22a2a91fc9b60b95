// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-call session metadata.

use serde::{Deserialize, Serialize};

/// Session bookkeeping attached to every outgoing payload under `$mp_metadata`.
///
/// Produced fresh for each track or engage call. The sequence number is drawn
/// from the event counter for track calls and from the profile-update counter
/// for engage calls, so the two sequences advance independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
	/// Random id unique to this call.
	#[serde(rename = "$mp_event_id")]
	pub event_id: String,
	/// Id of the session the call belongs to.
	#[serde(rename = "$mp_session_id")]
	pub session_id: String,
	/// Position of this call within its counter, starting at zero.
	#[serde(rename = "$mp_session_seq_id")]
	pub sequence: u64,
	/// Session start as whole seconds since the Unix epoch.
	#[serde(rename = "$mp_session_start_sec")]
	pub session_start_sec: i64,
}

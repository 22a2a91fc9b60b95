// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reserved event names and property keys.
//!
//! | Event | Emitted by | Properties |
//! |-------|------------|------------|
//! | `$create_alias` | alias / identify with auto-alias | `alias`, `original` |
//! | `$ae_session` | app going to background | `$ae_session_length` |
//! | `$ae_first_open` | first launch after install | - |
//! | `$ae_updated` | first launch after a version change | `$ae_updated_version` |
//! | `$ae_crashed` | crash reporting | `$ae_crashed_reason` |
//! | `$ae_screen_view` | screen navigation | `$screen_name` |

pub const CREATE_ALIAS: &str = "$create_alias";
pub const SESSION: &str = "$ae_session";
pub const FIRST_OPEN: &str = "$ae_first_open";
pub const APP_UPDATED: &str = "$ae_updated";
pub const CRASHED: &str = "$ae_crashed";
pub const SCREEN_VIEW: &str = "$ae_screen_view";

/// Property keys placed on track payloads.
pub mod props {
	pub const DISTINCT_ID: &str = "distinct_id";
	pub const USER_ID: &str = "$user_id";
	pub const TOKEN: &str = "token";
	pub const DURATION: &str = "$duration";
	pub const SESSION_LENGTH: &str = "$ae_session_length";
	pub const UPDATED_VERSION: &str = "$ae_updated_version";
	pub const CRASHED_REASON: &str = "$ae_crashed_reason";
	pub const SCREEN_NAME: &str = "$screen_name";
	pub const ALIAS: &str = "alias";
	pub const ORIGINAL: &str = "original";
}

/// Top-level keys of an engage payload.
pub mod engage {
	pub const TOKEN: &str = "$token";
	pub const DISTINCT_ID: &str = "$distinct_id";
	pub const USER_ID: &str = "$user_id";
}

/// Profile-update operations understood by the ingestion service.
///
/// The client treats the operation as an opaque key; these are the common ones.
pub mod operation {
	pub const SET: &str = "$set";
	pub const SET_ONCE: &str = "$set_once";
	pub const ADD: &str = "$add";
	pub const APPEND: &str = "$append";
	pub const UNSET: &str = "$unset";
}

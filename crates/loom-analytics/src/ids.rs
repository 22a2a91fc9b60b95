// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Random identifiers for sessions and events.
//!
//! No cryptographic requirement; collisions are astronomically unlikely, not impossible.

/// Returns the lowercase hex form of a random 64-bit integer.
pub fn random_token() -> String {
	format!("{:x}", rand::random::<u64>())
}

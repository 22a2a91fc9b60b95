// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity transition records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::event::props;

/// Properties of a `$create_alias` event, linking the previous distinct id to a new one.
///
/// The event is sent under the `original` identity; only after it has been
/// sent does the client adopt `alias` as its distinct id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTransition {
	pub alias: String,
	pub original: String,
}

impl AliasTransition {
	/// Creates a transition from `original` to `alias`.
	pub fn new(original: impl Into<String>, alias: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			original: original.into(),
		}
	}

	/// Returns the event properties `{alias, original}`.
	pub fn to_properties(&self) -> Map<String, Value> {
		let mut map = Map::new();
		map.insert(props::ALIAS.to_string(), Value::String(self.alias.clone()));
		map.insert(
			props::ORIGINAL.to_string(),
			Value::String(self.original.clone()),
		);
		map
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_alias_transition_properties() {
		let transition = AliasTransition::new("anon_123", "user@example.com");
		let map = transition.to_properties();
		assert_eq!(map.len(), 2);
		assert_eq!(map["alias"], "user@example.com");
		assert_eq!(map["original"], "anon_123");
	}

	proptest! {
		#[test]
		fn properties_match_fields(
			original in "[a-zA-Z0-9_]{1,50}",
			alias in "[a-zA-Z0-9_@.]{1,50}",
		) {
			let transition = AliasTransition::new(original.clone(), alias.clone());
			let map = transition.to_properties();
			prop_assert_eq!(map["alias"].as_str(), Some(alias.as_str()));
			prop_assert_eq!(map["original"].as_str(), Some(original.as_str()));
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Key/value bag attached to a track event or a profile update.
///
/// Writing a key twice keeps the last value, which is what lets caller
/// properties shadow super properties and device info.
///
/// ```
/// use loom_analytics::Properties;
///
/// let props = Properties::new()
///     .insert("screen", "settings")
///     .insert("items_in_cart", 3)
///     .insert("trial", false);
/// assert_eq!(props.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Map<String, Value>);

impl Properties {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`Properties::set`].
	pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.set(key, value);
		self
	}

	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(key.into(), value.into());
	}

	/// Layers `overrides` on top of `self`; colliding keys take the override.
	pub fn merge(mut self, overrides: Properties) -> Self {
		self.extend(overrides);
		self
	}

	/// In-place form of [`Properties::merge`].
	pub fn extend(&mut self, overrides: Properties) {
		self.0.extend(overrides.0);
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.0.remove(key)
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}

	/// The bag as a JSON object.
	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}

impl From<Map<String, Value>> for Properties {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

/// Device-info probes report flat string maps.
impl From<HashMap<String, String>> for Properties {
	fn from(map: HashMap<String, String>) -> Self {
		map.into_iter().collect()
	}
}

impl From<Properties> for Value {
	fn from(props: Properties) -> Self {
		props.into_value()
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut props = Properties::new();
		for (key, value) in iter {
			props.set(key, value);
		}
		props
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_caller_properties_shadow_super_properties() {
		let supers = Properties::new()
			.insert("app", "loom")
			.insert("plan", "free");
		let caller = Properties::new()
			.insert("plan", "pro")
			.insert("seats", 5);

		let merged = supers.merge(caller);

		assert_eq!(
			merged.into_value(),
			json!({"app": "loom", "plan": "pro", "seats": 5})
		);
	}

	#[test]
	fn test_set_replaces_existing_value() {
		let mut props = Properties::new().insert("$os", "linux");
		props.set("$os", "macos");
		assert_eq!(props.len(), 1);
		assert_eq!(props.get("$os"), Some(&json!("macos")));
	}

	#[test]
	fn test_remove_drops_key() {
		let mut props = Properties::new().insert("token", "t");
		assert_eq!(props.remove("token"), Some(json!("t")));
		assert!(!props.contains_key("token"));
		assert!(props.is_empty());
	}

	#[test]
	fn test_device_map_becomes_string_values() {
		let device: HashMap<String, String> =
			[("$arch".to_string(), "x86_64".to_string())].into();
		let props = Properties::from(device);
		assert_eq!(props.get("$arch"), Some(&json!("x86_64")));
	}

	#[test]
	fn test_collect_from_pairs() {
		let props: Properties = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
		assert_eq!(props.len(), 2);
		assert_eq!(props.get("a"), Some(&json!(3)));
	}

	proptest! {
		#[test]
		fn merge_is_a_key_union(
			left in proptest::collection::hash_map("[a-z]{1,6}", 0i64..100, 0..12),
			right in proptest::collection::hash_map("[a-z]{1,6}", 0i64..100, 0..12),
		) {
			let merged = Properties::from_iter(left.clone()).merge(Properties::from_iter(right.clone()));

			let mut keys: std::collections::HashSet<_> = left.keys().collect();
			keys.extend(right.keys());
			prop_assert_eq!(merged.len(), keys.len());

			for (key, value) in &right {
				prop_assert_eq!(merged.get(key), Some(&json!(value)));
			}
			for (key, value) in left.iter().filter(|(k, _)| !right.contains_key(*k)) {
				prop_assert_eq!(merged.get(key), Some(&json!(value)));
			}
		}
	}
}

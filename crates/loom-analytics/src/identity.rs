// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Distinct-id ownership and alias transitions.
//!
//! The manager only decides; the client sends the alias event under the
//! original id and then calls [`IdentityManager::adopt`].

use loom_analytics_core::AliasTransition;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::InvariantViolation;

/// Owns the currently active distinct id.
#[derive(Debug, Default)]
pub struct IdentityManager {
	current: RwLock<Option<String>>,
}

impl IdentityManager {
	pub fn new(initial: Option<String>) -> Self {
		Self {
			current: RwLock::new(initial),
		}
	}

	/// Returns the active distinct id, if any.
	pub fn distinct_id(&self) -> Option<String> {
		self.current.read().clone()
	}

	/// Makes `id` the active distinct id.
	pub fn adopt(&self, id: impl Into<String>) {
		let id = id.into();
		debug!(distinct_id = %id, "Adopting distinct id");
		*self.current.write() = Some(id);
	}

	/// Decides whether identifying as `id` needs an alias event first.
	///
	/// Returns a transition only when `auto_alias` is set, an id is already
	/// active, and it differs from `id`.
	pub fn plan_identify(&self, id: &str, auto_alias: bool) -> Option<AliasTransition> {
		if !auto_alias {
			return None;
		}
		match self.current.read().as_deref() {
			Some(current) if current != id => Some(AliasTransition::new(current, id)),
			_ => None,
		}
	}

	/// Builds the transition for an explicit alias to `new_id`.
	pub fn plan_alias(&self, new_id: &str) -> Result<AliasTransition, InvariantViolation> {
		self.current
			.read()
			.as_deref()
			.map(|current| AliasTransition::new(current, new_id))
			.ok_or(InvariantViolation::MissingDistinctId)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_starts_empty_by_default() {
		let identity = IdentityManager::default();
		assert_eq!(identity.distinct_id(), None);
	}

	#[test]
	fn test_identify_without_prior_id_needs_no_alias() {
		let identity = IdentityManager::default();
		assert_eq!(identity.plan_identify("A", true), None);
	}

	#[test]
	fn test_identify_with_auto_alias_plans_transition() {
		let identity = IdentityManager::new(Some("A".to_string()));
		let transition = identity.plan_identify("B", true).unwrap();
		assert_eq!(transition.original, "A");
		assert_eq!(transition.alias, "B");
		// Planning never mutates.
		assert_eq!(identity.distinct_id().as_deref(), Some("A"));
	}

	#[test]
	fn test_identify_same_id_needs_no_alias() {
		let identity = IdentityManager::new(Some("A".to_string()));
		assert_eq!(identity.plan_identify("A", true), None);
	}

	#[test]
	fn test_identify_without_auto_alias_needs_no_alias() {
		let identity = IdentityManager::new(Some("A".to_string()));
		assert_eq!(identity.plan_identify("B", false), None);
	}

	#[test]
	fn test_alias_without_identity_is_invariant_violation() {
		let identity = IdentityManager::default();
		assert_eq!(
			identity.plan_alias("B"),
			Err(InvariantViolation::MissingDistinctId)
		);
	}

	#[test]
	fn test_adopt_replaces_identity() {
		let identity = IdentityManager::new(Some("A".to_string()));
		identity.adopt("B");
		assert_eq!(identity.distinct_id().as_deref(), Some("B"));
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ingestion endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An ingestion endpoint on the analytics host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
	/// Point-in-time events.
	Track,
	/// Profile updates.
	Engage,
}

impl Endpoint {
	/// Returns the endpoint name ("track" or "engage").
	pub fn as_str(&self) -> &'static str {
		match self {
			Endpoint::Track => "track",
			Endpoint::Engage => "engage",
		}
	}

	/// Returns the URL path, including the leading slash.
	pub fn path(&self) -> &'static str {
		match self {
			Endpoint::Track => "/track",
			Endpoint::Engage => "/engage",
		}
	}
}

impl std::fmt::Display for Endpoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Returned when parsing an endpoint name fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown analytics endpoint: {0}")]
pub struct UnknownEndpoint(pub String);

impl std::str::FromStr for Endpoint {
	type Err = UnknownEndpoint;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim_start_matches('/') {
			"track" => Ok(Endpoint::Track),
			"engage" => Ok(Endpoint::Engage),
			other => Err(UnknownEndpoint(other.to_string())),
		}
	}
}

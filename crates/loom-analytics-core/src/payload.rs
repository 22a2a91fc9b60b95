// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outgoing payload shapes.
//!
//! A track payload looks like:
//!
//! ```json
//! {"event": "signup", "properties": {"distinct_id": "u1", "$user_id": "u1", "token": "t"}, "$mp_metadata": {...}}
//! ```
//!
//! An engage payload carries the operation as a top-level key:
//!
//! ```json
//! {"$token": "t", "$distinct_id": "u1", "$user_id": "u1", "$mp_metadata": {...}, "$set": {"plan": "pro"}}
//! ```

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::endpoint::Endpoint;
use crate::event::engage;
use crate::metadata::SessionMetadata;

/// A point-in-time event bound for `/track`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPayload {
	pub event: String,
	pub properties: Map<String, Value>,
	#[serde(rename = "$mp_metadata")]
	pub metadata: SessionMetadata,
}

/// A profile update bound for `/engage`.
///
/// `operation` is opaque to the client (`$set`, `$add`, ...) and becomes a
/// top-level key whose value is `properties`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagePayload {
	pub token: Option<String>,
	pub distinct_id: Option<String>,
	pub metadata: SessionMetadata,
	pub operation: String,
	pub properties: Value,
}

impl Serialize for EngagePayload {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(5))?;
		map.serialize_entry(engage::TOKEN, &self.token)?;
		map.serialize_entry(engage::DISTINCT_ID, &self.distinct_id)?;
		map.serialize_entry(engage::USER_ID, &self.distinct_id)?;
		map.serialize_entry("$mp_metadata", &self.metadata)?;
		map.serialize_entry(&self.operation, &self.properties)?;
		map.end()
	}
}

/// Either payload shape, tagged with where it is delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	Track(TrackPayload),
	Engage(EngagePayload),
}

impl Payload {
	/// Returns the endpoint this payload is delivered to.
	pub fn endpoint(&self) -> Endpoint {
		match self {
			Payload::Track(_) => Endpoint::Track,
			Payload::Engage(_) => Endpoint::Engage,
		}
	}

	/// Converts the payload to its JSON wire form.
	pub fn to_value(&self) -> serde_json::Result<Value> {
		match self {
			Payload::Track(p) => serde_json::to_value(p),
			Payload::Engage(p) => serde_json::to_value(p),
		}
	}
}

impl From<TrackPayload> for Payload {
	fn from(payload: TrackPayload) -> Self {
		Payload::Track(payload)
	}
}

impl From<EngagePayload> for Payload {
	fn from(payload: EngagePayload) -> Self {
		Payload::Engage(payload)
	}
}

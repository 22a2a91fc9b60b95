// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types for the Loom analytics event-tracking client.
//!
//! This crate defines the shapes that leave the client:
//!
//! - [`Endpoint`]: the two ingestion paths (`/track`, `/engage`)
//! - [`TrackPayload`] and [`EngagePayload`]: event and profile-update bodies
//! - [`SessionMetadata`]: per-call session bookkeeping attached to every payload
//! - [`AliasTransition`]: the properties of an alias event
//! - [`event`]: reserved event names and property keys
//!
//! It performs no I/O; the `loom-analytics` crate builds and delivers these.

pub mod endpoint;
pub mod event;
pub mod identify;
pub mod metadata;
pub mod payload;

pub use endpoint::{Endpoint, UnknownEndpoint};
pub use identify::AliasTransition;
pub use metadata::SessionMetadata;
pub use payload::{EngagePayload, Payload, TrackPayload};

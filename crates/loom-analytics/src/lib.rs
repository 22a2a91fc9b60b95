// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Product analytics Rust SDK for Loom.
//!
//! This crate records user events and profile updates and delivers each one
//! immediately to a Mixpanel-compatible ingestion service.
//!
//! # Features
//!
//! - **Event tracking**: super properties, timed events (`$duration`) and
//!   reserved lifecycle events (first open, app updated, crash, screen view)
//! - **Profile updates**: `$set`, `$set_once`, `$add`, `$append`, `$unset`
//!   enriched with a device-info bundle
//! - **Identity**: `identify` with optional auto-alias and explicit `alias`
//! - **Sessions**: per-session ids and sequence counters on every payload,
//!   plus a `$ae_session` summary when a session of reportable length ends
//! - **Debugging**: payload printing via `tracing` and an in-memory payload log
//! - **Error routing**: delivery failures go to an [`ErrorHandler`] or back
//!   to the caller
//!
//! # Example
//!
//! ```ignore
//! use loom_analytics::{AnalyticsClient, LifecycleEvent, Properties};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = loom_analytics::load_config()?;
//!     let client = AnalyticsClient::builder()
//!         .config(config)
//!         .anonymous()
//!         .on_error(|failure| eprintln!("analytics: {}", failure.error))
//!         .build_async()
//!         .await?;
//!
//!     client.track("app_launched", Properties::new()).await?;
//!     client.handle_lifecycle(LifecycleEvent::Background).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod debug;
mod delivery;
mod device;
mod error;
mod handler;
mod identity;
mod ids;
mod lifecycle;
mod properties;
mod session;
mod storage;
mod time;
mod timed;
mod transport;

pub use client::{AnalyticsClient, AnalyticsClientBuilder};
pub use config::{
	load_config, load_config_with_file, load_from_sources, AnalyticsConfig, AnalyticsConfigLayer,
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource,
};
pub use debug::{DebugEntry, DebugLog};
pub use delivery::{Delivery, DeliveryOptions};
pub use device::{DeviceInfoProbe, HostDeviceInfo, StaticDeviceInfo, SDK_NAME, SDK_VERSION};
pub use error::{AnalyticsError, ConfigError, InvariantViolation, Result, StorageError};
pub use handler::{DeliveryFailure, ErrorHandler};
pub use identity::IdentityManager;
pub use ids::random_token;
pub use lifecycle::{spawn_lifecycle_listener, LifecycleEvent};
pub use properties::Properties;
pub use session::{SessionTracker, MAX_SESSION_LENGTH, MIN_SESSION_LENGTH};
pub use storage::{AnalyticsStorage, FileStorage, MemoryStorage};
pub use time::{FakeTimeSource, SystemTimeSource, TimeSource};
pub use timed::TimedEvents;
pub use transport::{
	classify_response, encode_payload, user_agent, HttpTransport, Transport, DEFAULT_BASE_URL,
};

// Re-export core types for convenience
pub use loom_analytics_core::{
	event, AliasTransition, EngagePayload, Endpoint, Payload, SessionMetadata, TrackPayload,
	UnknownEndpoint,
};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The analytics client: payload building and dispatch.

use std::sync::Arc;
use std::time::Duration;

use loom_analytics_core::event::{self, operation, props};
use loom_analytics_core::{AliasTransition, EngagePayload, Payload, TrackPayload};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AnalyticsConfig;
use crate::debug::DebugLog;
use crate::delivery::{Delivery, DeliveryOptions};
use crate::device::{DeviceInfoProbe, HostDeviceInfo};
use crate::error::{AnalyticsError, Result};
use crate::handler::{DeliveryFailure, ErrorHandler};
use crate::identity::IdentityManager;
use crate::lifecycle::LifecycleEvent;
use crate::properties::Properties;
use crate::session::SessionTracker;
use crate::storage::{AnalyticsStorage, MemoryStorage};
use crate::time::{SystemTimeSource, TimeSource};
use crate::timed::TimedEvents;
use crate::transport::{HttpTransport, Transport};

/// Builder for constructing an [`AnalyticsClient`].
pub struct AnalyticsClientBuilder {
	config: AnalyticsConfig,
	super_properties: Properties,
	distinct_id: Option<String>,
	device_info: Box<dyn DeviceInfoProbe>,
	storage: Arc<dyn AnalyticsStorage>,
	error_handler: Option<Arc<dyn ErrorHandler>>,
	transport: Option<Arc<dyn Transport>>,
	time: Arc<dyn TimeSource>,
}

impl AnalyticsClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			config: AnalyticsConfig::default(),
			super_properties: Properties::new(),
			distinct_id: None,
			device_info: Box::new(HostDeviceInfo),
			storage: Arc::new(MemoryStorage::new()),
			error_handler: None,
			transport: None,
			time: Arc::new(SystemTimeSource),
		}
	}

	/// Replaces every configuration setting with a resolved config.
	pub fn config(mut self, config: AnalyticsConfig) -> Self {
		self.config = config;
		self
	}

	/// Sets the project token. Without one, nothing is sent.
	pub fn token(mut self, token: impl Into<String>) -> Self {
		self.config.token = Some(token.into());
		self
	}

	/// Sets the ingestion host.
	///
	/// Example: `https://api.mixpanel.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.config.base_url = url.into();
		self
	}

	/// Enables or disables network delivery. Debug printing and recording still apply.
	pub fn enabled(mut self, enabled: bool) -> Self {
		self.config.enabled = enabled;
		self
	}

	/// Requests verbose JSON responses from the server.
	pub fn verbose(mut self, verbose: bool) -> Self {
		self.config.verbose = verbose;
		self
	}

	/// Logs every attempted payload on the `loom_analytics::debug` target.
	pub fn debug_print(mut self, enabled: bool) -> Self {
		self.config.debug_print = enabled;
		self
	}

	/// Keeps every attempted payload in the client's [`DebugLog`].
	pub fn debug_record(mut self, enabled: bool) -> Self {
		self.config.debug_record = enabled;
		self
	}

	/// Sets the HTTP request timeout, rounded up to whole milliseconds.
	///
	/// A zero timeout is rejected by `build`.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		let millis = timeout.as_nanos().div_ceil(1_000_000);
		self.config.request_timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
		self
	}

	/// Sets the host application's version, used by [`AnalyticsClient::record_app_open`].
	pub fn app_version(mut self, version: impl Into<String>) -> Self {
		self.config.app_version = Some(version.into());
		self
	}

	/// Sets the properties merged into every track event.
	pub fn super_properties(mut self, properties: Properties) -> Self {
		self.super_properties = properties;
		self
	}

	/// Adds one super property.
	pub fn super_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.super_properties.set(key, value);
		self
	}

	/// Starts with an explicit distinct id.
	pub fn distinct_id(mut self, id: impl Into<String>) -> Self {
		self.distinct_id = Some(id.into());
		self
	}

	/// Starts with a freshly generated anonymous distinct id.
	pub fn anonymous(mut self) -> Self {
		self.distinct_id = Some(Uuid::new_v4().to_string());
		self
	}

	/// Sets the device-info probe. It runs once, during `build`.
	pub fn device_info(mut self, probe: impl DeviceInfoProbe + 'static) -> Self {
		self.device_info = Box::new(probe);
		self
	}

	/// Sets the install-state storage.
	pub fn storage(mut self, storage: Arc<dyn AnalyticsStorage>) -> Self {
		self.storage = storage;
		self
	}

	/// Routes delivery failures to `handler` instead of returning them.
	pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
		self.error_handler = Some(handler);
		self
	}

	/// Routes delivery failures to a closure instead of returning them.
	pub fn on_error<F>(self, f: F) -> Self
	where
		F: Fn(&DeliveryFailure<'_>) + Send + Sync + 'static,
	{
		self.error_handler(Arc::new(f))
	}

	/// Replaces the HTTP transport.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Replaces the wall clock.
	pub fn time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
		self.time = time;
		self
	}

	/// Builds the client. The first session starts now.
	pub fn build(self) -> Result<AnalyticsClient> {
		if self.config.request_timeout_ms == 0 {
			return Err(AnalyticsError::InvalidTimeout);
		}

		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(
				&self.config.base_url,
				self.config.request_timeout(),
			)?),
		};

		let options = DeliveryOptions {
			enabled: self.config.enabled,
			verbose: self.config.verbose,
			debug_print: self.config.debug_print,
			debug_record: self.config.debug_record,
		};
		let delivery = Delivery::new(
			transport,
			self.config.token.is_some(),
			options,
			self.error_handler,
		);

		let device_info = Properties::from(self.device_info.probe());

		let inner = Arc::new(ClientInner {
			token: self.config.token,
			app_version: self.config.app_version,
			super_properties: self.super_properties,
			device_info,
			identity: IdentityManager::new(self.distinct_id),
			timers: TimedEvents::new(self.time.clone()),
			session: SessionTracker::new(self.time),
			delivery,
			storage: self.storage,
		});

		info!(
			base_url = %self.config.base_url,
			enabled = options.enabled,
			token_configured = inner.token.is_some(),
			"Analytics client initialized"
		);

		Ok(AnalyticsClient { inner })
	}

	/// Builds the client and records the app open (first-open / updated events).
	pub async fn build_async(self) -> Result<AnalyticsClient> {
		let client = self.build()?;
		client.record_app_open().await?;
		Ok(client)
	}
}

impl Default for AnalyticsClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct ClientInner {
	token: Option<String>,
	app_version: Option<String>,
	super_properties: Properties,
	device_info: Properties,
	identity: IdentityManager,
	timers: TimedEvents,
	session: SessionTracker,
	delivery: Delivery,
	storage: Arc<dyn AnalyticsStorage>,
}

/// Client for tracking events and profile updates.
///
/// Every call builds one payload and delivers it immediately.
///
/// # Example
///
/// ```ignore
/// use loom_analytics::{AnalyticsClient, Properties};
///
/// let client = AnalyticsClient::builder()
///     .token("project_token")
///     .app_version(env!("CARGO_PKG_VERSION"))
///     .anonymous()
///     .build_async()
///     .await?;
///
/// client.time_event("checkout")?;
/// client.track("checkout", Properties::new().insert("items", 3)).await?;
///
/// client.identify("user_42", true).await?;
/// client.people_set(Properties::new().insert("plan", "pro")).await?;
/// ```
#[derive(Clone)]
pub struct AnalyticsClient {
	inner: Arc<ClientInner>,
}

impl AnalyticsClient {
	/// Creates a new builder for constructing an AnalyticsClient.
	pub fn builder() -> AnalyticsClientBuilder {
		AnalyticsClientBuilder::new()
	}

	/// Tracks an event under the current distinct id.
	///
	/// Property precedence, lowest to highest: super properties, identity
	/// fields, `$duration` (when a timer for `event` was open), caller
	/// properties, token.
	pub async fn track(&self, event: &str, properties: Properties) -> Result<()> {
		let distinct_id = self.inner.identity.distinct_id();
		self.track_as(event, properties, distinct_id).await
	}

	async fn track_as(
		&self,
		event: &str,
		properties: Properties,
		distinct_id: Option<String>,
	) -> Result<()> {
		let identity = distinct_id.map(Value::String).unwrap_or(Value::Null);

		let mut merged = self.inner.super_properties.clone();
		merged.set(props::DISTINCT_ID, identity.clone());
		merged.set(props::USER_ID, identity);
		if let Some(duration) = self.inner.timers.finish(event) {
			merged.set(props::DURATION, duration);
		}
		merged.extend(properties);
		merged.set(props::TOKEN, self.token_value());

		let payload = TrackPayload {
			event: event.to_string(),
			properties: merged.into_map(),
			metadata: self.inner.session.prepare_event(false),
		};
		debug!(event = %event, seq = payload.metadata.sequence, "Tracking event");
		self.dispatch(payload.into()).await
	}

	/// Applies a profile update.
	///
	/// `operation` is passed through untouched (`$set`, `$add`, ...). The
	/// device-info bundle is merged under the caller's properties.
	pub async fn profile_update(&self, operation: &str, properties: Properties) -> Result<()> {
		let merged = self.inner.device_info.clone().merge(properties);
		self.engage(operation, merged.into_value()).await
	}

	async fn engage(&self, operation: &str, properties: Value) -> Result<()> {
		let payload = EngagePayload {
			token: self.inner.token.clone(),
			distinct_id: self.inner.identity.distinct_id(),
			metadata: self.inner.session.prepare_event(true),
			operation: operation.to_string(),
			properties,
		};
		debug!(operation = %operation, seq = payload.metadata.sequence, "Updating profile");
		self.dispatch(payload.into()).await
	}

	/// Sets profile properties, overwriting existing values.
	pub async fn people_set(&self, properties: Properties) -> Result<()> {
		self.profile_update(operation::SET, properties).await
	}

	/// Sets profile properties only where they are not already set.
	pub async fn people_set_once(&self, properties: Properties) -> Result<()> {
		self.profile_update(operation::SET_ONCE, properties).await
	}

	/// Adds numeric deltas to profile properties.
	pub async fn people_increment(&self, properties: Properties) -> Result<()> {
		self.profile_update(operation::ADD, properties).await
	}

	/// Appends values to list-valued profile properties.
	pub async fn people_append(&self, properties: Properties) -> Result<()> {
		self.profile_update(operation::APPEND, properties).await
	}

	/// Removes profile properties by name.
	pub async fn people_unset(&self, keys: &[&str]) -> Result<()> {
		let keys = keys.iter().map(|k| Value::from(*k)).collect();
		self.engage(operation::UNSET, Value::Array(keys)).await
	}

	/// Adopts `id` as the distinct id.
	///
	/// With `auto_alias`, a differing previous id is first linked to `id`
	/// through an alias event sent under the previous id.
	pub async fn identify(&self, id: &str, auto_alias: bool) -> Result<()> {
		match self.inner.identity.plan_identify(id, auto_alias) {
			Some(transition) => self.send_alias(transition).await,
			None => {
				self.inner.identity.adopt(id);
				Ok(())
			}
		}
	}

	/// Links the current distinct id to `new_id` and switches to it.
	///
	/// Fails with [`crate::InvariantViolation::MissingDistinctId`] when no id is set.
	/// If the alias event cannot be delivered (and no error handler is
	/// configured), the identity is left unchanged.
	pub async fn alias(&self, new_id: &str) -> Result<()> {
		let transition = self.inner.identity.plan_alias(new_id)?;
		self.send_alias(transition).await
	}

	async fn send_alias(&self, transition: AliasTransition) -> Result<()> {
		info!(original = %transition.original, alias = %transition.alias, "Creating alias");
		self.track_as(
			event::CREATE_ALIAS,
			Properties::from(transition.to_properties()),
			Some(transition.original),
		)
		.await?;
		self.inner.identity.adopt(transition.alias);
		Ok(())
	}

	/// Starts timing `event`; the next `track` of it carries `$duration`.
	pub fn time_event(&self, event: &str) -> Result<()> {
		self.inner.timers.start(event)?;
		Ok(())
	}

	/// Starts a new session.
	pub fn begin_session(&self) {
		self.inner.session.begin();
	}

	/// Ends the session, tracking a `$ae_session` summary if its length is reportable.
	pub async fn end_session(&self) -> Result<()> {
		match self.inner.session.end() {
			Some(length) => {
				self.track(
					event::SESSION,
					Properties::new().insert(props::SESSION_LENGTH, length),
				)
				.await
			}
			None => Ok(()),
		}
	}

	/// Reacts to a host lifecycle signal.
	pub async fn handle_lifecycle(&self, event: LifecycleEvent) -> Result<()> {
		match event {
			LifecycleEvent::Foreground => {
				self.begin_session();
				Ok(())
			}
			LifecycleEvent::Background => self.end_session().await,
			LifecycleEvent::ScreenViewed(screen) => self.track_screen_view(&screen).await,
		}
	}

	/// Tracks `$ae_first_open`.
	pub async fn track_first_open(&self) -> Result<()> {
		self.track(event::FIRST_OPEN, Properties::new()).await
	}

	/// Tracks `$ae_updated` with the new version.
	pub async fn track_app_updated(&self, version: &str) -> Result<()> {
		self.track(
			event::APP_UPDATED,
			Properties::new().insert(props::UPDATED_VERSION, version),
		)
		.await
	}

	/// Tracks `$ae_crashed` with a reason.
	pub async fn track_crash(&self, reason: &str) -> Result<()> {
		self.track(
			event::CRASHED,
			Properties::new().insert(props::CRASHED_REASON, reason),
		)
		.await
	}

	/// Tracks `$ae_screen_view` for the named screen.
	pub async fn track_screen_view(&self, screen: &str) -> Result<()> {
		self.track(
			event::SCREEN_VIEW,
			Properties::new().insert(props::SCREEN_NAME, screen),
		)
		.await
	}

	/// Emits first-open on a fresh install, or app-updated when the stored
	/// version differs from the configured one, then persists the new state.
	pub async fn record_app_open(&self) -> Result<()> {
		let storage = &self.inner.storage;
		let app_version = self.inner.app_version.as_deref();

		if !storage.first_open_recorded().await? {
			self.track_first_open().await?;
			storage.set_first_open_recorded(true).await?;
			if let Some(version) = app_version {
				storage.set_last_known_version(version).await?;
			}
			return Ok(());
		}

		let Some(current) = app_version else {
			return Ok(());
		};
		match storage.last_known_version().await? {
			Some(previous) if previous == current => {}
			Some(previous) => {
				info!(previous = %previous, current = %current, "App version changed");
				self.track_app_updated(current).await?;
				storage.set_last_known_version(current).await?;
			}
			None => storage.set_last_known_version(current).await?,
		}
		Ok(())
	}

	/// Returns the current distinct id, if any.
	pub fn distinct_id(&self) -> Option<String> {
		self.inner.identity.distinct_id()
	}

	/// Returns the live session's id.
	pub fn session_id(&self) -> String {
		self.inner.session.session_id()
	}

	/// Returns the log of attempted payloads (empty unless debug recording is on).
	pub fn debug_log(&self) -> DebugLog {
		self.inner.delivery.debug_log().clone()
	}

	fn token_value(&self) -> Value {
		self.inner
			.token
			.clone()
			.map(Value::String)
			.unwrap_or(Value::Null)
	}

	async fn dispatch(&self, payload: Payload) -> Result<()> {
		let endpoint = payload.endpoint();
		let value = payload.to_value()?;
		self.inner.delivery.send(endpoint, value).await
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration: layers, sources and the resolved config.
//!
//! Precedence (highest to lowest):
//! 1. Environment variables (`LOOM_ANALYTICS_*`)
//! 2. TOML config file
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::ConfigError;
use crate::transport::DEFAULT_BASE_URL;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Partial configuration; every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfigLayer {
	pub token: Option<String>,
	pub base_url: Option<String>,
	pub enabled: Option<bool>,
	pub verbose: Option<bool>,
	pub debug_print: Option<bool>,
	pub debug_record: Option<bool>,
	pub request_timeout_ms: Option<u64>,
	pub app_version: Option<String>,
}

impl AnalyticsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.verbose.is_some() {
			self.verbose = other.verbose;
		}
		if other.debug_print.is_some() {
			self.debug_print = other.debug_print;
		}
		if other.debug_record.is_some() {
			self.debug_record = other.debug_record;
		}
		if other.request_timeout_ms.is_some() {
			self.request_timeout_ms = other.request_timeout_ms;
		}
		if other.app_version.is_some() {
			self.app_version = other.app_version;
		}
	}

	/// Rejects values no client can run with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.request_timeout_ms == Some(0) {
			return Err(ConfigError::InvalidValue {
				key: "request_timeout_ms".to_string(),
				message: "timeout must be greater than zero".to_string(),
			});
		}
		Ok(())
	}

	pub fn finalize(self) -> AnalyticsConfig {
		AnalyticsConfig {
			token: self.token,
			base_url: self
				.base_url
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			enabled: self.enabled.unwrap_or(true),
			verbose: self.verbose.unwrap_or(false),
			debug_print: self.debug_print.unwrap_or(false),
			debug_record: self.debug_record.unwrap_or(false),
			request_timeout_ms: self
				.request_timeout_ms
				.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
			app_version: self.app_version,
		}
	}
}

/// Fully resolved client configuration.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
	/// Project token; without one nothing is sent.
	pub token: Option<String>,
	pub base_url: String,
	pub enabled: bool,
	pub verbose: bool,
	pub debug_print: bool,
	pub debug_record: bool,
	pub request_timeout_ms: u64,
	/// Version of the host application, for update detection.
	pub app_version: Option<String>,
}

impl AnalyticsConfig {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}
}

impl Default for AnalyticsConfig {
	fn default() -> Self {
		AnalyticsConfigLayer::default().finalize()
	}
}

impl std::fmt::Debug for AnalyticsConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AnalyticsConfig")
			.field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
			.field("base_url", &self.base_url)
			.field("enabled", &self.enabled)
			.field("verbose", &self.verbose)
			.field("debug_print", &self.debug_print)
			.field("debug_record", &self.debug_record)
			.field("request_timeout_ms", &self.request_timeout_ms)
			.field("app_version", &self.app_version)
			.finish()
	}
}

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// A place configuration can come from.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<AnalyticsConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<AnalyticsConfigLayer, ConfigError> {
		Ok(AnalyticsConfigLayer::default())
	}
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `<config dir>/loom/analytics.toml`, if the platform has a config dir.
	pub fn user() -> Option<Self> {
		dirs::config_dir().map(|dir| Self::new(dir.join("loom").join("analytics.toml")))
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<AnalyticsConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(AnalyticsConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: AnalyticsConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable source.
///
/// Convention: `LOOM_ANALYTICS_<FIELD>`.
pub struct EnvSource {
	lookup: EnvLookup,
}

impl EnvSource {
	pub fn new() -> Self {
		Self::with_lookup(|name| std::env::var(name).ok())
	}

	/// Reads variables through `lookup` instead of the process environment.
	pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self.var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn positive_u64(&self, name: &str) -> Result<Option<u64>, ConfigError> {
		let Some(v) = self.var(name) else {
			return Ok(None);
		};
		match v.parse::<u64>() {
			Ok(0) => Err(ConfigError::InvalidValue {
				key: name.to_string(),
				message: "must be greater than zero".to_string(),
			}),
			Ok(n) => Ok(Some(n)),
			Err(_) => Err(ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid u64 value '{v}'"),
			}),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<AnalyticsConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(AnalyticsConfigLayer {
			token: self.var("LOOM_ANALYTICS_TOKEN"),
			base_url: self.var("LOOM_ANALYTICS_BASE_URL"),
			enabled: self.bool("LOOM_ANALYTICS_ENABLED"),
			verbose: self.bool("LOOM_ANALYTICS_VERBOSE"),
			debug_print: self.bool("LOOM_ANALYTICS_DEBUG_PRINT"),
			debug_record: self.bool("LOOM_ANALYTICS_DEBUG_RECORD"),
			request_timeout_ms: self.positive_u64("LOOM_ANALYTICS_REQUEST_TIMEOUT_MS")?,
			app_version: self.var("LOOM_ANALYTICS_APP_VERSION"),
		})
	}
}

/// Load configuration from defaults, the user config file and the environment.
pub fn load_config() -> Result<AnalyticsConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(DefaultsSource)];
	if let Some(toml) = TomlSource::user() {
		sources.push(Box::new(toml));
	}
	sources.push(Box::new(EnvSource::new()));
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<PathBuf>,
) -> Result<AnalyticsConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<AnalyticsConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = AnalyticsConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}
	merged.validate()?;

	let config = merged.finalize();
	info!(
		base_url = %config.base_url,
		enabled = config.enabled,
		token_configured = config.token.is_some(),
		verbose = config.verbose,
		"Analytics configuration loaded"
	);
	Ok(config)
}

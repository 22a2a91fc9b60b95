// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Device metadata probes.
//!
//! The probe runs once when the client is built; its result is merged into
//! every profile update and never refreshed.

use std::collections::HashMap;

/// SDK identifier reported as `$lib`.
pub const SDK_NAME: &str = "loom-analytics-rust";
/// SDK version reported as `$lib_version`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supplies a flat string map describing the device.
pub trait DeviceInfoProbe: Send + Sync {
	fn probe(&self) -> HashMap<String, String>;
}

impl<F> DeviceInfoProbe for F
where
	F: Fn() -> HashMap<String, String> + Send + Sync,
{
	fn probe(&self) -> HashMap<String, String> {
		self()
	}
}

/// Describes the host from compile-time target information.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDeviceInfo;

impl DeviceInfoProbe for HostDeviceInfo {
	fn probe(&self) -> HashMap<String, String> {
		HashMap::from([
			("$os".to_string(), std::env::consts::OS.to_string()),
			("$os_family".to_string(), std::env::consts::FAMILY.to_string()),
			("$arch".to_string(), std::env::consts::ARCH.to_string()),
			("$lib".to_string(), SDK_NAME.to_string()),
			("$lib_version".to_string(), SDK_VERSION.to_string()),
		])
	}
}

/// A fixed bundle supplied by the host application.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceInfo {
	info: HashMap<String, String>,
}

impl StaticDeviceInfo {
	pub fn new(info: HashMap<String, String>) -> Self {
		Self { info }
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticDeviceInfo {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			info: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl DeviceInfoProbe for StaticDeviceInfo {
	fn probe(&self) -> HashMap<String, String> {
		self.info.clone()
	}
}

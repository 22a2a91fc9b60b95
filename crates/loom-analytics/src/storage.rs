// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Install-state storage capability.
//!
//! The client only needs two facts to detect first launches and upgrades:
//! whether the first open was already recorded, and the last app version
//! it saw. Hosts supply any backend by implementing [`AnalyticsStorage`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;

/// Persistent get/set access to install state.
#[async_trait]
pub trait AnalyticsStorage: Send + Sync {
	async fn first_open_recorded(&self) -> Result<bool, StorageError>;
	async fn set_first_open_recorded(&self, recorded: bool) -> Result<(), StorageError>;
	async fn last_known_version(&self) -> Result<Option<String>, StorageError>;
	async fn set_last_known_version(&self, version: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct InstallState {
	#[serde(default)]
	first_open_recorded: bool,
	#[serde(default)]
	last_known_version: Option<String>,
}

/// Process-local storage; state is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	state: Mutex<InstallState>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl AnalyticsStorage for MemoryStorage {
	async fn first_open_recorded(&self) -> Result<bool, StorageError> {
		Ok(self.state.lock().first_open_recorded)
	}

	async fn set_first_open_recorded(&self, recorded: bool) -> Result<(), StorageError> {
		self.state.lock().first_open_recorded = recorded;
		Ok(())
	}

	async fn last_known_version(&self) -> Result<Option<String>, StorageError> {
		Ok(self.state.lock().last_known_version.clone())
	}

	async fn set_last_known_version(&self, version: &str) -> Result<(), StorageError> {
		self.state.lock().last_known_version = Some(version.to_string());
		Ok(())
	}
}

/// JSON file storage.
///
/// A missing file reads as a fresh install. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStorage {
	path: PathBuf,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Storage at `<data dir>/loom/analytics-state.json`, if the platform has a data dir.
	pub fn in_data_dir() -> Option<Self> {
		dirs::data_dir().map(|dir| Self::new(dir.join("loom").join("analytics-state.json")))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	async fn load(&self) -> Result<InstallState, StorageError> {
		let bytes = match tokio::fs::read(&self.path).await {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!(path = %self.path.display(), "state file not found, assuming fresh install");
				return Ok(InstallState::default());
			}
			Err(source) => {
				return Err(StorageError::Io {
					path: self.path.clone(),
					source,
				})
			}
		};

		serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
			path: self.path.clone(),
			source,
		})
	}

	async fn store(&self, state: &InstallState) -> Result<(), StorageError> {
		let io_err = |source: std::io::Error| StorageError::Io {
			path: self.path.clone(),
			source,
		};

		if let Some(parent) = self.path.parent() {
			tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
		}
		let json = serde_json::to_vec_pretty(state).map_err(|source| StorageError::Corrupt {
			path: self.path.clone(),
			source,
		})?;
		tokio::fs::write(&self.path, json).await.map_err(io_err)
	}

	async fn update(&self, f: impl FnOnce(&mut InstallState)) -> Result<(), StorageError> {
		let mut state = self.load().await?;
		f(&mut state);
		self.store(&state).await
	}
}

#[async_trait]
impl AnalyticsStorage for FileStorage {
	async fn first_open_recorded(&self) -> Result<bool, StorageError> {
		Ok(self.load().await?.first_open_recorded)
	}

	async fn set_first_open_recorded(&self, recorded: bool) -> Result<(), StorageError> {
		self.update(|state| state.first_open_recorded = recorded).await
	}

	async fn last_known_version(&self) -> Result<Option<String>, StorageError> {
		Ok(self.load().await?.last_known_version)
	}

	async fn set_last_known_version(&self, version: &str) -> Result<(), StorageError> {
		let version = version.to_string();
		self.update(move |state| state.last_known_version = Some(version)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[tokio::test]
	async fn test_memory_storage_starts_fresh() {
		let storage = MemoryStorage::new();
		assert!(!storage.first_open_recorded().await.unwrap());
		assert_eq!(storage.last_known_version().await.unwrap(), None);

		storage.set_first_open_recorded(true).await.unwrap();
		storage.set_last_known_version("1.2.0").await.unwrap();
		assert!(storage.first_open_recorded().await.unwrap());
		assert_eq!(
			storage.last_known_version().await.unwrap().as_deref(),
			Some("1.2.0")
		);
	}

	#[tokio::test]
	async fn test_file_storage_missing_file_is_fresh_install() {
		let dir = tempdir().unwrap();
		let storage = FileStorage::new(dir.path().join("state.json"));
		assert!(!storage.first_open_recorded().await.unwrap());
		assert_eq!(storage.last_known_version().await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_file_storage_persists_across_instances() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("nested").join("state.json");

		let storage = FileStorage::new(&path);
		storage.set_first_open_recorded(true).await.unwrap();
		storage.set_last_known_version("2.0.0").await.unwrap();

		let reopened = FileStorage::new(&path);
		assert!(reopened.first_open_recorded().await.unwrap());
		assert_eq!(
			reopened.last_known_version().await.unwrap().as_deref(),
			Some("2.0.0")
		);
	}

	#[tokio::test]
	async fn test_file_storage_reports_corrupt_file() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("state.json");
		std::fs::write(&path, b"not json").unwrap();

		let storage = FileStorage::new(&path);
		assert!(matches!(
			storage.first_open_recorded().await,
			Err(StorageError::Corrupt { .. })
		));
	}
}

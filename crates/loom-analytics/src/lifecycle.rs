// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application lifecycle triggers.
//!
//! Hosts forward foreground, background and navigation signals either by
//! calling [`AnalyticsClient::handle_lifecycle`] directly or by feeding a
//! channel drained by [`spawn_lifecycle_listener`].

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::client::AnalyticsClient;

/// A signal from the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
	/// The app came to the foreground; a new session begins.
	Foreground,
	/// The app went to the background; the session ends and may be summarized.
	Background,
	/// The user navigated to the named screen.
	ScreenViewed(String),
}

/// Drives `client` from `rx` until every sender is dropped.
///
/// Failures are logged and do not stop the listener.
pub fn spawn_lifecycle_listener(
	client: AnalyticsClient,
	mut rx: mpsc::Receiver<LifecycleEvent>,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		info!("Starting analytics lifecycle listener");
		while let Some(event) = rx.recv().await {
			if let Err(e) = client.handle_lifecycle(event.clone()).await {
				error!(error = %e, event = ?event, "Failed to handle lifecycle event");
			}
		}
		info!("Analytics lifecycle listener stopped");
	})
}

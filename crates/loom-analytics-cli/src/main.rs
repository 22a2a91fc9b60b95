// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loom_analytics::{
	load_config, load_config_with_file, AnalyticsClient, AnalyticsConfig, AnalyticsStorage,
	FileStorage, Properties,
};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Send product analytics events and profile updates from the command line
#[derive(Parser, Debug)]
#[command(name = "loom-analytics", version, about, long_about = None)]
struct Args {
	/// Path to an analytics TOML file (defaults to the user config directory)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Distinct id to send as
	#[arg(long, env = "LOOM_ANALYTICS_DISTINCT_ID")]
	distinct_id: Option<String>,

	/// Print payloads instead of sending them; install state on disk is left untouched
	#[arg(long)]
	dry_run: bool,

	/// Ask the server for verbose responses
	#[arg(long)]
	verbose: bool,

	/// Output logs as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Track an event
	Track {
		/// Event name
		event: String,
		/// Event property (repeatable: -p KEY=VALUE, VALUE parsed as JSON when valid)
		#[arg(long = "prop", short = 'p', value_name = "KEY=VALUE")]
		props: Vec<String>,
	},
	/// Apply a profile update ($set, $set_once, $add, $append)
	Engage {
		/// Profile operation
		#[arg(default_value = "$set")]
		operation: String,
		/// Profile property (repeatable: -p KEY=VALUE)
		#[arg(long = "prop", short = 'p', value_name = "KEY=VALUE")]
		props: Vec<String>,
	},
	/// Remove profile properties
	Unset {
		/// Property names
		#[arg(required = true)]
		keys: Vec<String>,
	},
	/// Link the current distinct id to a new one
	Alias {
		/// The new distinct id
		new_id: String,
	},
	/// Record an app open (first open or update detection)
	Open,
	/// Print the resolved configuration
	Config,
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.json_logs);

	let mut config = resolve_config(args.config.as_deref())?;
	if args.dry_run {
		config.enabled = false;
		config.debug_print = true;
	}
	if args.verbose {
		config.verbose = true;
	}

	if let Command::Config = args.command {
		println!("{config:#?}");
		return Ok(());
	}

	let mut builder = AnalyticsClient::builder().config(config);
	if let Some(id) = args.distinct_id {
		builder = builder.distinct_id(id);
	}
	if let Some(storage) = install_storage(args.dry_run) {
		builder = builder.storage(storage);
	}
	let client = builder.build().context("Failed to build analytics client")?;

	match args.command {
		Command::Track { event, props } => {
			client.track(&event, parse_props(&props)?).await?;
			info!(event = %event, "Event tracked");
		}
		Command::Engage { operation, props } => {
			client.profile_update(&operation, parse_props(&props)?).await?;
			info!(operation = %operation, "Profile updated");
		}
		Command::Unset { keys } => {
			let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
			client.people_unset(&keys).await?;
			info!(count = keys.len(), "Profile properties removed");
		}
		Command::Alias { new_id } => {
			client.alias(&new_id).await?;
			info!(alias = %new_id, "Alias created");
		}
		Command::Open => {
			client.record_app_open().await?;
		}
		Command::Config => {}
	}

	Ok(())
}

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().compact().with_writer(std::io::stderr))
			.init();
	}
}

/// Persistent install state, unless this is a dry run (which keeps the
/// client's in-memory default so nothing on disk changes).
fn install_storage(dry_run: bool) -> Option<Arc<dyn AnalyticsStorage>> {
	if dry_run {
		return None;
	}
	FileStorage::in_data_dir().map(|storage| Arc::new(storage) as Arc<dyn AnalyticsStorage>)
}

fn resolve_config(path: Option<&std::path::Path>) -> Result<AnalyticsConfig> {
	let config = match path {
		Some(path) => load_config_with_file(path)?,
		None => load_config()?,
	};
	Ok(config)
}

fn parse_props(pairs: &[String]) -> Result<Properties> {
	let mut props = Properties::new();
	for pair in pairs {
		let (key, raw) = pair
			.split_once('=')
			.with_context(|| format!("Invalid property '{pair}', expected KEY=VALUE"))?;
		if key.is_empty() {
			anyhow::bail!("Invalid property '{pair}', key is empty");
		}
		let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
		props.set(key, value);
	}
	Ok(props)
}

//! tagwatch binary entry point.

mod cli;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::warn;

use tagwatch::config::MonitorConfig;
use tagwatch::error::ClientError;
use tagwatch::poll::{Poller, PollingEngine};
use tagwatch::registry::TagRegistry;
use tagwatch::source::{demo_tags, SharedSource, SourceRegistry, TagSpec};
use tagwatch::tag::{Quality, Tag};
use tagwatch::ui;

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };

    match cli.command.unwrap_or(Command::Monitor {
        endpoint: None,
        interval: None,
        source: None,
    }) {
        Command::Monitor {
            endpoint,
            interval,
            source,
        } => monitor(&config, endpoint, interval, source),
        Command::List {
            endpoint,
            source,
            json,
        } => list(&config, endpoint, source, json),
        Command::Read {
            tag,
            endpoint,
            source,
            json,
        } => read(&config, &tag, endpoint, source, json),
        Command::Write {
            tag,
            value,
            endpoint,
            source,
        } => write(&config, &tag, &value, endpoint, source),
        Command::Validate => validate(cli.config.as_deref()),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Build the adapter, registry and engine from config plus CLI overrides.
fn build_world(
    config: &MonitorConfig,
    endpoint: Option<String>,
    driver_override: Option<String>,
) -> anyhow::Result<(Arc<PollingEngine>, bool)> {
    let sources = SourceRegistry::default_registry();
    let driver = driver_override.unwrap_or_else(|| config.source.driver.to_string());
    let Some(spec) = sources.build(&driver, &config.source.params)? else {
        bail!(
            "source driver 'none' cannot run the monitor (available: {})",
            sources.canonical_source_names().join(", ")
        );
    };
    let mut source = spec.source;

    let endpoint = endpoint.unwrap_or_else(|| config.endpoint.to_string());
    let connected = match source.connect(&endpoint) {
        Ok(()) => true,
        Err(err) => {
            warn!("connect to {endpoint} failed: {err}");
            false
        }
    };

    // Config tags win, then server browsing, then the classic demo pair.
    let discovered = source.discover();
    let seeds: Vec<TagSpec> = if !config.tags.is_empty() {
        config.tags.clone()
    } else if discovered.is_empty() {
        demo_tags()
    } else {
        discovered
    };

    let shared: SharedSource = Arc::new(Mutex::new(source));
    let registry = Arc::new(TagRegistry::with_history_cap(
        Arc::clone(&shared),
        config.history_cap,
    ));
    for seed in seeds {
        registry.add(
            seed.name,
            seed.node_id,
            seed.unit,
            seed.min_hint,
            seed.max_hint,
        );
    }
    let engine = Arc::new(PollingEngine::new(registry, shared));
    Ok((engine, connected))
}

fn monitor(
    config: &MonitorConfig,
    endpoint: Option<String>,
    interval: Option<u64>,
    source: Option<String>,
) -> anyhow::Result<()> {
    let interval = interval.map_or(config.poll_interval, Duration::from_millis);
    if interval.is_zero() {
        bail!("poll interval must be positive");
    }
    let (engine, connected) = build_world(config, endpoint, source)?;
    engine.refresh();

    let (tx, rx) = crossbeam_channel::unbounded();
    let poller = Poller::spawn(Arc::clone(&engine), interval, tx);
    let result = ui::run_ui(&engine, &poller, &rx, connected);
    poller.stop();
    result
}

fn list(
    config: &MonitorConfig,
    endpoint: Option<String>,
    source: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (engine, connected) = build_world(config, endpoint, source)?;
    engine.refresh();
    let tags = engine.registry().list_all();

    if json {
        let body = serde_json::json!({
            "connected": connected,
            "tags": tags.iter().map(tag_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!(
        "{} ({} tags)",
        if connected { "CONNECTED" } else { "DISCONNECTED" },
        tags.len()
    );
    println!(
        "{:<20} {:>12} {:<8} {:<8} {:<10} QUALITY",
        "TAG NAME", "VALUE", "UNIT", "STATUS", "TIME"
    );
    for tag in &tags {
        print_tag_row(tag);
    }
    Ok(())
}

fn read(
    config: &MonitorConfig,
    tag_name: &str,
    endpoint: Option<String>,
    source: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (engine, _connected) = build_world(config, endpoint, source)?;
    engine.refresh();
    let Some(tag) = engine.registry().find_by_name(tag_name) else {
        bail!("tag '{tag_name}' not found");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&tag_json(&tag))?);
    } else {
        println!(
            "{} = {:.2} {} [{}] {} {}",
            tag.name,
            tag.value,
            tag.unit,
            tag.mode(),
            tag.quality,
            tag.stamp
        );
    }
    Ok(())
}

fn write(
    config: &MonitorConfig,
    tag_name: &str,
    value_text: &str,
    endpoint: Option<String>,
    source: Option<String>,
) -> anyhow::Result<()> {
    // Malformed input is rejected before it reaches the registry.
    let value: f64 = value_text
        .trim()
        .parse()
        .map_err(|_| ClientError::InvalidInput(value_text.into()))?;

    let (engine, connected) = build_world(config, endpoint, source)?;
    if !connected {
        warn!("writing without an established session; local state only");
    }
    if !engine.registry().write(tag_name, value) {
        bail!("tag '{tag_name}' not found");
    }
    let tag = engine
        .registry()
        .find_by_name(tag_name)
        .context("tag vanished after write")?;
    println!(
        "{} = {:.2} {} [{}]",
        tag.name,
        tag.value,
        tag.unit,
        tag.mode()
    );
    Ok(())
}

fn validate(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        bail!("--config is required for validate");
    };
    let config = MonitorConfig::load(path)?;
    let sources = SourceRegistry::default_registry();
    if sources
        .build(&config.source.driver, &config.source.params)?
        .is_none()
    {
        println!("{}: OK (driver 'none', polling disabled)", path.display());
        return Ok(());
    }
    println!(
        "{}: OK ({} seed tags, driver '{}')",
        path.display(),
        config.tags.len(),
        config.source.driver
    );
    Ok(())
}

fn print_tag_row(tag: &Tag) {
    let quality = match tag.quality {
        Quality::Good => tag.quality.as_str().green().to_string(),
        Quality::Bad => tag.quality.as_str().red().to_string(),
        Quality::Init => tag.quality.as_str().dimmed().to_string(),
    };
    println!(
        "{:<20} {:>12.2} {:<8} {:<8} {:<10} {}",
        tag.name,
        tag.value,
        tag.unit,
        tag.mode(),
        tag.stamp,
        quality
    );
}

fn tag_json(tag: &Tag) -> serde_json::Value {
    serde_json::json!({
        "name": tag.name.as_str(),
        "node_id": tag.node_id.as_str(),
        "value": tag.value,
        "unit": tag.unit.as_str(),
        "quality": tag.quality.as_str(),
        "mode": tag.mode(),
        "time": tag.stamp.as_str(),
    })
}

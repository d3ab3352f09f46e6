//! remotecard-sim: replay a host script against the card core.
//!
//! ```text
//!  script.jsonl ──▶ ┌───────────────┐ ──▶ stdout (one RenderState per line)
//!                   │  CardService   │
//!  config.json  ──▶ │  + SimHost     │ ──▶ stderr (logs, RUST_LOG)
//!  themes.json  ──▶ └───────────────┘
//! ```
//!
//! Each script line carries an `at` timestamp plus any of
//! `"states": {...}` (entity updates), `"dark": bool`, `"offline": bool`
//! and `"command"`, one of `{"select_activity": "..."}`,
//! `{"press_button": "key"}` or `{"press_shortcut": n}`.
//! Timers due before a line's `at` fire first.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use remotecard::adapters::log_sink::LogEventSink;
use remotecard::adapters::sim_host::{JsonLinesRenderer, SimHost};
use remotecard::app::ports::RenderSink;
use remotecard::attributes::EntityState;
use remotecard::theme::ThemeDefinition;
use remotecard::{CardCommand, CardConfig, CardService};

#[derive(Debug, Parser)]
#[command(name = "remotecard-sim", version, about = "Replay a host script against the remote card core")]
struct Cli {
    /// Card configuration (JSON object, as produced by the config editor)
    #[arg(long)]
    config: PathBuf,

    /// JSON-lines script; reads stdin when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// Theme registry (JSON object of theme name → variables)
    #[arg(long)]
    themes: Option<PathBuf>,

    /// Resolve theme `modes.dark` instead of `modes.light`
    #[arg(long)]
    dark: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptLine {
    at: u64,
    #[serde(default)]
    states: Option<HashMap<String, EntityState>>,
    #[serde(default)]
    command: Option<CardCommand>,
    /// Flip the host's dark mode before this line's state pass.
    #[serde(default)]
    dark: Option<bool>,
    /// Take the hub off the bus (calls fail) or bring it back.
    #[serde(default)]
    offline: Option<bool>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config_text = fs::read_to_string(&cli.config)
        .with_context(|| format!("reading config {}", cli.config.display()))?;
    let config = CardConfig::from_json_str(&config_text).context("invalid card configuration")?;

    let themes: HashMap<String, ThemeDefinition> = match &cli.themes {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading themes {}", path.display()))?;
            serde_json::from_str(&text).context("invalid theme registry")?
        }
        None => HashMap::new(),
    };

    let reader: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            fs::File::open(path).with_context(|| format!("opening script {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    info!("simulating card for {}", config.entity);
    let mut service = CardService::new(config)?;
    let mut host = SimHost::new(themes, cli.dark);
    let mut sink = LogEventSink::new();
    let mut renderer = JsonLinesRenderer::new(io::stdout().lock());
    let mut states: HashMap<String, EntityState> = HashMap::new();

    service.start(&mut sink);

    let mut last_at = 0;
    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading script line {}", n + 1))?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let step: ScriptLine = serde_json::from_str(&line)
            .with_context(|| format!("script line {}", n + 1))?;
        if step.at < last_at {
            bail!("script line {}: time goes backwards ({} < {})", n + 1, step.at, last_at);
        }
        last_at = step.at;

        fire_timers_until(step.at, &mut service, &mut sink, &mut renderer);
        renderer.set_time(step.at);

        if let Some(offline) = step.offline {
            info!("hub {}", if offline { "offline" } else { "online" });
            host.set_offline(offline);
        }
        if let Some(dark) = step.dark {
            host.set_dark_mode(dark);
        }

        if step.states.is_some() || step.dark.is_some() {
            for (entity_id, mut entity) in step.states.unwrap_or_default() {
                entity.entity_id.clone_from(&entity_id);
                states.insert(entity_id, entity);
            }
            let render = service.update_from_states(&states, step.at, &mut host, &mut sink);
            renderer.apply(&render);
        }

        if let Some(command) = step.command {
            if let Some(render) = service.handle_command(command, step.at, &mut host, &mut sink) {
                renderer.apply(&render);
            }
        }

        if let Some(value) = service.sync_selector_display() {
            debug!("selector display <- '{}'", value);
        }
    }

    fire_timers_until(u64::MAX, &mut service, &mut sink, &mut renderer);
    info!(
        "script done: {} service calls, {} style properties set",
        host.calls().len(),
        host.style().len()
    );
    Ok(())
}

/// Fire every timer due at or before `until`, in deadline order.
fn fire_timers_until(
    until: u64,
    service: &mut CardService,
    sink: &mut LogEventSink,
    renderer: &mut JsonLinesRenderer<impl Write>,
) {
    let mut last = None;
    while let Some(deadline) = service.next_deadline().filter(|d| *d <= until) {
        if last == Some(deadline) {
            break;
        }
        last = Some(deadline);
        renderer.set_time(deadline);
        if let Some(render) = service.poll_timers(deadline, sink) {
            renderer.apply(&render);
        }
    }
}

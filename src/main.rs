// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # MIDI control surface dispatcher.
//!
//! Turns the buttons and knobs of a MIDI controller into actions.
//!
//! The application runs in one of two modes:
//!
//! * **Exec**: Each event is looked up in a mapping file and the matching
//!   shell command is started, with event values substituted into it.
//! * **Publish**: Each event is serialized to JSON and published to an MQTT
//!   topic for remote consumers.
//!
//! ## Architecture
//!
//! * The **MIDI Driver Thread** decodes incoming messages and forwards them
//!   over a `std::sync::mpsc` channel.
//! * The **Main Thread** consumes that channel in arrival order and hands each
//!   event to the sink for the active mode.
//! * **Background Work** never blocks the main thread: commands run as
//!   detached processes and the MQTT connection is driven by its own worker.

mod config;
mod dispatch;
mod events;
mod mapping;
mod midi;
mod model;
mod sinks;

use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    dispatch::{CommandPipeline, Dispatcher},
    events::{AppEvent, EventHandler, process_events},
    sinks::{mqtt::MqttBus, process::ProcessSink, publish::PublishSink},
};

/// Route MIDI controller events to shell commands or an MQTT topic.
#[derive(Parser, Debug)]
#[command(name = "rebutton")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the per-user configuration file)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// MIDI input port, by index or part of its name (defaults to the first port)
    #[arg(short, long, global = true, value_name = "PORT")]
    port: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run mapped shell commands (the default)
    Exec(ExecArgs),
    /// Publish every event to an MQTT topic
    Publish(PublishArgs),
    /// List available MIDI input ports
    Ports,
    /// Print the configuration file path
    Config,
}

#[derive(Args, Debug, Default)]
struct ExecArgs {
    /// Mapping file
    #[arg(short, long, value_name = "PATH")]
    mapping: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct PublishArgs {
    /// MQTT broker host
    #[arg(long)]
    host: Option<String>,

    /// MQTT broker port
    #[arg(long)]
    mqtt_port: Option<u16>,

    /// Topic to publish to
    #[arg(short, long)]
    topic: Option<String>,
}

/// Application state.
struct App {
    config: AppConfig,

    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            config,
            event_tx,
            event_rx,
        }
    }
}

/// The entry point of the application.
///
/// Parses the command line, initialises logging and configuration, then runs
/// the selected mode until the MIDI input closes or the process is killed.
fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli);

    let mut config = config::load_config(cli.config.as_deref());
    if let Some(port) = cli.port {
        config.midi_port = Some(port);
    }

    match cli.command.unwrap_or(Command::Exec(ExecArgs::default())) {
        Command::Exec(args) => run_exec(App::new(config), args),
        Command::Publish(args) => run_publish(App::new(config), args),
        Command::Ports => list_ports(),
        Command::Config => {
            let path = match cli.config {
                Some(path) => path,
                None => config::config_path().context("Failed to resolve configuration path")?,
            };
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Installs the global tracing subscriber.
///
/// `--debug` takes precedence over `--verbose`, without either the filter
/// comes from `RUST_LOG`, defaulting to `info` so that every dispatch is
/// traced.
fn init_tracing(cli: &Cli) {
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list_ports() -> Result<()> {
    let names = midi::list_ports().context("Failed to enumerate MIDI inputs")?;

    println!("Available MIDI inputs:");
    for (idx, name) in names.iter().enumerate() {
        println!("{}: {}", idx, name);
    }

    Ok(())
}

/// Command dispatch mode.
///
/// # Errors
///
/// Returns an error if the mapping file cannot be read or the MIDI input
/// cannot be opened.
fn run_exec(mut app: App, args: ExecArgs) -> Result<()> {
    if let Some(mapping) = args.mapping {
        app.config.mapping_file = mapping;
    }

    let path = &app.config.mapping_file;
    let table = mapping::load(path)
        .with_context(|| format!("Failed to load mapping file {}", path.display()))?;

    if table.is_empty() {
        warn!(path = %path.display(), "Mapping file has no entries, no commands will run");
    } else {
        info!(path = %path.display(), entries = table.len(), "Loaded mapping");
    }

    let dispatcher = Dispatcher::new(table);
    let runner = ProcessSink::new(app.config.shell.clone());
    let pipeline = CommandPipeline::new(&dispatcher, &runner);

    run(app, &pipeline)
}

/// Event publishing mode.
///
/// The broker connection is started in the background, events are published
/// whether or not it has been established yet.
fn run_publish(mut app: App, args: PublishArgs) -> Result<()> {
    let mqtt = &mut app.config.mqtt;
    if let Some(host) = args.host {
        mqtt.host = host;
    }
    if let Some(port) = args.mqtt_port {
        mqtt.port = port;
    }
    if let Some(topic) = args.topic {
        mqtt.topic = topic;
    }

    let bus = MqttBus::connect(&app.config.mqtt);
    let sink = PublishSink::new(bus, app.config.mqtt.topic.clone());

    run(app, &sink)
}

/// Opens the MIDI input and enters the event loop.
///
/// The input connection owns the only sender of the event channel and lives
/// until this function returns, so the loop runs until the process is
/// terminated. The driver reports no disconnect, a vanished device simply
/// stops producing events.
fn run(app: App, handler: &dyn EventHandler) -> Result<()> {
    let App {
        config,
        event_tx,
        event_rx,
    } = app;

    let source = midi::open_input(config.midi_port.as_deref(), event_tx)
        .context("Failed to open MIDI input")?;

    info!(port = %source.port_name, "Listening");

    process_events(&event_rx, handler);
    drop(source);

    Ok(())
}

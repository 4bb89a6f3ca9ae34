use std::{io::Write, path::PathBuf};

use chatshell_core::{ConnectionState, StatusEvent};
use chatshell_supervisor::{
    DEFAULT_CONFIG_PATH, MonitorEvent, default_client_binary, start, supervise,
};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};

/// Run the chat client headless and report its status changes.
#[derive(Parser, Debug)]
#[command(name = "chatshell-monitor")]
struct MonitorArgs {
    #[arg(long, default_value_os_t = default_client_binary())]
    client_bin: PathBuf,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Print one JSON object per recognized event on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct EventRecord<'a> {
    line: &'a str,
    event: &'a StatusEvent,
    connected: bool,
    client_id: Option<&'a str>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = MonitorArgs::parse();

    let client = match start(&args.client_bin, &args.config).and_then(|h| supervise(h, || {})) {
        Ok(client) => client,
        Err(err) => {
            // `supervise` has already killed the process if one was started.
            error!("{}", err);
            std::process::exit(1);
        }
    };

    let mut state = ConnectionState::default();
    let stdout = std::io::stdout();
    for event in &client.events {
        match event {
            MonitorEvent::Status { line, event } => {
                let delta = event.delta();
                state.apply(&delta);
                if args.json {
                    let record = EventRecord {
                        line: &line,
                        event: &event,
                        connected: state.connected,
                        client_id: state.client_id.as_deref(),
                    };
                    match serde_json::to_string(&record) {
                        Ok(json) => {
                            let mut out = stdout.lock();
                            if writeln!(out, "{json}").is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!("failed to encode event: {}", err),
                    }
                } else {
                    info!(
                        connected = state.connected,
                        client_id = state.client_id.as_deref().unwrap_or("-"),
                        "{}",
                        delta.note.as_deref().unwrap_or(line.as_str())
                    );
                }
            }
            MonitorEvent::Exited => break,
        }
    }

    let pid = client.pid();
    match client.shutdown() {
        Some(status) => info!(pid, %status, "client exited"),
        None => warn!(pid, "client exit status unavailable"),
    }
}

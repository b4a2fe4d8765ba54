// MIT License - Copyright (c) 2026 Peter Wright
// lircctl: command line client for lircd

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};

use lirc_client::{
    ButtonPress, Command, CommandReply, Connection, ConnectionConfig, LircError, List, Raw,
    SendOnce, SendStart, SendStop, Version,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "lircctl")]
#[command(about = "Talk to the LIRC daemon: watch button presses and send commands")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// lircd socket path (overrides the config file)
    #[arg(long, conflicts_with = "host")]
    socket: Option<PathBuf>,

    /// lircd TCP address, host[:port] (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Print replies and button presses as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print button presses until interrupted
    Listen,
    /// Print the lircd version
    Version,
    /// List remotes, or the buttons of one remote
    List { remote: Option<String> },
    /// Send a button once
    SendOnce {
        remote: String,
        button: String,
        #[arg(long)]
        repeats: Option<u32>,
    },
    /// Start repeating a button
    SendStart { remote: String, button: String },
    /// Stop repeating a button
    SendStop { remote: String, button: String },
    /// Send arbitrary command tokens
    Raw {
        #[arg(required = true)]
        tokens: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct Config {
    #[serde(default)]
    connection: ConnectionToml,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectionToml {
    /// lircd socket path
    #[serde(default)]
    socket: Option<PathBuf>,
    /// lircd TCP address; takes precedence over `socket` when both are set
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    event_capacity: Option<usize>,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text).context("Failed to parse config file")
}

fn build_connection_config(cli: &Cli, toml: &ConnectionToml) -> ConnectionConfig {
    let mut builder = ConnectionConfig::builder();

    if let Some(path) = &cli.socket {
        builder = builder.unix(path);
    } else if let Some(host) = &cli.host {
        builder = builder.tcp(host);
    } else if let Some(host) = &toml.host {
        builder = builder.tcp(host);
    } else if let Some(path) = &toml.socket {
        builder = builder.unix(path);
    }

    if let Some(capacity) = toml.event_capacity {
        builder = builder.event_capacity(capacity);
    }
    builder.build()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_json(value: &impl Serialize) {
    match serde_json::to_string(value) {
        Ok(text) => println!("{text}"),
        Err(e) => warn!("Failed to encode JSON: {e}"),
    }
}

fn print_press(press: &ButtonPress, json: bool) {
    if json {
        print_json(press);
    } else {
        println!(
            "{} {} repeat={}",
            press.remote_control_name, press.button_name, press.repeat_count
        );
    }
}

fn print_reply(reply: &CommandReply, json: bool) {
    if json {
        print_json(reply);
    } else {
        for line in &reply.data {
            println!("{line}");
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

fn command_for(action: &Action) -> Option<Box<dyn Command>> {
    let command: Box<dyn Command> = match action {
        Action::Listen => return None,
        Action::Version => Box::new(Version),
        Action::List { remote } => Box::new(List {
            remote: remote.clone(),
        }),
        Action::SendOnce {
            remote,
            button,
            repeats,
        } => Box::new(SendOnce {
            remote: remote.clone(),
            button: button.clone(),
            repeats: *repeats,
        }),
        Action::SendStart { remote, button } => Box::new(SendStart {
            remote: remote.clone(),
            button: button.clone(),
        }),
        Action::SendStop { remote, button } => Box::new(SendStop {
            remote: remote.clone(),
            button: button.clone(),
        }),
        Action::Raw { tokens } => Box::new(Raw(tokens.clone())),
    };
    Some(command)
}

async fn listen(conn: &Connection, json: bool) -> Result<()> {
    let mut events = conn
        .take_events()
        .context("Event receiver already taken")?;
    let mut sigterm = signal(SignalKind::terminate())?;

    info!("Listening for button presses. Send SIGINT/SIGTERM to stop.");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }
            Some(press) = events.recv() => print_press(&press, json),
        }
    }
    Ok(())
}

async fn send(conn: &Connection, command: &dyn Command, json: bool) -> Result<()> {
    debug!(command = %command.name(), "Sending command");
    match conn.send_command(command).await {
        Ok(reply) => {
            print_reply(&reply, json);
            Ok(())
        }
        Err(LircError::UnsuccessfulCommand { reply }) => {
            print_reply(&reply, json);
            anyhow::bail!("lircd reported failure for {}", reply.command)
        }
        Err(e) => Err(e).with_context(|| format!("Cannot send {}", command.name())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=lirc_client=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    }

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let connection_config = build_connection_config(&cli, &config.connection);

    let conn = Arc::new(
        Connection::from_config(&connection_config).context("Invalid connection settings")?,
    );
    info!("Connecting to lircd at {}", conn.endpoint());

    let mut runner = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move { conn.start().await })
    };

    let action = async {
        match command_for(&cli.command) {
            None => listen(&conn, cli.json).await,
            Some(command) => send(&conn, command.as_ref(), cli.json).await,
        }
    };

    let outcome = tokio::select! {
        finished = &mut runner => {
            // The connection ended before the action did.
            return match finished.context("Connection task panicked")? {
                Ok(()) => Ok(()),
                Err(e) => Err(e).context("lircd connection failed"),
            };
        }
        outcome = action => outcome,
    };

    conn.disconnect();
    match runner.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("lircd connection failed: {e}"),
        Err(e) => warn!("Connection task failed: {e}"),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use lirc_client::Endpoint;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("lircctl").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_overrides_config() {
        let toml: Config = toml::from_str(
            r#"
            [connection]
            socket = "/run/lirc/lircd"
            event_capacity = 4
            "#,
        )
        .unwrap();

        let config = build_connection_config(&cli(&["version"]), &toml.connection);
        assert_eq!(config.endpoint, Endpoint::unix("/run/lirc/lircd"));
        assert_eq!(config.event_capacity, 4);

        let config =
            build_connection_config(&cli(&["--host", "pi", "version"]), &toml.connection);
        assert_eq!(config.endpoint, Endpoint::tcp("pi"));
    }

    #[test]
    fn test_default_config_uses_local_socket() {
        let config = build_connection_config(&cli(&["listen"]), &ConnectionToml::default());
        assert_eq!(config.endpoint, Endpoint::unix("/var/run/lirc/lircd"));
    }

    #[test]
    fn test_actions_encode_commands() {
        let parsed = cli(&["send-once", "tv", "KEY_POWER", "--repeats", "2"]);
        let command = command_for(&parsed.command).unwrap();
        assert_eq!(command.encode().join(" "), "SEND_ONCE tv KEY_POWER 2");

        let parsed = cli(&["raw", "DRV_OPTION", "key", "value"]);
        let command = command_for(&parsed.command).unwrap();
        assert_eq!(command.encode().join(" "), "DRV_OPTION key value");

        assert!(command_for(&cli(&["listen"]).command).is_none());
    }
}

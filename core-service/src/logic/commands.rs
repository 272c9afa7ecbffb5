//! Command Ingestion
//!
//! Operator input (and optionally peer input) arrives as text lines on a
//! channel; one ingestion task turns each line into a single atomic state
//! replace. Nothing here ever waits on the tick, and the tick never waits on
//! input.
//!
//! Stdin is read on a dedicated OS thread: a blocking read inside the async
//! runtime would keep the runtime from shutting down while nobody types.

use std::io::BufRead;
use std::thread;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::{HabitatState, ScenarioCommand, SharedState};

/// Buffered command lines between producers and the ingestion task
pub const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Where a command line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Operator,
    Peer,
}

impl CommandSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandSource::Operator => "operator",
            CommandSource::Peer => "peer",
        }
    }
}

/// One raw line of input
#[derive(Debug, Clone)]
pub struct CommandLine {
    pub source: CommandSource,
    pub text: String,
}

impl CommandLine {
    pub fn new(source: CommandSource, text: impl Into<String>) -> Self {
        Self { source, text: text.into() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid command {0:?}, state unchanged")]
pub struct RejectedCommand(pub String);

pub fn channel() -> (mpsc::Sender<CommandLine>, mpsc::Receiver<CommandLine>) {
    mpsc::channel(COMMAND_CHANNEL_CAPACITY)
}

// ============================================================================
// INGESTION
// ============================================================================

/// Parse and apply one line. Unknown input leaves the state untouched.
pub fn ingest_line(
    state: &SharedState,
    line: &str,
) -> Result<(ScenarioCommand, HabitatState), RejectedCommand> {
    let command =
        ScenarioCommand::parse(line).ok_or_else(|| RejectedCommand(line.trim().to_string()))?;
    Ok((command, state.apply(command)))
}

/// Consume command lines until every sender is gone.
///
/// Stopping is cooperative: Quit only flips the running flag, the streaming
/// loop notices it at its next tick boundary.
pub async fn run_ingestion(mut rx: mpsc::Receiver<CommandLine>, state: SharedState) {
    while let Some(line) = rx.recv().await {
        match ingest_line(&state, &line.text) {
            Ok((ScenarioCommand::Quit, _)) => {
                info!(source = line.source.as_str(), "quit requested, stopping at next tick");
            }
            Ok((command, new_state)) => {
                info!(
                    source = line.source.as_str(),
                    command = %command,
                    level = %new_state.level,
                    ">>> Switching to: {}",
                    command.description()
                );
            }
            Err(rejected) => {
                warn!(source = line.source.as_str(), "{}", rejected);
            }
        }
    }
    debug!("command ingestion finished");
}

// ============================================================================
// PRODUCERS
// ============================================================================

/// Read lines from a blocking reader on its own thread.
///
/// Ends on EOF, on a read error, or when the ingestion side is gone.
pub fn spawn_line_reader<R>(
    reader: R,
    source: CommandSource,
    tx: mpsc::Sender<CommandLine>,
) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    warn!(source = source.as_str(), "input read failed: {}", e);
                    break;
                }
            };
            if tx.blocking_send(CommandLine::new(source, text)).is_err() {
                return;
            }
        }
        info!(source = source.as_str(), "input closed, stream keeps running");
    })
}

/// Operator terminal input
pub fn spawn_operator_input(tx: mpsc::Sender<CommandLine>) -> thread::JoinHandle<()> {
    let stdin = std::io::BufReader::new(std::io::stdin());
    spawn_line_reader(stdin, CommandSource::Operator, tx)
}

/// Forward command lines the peer sends on its half of the connection
pub async fn forward_peer_commands<R>(reader: R, tx: mpsc::Sender<CommandLine>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(text)) => {
                if tx.send(CommandLine::new(CommandSource::Peer, text)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("peer command read ended: {}", e);
                break;
            }
        }
    }
}

/// Command list shown once a peer is connected
pub fn announce_commands() {
    info!("------------------------------------------------");
    info!("Enter commands in terminal to control the scene:");
    for command in [
        ScenarioCommand::Normal,
        ScenarioCommand::Radiation,
        ScenarioCommand::Gas,
        ScenarioCommand::Oxygen,
        ScenarioCommand::Quit,
    ] {
        info!(" [{}]  -> {}", command.token(), command.description());
    }
    info!("------------------------------------------------");
}

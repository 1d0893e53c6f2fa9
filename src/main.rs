//! Message Relay (v1)
//!
//! Loads a flow definition, pushes one message into a named channel and
//! prints whatever arrives on the pollable queue channels.
//!
//! # Architecture Overview
//!
//! ```text
//!   producer ──▶ input channel ──▶ router ──┬──▶ queue channel ──▶ consumer
//!                 (direct)                   │
//!                                            └──▶ outbound input ──▶ HTTP gateway ──▶ remote service
//!                                                   (direct)              │
//!                                                                         └──▶ reply queue
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use message_relay::channel::PollableChannel;
use message_relay::config::load_config;
use message_relay::message::{MessageBuilder, Payload};
use message_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "message-relay")]
#[command(about = "Route messages through a configured flow", long_about = None)]
struct Cli {
    /// Flow definition (TOML).
    #[arg(short, long, default_value = "relay.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the flow definition and list its channels
    Check,
    /// Send one message into a channel and print what the queues received
    Send {
        /// Channel to send to.
        channel: String,

        /// Text payload. Ignored when --field is given.
        #[arg(default_value = "")]
        payload: String,

        /// Header as name=value (repeatable).
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Form field as name=value (repeatable). Sends a map payload.
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// How long to wait for each queue after sending, in milliseconds.
        #[arg(long, default_value_t = 100)]
        wait_ms: u64,
    },
}

fn split_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(config = %cli.config.display(), "message-relay v0.1.0 starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let flow = message_relay::build_flow(&config)?;

    match cli.command {
        Commands::Check => {
            println!("configuration OK");
            for name in flow.registry().names() {
                println!("  channel {}", name);
            }
        }
        Commands::Send {
            channel,
            payload,
            headers,
            fields,
            wait_ms,
        } => {
            let payload = if fields.is_empty() {
                Payload::Text(payload)
            } else {
                let pairs = fields
                    .iter()
                    .map(|f| split_pair(f))
                    .collect::<Result<Vec<_>, _>>()?;
                Payload::text_map(pairs)
            };

            let mut builder = MessageBuilder::with_payload(payload);
            for raw in &headers {
                let (name, value) = split_pair(raw)?;
                builder = builder.header(name, value);
            }
            let message = builder.build();
            let id = message.id();

            let accepted = flow.send(&channel, message).await?;
            tracing::info!(message_id = %id, channel = %channel, accepted, "Message sent");

            let wait = Duration::from_millis(wait_ms);
            for name in flow.queue_names() {
                let Some(queue) = flow.queue(&name) else {
                    continue;
                };
                while let Some(received) = queue.receive(wait).await {
                    let body = serde_json::to_string(received.payload())?;
                    println!("{}\t{}\t{}", name, received.id(), body);
                }
            }
        }
    }

    Ok(())
}

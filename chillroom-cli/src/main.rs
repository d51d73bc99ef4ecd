use anyhow::{Context, Result};
use chillroom_client::media::{AdmissionPolicy, WriterSink};
use chillroom_client::signaling::{
    HttpOfferExchange, MediaControl, PeerEvent, SignalingNegotiator, WebRtcPeer,
};
use chillroom_client::{ChatSession, ClientConfig, ClientError, SessionEvent};
use chillroom_core::{ChatEvent, Credential, MediaTrigger};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chillroom")]
#[command(about = "Chat and watch together from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the room chat. Lines from stdin are sent as messages.
    Chat {
        /// Session token; prompted for when absent.
        #[arg(long, env = "CHILLROOM_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Write the room's media stream here ("-" for stdout).
        #[arg(long)]
        media_out: Option<String>,

        /// Hold up to this many chunks while the writer is busy instead of
        /// dropping them.
        #[arg(long)]
        queue: Option<usize>,
    },

    /// Negotiate a receive-only video session and report incoming tracks.
    Watch,

    /// Ask the server to start broadcasting a stored object.
    Trigger {
        #[arg(long)]
        bucket: String,

        #[arg(long)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Invalid CHILLROOM_* environment")?;

    match cli.command {
        Commands::Chat {
            token,
            media_out,
            queue,
        } => chat(config, token, media_out, queue).await,
        Commands::Watch => watch(config).await,
        Commands::Trigger { bucket, key } => trigger(config, bucket, key).await,
    }
}

async fn chat(
    mut config: ClientConfig,
    token: Option<String>,
    media_out: Option<String>,
    queue: Option<usize>,
) -> Result<()> {
    let credential = match token {
        Some(token) => Credential::new(token),
        None => Credential::new(
            dialoguer::Password::new()
                .with_prompt("Session token")
                .interact()
                .context("No session token")?,
        ),
    };

    if let Some(capacity) = queue {
        config.media.policy = AdmissionPolicy::Queue { capacity };
    }

    // Chat goes to stderr when stdout carries the media stream.
    let to_stderr = media_out.as_deref() == Some("-");
    let sink = match media_out.as_deref() {
        Some("-") => WriterSink::stdout(),
        Some(path) => WriterSink::file(path),
        None => WriterSink::discard(),
    };

    let (session, handle, mut events) = ChatSession::connect(credential, &config, sink);
    let task = tokio::spawn(session.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match handle.send(line).await {
                    Ok(()) | Err(ClientError::EmptyMessage) => {}
                    Err(e) => print_line(to_stderr, format!("{} {}", "✗".red(), e)),
                },
                None => {
                    stdin_open = false;
                    handle.close().await;
                }
            },

            event = events.recv() => match event {
                Some(SessionEvent::Connected) => {
                    print_line(to_stderr, format!("{}", "Connected to the room".green().bold()));
                }
                Some(SessionEvent::Message { event, is_self }) => {
                    print_line(to_stderr, format_message(&event, is_self));
                }
                Some(SessionEvent::Disconnected(notice)) => {
                    let text = if notice.clean {
                        format!("Disconnected ({})", notice.reason).yellow()
                    } else {
                        format!("Connection lost: {}", notice.reason).red()
                    };
                    print_line(to_stderr, text.to_string());
                    break;
                }
                None => break,
            },
        }
    }

    let stats = task.await.context("Chat session panicked")?;
    if media_out.is_some() {
        eprintln!(
            "{} {} chunks ({} bytes) written, {} dropped",
            "media:".cyan(),
            stats.appended,
            stats.bytes_appended,
            stats.dropped
        );
    }
    Ok(())
}

fn format_message(event: &ChatEvent, is_self: bool) -> String {
    if is_self {
        format!("{} {}", "you:".green().bold(), event.content())
    } else {
        format!(
            "{} {}",
            format!("{}:", event.display_name()).cyan().bold(),
            event.content()
        )
    }
}

fn print_line(to_stderr: bool, line: String) {
    if to_stderr {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

async fn watch(config: ClientConfig) -> Result<()> {
    let (peer, mut peer_events) = WebRtcPeer::new(&config.signaling).await?;
    let exchange = HttpOfferExchange::new(&config.signaling)?;
    let mut negotiator = SignalingNegotiator::new(peer, exchange).await?;

    println!("{} {}", "Negotiating with".cyan(), config.signaling.offer_url);
    negotiator.negotiate().await.context("Negotiation failed")?;
    println!("{}", "Negotiated; waiting for media (Ctrl-C to stop)".green().bold());

    let received = Arc::new(AtomicU64::new(0));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            event = peer_events.recv() => match event {
                Some(PeerEvent::TrackAdded(track)) => {
                    println!(
                        "{} {} ({})",
                        "Track:".cyan().bold(),
                        track.kind(),
                        track.codec().capability.mime_type
                    );
                    let received = received.clone();
                    tokio::spawn(async move {
                        loop {
                            match track.read_rtp().await {
                                Ok((packet, _)) => {
                                    received.fetch_add(packet.payload.len() as u64, Ordering::Relaxed);
                                }
                                Err(e) => {
                                    warn!("Track read ended: {}", e);
                                    break;
                                }
                            }
                        }
                    });
                }
                Some(PeerEvent::ConnectionState(state)) => {
                    println!("{} {}", "Peer:".cyan(), state);
                }
                None => break,
            },
        }
    }

    negotiator.close().await;
    println!(
        "{} {} payload bytes received",
        "Done:".green().bold(),
        received.load(Ordering::Relaxed)
    );
    Ok(())
}

async fn trigger(config: ClientConfig, bucket: String, key: String) -> Result<()> {
    let control = MediaControl::new(&config.signaling)?;
    let reply = control
        .trigger(&MediaTrigger { bucket, key })
        .await
        .context("Media trigger failed")?;

    println!("{} {}", "✓".green().bold(), reply);
    Ok(())
}

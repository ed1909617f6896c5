use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use colored::*;
use pairlink_client::{
    NegotiationState, SessionConfig, SessionHandle, SessionNotice, TransportConfig, WebRtcConfig,
    spawn_peer,
};
use pairlink_core::{Role, RoomId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pairlink-peer")]
#[command(about = "Terminal chat over a WebRTC data channel, paired through a pairlink relay")]
struct Args {
    #[arg(long, env = "PAIRLINK_RELAY", default_value = "ws://127.0.0.1:8080/ws")]
    relay: String,

    #[arg(short, long, env = "PAIRLINK_ROOM")]
    room: String,

    /// initiator (alias: android) or responder (alias: web)
    #[arg(long, env = "PAIRLINK_ROLE", default_value = "initiator")]
    role: Role,

    /// Wait for `/offer` instead of offering as soon as the relay connection opens.
    #[arg(long)]
    no_auto_offer: bool,

    /// Leave the relay once the data channel is open.
    #[arg(long)]
    leave_relay: bool,

    /// STUN server urls, comma separated. Defaults to the public Google servers.
    #[arg(long, env = "PAIRLINK_STUN", value_delimiter = ',')]
    stun: Vec<String>,

    /// Host candidates only.
    #[arg(long, conflicts_with = "stun")]
    no_stun: bool,
}

impl Args {
    fn webrtc_config(&self) -> WebRtcConfig {
        if self.no_stun {
            WebRtcConfig::local()
        } else if self.stun.is_empty() {
            WebRtcConfig::default()
        } else {
            WebRtcConfig {
                ice_servers: self.stun.clone(),
                ..Default::default()
            }
        }
    }
}

enum Input {
    Line(String),
    Offer,
    State,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim_end() {
        "" => None,
        "/offer" => Some(Input::Offer),
        "/state" => Some(Input::State),
        "/quit" | "/exit" => Some(Input::Quit),
        text => Some(Input::Line(text.to_owned())),
    }
}

fn print_notice(notice: SessionNotice) {
    match notice {
        SessionNotice::Data(data) => {
            println!("{} {}", "peer>".green().bold(), String::from_utf8_lossy(&data));
        }
        SessionNotice::State(NegotiationState::ChannelOpen) => {
            println!("{}", "🔗 Data channel open, start typing".green().bold());
        }
        SessionNotice::State(state) => println!("{}", format!("· {:?}", state).yellow()),
        SessionNotice::Error(e) => println!("{} {}", "error:".red().bold(), e),
    }
}

async fn handle_input(handle: &SessionHandle, input: Input) -> bool {
    match input {
        Input::Line(text) => {
            if let Err(e) = handle.send(Bytes::from(text)).await {
                println!("{} {}", "not sent:".red(), e);
            }
        }
        Input::Offer => {
            if let Err(e) = handle.offer() {
                println!("{} {}", "error:".red().bold(), e);
            }
        }
        Input::State => println!("{}", format!("· {:?}", handle.state()).yellow()),
        Input::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let room = RoomId::new(&args.room).context("Invalid room id")?;

    let transport = TransportConfig::new(args.relay.clone(), room, args.role);
    let session = SessionConfig {
        offer_on_connect: !args.no_auto_offer,
        close_signaling_on_open: args.leave_relay,
        ..Default::default()
    };

    let (handle, mut notices) = spawn_peer(transport, session, args.webrtc_config())
        .context("Failed to start peer")?;

    println!(
        "{}",
        format!("🚀 Joining room {} as {} via {}", args.room, args.role, args.relay)
            .green()
            .bold()
    );
    handle.connect()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Some(notice) => print_notice(notice),
                None => break,
            },
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => {
                    let Some(input) = parse_input(&line) else { continue };
                    if !handle_input(&handle, input).await {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    handle.disconnect().await;
    println!("{}", "👋 Bye".cyan());
    Ok(())
}

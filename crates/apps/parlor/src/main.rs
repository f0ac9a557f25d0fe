//! Parlor - A terminal client for channel-based messaging
//!
//! This is the main entry point for the Parlor chat application.

use anyhow::{Context, Result};
use chat::{ChatSession, ClientConfig, ErrorLog, HttpChatClient, SyncController};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

mod commands;
mod render;

use commands::Flow;

#[derive(Parser, Debug)]
#[command(name = "parlor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Read client settings from this JSON file instead of ~/.config/parlor/client.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the resolved settings to ~/.config/parlor/client.json and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let settings = ClientConfig::load_from(args.config.as_deref())
        .context("Failed to load client configuration")?;

    if args.init_config {
        let path = settings.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    info!("Connecting to {}", settings.base_url);
    let client = HttpChatClient::new(&settings);
    let errors = Arc::new(ErrorLog::new());
    let controller = SyncController::new(settings.draft_policy).with_observer(errors.clone());

    let mut session = ChatSession::new(Arc::new(client), controller);
    session.start();

    println!("{}", commands::HELP);
    run(&mut session).await?;

    info!("Parlor exiting ({} request errors this session)", errors.len());
    Ok(())
}

async fn run(session: &mut ChatSession) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let flow = commands::parse(&line)
                    .and_then(|command| commands::execute(command, session));
                match flow {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::ShowChannels) => print!("{}", render::render_channels(session.controller())),
                    Ok(Flow::ShowHelp) => println!("{}", commands::HELP),
                    Ok(Flow::Continue) => print!("{}", render::render_view(session.controller())),
                    Err(message) => println!("{}", message),
                }
            }
            Some(event) = session.next_event(), if session.in_flight() > 0 => {
                if let Some(message) = render::describe_event(&event) {
                    println!("{}", message);
                }
                match event {
                    chat::SessionEvent::ChannelsLoaded(_) => {
                        print!("{}", render::render_channels(session.controller()));
                    }
                    _ => print!("{}", render::render_view(session.controller())),
                }
            }
        }
    }
    Ok(())
}

//! CLI for chathub
//!
//! Subcommands:
//! - `server`: run the HTTP/WebSocket server

use std::sync::Arc;

use chathub::auth::{AccountService, TokenService};
use chathub::config::load_config;
use chathub::hub::Hub;
use chathub::persistence::SledStore;
use chathub::transport::{AppState, serve};
use chathub::utils::{Error, HubError, logging};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "chathub")]
enum Command {
    /// Start the chat server
    Server,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cmd = Command::parse();

    match cmd {
        Command::Server => {
            if let Err(e) = run_server().await {
                logging::init("info");
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run_server() -> Result<(), Error> {
    let settings = load_config()?;
    logging::init(&settings.log.level);

    let tokens = TokenService::new(&settings.auth.secret_key)?;
    let store = Arc::new(SledStore::open(&settings.storage.path)?);
    let identity = Arc::new(AccountService::new(
        store.clone(),
        tokens.clone(),
        &settings.auth,
    ));

    let (hub, hub_task) = Hub::start(&settings.hub);
    for seed in &settings.hub.rooms {
        match hub.create_room(&seed.id, &seed.name).await {
            Ok(_) | Err(HubError::RoomAlreadyExists(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    let state = AppState::new(hub, identity, tokens, settings);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received. Exiting gracefully.");
    };
    serve(listener, state, shutdown).await?;

    hub_task.abort();
    store.flush()?;
    Ok(())
}

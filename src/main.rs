use std::sync::Arc;

use clap::Parser;
use log::{error, info, LevelFilter};
use tokio::net::TcpListener;

use flotilla::transport::TcpTransport;
use flotilla::{
    init_logging, init_logging_at, Connection, GameService, Identity, MemoryStore, SessionManager,
    TokenRegistry, DEFAULT_BIND_ADDR,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Run the game server and accept client connections.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND_ADDR)]
        bind: String,
        #[arg(
            long,
            help = "Accept any non-empty credential and derive a stable user id from it"
        )]
        permissive: bool,
        #[arg(long, help = "Log level, overriding FLOTILLA_LOG")]
        log_level: Option<LevelFilter>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            permissive,
            log_level,
        } => {
            match log_level {
                Some(level) => init_logging_at(level),
                None => init_logging(),
            }
            let identity: Arc<dyn Identity> = if permissive {
                Arc::new(TokenRegistry::permissive())
            } else {
                Arc::new(TokenRegistry::new())
            };
            let sessions = Arc::new(SessionManager::new());
            let store = Arc::new(MemoryStore::new());
            let service = Arc::new(GameService::new(store, sessions));

            let listener = TcpListener::bind(&bind).await?;
            info!("listening on {}", bind);

            loop {
                let (stream, peer) = listener.accept().await?;
                info!("accepted connection from {}", peer);
                let connection =
                    Connection::new(TcpTransport::new(stream), service.clone(), identity.clone());
                tokio::spawn(async move {
                    if let Err(err) = connection.run().await {
                        error!("connection from {} failed: {}", peer, err);
                    }
                });
            }
        }
    }
}

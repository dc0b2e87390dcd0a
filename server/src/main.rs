use clap::Parser;
use log::info;
use server::network::{Server, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Simulation ticks per second
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Maximum number of simultaneous connections
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// Seed for spawn points and piercing-shot targets
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);
    let config = ServerConfig {
        tick_rate: args.tick_rate,
        max_clients: args.max_clients,
        seed: args.seed,
    };

    info!("Starting arena server on {}", address);
    info!(
        "Tick rate: {}Hz, max clients: {}",
        config.tick_rate, config.max_clients
    );

    let mut server = Server::new(&address, config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

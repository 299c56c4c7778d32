use std::net::SocketAddr;

use anyhow::Result;
use bookalope_testnet::EphemeralServer;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Run an in-memory Bookalope server until Ctrl-C.")]
struct Cli {
    /// Address to listen on. Port 0 picks a free port.
    #[clap(long, default_value = "127.0.0.1:0")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter("bookalope_testnet=debug,tower_http=debug".to_string())
        .init();

    let server = EphemeralServer::start_on(args.listen).await?;

    tracing::info!("Bookalope test server running");
    tracing::info!("Host: {}", server.url());
    tracing::info!("Token: {}", server.token());

    tokio::signal::ctrl_c().await?;
    drop(server);

    Ok(())
}

use anyhow::Result;
use bookalope_testnet::EphemeralServer;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    version,
    about = "Configure tracing before calling into the Bookalope client."
)]
struct Cli {
    /// Maximum tracing verbosity to enable: error|warn|info|debug|trace
    #[arg(long, default_value_t = LevelFilter::INFO, value_parser = clap::value_parser!(LevelFilter))]
    level: LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { level } = Cli::parse();
    init_tracing(level);
    info!(%level, "Tracing initialized");

    info!("Starting in-memory Bookalope server");
    let server = EphemeralServer::start().await?;
    let client = server.client()?;

    let profile = client.get_profile().await?;
    info!(firstname = %profile.firstname, lastname = %profile.lastname, "Fetched profile");

    let book = client.create_book().await?;
    let bookflow = &book.bookflows()[0];
    info!(book = %book.id(), bookflow = %bookflow.id(), "Created book");

    debug!("Uploading a document so the bookflow can convert");
    bookflow
        .set_document("hello.txt", b"Hello from the logging demo")
        .await?;

    book.delete().await?;
    info!(book = %book.id(), "Roundtrip complete");

    Ok(())
}

fn init_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .init();
}

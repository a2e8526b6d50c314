use clap::Parser;
use dotenv::dotenv;
use eyre::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pdfpress::{cli::Args, config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::resolve(&args)?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Listening on {}...", listener.local_addr()?);

    axum::serve(listener, server::router(config)).await?;

    Ok(())
}

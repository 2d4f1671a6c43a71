use anyhow::Result;
use clap::Parser;
use pnrsend::pipeline::{self, RunConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Submit PNR events from spreadsheet files to a SOAP endpoint, one request
/// per row, with a CSV audit log of every outcome.
#[derive(Parser, Debug)]
#[command(name = "pnrsend", version)]
struct Args {
    /// Directory containing the spreadsheet files to process.
    #[arg(long, value_name = "PATH")]
    excel_dir: PathBuf,

    /// URL of the SOAP endpoint that receives the requests.
    #[arg(long, value_name = "URL")]
    soap_endpoint: String,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    info!(dir = %args.excel_dir.display(), endpoint = %args.soap_endpoint, "startup");

    let config = RunConfig::new(args.excel_dir, args.soap_endpoint);
    pipeline::run(&config)?;
    Ok(())
}
